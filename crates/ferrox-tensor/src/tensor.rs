use thiserror::Error;

use super::{
    allocator::{CpuAllocator, TensorAllocator, TensorAllocatorError},
    storage::TensorStorage,
    view::{TensorView, TensorViewMut},
};

/// An error type for tensor operations.
#[derive(Error, Debug, PartialEq)]
pub enum TensorError {
    /// Tensor shape does not match the provided data.
    ///
    /// Returned when the product of the shape extents does not equal the
    /// number of elements supplied at construction.
    #[error("Shape mismatch: expected {expected} elements for shape, but got {actual} elements in data")]
    InvalidShape {
        /// Expected number of elements based on the shape.
        expected: usize,
        /// Actual number of elements in the data.
        actual: usize,
    },

    /// Index exceeds tensor bounds.
    #[error("Index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index that was attempted.
        index: usize,
        /// The size of the dimension being indexed.
        size: usize,
    },

    /// The product of the shape extents overflows the address space.
    ///
    /// No buffer of that many elements can exist, so the shape is rejected
    /// before any length comparison.
    #[error("Shape overflow: product of extents {shape:?} exceeds usize::MAX")]
    ShapeOverflow {
        /// The offending shape.
        shape: Vec<usize>,
    },

    /// Underlying storage allocation failed.
    ///
    /// See [`TensorAllocatorError`] for details.
    #[error("Storage error: {0}")]
    StorageError(#[from] TensorAllocatorError),
}

impl TensorError {
    /// Creates an InvalidShape error with clear context.
    pub fn invalid_shape(expected: usize, actual: usize) -> Self {
        Self::InvalidShape { expected, actual }
    }

    /// Creates an IndexOutOfBounds error with clear context.
    pub fn index_out_of_bounds(index: usize, size: usize) -> Self {
        Self::IndexOutOfBounds { index, size }
    }
}

/// Computes the strides for a row-major (C-contiguous) tensor layout.
///
/// The rightmost dimension has stride 1 and each dimension's stride is the
/// product of all extents to its right.
///
/// # Examples
///
/// ```rust
/// use ferrox_tensor::tensor::get_strides_from_shape;
///
/// assert_eq!(get_strides_from_shape(&[2, 3]), vec![3, 1]);
/// assert_eq!(get_strides_from_shape(&[2, 3, 4]), vec![12, 4, 1]);
/// ```
pub fn get_strides_from_shape(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![0; shape.len()];
    let mut stride = 1usize;
    for i in (0..shape.len()).rev() {
        strides[i] = stride;
        // For shapes whose element count fits in usize this cannot saturate;
        // a zero extent with absurd sibling extents may, and the saturated
        // strides then only address the (empty) buffer out of bounds.
        stride = stride.saturating_mul(shape[i]);
    }
    strides
}

/// Computes the element count for a shape, rejecting products that overflow.
///
/// A shape containing a zero extent has zero elements regardless of its
/// other extents.
fn checked_numel(shape: &[usize]) -> Result<usize, TensorError> {
    if shape.contains(&0) {
        return Ok(0);
    }
    shape
        .iter()
        .try_fold(1usize, |acc, &extent| acc.checked_mul(extent))
        .ok_or_else(|| TensorError::ShapeOverflow {
            shape: shape.to_vec(),
        })
}

/// A dynamically-ranked multi-dimensional array with owned data.
///
/// `Tensor` combines an exclusively-owned contiguous buffer, the shape (one
/// extent per dimension) and the row-major strides derived from it. The
/// rank is whatever the shape says at runtime: the C++ side of the bridge
/// supplies shapes as plain slices, so rank cannot be a compile-time
/// parameter here.
///
/// The element count is fixed at construction; there is no resize.
/// Rank 0 (empty shape) is legal and holds exactly one element, the empty
/// product. A shape with any zero extent holds no elements.
///
/// # Examples
///
/// ```rust
/// use ferrox_tensor::{CpuAllocator, Tensor};
///
/// let data: Vec<u8> = vec![1, 2, 3, 4];
/// let t = Tensor::from_shape_vec(&[2, 2], data, CpuAllocator).unwrap();
/// assert_eq!(t.shape(), &[2, 2]);
/// assert_eq!(t.as_slice(), &[1, 2, 3, 4]);
/// ```
pub struct Tensor<T, A: TensorAllocator = CpuAllocator> {
    /// The storage of the tensor.
    pub storage: TensorStorage<T, A>,
    /// The shape of the tensor.
    pub shape: Vec<usize>,
    /// The strides of the tensor data in memory.
    pub strides: Vec<usize>,
}

impl<T, A: TensorAllocator> Tensor<T, A> {
    /// Creates a new `Tensor` with the given shape and data.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::InvalidShape`] if the number of elements in the
    /// data does not match the product of the shape extents.
    ///
    /// # Example
    ///
    /// ```
    /// use ferrox_tensor::{CpuAllocator, Tensor};
    ///
    /// let data: Vec<u8> = vec![1, 2, 3, 4];
    /// let t = Tensor::from_shape_vec(&[2, 2], data, CpuAllocator).unwrap();
    /// assert_eq!(t.shape(), &[2, 2]);
    /// ```
    pub fn from_shape_vec(shape: &[usize], data: Vec<T>, alloc: A) -> Result<Self, TensorError> {
        let numel = checked_numel(shape)?;
        if numel != data.len() {
            return Err(TensorError::invalid_shape(numel, data.len()));
        }
        let storage = TensorStorage::from_vec(data, alloc)?;
        let strides = get_strides_from_shape(shape);
        Ok(Self {
            storage,
            shape: shape.to_vec(),
            strides,
        })
    }

    /// Creates a new `Tensor` with the given shape by copying a slice of data.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::InvalidShape`] if the number of elements in the
    /// data does not match the product of the shape extents.
    pub fn from_shape_slice(shape: &[usize], data: &[T], alloc: A) -> Result<Self, TensorError>
    where
        T: Clone,
    {
        let numel = checked_numel(shape)?;
        if numel != data.len() {
            return Err(TensorError::invalid_shape(numel, data.len()));
        }
        let storage = TensorStorage::from_vec(data.to_vec(), alloc)?;
        let strides = get_strides_from_shape(shape);
        Ok(Self {
            storage,
            shape: shape.to_vec(),
            strides,
        })
    }

    /// Creates a new `Tensor` with the given shape, filled with a value.
    ///
    /// # Example
    ///
    /// ```
    /// use ferrox_tensor::{CpuAllocator, Tensor};
    ///
    /// let t = Tensor::from_shape_val(&[2, 2], 1u8, CpuAllocator).unwrap();
    /// assert_eq!(t.as_slice(), &[1, 1, 1, 1]);
    /// ```
    pub fn from_shape_val(shape: &[usize], value: T, alloc: A) -> Result<Self, TensorError>
    where
        T: Clone,
    {
        let numel = checked_numel(shape)?;
        let storage = TensorStorage::from_vec(vec![value; numel], alloc)?;
        let strides = get_strides_from_shape(shape);
        Ok(Self {
            storage,
            shape: shape.to_vec(),
            strides,
        })
    }

    /// Creates a new `Tensor` by copying `product(shape)` elements from a
    /// raw pointer.
    ///
    /// This is the caller-validated construction path used by the C++
    /// pointer-taking constructor, which has no independent length to check
    /// the shape against.
    ///
    /// # Safety
    ///
    /// `data` must be valid for reads of `product(shape)` elements of `T`
    /// and properly aligned.
    pub unsafe fn from_shape_ptr(shape: &[usize], data: *const T, alloc: A) -> Result<Self, TensorError>
    where
        T: Copy,
    {
        let numel = checked_numel(shape)?;
        let storage = TensorStorage::from_ptr(data, numel, alloc)?;
        let strides = get_strides_from_shape(shape);
        Ok(Self {
            storage,
            shape: shape.to_vec(),
            strides,
        })
    }

    /// Returns the shape of the tensor as a slice of extents.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the row-major strides of the tensor.
    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Returns the number of dimensions.
    #[inline]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Returns the total number of elements, the product of the extents.
    #[inline]
    pub fn numel(&self) -> usize {
        self.storage.len()
    }

    /// Returns the tensor data as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.storage.as_slice()
    }

    /// Returns the tensor data as a mutable slice.
    #[inline]
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        self.storage.as_mut_slice()
    }

    /// Returns a pointer to the tensor data.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.storage.as_ptr()
    }

    /// Returns a mutable pointer to the tensor data.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.storage.as_mut_ptr()
    }

    /// Returns an iterator over the elements in memory (row-major) order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Returns a mutable iterator over the elements in memory order.
    #[inline]
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.as_slice_mut().iter_mut()
    }

    /// Gets a reference to the element at the given multi-dimensional index.
    ///
    /// Returns `None` if the index rank does not match the tensor rank or
    /// any coordinate is out of bounds.
    ///
    /// # Example
    ///
    /// ```
    /// use ferrox_tensor::{CpuAllocator, Tensor};
    ///
    /// let t = Tensor::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6], CpuAllocator).unwrap();
    /// assert_eq!(t.get(&[0, 0]), Some(&1));
    /// assert_eq!(t.get(&[1, 2]), Some(&6));
    /// assert_eq!(t.get(&[2, 0]), None);
    /// ```
    pub fn get(&self, index: &[usize]) -> Option<&T> {
        if index.len() != self.rank() {
            return None;
        }
        let mut offset = 0;
        for ((&i, &extent), &stride) in index.iter().zip(&self.shape).zip(&self.strides) {
            if i >= extent {
                return None;
            }
            offset += i * stride;
        }
        self.as_slice().get(offset)
    }

    /// Returns an immutable view over the whole tensor.
    #[inline]
    pub fn view(&self) -> TensorView<'_, T> {
        TensorView {
            data: self.storage.as_slice(),
            shape: &self.shape,
            strides: &self.strides,
        }
    }

    /// Returns a mutable view over the whole tensor.
    #[inline]
    pub fn view_mut(&mut self) -> TensorViewMut<'_, T> {
        TensorViewMut {
            data: self.storage.as_mut_slice(),
            shape: &self.shape,
            strides: &self.strides,
        }
    }

    /// Returns a copy of the tensor data as a vector.
    #[inline]
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.as_slice().to_vec()
    }
}

impl<T> Tensor<T, CpuAllocator> {
    /// Consumes the tensor and returns the underlying vector.
    ///
    /// The returned vector holds the elements in memory (row-major) order.
    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.storage.into_vec()
    }
}

impl<T: Clone, A: TensorAllocator> Clone for Tensor<T, A> {
    /// Deep-copies the tensor through a fresh allocation.
    ///
    /// Storage ownership is exclusive, so cloning always duplicates the
    /// buffer.
    fn clone(&self) -> Self {
        let storage = TensorStorage::from_vec(self.to_vec(), self.storage.alloc().clone())
            .expect("allocation failed while cloning tensor");
        Self {
            storage,
            shape: self.shape.clone(),
            strides: self.strides.clone(),
        }
    }
}

impl<T: PartialEq, A: TensorAllocator> PartialEq for Tensor<T, A> {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.as_slice() == other.as_slice()
    }
}

impl<T: std::fmt::Debug, A: TensorAllocator> std::fmt::Debug for Tensor<T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("strides", &self.strides)
            .field("data", &self.as_slice())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CpuAllocator;

    #[test]
    fn test_from_shape_vec() -> Result<(), TensorError> {
        let t = Tensor::from_shape_vec(&[2, 3], vec![1u8, 2, 3, 4, 5, 6], CpuAllocator)?;
        assert_eq!(t.shape(), &[2, 3]);
        assert_eq!(t.strides(), &[3, 1]);
        assert_eq!(t.rank(), 2);
        assert_eq!(t.numel(), 6);
        assert_eq!(t.as_slice(), &[1, 2, 3, 4, 5, 6]);
        Ok(())
    }

    #[test]
    fn test_from_shape_vec_mismatch() {
        let result = Tensor::from_shape_vec(&[2, 3], vec![1u8, 2, 3, 4, 5], CpuAllocator);
        assert_eq!(
            result.err(),
            Some(TensorError::InvalidShape {
                expected: 6,
                actual: 5
            })
        );
    }

    #[test]
    fn test_from_shape_slice() -> Result<(), TensorError> {
        let data = [1.0f32, 2.0, 3.0, 4.0];
        let t = Tensor::from_shape_slice(&[4], &data, CpuAllocator)?;
        assert_eq!(t.as_slice(), &data);
        Ok(())
    }

    #[test]
    fn test_from_shape_val() -> Result<(), TensorError> {
        let t = Tensor::from_shape_val(&[2, 1, 3], 7u16, CpuAllocator)?;
        assert_eq!(t.as_slice(), &[7, 7, 7, 7, 7, 7]);
        Ok(())
    }

    #[test]
    fn test_from_shape_ptr() -> Result<(), TensorError> {
        let data = [1i32, 2, 3, 4, 5, 6];
        let t = unsafe { Tensor::from_shape_ptr(&[3, 2], data.as_ptr(), CpuAllocator)? };
        assert_eq!(t.shape(), &[3, 2]);
        assert_eq!(t.as_slice(), &data);
        Ok(())
    }

    #[test]
    fn test_rank_zero() -> Result<(), TensorError> {
        // Empty shape: the empty product is 1, so a scalar holds one element.
        let t = Tensor::from_shape_vec(&[], vec![42u8], CpuAllocator)?;
        assert_eq!(t.rank(), 0);
        assert_eq!(t.numel(), 1);
        assert_eq!(t.as_slice(), &[42]);
        Ok(())
    }

    #[test]
    fn test_zero_extent() -> Result<(), TensorError> {
        let t = Tensor::from_shape_vec(&[3, 0, 2], Vec::<f64>::new(), CpuAllocator)?;
        assert_eq!(t.rank(), 3);
        assert_eq!(t.numel(), 0);
        assert!(t.as_slice().is_empty());
        Ok(())
    }

    #[test]
    fn test_overflowing_shape_is_rejected() {
        // On 64-bit the product of these extents wraps to 0; a wrapped
        // product must not let an empty buffer pass as this shape.
        let shape = [1usize << 33, 1usize << 33];
        let result = Tensor::from_shape_vec(&shape, Vec::<u8>::new(), CpuAllocator);
        assert_eq!(
            result.err(),
            Some(TensorError::ShapeOverflow {
                shape: shape.to_vec()
            })
        );

        let result = Tensor::from_shape_val(&shape, 0u8, CpuAllocator);
        assert!(matches!(result, Err(TensorError::ShapeOverflow { .. })));
    }

    #[test]
    fn test_zero_extent_with_huge_siblings() -> Result<(), TensorError> {
        // The true product is 0, however the suffix product behind the zero
        // extent overflows during stride accumulation; construction must
        // neither panic nor reject.
        let t = Tensor::from_shape_vec(&[0, 1 << 40, 1 << 40], Vec::<u8>::new(), CpuAllocator)?;
        assert_eq!(t.numel(), 0);
        assert_eq!(t.get(&[0, 0, 0]), None);
        Ok(())
    }

    #[test]
    fn test_get() -> Result<(), TensorError> {
        let t = Tensor::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6], CpuAllocator)?;
        assert_eq!(t.get(&[0, 0]), Some(&1));
        assert_eq!(t.get(&[1, 2]), Some(&6));
        assert_eq!(t.get(&[1, 3]), None);
        assert_eq!(t.get(&[0]), None);
        Ok(())
    }

    #[test]
    fn test_write_then_read() -> Result<(), TensorError> {
        let mut t = Tensor::from_shape_vec(&[4], vec![0u8; 4], CpuAllocator)?;
        t.as_slice_mut()[2] = 9;
        assert_eq!(t.as_slice(), &[0, 0, 9, 0]);
        Ok(())
    }

    #[test]
    fn test_into_vec() -> Result<(), TensorError> {
        let t = Tensor::from_shape_vec(&[2, 2], vec![1u64, 2, 3, 4], CpuAllocator)?;
        assert_eq!(t.into_vec(), vec![1, 2, 3, 4]);
        Ok(())
    }

    #[test]
    fn test_clone_is_deep() -> Result<(), TensorError> {
        let t = Tensor::from_shape_vec(&[3], vec![1u8, 2, 3], CpuAllocator)?;
        let mut c = t.clone();
        c.as_slice_mut()[0] = 9;
        assert_eq!(t.as_slice(), &[1, 2, 3]);
        assert_eq!(c.as_slice(), &[9, 2, 3]);
        Ok(())
    }

    #[test]
    fn test_iter() -> Result<(), TensorError> {
        let t = Tensor::from_shape_vec(&[5], vec![1, 2, 3, 4, 5], CpuAllocator)?;
        let sum: i32 = t.iter().sum();
        assert_eq!(sum, 15);
        Ok(())
    }
}
