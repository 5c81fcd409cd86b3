//! Non-owning views into tensor data.
//!
//! Views are borrow-based: they are valid only while the owning
//! [`crate::Tensor`] is alive, which the lifetimes enforce. The immutable
//! and mutable variants are distinct types so the
//! single-writer-or-multiple-readers discipline is visible in signatures.

/// An immutable, non-owning view into tensor data.
///
/// Carries the borrowed element slice together with the owner's shape and
/// strides. Obtained from [`crate::Tensor::view`].
///
/// # Examples
///
/// ```rust
/// use ferrox_tensor::{CpuAllocator, Tensor};
///
/// let t = Tensor::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6], CpuAllocator).unwrap();
/// let view = t.view();
/// assert_eq!(view.shape(), &[2, 3]);
/// assert_eq!(view.as_slice(), &[1, 2, 3, 4, 5, 6]);
/// assert_eq!(view.get(&[1, 2]), Some(&6));
/// ```
pub struct TensorView<'a, T> {
    /// The borrowed element buffer in memory (row-major) order.
    pub data: &'a [T],
    /// The shape of the viewed tensor.
    pub shape: &'a [usize],
    /// The strides of the viewed tensor.
    pub strides: &'a [usize],
}

impl<T> TensorView<'_, T> {
    /// Returns the viewed elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.data
    }

    /// Returns a raw pointer to the first viewed element.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.data.as_ptr()
    }

    /// Returns the shape of the viewed tensor.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.shape
    }

    /// Returns the strides of the viewed tensor.
    #[inline]
    pub fn strides(&self) -> &[usize] {
        self.strides
    }

    /// Returns the number of dimensions.
    #[inline]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Returns the total number of viewed elements.
    #[inline]
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Gets a reference to the element at the given multi-dimensional index.
    ///
    /// Returns `None` if the index rank does not match or any coordinate is
    /// out of bounds.
    pub fn get(&self, index: &[usize]) -> Option<&T> {
        linear_offset(index, self.shape, self.strides).and_then(|offset| self.data.get(offset))
    }
}

/// A mutable, non-owning view into tensor data.
///
/// The mutable counterpart of [`TensorView`]; obtained from
/// [`crate::Tensor::view_mut`]. Holding it exclusively borrows the owning
/// tensor, so no immutable view can alias it.
pub struct TensorViewMut<'a, T> {
    /// The borrowed element buffer in memory (row-major) order.
    pub data: &'a mut [T],
    /// The shape of the viewed tensor.
    pub shape: &'a [usize],
    /// The strides of the viewed tensor.
    pub strides: &'a [usize],
}

impl<T> TensorViewMut<'_, T> {
    /// Returns the viewed elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.data
    }

    /// Returns the viewed elements as a mutable slice.
    #[inline]
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        self.data
    }

    /// Returns the shape of the viewed tensor.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.shape
    }

    /// Returns the number of dimensions.
    #[inline]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Returns the total number of viewed elements.
    #[inline]
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Gets a mutable reference to the element at the given index.
    pub fn get_mut(&mut self, index: &[usize]) -> Option<&mut T> {
        linear_offset(index, self.shape, self.strides).and_then(|offset| self.data.get_mut(offset))
    }
}

fn linear_offset(index: &[usize], shape: &[usize], strides: &[usize]) -> Option<usize> {
    if index.len() != shape.len() {
        return None;
    }
    let mut offset = 0;
    for ((&i, &extent), &stride) in index.iter().zip(shape).zip(strides) {
        if i >= extent {
            return None;
        }
        offset += i * stride;
    }
    Some(offset)
}

#[cfg(test)]
mod tests {
    use crate::{CpuAllocator, Tensor, TensorError};

    #[test]
    fn test_view_matches_owner() -> Result<(), TensorError> {
        let t = Tensor::from_shape_vec(&[2, 2], vec![1u8, 2, 3, 4], CpuAllocator)?;
        let view = t.view();
        assert_eq!(view.shape(), t.shape());
        assert_eq!(view.strides(), t.strides());
        assert_eq!(view.as_slice(), t.as_slice());
        assert_eq!(view.numel(), 4);
        assert_eq!(view.rank(), 2);
        Ok(())
    }

    #[test]
    fn test_view_get() -> Result<(), TensorError> {
        let t = Tensor::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6], CpuAllocator)?;
        let view = t.view();
        assert_eq!(view.get(&[0, 1]), Some(&2));
        assert_eq!(view.get(&[1, 2]), Some(&6));
        assert_eq!(view.get(&[2, 0]), None);
        Ok(())
    }

    #[test]
    fn test_view_mut_write() -> Result<(), TensorError> {
        let mut t = Tensor::from_shape_vec(&[2, 2], vec![0u32; 4], CpuAllocator)?;
        {
            let mut view = t.view_mut();
            *view.get_mut(&[1, 1]).unwrap() = 5;
            view.as_slice_mut()[0] = 1;
        }
        assert_eq!(t.as_slice(), &[1, 0, 0, 5]);
        Ok(())
    }

    #[test]
    fn test_view_zero_extent() -> Result<(), TensorError> {
        let t = Tensor::from_shape_vec(&[0, 4], Vec::<i16>::new(), CpuAllocator)?;
        let view = t.view();
        assert_eq!(view.numel(), 0);
        assert_eq!(view.get(&[0, 0]), None);
        Ok(())
    }
}
