//! Exclusively-owned buffer management for tensor data.
//!
//! [`TensorStorage`] owns a single contiguous allocation obtained from a
//! [`TensorAllocator`] and releases it exactly once on drop. There is no
//! sharing and no offsetting: every storage is the whole buffer, owned by
//! exactly one handle at a time.

use std::{alloc::Layout, mem::ManuallyDrop, ptr::NonNull};

use crate::allocator::{CpuAllocator, TensorAllocator, TensorAllocatorError};

/// An exclusively-owned, contiguous, allocator-backed buffer of `T`.
///
/// The buffer length is fixed at construction; there is no resize operation.
/// Empty buffers (zero elements) hold a dangling, well-aligned pointer and
/// never touch the allocator.
///
/// # Thread Safety
///
/// `TensorStorage` is `Send + Sync` when `T` is: ownership is exclusive, so
/// mutation requires `&mut self` and the usual borrow rules apply.
pub struct TensorStorage<T, A: TensorAllocator> {
    /// The pointer to the buffer, which must be non-null.
    ptr: NonNull<T>,
    /// The number of elements in the buffer.
    len: usize,
    /// The memory layout used for allocation.
    layout: Layout,
    /// The allocator that produced the buffer and will release it.
    alloc: A,
}

impl<T, A: TensorAllocator> TensorStorage<T, A> {
    /// Creates a new storage by moving the elements of a vector into an
    /// allocator-owned buffer.
    ///
    /// The vector's own allocation is released without dropping the
    /// moved-out elements, so every live buffer was produced by
    /// [`TensorAllocator::alloc`] and is released by
    /// [`TensorAllocator::dealloc`].
    ///
    /// # Errors
    ///
    /// Returns an error if the layout is invalid or allocation fails.
    pub fn from_vec(value: Vec<T>, alloc: A) -> Result<Self, TensorAllocatorError> {
        let layout = match Layout::array::<T>(value.len()) {
            Ok(layout) => layout,
            Err(e) => return Err(TensorAllocatorError::LayoutError(e)),
        };

        let mut value = ManuallyDrop::new(value);
        let (src, len, cap) = (value.as_mut_ptr(), value.len(), value.capacity());

        let ptr = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            let raw = match alloc.alloc(layout) {
                Ok(raw) => NonNull::new(raw as *mut T).ok_or(TensorAllocatorError::NullPointer),
                Err(e) => Err(e),
            };
            let ptr = match raw {
                Ok(ptr) => ptr,
                Err(e) => {
                    // Nothing was moved out yet; hand the vector back to be
                    // dropped normally.
                    // SAFETY: src/len/cap come from the live Vec above.
                    unsafe { drop(Vec::from_raw_parts(src, len, cap)) };
                    return Err(e);
                }
            };
            // SAFETY: `ptr` was just allocated for `len` elements, `src` is
            // valid for `len` reads, and the regions cannot overlap.
            unsafe {
                std::ptr::copy_nonoverlapping(src, ptr.as_ptr(), len);
            }
            ptr
        };

        // Release the vector's buffer without dropping the moved-out elements.
        // SAFETY: `src`/`cap` come from a live Vec and length 0 skips drops.
        unsafe {
            drop(Vec::from_raw_parts(src, 0, cap));
        }

        Ok(Self {
            ptr,
            len,
            layout,
            alloc,
        })
    }

    /// Creates a new storage by copying `len` elements from a raw pointer.
    ///
    /// # Safety
    ///
    /// The caller must ensure that:
    /// - `ptr` is valid for reads of `len` elements of `T`
    /// - `ptr` is properly aligned for type `T`
    pub unsafe fn from_ptr(ptr: *const T, len: usize, alloc: A) -> Result<Self, TensorAllocatorError>
    where
        T: Copy,
    {
        let layout = Layout::array::<T>(len).map_err(TensorAllocatorError::LayoutError)?;
        let buf_ptr = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            let raw = alloc.alloc(layout)? as *mut T;
            let buf_ptr = NonNull::new(raw).ok_or(TensorAllocatorError::NullPointer)?;
            // SAFETY: caller guarantees `ptr` is valid for `len` reads and the
            // freshly allocated region cannot overlap it.
            std::ptr::copy_nonoverlapping(ptr, buf_ptr.as_ptr(), len);
            buf_ptr
        };

        Ok(Self {
            ptr: buf_ptr,
            len,
            layout,
            alloc,
        })
    }

    /// Returns the pointer to the buffer.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Returns the mutable pointer to the buffer.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Returns the buffer as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: ptr is valid for len elements and properly aligned; for
        // len == 0 the dangling pointer is permitted by from_raw_parts.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Returns the buffer as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: same as as_slice, and &mut self guarantees exclusivity.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Returns the number of elements in the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the buffer holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the memory layout of the buffer.
    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Returns a reference to the allocator owning the buffer.
    #[inline]
    pub fn alloc(&self) -> &A {
        &self.alloc
    }
}

impl<T> TensorStorage<T, CpuAllocator> {
    /// Consumes the storage and returns the data as a vector.
    ///
    /// Only available for [`CpuAllocator`] storage, whose buffers provably
    /// come from the global allocator with capacity equal to length.
    pub fn into_vec(self) -> Vec<T> {
        let me = ManuallyDrop::new(self);
        if me.layout.size() == 0 {
            return Vec::new();
        }
        // SAFETY: the buffer was allocated by the global allocator with
        // Layout::array::<T>(len), so capacity == len. ManuallyDrop prevents
        // a second release through Drop.
        unsafe { Vec::from_raw_parts(me.ptr.as_ptr(), me.len, me.len) }
    }
}

impl<T, A: TensorAllocator> Drop for TensorStorage<T, A> {
    fn drop(&mut self) {
        // SAFETY: ptr is valid for len elements; each element is dropped
        // exactly once before the buffer is released.
        unsafe {
            std::ptr::drop_in_place(std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len));
        }
        if self.layout.size() != 0 {
            self.alloc.dealloc(self.ptr.as_ptr() as *mut u8, self.layout);
        }
    }
}

// SAFETY: ownership is exclusive and all shared access goes through &self,
// so TensorStorage inherits T's thread-safety.
unsafe impl<T: Send, A: TensorAllocator + Send> Send for TensorStorage<T, A> {}

// SAFETY: mutation requires &mut self; &self access is read-only.
unsafe impl<T: Sync, A: TensorAllocator + Sync> Sync for TensorStorage<T, A> {}

impl<T, A: TensorAllocator> std::fmt::Debug for TensorStorage<T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TensorStorage")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .field("layout", &self.layout)
            .finish()
    }
}
