//! Verifies that every buffer a tensor allocates is released exactly once,
//! using a counting allocator plugged into the `TensorAllocator` seam.

use std::alloc::Layout;
use std::sync::atomic::{AtomicIsize, AtomicUsize, Ordering};
use std::sync::Arc;

use ferrox_tensor::{Tensor, TensorAllocator, TensorAllocatorError, TensorError};

/// Delegates to the system allocator while tracking live bytes and call counts.
#[derive(Clone, Default)]
struct CountingAllocator {
    live_bytes: Arc<AtomicIsize>,
    allocs: Arc<AtomicUsize>,
    deallocs: Arc<AtomicUsize>,
}

impl CountingAllocator {
    fn live_bytes(&self) -> isize {
        self.live_bytes.load(Ordering::SeqCst)
    }

    fn allocs(&self) -> usize {
        self.allocs.load(Ordering::SeqCst)
    }

    fn deallocs(&self) -> usize {
        self.deallocs.load(Ordering::SeqCst)
    }
}

impl TensorAllocator for CountingAllocator {
    fn alloc(&self, layout: Layout) -> Result<*mut u8, TensorAllocatorError> {
        let ptr = unsafe { std::alloc::alloc(layout) };
        if ptr.is_null() {
            return Err(TensorAllocatorError::NullPointer);
        }
        self.live_bytes
            .fetch_add(layout.size() as isize, Ordering::SeqCst);
        self.allocs.fetch_add(1, Ordering::SeqCst);
        Ok(ptr)
    }

    fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if !ptr.is_null() {
            unsafe { std::alloc::dealloc(ptr, layout) }
            self.live_bytes
                .fetch_sub(layout.size() as isize, Ordering::SeqCst);
            self.deallocs.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[test]
fn drop_returns_to_baseline() -> Result<(), TensorError> {
    let alloc = CountingAllocator::default();

    {
        let t = Tensor::from_shape_vec(&[3, 3], (1u8..=9).collect(), alloc.clone())?;
        assert_eq!(alloc.live_bytes(), 9);
        assert_eq!(t.numel(), 9);
    }

    assert_eq!(alloc.live_bytes(), 0);
    assert_eq!(alloc.allocs(), alloc.deallocs());
    Ok(())
}

#[test]
fn every_construction_path_balances() -> Result<(), TensorError> {
    let alloc = CountingAllocator::default();
    let data = [1.0f64, 2.0, 3.0, 4.0];

    {
        let _a = Tensor::from_shape_vec(&[4], data.to_vec(), alloc.clone())?;
        let _b = Tensor::from_shape_slice(&[2, 2], &data, alloc.clone())?;
        let _c = Tensor::from_shape_val(&[2, 3], 0.5f64, alloc.clone())?;
        let _d = unsafe { Tensor::from_shape_ptr(&[4, 1], data.as_ptr(), alloc.clone())? };
        assert_eq!(alloc.allocs(), 4);
        assert_eq!(alloc.live_bytes(), (4 + 4 + 6 + 4) * 8);
    }

    assert_eq!(alloc.live_bytes(), 0);
    assert_eq!(alloc.deallocs(), 4);
    Ok(())
}

#[test]
fn clone_allocates_and_releases_independently() -> Result<(), TensorError> {
    let alloc = CountingAllocator::default();

    let t = Tensor::from_shape_vec(&[2, 2], vec![1u32, 2, 3, 4], alloc.clone())?;
    let c = t.clone();
    assert_eq!(alloc.allocs(), 2);
    assert_eq!(alloc.live_bytes(), 32);

    drop(t);
    assert_eq!(alloc.live_bytes(), 16);
    assert_eq!(c.as_slice(), &[1, 2, 3, 4]);

    drop(c);
    assert_eq!(alloc.live_bytes(), 0);
    Ok(())
}

#[test]
fn empty_tensor_never_touches_the_allocator() -> Result<(), TensorError> {
    let alloc = CountingAllocator::default();

    {
        let t = Tensor::from_shape_vec(&[0, 5], Vec::<u8>::new(), alloc.clone())?;
        assert_eq!(t.numel(), 0);
        assert_eq!(alloc.allocs(), 0);
    }

    assert_eq!(alloc.deallocs(), 0);
    assert_eq!(alloc.live_bytes(), 0);
    Ok(())
}
