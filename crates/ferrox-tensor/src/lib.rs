#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! `ferrox-tensor` is a small tensor library providing the owning type behind
//! the ferrox C++ bridge. It keeps a deliberately narrow contract: a tensor
//! owns a contiguous buffer of a single primitive element type together with
//! its shape, constructed once by copying caller data and destroyed exactly
//! once.
//!
//! # Architecture
//!
//! - **Tensor**: dynamically-ranked array with shape and row-major strides
//! - **TensorStorage**: exclusively-owned, allocator-backed memory buffer
//! - **TensorView / TensorViewMut**: non-owning views tied to the owner's
//!   lifetime, split into immutable and mutable capability types
//! - **TensorAllocator**: trait seam for memory backends; [`CpuAllocator`]
//!   delegates to the system allocator
//!
//! # Quick Start
//!
//! ```rust
//! use ferrox_tensor::{CpuAllocator, Tensor};
//!
//! let data = vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
//! let tensor = Tensor::from_shape_vec(&[2, 3], data, CpuAllocator).unwrap();
//!
//! assert_eq!(tensor.shape(), &[2, 3]);
//! assert_eq!(tensor.get(&[1, 2]), Some(&6.0));
//!
//! let view = tensor.view();
//! assert_eq!(view.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
//! ```

/// Allocator module containing memory management utilities.
///
/// Provides the [`TensorAllocator`] trait and the default [`CpuAllocator`]
/// backed by the system allocator.
pub mod allocator;

/// Storage module containing the exclusively-owned memory buffer.
pub mod storage;

/// Tensor module containing the main tensor implementation and error types.
pub mod tensor;

/// View module containing non-owning tensor view implementations.
pub mod view;

pub use crate::allocator::{CpuAllocator, TensorAllocator, TensorAllocatorError};
pub use crate::tensor::{get_strides_from_shape, Tensor, TensorError};
pub use crate::view::{TensorView, TensorViewMut};

/// Type alias for a tensor with the system allocator.
pub type CpuTensor<T> = Tensor<T, CpuAllocator>;
