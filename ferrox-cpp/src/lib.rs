mod element;

use element::TensorElement;
use ferrox_tensor::{CpuAllocator, Tensor, TensorError};
use ffi::DType;
use paste::paste;

#[cxx::bridge(namespace = "ferrox::bridge")]
mod ffi {
    /// Element type tag for runtime dtype introspection.
    pub enum DType {
        UInt8,
        Int8,
        UInt16,
        Int16,
        UInt32,
        Int32,
        UInt64,
        Int64,
        Float32,
        Float64,
    }

    // One extern block per element type: cxx parses the bridge module
    // syntactically, so these declarations cannot be macro-generated. The
    // Rust-side boilerplate behind them is (see bridge_tensor! below).

    extern "Rust" {
        type TensorU8;
        fn shape(&self) -> &[usize];
        fn as_slice(&self) -> &[u8];
        fn as_slice_mut(&mut self) -> &mut [u8];
        fn rank(&self) -> usize;
        fn numel(&self) -> usize;
        fn dtype(&self) -> DType;
        fn tensor_u8_new(shape: &[usize], data: &[u8]) -> Result<Box<TensorU8>>;
        fn tensor_u8_full(shape: &[usize], value: u8) -> Result<Box<TensorU8>>;
    }

    extern "Rust" {
        type TensorI8;
        fn shape(&self) -> &[usize];
        fn as_slice(&self) -> &[i8];
        fn as_slice_mut(&mut self) -> &mut [i8];
        fn rank(&self) -> usize;
        fn numel(&self) -> usize;
        fn dtype(&self) -> DType;
        fn tensor_i8_new(shape: &[usize], data: &[i8]) -> Result<Box<TensorI8>>;
        fn tensor_i8_full(shape: &[usize], value: i8) -> Result<Box<TensorI8>>;
    }

    extern "Rust" {
        type TensorU16;
        fn shape(&self) -> &[usize];
        fn as_slice(&self) -> &[u16];
        fn as_slice_mut(&mut self) -> &mut [u16];
        fn rank(&self) -> usize;
        fn numel(&self) -> usize;
        fn dtype(&self) -> DType;
        fn tensor_u16_new(shape: &[usize], data: &[u16]) -> Result<Box<TensorU16>>;
        fn tensor_u16_full(shape: &[usize], value: u16) -> Result<Box<TensorU16>>;
    }

    extern "Rust" {
        type TensorI16;
        fn shape(&self) -> &[usize];
        fn as_slice(&self) -> &[i16];
        fn as_slice_mut(&mut self) -> &mut [i16];
        fn rank(&self) -> usize;
        fn numel(&self) -> usize;
        fn dtype(&self) -> DType;
        fn tensor_i16_new(shape: &[usize], data: &[i16]) -> Result<Box<TensorI16>>;
        fn tensor_i16_full(shape: &[usize], value: i16) -> Result<Box<TensorI16>>;
    }

    extern "Rust" {
        type TensorU32;
        fn shape(&self) -> &[usize];
        fn as_slice(&self) -> &[u32];
        fn as_slice_mut(&mut self) -> &mut [u32];
        fn rank(&self) -> usize;
        fn numel(&self) -> usize;
        fn dtype(&self) -> DType;
        fn tensor_u32_new(shape: &[usize], data: &[u32]) -> Result<Box<TensorU32>>;
        fn tensor_u32_full(shape: &[usize], value: u32) -> Result<Box<TensorU32>>;
    }

    extern "Rust" {
        type TensorI32;
        fn shape(&self) -> &[usize];
        fn as_slice(&self) -> &[i32];
        fn as_slice_mut(&mut self) -> &mut [i32];
        fn rank(&self) -> usize;
        fn numel(&self) -> usize;
        fn dtype(&self) -> DType;
        fn tensor_i32_new(shape: &[usize], data: &[i32]) -> Result<Box<TensorI32>>;
        fn tensor_i32_full(shape: &[usize], value: i32) -> Result<Box<TensorI32>>;
    }

    extern "Rust" {
        type TensorU64;
        fn shape(&self) -> &[usize];
        fn as_slice(&self) -> &[u64];
        fn as_slice_mut(&mut self) -> &mut [u64];
        fn rank(&self) -> usize;
        fn numel(&self) -> usize;
        fn dtype(&self) -> DType;
        fn tensor_u64_new(shape: &[usize], data: &[u64]) -> Result<Box<TensorU64>>;
        fn tensor_u64_full(shape: &[usize], value: u64) -> Result<Box<TensorU64>>;
    }

    extern "Rust" {
        type TensorI64;
        fn shape(&self) -> &[usize];
        fn as_slice(&self) -> &[i64];
        fn as_slice_mut(&mut self) -> &mut [i64];
        fn rank(&self) -> usize;
        fn numel(&self) -> usize;
        fn dtype(&self) -> DType;
        fn tensor_i64_new(shape: &[usize], data: &[i64]) -> Result<Box<TensorI64>>;
        fn tensor_i64_full(shape: &[usize], value: i64) -> Result<Box<TensorI64>>;
    }

    extern "Rust" {
        type TensorF32;
        fn shape(&self) -> &[usize];
        fn as_slice(&self) -> &[f32];
        fn as_slice_mut(&mut self) -> &mut [f32];
        fn rank(&self) -> usize;
        fn numel(&self) -> usize;
        fn dtype(&self) -> DType;
        fn tensor_f32_new(shape: &[usize], data: &[f32]) -> Result<Box<TensorF32>>;
        fn tensor_f32_full(shape: &[usize], value: f32) -> Result<Box<TensorF32>>;
    }

    extern "Rust" {
        type TensorF64;
        fn shape(&self) -> &[usize];
        fn as_slice(&self) -> &[f64];
        fn as_slice_mut(&mut self) -> &mut [f64];
        fn rank(&self) -> usize;
        fn numel(&self) -> usize;
        fn dtype(&self) -> DType;
        fn tensor_f64_new(shape: &[usize], data: &[f64]) -> Result<Box<TensorF64>>;
        fn tensor_f64_full(shape: &[usize], value: f64) -> Result<Box<TensorF64>>;
    }
}

/// Defines the bridge newtype and entry points for one element type.
///
/// For `u8` this expands to the opaque `TensorU8` wrapper around
/// `Tensor<u8, CpuAllocator>`, the accessor methods declared in the matching
/// `extern "Rust"` block, the `tensor_u8_new`/`tensor_u8_full` constructors,
/// and `From` conversions to and from the inner tensor type.
macro_rules! bridge_tensor {
    ($typ:ty) => {
        paste! {
            /// Opaque handle exposing a CPU tensor of this element type to C++.
            pub struct [<Tensor $typ:upper>](Tensor<$typ, CpuAllocator>);

            impl [<Tensor $typ:upper>] {
                /// Returns the shape extents, one per dimension.
                pub fn shape(&self) -> &[usize] {
                    self.0.shape()
                }

                /// Returns the whole element buffer as a read-only slice.
                pub fn as_slice(&self) -> &[$typ] {
                    self.0.as_slice()
                }

                /// Returns the whole element buffer as a writable slice.
                pub fn as_slice_mut(&mut self) -> &mut [$typ] {
                    self.0.as_slice_mut()
                }

                /// Returns the number of dimensions.
                pub fn rank(&self) -> usize {
                    self.0.rank()
                }

                /// Returns the total number of elements.
                pub fn numel(&self) -> usize {
                    self.0.numel()
                }

                /// Returns the runtime dtype tag of the element type.
                pub fn dtype(&self) -> DType {
                    <$typ as TensorElement>::DTYPE
                }
            }

            /// Allocate-and-copy constructor.
            ///
            /// Fails with a shape mismatch error (a C++ exception on the
            /// other side) when `data.len() != product(shape)`.
            pub fn [<tensor_ $typ _new>](
                shape: &[usize],
                data: &[$typ],
            ) -> Result<Box<[<Tensor $typ:upper>]>, TensorError> {
                let tensor = Tensor::from_shape_slice(shape, data, CpuAllocator)?;
                Ok(Box::new([<Tensor $typ:upper>](tensor)))
            }

            /// Fill constructor: every element set to `value`.
            pub fn [<tensor_ $typ _full>](
                shape: &[usize],
                value: $typ,
            ) -> Result<Box<[<Tensor $typ:upper>]>, TensorError> {
                let tensor = Tensor::from_shape_val(shape, value, CpuAllocator)?;
                Ok(Box::new([<Tensor $typ:upper>](tensor)))
            }

            impl From<Tensor<$typ, CpuAllocator>> for [<Tensor $typ:upper>] {
                fn from(tensor: Tensor<$typ, CpuAllocator>) -> Self {
                    Self(tensor)
                }
            }

            impl From<[<Tensor $typ:upper>]> for Tensor<$typ, CpuAllocator> {
                fn from(wrapped: [<Tensor $typ:upper>]) -> Self {
                    wrapped.0
                }
            }
        }
    };
    ($typ:ty, $($tail:ty),+) => {
        bridge_tensor!($typ);
        bridge_tensor!($($tail),+);
    };
}
bridge_tensor!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);
