use crate::DType;

/// Maps each supported primitive element type to its runtime dtype tag.
///
/// The impls below are the closed set of element types the bridge exposes;
/// instantiating the bridge for anything else fails at compile time.
pub trait TensorElement: Copy {
    /// The dtype tag reported across the boundary for this element type.
    const DTYPE: DType;
}

impl TensorElement for u8 {
    const DTYPE: DType = DType::UInt8;
}
impl TensorElement for i8 {
    const DTYPE: DType = DType::Int8;
}
impl TensorElement for u16 {
    const DTYPE: DType = DType::UInt16;
}
impl TensorElement for i16 {
    const DTYPE: DType = DType::Int16;
}
impl TensorElement for u32 {
    const DTYPE: DType = DType::UInt32;
}
impl TensorElement for i32 {
    const DTYPE: DType = DType::Int32;
}
impl TensorElement for u64 {
    const DTYPE: DType = DType::UInt64;
}
impl TensorElement for i64 {
    const DTYPE: DType = DType::Int64;
}
impl TensorElement for f32 {
    const DTYPE: DType = DType::Float32;
}
impl TensorElement for f64 {
    const DTYPE: DType = DType::Float64;
}
