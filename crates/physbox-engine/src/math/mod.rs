pub mod axis;
pub mod point;
pub mod segment;
pub mod vector;

pub(crate) mod num;

pub type FloatNum = f32;

// below this length a vector has no usable direction
pub const EPSILON: FloatNum = 1e-6;

#[inline]
pub const fn pi() -> FloatNum {
    std::f32::consts::PI
}

#[inline]
pub const fn tau() -> FloatNum {
    std::f32::consts::TAU
}
