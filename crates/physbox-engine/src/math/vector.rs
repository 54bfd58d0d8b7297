use serde::{Deserialize, Serialize};
use std::{
    fmt::Display,
    ops::{Add, AddAssign, BitXor, Div, DivAssign, Mul, MulAssign, Neg, Not, Sub, SubAssign},
};

use super::{point::Point, segment::Segment, FloatNum, EPSILON};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Vector {
    pub(crate) x: FloatNum,
    pub(crate) y: FloatNum,
}

impl Display for Vector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{ x: {}, y: {} }}", self.x, self.y)
    }
}

impl PartialEq for Vector {
    fn eq(&self, other: &Self) -> bool {
        (self.x - other.x).abs() < FloatNum::EPSILON && (self.y - other.y).abs() < FloatNum::EPSILON
    }
}

impl Vector {
    #[inline]
    pub const fn new(x: FloatNum, y: FloatNum) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn x(&self) -> FloatNum {
        self.x
    }

    #[inline]
    pub fn set_x(&mut self, reducer: impl FnOnce(FloatNum) -> FloatNum) {
        self.x = reducer(self.x);
    }

    #[inline]
    pub fn y(&self) -> FloatNum {
        self.y
    }

    #[inline]
    pub fn set_y(&mut self, reducer: impl FnOnce(FloatNum) -> FloatNum) {
        self.y = reducer(self.y);
    }

    #[inline]
    pub fn to_point(&self) -> Point {
        (self.x, self.y).into()
    }

    #[inline]
    pub fn abs(&self) -> FloatNum {
        self.x.hypot(self.y)
    }

    #[inline]
    pub fn abs_squared(&self) -> FloatNum {
        self.x * self.x + self.y * self.y
    }

    /// zero length vector produce NaN, use [`Vector::checked_normalize`] when unsure
    pub fn normalize(&self) -> Vector {
        let shrink = self.abs().recip();
        (self.x * shrink, self.y * shrink).into()
    }

    pub fn checked_normalize(&self) -> Option<Vector> {
        let length = self.abs();
        if !length.is_finite() || length < EPSILON {
            return None;
        }
        Some(*self / length)
    }

    /// positive angle turns +x toward +y
    #[inline]
    pub fn rotate(&self, angle: FloatNum) -> Vector {
        let (s, c) = angle.sin_cos();
        (self.x * c - self.y * s, self.x * s + self.y * c).into()
    }

    #[inline]
    pub fn rotate_self(&mut self, angle: FloatNum) {
        *self = self.rotate(angle);
    }

    /// velocity of a point at `self` (relative to the rotation center) under angular velocity `w`
    #[inline]
    pub fn angular_velocity_at(&self, w: FloatNum) -> Vector {
        (-w * self.y, w * self.x).into()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.x == 0. && self.y == 0.
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[inline]
    pub fn set_zero(&mut self) {
        self.x = 0.;
        self.y = 0.;
    }
}

impl From<(FloatNum, FloatNum)> for Vector {
    fn from((x, y): (FloatNum, FloatNum)) -> Self {
        Self { x, y }
    }
}

impl From<[FloatNum; 2]> for Vector {
    fn from([x, y]: [FloatNum; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Vector> for (FloatNum, FloatNum) {
    fn from(v: Vector) -> Self {
        (v.x, v.y)
    }
}

impl From<(Point, Point)> for Vector {
    fn from((p1, p2): (Point, Point)) -> Self {
        (p2.x() - p1.x(), p2.y() - p1.y()).into()
    }
}

impl From<(&Point, &Point)> for Vector {
    fn from((p1, p2): (&Point, &Point)) -> Self {
        (p2.x() - p1.x(), p2.y() - p1.y()).into()
    }
}

impl From<&Segment> for Vector {
    fn from(segment: &Segment) -> Self {
        (segment.start_point(), segment.end_point()).into()
    }
}

impl Add for Vector {
    type Output = Self;
    fn add(self, rhs: Vector) -> Self::Output {
        (self.x + rhs.x, self.y + rhs.y).into()
    }
}

impl Add<&Vector> for Vector {
    type Output = Self;
    fn add(self, rhs: &Vector) -> Self::Output {
        self + *rhs
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Vector) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl AddAssign<&Vector> for Vector {
    fn add_assign(&mut self, rhs: &Vector) {
        *self += *rhs;
    }
}

impl Sub for Vector {
    type Output = Self;
    fn sub(self, rhs: Vector) -> Self::Output {
        (self.x - rhs.x, self.y - rhs.y).into()
    }
}

impl SubAssign for Vector {
    fn sub_assign(&mut self, rhs: Vector) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Neg for Vector {
    type Output = Self;
    fn neg(self) -> Self::Output {
        (-self.x, -self.y).into()
    }
}

impl Mul<FloatNum> for Vector {
    type Output = Self;
    fn mul(self, rhs: FloatNum) -> Self::Output {
        (self.x * rhs, self.y * rhs).into()
    }
}

impl MulAssign<FloatNum> for Vector {
    fn mul_assign(&mut self, rhs: FloatNum) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

// dot product
impl Mul for Vector {
    type Output = FloatNum;
    fn mul(self, rhs: Vector) -> Self::Output {
        self.x * rhs.x + self.y * rhs.y
    }
}

impl Mul<&Vector> for &Vector {
    type Output = FloatNum;
    fn mul(self, rhs: &Vector) -> Self::Output {
        *self * *rhs
    }
}

impl Div<FloatNum> for Vector {
    type Output = Self;
    fn div(self, rhs: FloatNum) -> Self::Output {
        (self.x / rhs, self.y / rhs).into()
    }
}

impl DivAssign<FloatNum> for Vector {
    fn div_assign(&mut self, rhs: FloatNum) {
        self.x /= rhs;
        self.y /= rhs;
    }
}

// 2d cross product
impl BitXor for Vector {
    type Output = FloatNum;
    fn bitxor(self, rhs: Vector) -> Self::Output {
        self.x * rhs.y - self.y * rhs.x
    }
}

// perpendicular vector
impl Not for Vector {
    type Output = Self;
    fn not(self) -> Self::Output {
        Self {
            x: self.y,
            y: -self.x,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::pi;

    #[test]
    fn test_dot_and_cross() {
        let a: Vector = (1., 2.).into();
        let b: Vector = (3., 4.).into();
        assert_eq!(a * b, 11.);
        assert_eq!(a ^ b, -2.);
        assert_eq!((!a) * a, 0.);
    }

    #[test]
    fn test_rotate_turns_x_toward_y() {
        let v: Vector = (1., 0.).into();
        let rotated = v.rotate(pi() * 0.5);
        assert!(rotated.x().abs() < 1e-6);
        assert!((rotated.y() - 1.).abs() < 1e-6);
    }

    #[test]
    fn test_checked_normalize() {
        assert!(Vector::default().checked_normalize().is_none());
        assert!(Vector::new(FloatNum::NAN, 1.).checked_normalize().is_none());
        let n = Vector::new(3., 4.).checked_normalize().unwrap();
        assert!((n.abs() - 1.).abs() < 1e-6);
    }

    #[test]
    fn test_angular_velocity_matches_cross() {
        let r: Vector = (2., 1.).into();
        let w = 3.;
        // r x (w x r) == w * |r|^2
        assert!(((r ^ r.angular_velocity_at(w)) - w * r.abs_squared()).abs() < 1e-5);
    }
}
