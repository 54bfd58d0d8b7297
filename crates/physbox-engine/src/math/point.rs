use serde::{Deserialize, Serialize};
use std::{
    fmt::Display,
    ops::{Add, AddAssign, Sub, SubAssign},
};

use super::{vector::Vector, FloatNum};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Point {
    pub(crate) x: FloatNum,
    pub(crate) y: FloatNum,
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        (self.x - other.x).abs() < FloatNum::EPSILON && (self.y - other.y).abs() < FloatNum::EPSILON
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Point {
    #[inline]
    pub const fn new(x: FloatNum, y: FloatNum) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn x(&self) -> FloatNum {
        self.x
    }

    #[inline]
    pub fn y(&self) -> FloatNum {
        self.y
    }

    #[inline]
    pub fn set_x(&mut self, x_reducer: impl FnOnce(FloatNum) -> FloatNum) {
        self.x = x_reducer(self.x)
    }

    #[inline]
    pub fn set_y(&mut self, y_reducer: impl FnOnce(FloatNum) -> FloatNum) {
        self.y = y_reducer(self.y)
    }

    #[inline]
    pub fn to_vector(self) -> Vector {
        Vector {
            x: self.x,
            y: self.y,
        }
    }

    #[inline]
    pub fn distance(&self, other: &Point) -> FloatNum {
        Vector::from((self, other)).abs()
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn mid_point(&self, other: &Point) -> Point {
        ((self.x + other.x) * 0.5, (self.y + other.y) * 0.5).into()
    }
}

impl From<(FloatNum, FloatNum)> for Point {
    fn from((x, y): (FloatNum, FloatNum)) -> Self {
        Point { x, y }
    }
}

impl From<[FloatNum; 2]> for Point {
    fn from([x, y]: [FloatNum; 2]) -> Self {
        Point { x, y }
    }
}

impl From<Point> for (FloatNum, FloatNum) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

impl Add<Vector> for Point {
    type Output = Point;
    fn add(self, rhs: Vector) -> Self::Output {
        (self.x + rhs.x(), self.y + rhs.y()).into()
    }
}

impl Add<&Vector> for Point {
    type Output = Point;
    fn add(self, rhs: &Vector) -> Self::Output {
        self + *rhs
    }
}

impl Add<&Vector> for &Point {
    type Output = Point;
    fn add(self, rhs: &Vector) -> Self::Output {
        *self + *rhs
    }
}

impl AddAssign<Vector> for Point {
    fn add_assign(&mut self, rhs: Vector) {
        self.x += rhs.x();
        self.y += rhs.y();
    }
}

impl AddAssign<&Vector> for Point {
    fn add_assign(&mut self, rhs: &Vector) {
        *self += *rhs;
    }
}

impl Sub<Vector> for Point {
    type Output = Point;
    fn sub(self, rhs: Vector) -> Self::Output {
        (self.x - rhs.x(), self.y - rhs.y()).into()
    }
}

impl SubAssign<Vector> for Point {
    fn sub_assign(&mut self, rhs: Vector) {
        self.x -= rhs.x();
        self.y -= rhs.y();
    }
}
