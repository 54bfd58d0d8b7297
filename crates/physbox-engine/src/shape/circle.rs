use crate::{
    collision::Projector,
    element::ComputeMomentOfInertia,
    math::{point::Point, vector::Vector, FloatNum},
    meta::{Mass, Transform},
};

use super::{CenterPoint, GeometryTransformer, Outline, ShapeOutline};

#[derive(Clone, Debug)]
pub struct Circle {
    origin_center_point: Point,
    center_point: Point,
    radius: FloatNum,
    rotation: FloatNum,
}

impl<P: Into<Point>> From<(P, FloatNum)> for Circle {
    fn from((p, radius): (P, FloatNum)) -> Self {
        Self::new(p, radius)
    }
}

impl Circle {
    #[inline]
    pub fn new(center_point: impl Into<Point>, radius: FloatNum) -> Self {
        let center_point = center_point.into();
        Self {
            origin_center_point: center_point,
            center_point,
            radius: radius.abs(),
            rotation: 0.,
        }
    }

    #[inline]
    pub fn radius(&self) -> FloatNum {
        self.radius
    }

    #[inline]
    pub fn rotation(&self) -> FloatNum {
        self.rotation
    }
}

impl CenterPoint for Circle {
    fn center_point(&self) -> Point {
        self.center_point
    }
}

impl GeometryTransformer for Circle {
    fn sync_transform(&mut self, transform: &Transform) {
        self.center_point = self.origin_center_point + transform.translation();
        self.rotation = transform.rotation();
    }
}

impl Outline for Circle {
    fn outline(&self) -> ShapeOutline<'_> {
        ShapeOutline::Circle {
            center: self.center_point,
            radius: self.radius,
        }
    }
}

impl Projector for Circle {
    fn projection_on_vector(&self, vector: &Vector) -> (Point, Point) {
        let direction = vector.checked_normalize().unwrap_or_else(|| (1., 0.).into());
        let offset = direction * self.radius;
        (self.center_point - offset, self.center_point + offset)
    }
}

impl ComputeMomentOfInertia for Circle {
    fn compute_moment_of_inertia(&self, m: Mass) -> FloatNum {
        m * self.radius.powf(2.) * 0.5
    }
}
