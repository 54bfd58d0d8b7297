use crate::{
    math::{point::Point, FloatNum},
    meta::Transform,
};

macro_rules! impl_shape_traits_use_deref {
    ($struct_name:ty) => {
        impl $crate::shape::CenterPoint for $struct_name {
            fn center_point(&self) -> $crate::math::point::Point {
                $crate::shape::CenterPoint::center_point(core::ops::Deref::deref(self))
            }
        }

        impl $crate::shape::GeometryTransformer for $struct_name {
            fn sync_transform(&mut self, transform: &$crate::meta::Transform) {
                $crate::shape::GeometryTransformer::sync_transform(
                    core::ops::DerefMut::deref_mut(self),
                    transform,
                )
            }
        }

        impl $crate::shape::Outline for $struct_name {
            fn outline(&self) -> $crate::shape::ShapeOutline<'_> {
                $crate::shape::Outline::outline(core::ops::Deref::deref(self))
            }
        }

        impl $crate::collision::Projector for $struct_name {
            fn projection_on_vector(
                &self,
                vector: &$crate::math::vector::Vector,
            ) -> ($crate::math::point::Point, $crate::math::point::Point) {
                $crate::collision::Projector::projection_on_vector(
                    core::ops::Deref::deref(self),
                    vector,
                )
            }
        }
    };
}

pub mod circle;
pub mod convex;
pub mod polygon;
pub mod rect;
pub mod utils;

pub use circle::Circle;
pub use convex::ConvexPolygon;
pub use polygon::RegularPolygon;
pub use rect::Rect;

pub trait CenterPoint {
    fn center_point(&self) -> Point;
}

pub trait GeometryTransformer {
    /// rebuild world geometry from the origin geometry and the total transform
    fn sync_transform(&mut self, transform: &Transform);
}

/// world space geometry used by narrow phase and queries
#[derive(Clone, Copy, Debug)]
pub enum ShapeOutline<'a> {
    Polygon(&'a [Point]),
    Circle { center: Point, radius: FloatNum },
}

pub trait Outline {
    fn outline(&self) -> ShapeOutline<'_>;
}
