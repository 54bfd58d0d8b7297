pub mod collision;
pub mod constraints;
pub mod element;
pub mod math;
pub mod meta;
pub mod scene;
pub mod shape;

pub mod prelude {
    pub use super::element::{ComputeMomentOfInertia, Element, ElementBuilder, ShapeTraitUnion, ID};

    pub use super::collision::{ContactPointPair, Projector};
    pub use super::math::{point::Point, segment::Segment, vector::Vector, FloatNum};
    pub use super::meta::{Mass, Meta, MetaBuilder};
    pub use super::scene::{
        event::{CollisionEvent, CollisionListener},
        Scene,
    };
    pub use super::shape::{
        CenterPoint, Circle, ConvexPolygon, GeometryTransformer, Outline, Rect, RegularPolygon,
        ShapeOutline,
    };
}
