pub(crate) mod store;

use physbox_macro_tools::Fields;

use crate::{
    collision::Projector,
    constraints::ConstraintObject,
    math::{point::Point, vector::Vector, FloatNum},
    meta::{Mass, Meta},
    shape::{CenterPoint, GeometryTransformer, Outline, ShapeOutline},
};

pub type ID = u32;

pub trait ComputeMomentOfInertia {
    fn compute_moment_of_inertia(&self, m: Mass) -> FloatNum;
}

pub trait SelfClone {
    fn self_clone(&self) -> Box<dyn ShapeTraitUnion>;
}

impl<T> SelfClone for T
where
    T: GeometryTransformer
        + CenterPoint
        + Outline
        + ComputeMomentOfInertia
        + Projector
        + Clone
        + 'static,
{
    fn self_clone(&self) -> Box<dyn ShapeTraitUnion> {
        Box::new(self.clone())
    }
}

pub trait ShapeTraitUnion:
    GeometryTransformer + CenterPoint + Outline + ComputeMomentOfInertia + Projector + SelfClone
{
}

impl<T> ShapeTraitUnion for T where
    T: GeometryTransformer + CenterPoint + Outline + ComputeMomentOfInertia + Projector + SelfClone
{
}

impl<T: ShapeTraitUnion + 'static> From<T> for Box<dyn ShapeTraitUnion> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

pub struct ElementBuilder<T: Clone = ()> {
    shape: Box<dyn ShapeTraitUnion>,
    meta: Meta,
    data: T,
}

impl<T: Clone> ElementBuilder<T> {
    pub fn new(shape: impl Into<Box<dyn ShapeTraitUnion>>, meta: impl Into<Meta>, data: T) -> Self {
        let shape = shape.into();
        let meta = meta.into();
        Self { shape, meta, data }
    }

    pub fn shape(mut self, shape: impl Into<Box<dyn ShapeTraitUnion>>) -> Self {
        self.shape = shape.into();
        self
    }

    pub fn meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }
}

#[derive(Fields)]
#[r]
pub struct Element<Data: Clone> {
    id: ID,
    #[w]
    meta: Meta,
    shape: Box<dyn ShapeTraitUnion>,
    #[w]
    data: Data,
}

impl<T: Clone> Clone for Element<T> {
    fn clone(&self) -> Self {
        // clone element will return element with id unset
        Self {
            id: 0,
            meta: self.meta.clone(),
            shape: self.shape.self_clone(),
            data: self.data.clone(),
        }
    }
}

impl<T: Clone> Element<T> {
    pub(crate) fn inject_id(&mut self, id: ID) {
        self.id = id
    }

    #[inline]
    pub fn new(shape: Box<dyn ShapeTraitUnion>, meta: impl Into<Meta>, data: T) -> Self {
        let mut meta: Meta = meta.into();

        let moment_of_inertia = shape.compute_moment_of_inertia(meta.mass());

        meta.set_moment_of_inertia(|_| moment_of_inertia);

        Self {
            id: 0,
            shape,
            meta,
            data,
        }
    }

    #[inline]
    pub fn center_point(&self) -> Point {
        self.shape.center_point()
    }

    #[inline]
    pub fn angle(&self) -> FloatNum {
        self.meta.transform().rotation()
    }

    #[inline]
    pub fn outline(&self) -> ShapeOutline<'_> {
        self.shape.outline()
    }

    pub fn vertices(&self) -> Option<&[Point]> {
        match self.shape.outline() {
            ShapeOutline::Polygon(vertices) => Some(vertices),
            ShapeOutline::Circle { .. } => None,
        }
    }

    /// axis aligned bounding box as (min, max)
    #[inline]
    pub fn aabb(&self) -> (Point, Point) {
        self.shape.aabb()
    }

    /// mass change also refresh the moment of inertia
    pub fn set_mass(&mut self, mass: Mass) {
        self.meta.set_mass(mass);
        let moment_of_inertia = self.shape.compute_moment_of_inertia(mass);
        self.meta.set_moment_of_inertia(|_| moment_of_inertia);
    }

    fn sync_shape(&mut self) {
        self.shape.sync_transform(self.meta.transform());
    }

    pub fn translate(&mut self, translation: &Vector) {
        *self.meta.transform_mut().translation_mut() += translation;
        self.sync_shape();
    }

    pub fn set_position(&mut self, position: impl Into<Point>) {
        let translation: Vector = (self.center_point(), position.into()).into();
        self.translate(&translation);
    }

    pub fn rotate(&mut self, rad: FloatNum) {
        *self.meta.transform_mut().rotation_mut() += rad;
        self.sync_shape();
    }

    pub fn set_angle(&mut self, angle: FloatNum) {
        *self.meta.transform_mut().rotation_mut() = angle;
        self.sync_shape();
    }

    // simple integrate position by velocity and angle_velocity;
    pub fn integrate_position(&mut self, delta_time: FloatNum) -> Option<(Vector, FloatNum)> {
        if self.meta().is_fixed() {
            return None;
        }
        let path = *self.meta().velocity() * delta_time;
        let rad = self.meta().angle_velocity() * delta_time;

        let transform = self.meta.transform_mut();
        *transform.translation_mut() += path;
        *transform.rotation_mut() += rad;
        self.sync_shape();

        (path, rad).into()
    }

    /// accumulate a world space force at a world space point
    pub fn apply_force_at(&mut self, force: Vector, point: &Point) {
        let r: Vector = (self.center_point(), *point).into();
        self.meta.apply_force(force, r);
    }

    #[inline]
    pub fn apply_force(&mut self, force: Vector) {
        self.meta.apply_force(force, Default::default());
    }
}

impl<T: Clone> From<ElementBuilder<T>> for Element<T> {
    fn from(builder: ElementBuilder<T>) -> Self {
        Self::new(builder.shape, builder.meta, builder.data)
    }
}

impl<T: Clone> ConstraintObject for Element<T> {
    fn center_point(&self) -> Point {
        self.shape.center_point()
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    fn compute_point_velocity(&self, point: &Point) -> Vector {
        let meta = self.meta();
        if meta.is_fixed() {
            return (0., 0.).into();
        }

        let r: Vector = (ConstraintObject::center_point(self), *point).into();
        r.angular_velocity_at(meta.angle_velocity()) + meta.velocity()
    }

    // separate object from contact by moving it directly
    fn apply_position_fix(&mut self, fix: Vector) {
        if self.meta().is_fixed() {
            return;
        }

        let translate_fix = fix * self.meta().inv_mass();

        self.translate(&translate_fix);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        math::pi,
        meta::MetaBuilder,
        shape::{Circle, Rect},
    };

    #[test]
    fn test_set_position_and_angle() {
        let mut element: Element<()> =
            ElementBuilder::new(Rect::new((0., 0.), 20., 10.), MetaBuilder::new(), ()).into();

        element.set_position((50., 60.));
        element.set_angle(pi() * 0.5);

        assert_eq!(element.center_point(), (50., 60.).into());
        assert!((element.angle() - pi() * 0.5).abs() < 1e-6);

        let (min, max) = element.aabb();
        assert!((max.x() - min.x() - 10.).abs() < 1e-3);
        assert!((max.y() - min.y() - 20.).abs() < 1e-3);
    }

    #[test]
    fn test_set_mass_refresh_moment_of_inertia() {
        let mut element: Element<()> =
            ElementBuilder::new(Circle::new((0., 0.), 2.), MetaBuilder::new().mass(1.), ()).into();
        assert!((element.meta().moment_of_inertia() - 2.).abs() < 1e-6);

        element.set_mass(3.);
        assert!((element.meta().moment_of_inertia() - 6.).abs() < 1e-6);
    }

    #[test]
    fn test_point_velocity() {
        let mut element: Element<()> =
            ElementBuilder::new(Circle::new((0., 0.), 2.), MetaBuilder::new(), ()).into();
        *element.meta_mut().angle_velocity_mut() = 1.;
        *element.meta_mut().velocity_mut() = (1., 0.).into();

        let v = element.compute_point_velocity(&(2., 0.).into());
        assert_eq!(v, (1., 2.).into());
    }
}
