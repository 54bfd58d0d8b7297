use crate::{
    math::{point::Point, vector::Vector, FloatNum},
    meta::Meta,
};

pub mod contact;
pub mod contact_manifold;

pub fn compute_inv_mass_effective<Obj: ConstraintObject>(
    &normal: &Vector,
    object_pair: (&Obj, &Obj),
    r_a: Vector,
    r_b: Vector,
) -> FloatNum {
    let (obj_a, obj_b) = object_pair;
    let meta_a = obj_a.meta();
    let meta_b = obj_b.meta();

    let inv_moment_of_inertia_a = meta_a.inv_moment_of_inertia();
    let inv_moment_of_inertia_b = meta_b.inv_moment_of_inertia();

    let inv_mass_a = meta_a.inv_mass();
    let inv_mass_b = meta_b.inv_mass();

    inv_mass_a
        + inv_mass_b
        + (r_a ^ normal).powf(2.) * inv_moment_of_inertia_a
        + (r_b ^ normal).powf(2.) * inv_moment_of_inertia_b
}

pub trait ConstraintObject {
    fn center_point(&self) -> Point;

    fn meta(&self) -> &Meta;

    fn meta_mut(&mut self) -> &mut Meta;

    fn compute_point_velocity(&self, contact_point: &Point) -> Vector;

    // fix is scaled by the inverse mass of the object
    fn apply_position_fix(&mut self, fix: Vector);
}

// sequential impulses: for a contact with normal n the relative velocity
// (v_a + w_a x r_a - v_b - w_b x r_b) * n must reach the bias, the impulse
// magnitude is accumulated across iterations and clamped to stay non negative,
// friction is clamped by the friction coefficient times that magnitude
