use physbox_macro_tools::{Deref, Fields};

use crate::{
    collision::ContactPointPair,
    element::ID,
    math::{num::limit_at_range, vector::Vector, FloatNum},
    meta::Meta,
    scene::context::ConstraintParameters,
};

use super::{compute_inv_mass_effective, ConstraintObject};

#[derive(Fields)]
pub struct ContactConstraint {
    contact_point_pair_constraint_infos: Vec<ContactPointPairConstraintInfo>,
    // two collide obj
    obj_id_a: ID,
    obj_id_b: ID,
    #[r]
    #[w(set)]
    is_active: bool,
    #[r]
    #[w(set)]
    factor_friction: FloatNum,
    #[r]
    #[w(set)]
    factor_static_friction: FloatNum,
    #[r]
    #[w(set)]
    factor_restitution: FloatNum,
}

#[derive(Default, Deref, Fields)]
pub struct ContactPointPairConstraintInfo {
    #[deref]
    #[r]
    contact_point_pair: ContactPointPair,
    #[r]
    r_a: Vector,
    #[r]
    r_b: Vector,
    mass_effective: FloatNum,
    tangent_mass_effective: FloatNum,
    #[r]
    total_lambda: FloatNum,
    #[r]
    total_friction_lambda: FloatNum,
    velocity_bias: FloatNum,
}

impl ContactPointPairConstraintInfo {
    // restrict total lambda must big than zero
    pub(crate) fn restrict_contact_lambda(&mut self, lambda: FloatNum) -> FloatNum {
        let previous_total_lambda = self.total_lambda;
        self.total_lambda = (self.total_lambda + lambda).max(0.);
        self.total_lambda - previous_total_lambda
    }

    pub(crate) fn restrict_contact_friction_lambda(
        &mut self,
        friction_lambda: FloatNum,
        max_friction_lambda: FloatNum,
    ) -> FloatNum {
        let previous_total_friction_lambda = self.total_friction_lambda;
        self.total_friction_lambda = limit_at_range(
            self.total_friction_lambda + friction_lambda,
            -(max_friction_lambda.abs())..=(max_friction_lambda.abs()),
        );
        self.total_friction_lambda - previous_total_friction_lambda
    }
}

impl ContactConstraint {
    /// friction and restitution start as the geometric mean of both materials
    pub fn new(
        obj_id_a: ID,
        obj_id_b: ID,
        contact_point_pairs: Vec<ContactPointPair>,
        (meta_a, meta_b): (&Meta, &Meta),
    ) -> Self {
        let contact_point_pair_constraint_infos = contact_point_pairs
            .into_iter()
            .map(|v| ContactPointPairConstraintInfo {
                contact_point_pair: v,
                ..Default::default()
            })
            .collect();

        let mix = |a: FloatNum, b: FloatNum| (a.max(0.) * b.max(0.)).sqrt();

        Self {
            contact_point_pair_constraint_infos,
            obj_id_a,
            obj_id_b,
            is_active: true,
            factor_friction: mix(meta_a.factor_friction(), meta_b.factor_friction()),
            factor_static_friction: mix(
                meta_a.factor_static_friction(),
                meta_b.factor_static_friction(),
            ),
            factor_restitution: mix(meta_a.factor_restitution(), meta_b.factor_restitution()),
        }
    }

    pub fn obj_id_pair(&self) -> (ID, ID) {
        (self.obj_id_a, self.obj_id_b)
    }

    pub fn contact_point_pairs(&self) -> impl Iterator<Item = &ContactPointPair> {
        self.contact_point_pair_constraint_infos
            .iter()
            .map(|info| info.contact_point_pair())
    }

    pub(crate) fn pre_solve<Obj: ConstraintObject>(
        &mut self,
        (object_a, object_b): (&Obj, &Obj),
        parameters: &ConstraintParameters,
    ) {
        let factor_restitution = self.factor_restitution;

        self.contact_point_pair_constraint_infos
            .iter_mut()
            .for_each(|contact_info| {
                let contact_point = *contact_info.point();

                let r_a = (object_a.center_point(), contact_point).into();

                let r_b = (object_b.center_point(), contact_point).into();

                contact_info.r_a = r_a;

                contact_info.r_b = r_b;

                let normal = contact_info.normal_toward_a();

                let tangent_normal: Vector = !normal;

                let inv_mass_effective =
                    compute_inv_mass_effective(&normal, (object_a, object_b), r_a, r_b);

                let inv_tangent_mass_effective =
                    compute_inv_mass_effective(&tangent_normal, (object_a, object_b), r_a, r_b);

                contact_info.mass_effective = safe_recip(inv_mass_effective);
                contact_info.tangent_mass_effective = safe_recip(inv_tangent_mass_effective);

                let vn = normal
                    * (object_a.compute_point_velocity(&contact_point)
                        - object_b.compute_point_velocity(&contact_point));

                contact_info.velocity_bias = if vn < -parameters.min_restitution_speed() {
                    -vn * factor_restitution
                } else {
                    0.
                };

                contact_info.total_lambda = 0.;
                contact_info.total_friction_lambda = 0.;
            });
    }

    pub(crate) fn solve_velocity_constraint<Obj: ConstraintObject>(
        &mut self,
        (obj_a, obj_b): (&mut Obj, &mut Obj),
        parameters: &ConstraintParameters,
    ) {
        self.contact_point_pair_constraint_infos
            .iter_mut()
            .for_each(|contact_info| {
                let normal = contact_info.normal_toward_a();

                let v_a = obj_a.compute_point_velocity(contact_info.point());
                let v_b = obj_b.compute_point_velocity(contact_info.point());

                let jv = (v_a - v_b) * normal;

                let lambda = (contact_info.velocity_bias - jv) * contact_info.mass_effective;

                let lambda = contact_info.restrict_contact_lambda(lambda);

                obj_a
                    .meta_mut()
                    .apply_impulse(normal * lambda, contact_info.r_a);
                obj_b
                    .meta_mut()
                    .apply_impulse(-normal * lambda, contact_info.r_b);
            });

        if !parameters.skip_friction_constraints() {
            self.solve_friction_constraint((obj_a, obj_b), parameters);
        }
    }

    fn solve_friction_constraint<Obj: ConstraintObject>(
        &mut self,
        (obj_a, obj_b): (&mut Obj, &mut Obj),
        parameters: &ConstraintParameters,
    ) {
        let factor_friction = self.factor_friction;
        let factor_static_friction = self.factor_static_friction.max(factor_friction);

        self.contact_point_pair_constraint_infos
            .iter_mut()
            .for_each(|contact_info| {
                let contact_point = contact_info.point();

                let sum_velocity_a = obj_a.compute_point_velocity(contact_point);

                let sum_velocity_b = obj_b.compute_point_velocity(contact_point);

                let tangent_normal = !contact_info.normal_toward_a();

                let vt = (sum_velocity_a - sum_velocity_b) * tangent_normal;

                // slow sliding is held by static friction
                let factor = if vt.abs() < parameters.static_friction_speed() {
                    factor_static_friction
                } else {
                    factor_friction
                };

                let friction_lambda = -vt * contact_info.tangent_mass_effective;

                let friction_lambda = contact_info.restrict_contact_friction_lambda(
                    friction_lambda,
                    contact_info.total_lambda * factor,
                );

                let friction_impulse = tangent_normal * friction_lambda;

                obj_a
                    .meta_mut()
                    .apply_impulse(friction_impulse, contact_info.r_a);

                obj_b
                    .meta_mut()
                    .apply_impulse(-friction_impulse, contact_info.r_b);
            });
    }

    // separate contact object by change their position directly
    pub(crate) fn solve_position_constraint<Obj: ConstraintObject>(
        &self,
        (obj_a, obj_b): (&mut Obj, &mut Obj),
        parameters: &ConstraintParameters,
    ) {
        let Some(deepest) = self
            .contact_point_pair_constraint_infos
            .iter()
            .max_by(|a, b| a.depth().total_cmp(&b.depth()))
        else {
            return;
        };

        let total_inv_mass = obj_a.meta().inv_mass() + obj_b.meta().inv_mass();
        if total_inv_mass <= 0. {
            return;
        }

        let depth_fix = (deepest.depth() - parameters.max_allow_permeate()).max(0.)
            * parameters.factor_position_fix();

        if depth_fix <= 0. {
            return;
        }

        let fix = deepest.normal_toward_a() * (depth_fix / total_inv_mass);

        obj_a.apply_position_fix(fix);
        obj_b.apply_position_fix(-fix);
    }
}

#[inline]
fn safe_recip(value: FloatNum) -> FloatNum {
    if value > FloatNum::EPSILON && value.is_finite() {
        value.recip()
    } else {
        0.
    }
}
