pub mod force;

use physbox_macro_tools::{Builder, Deref, Fields};

use crate::math::{vector::Vector, FloatNum};

use self::force::ForceAccumulator;

pub type Mass = f32;

pub type Speed = Vector;

/// translation and rotation of a shape relative to the pose it was built with
#[derive(Default, Clone, Fields, Debug)]
#[r]
#[w]
pub struct Transform {
    translation: Vector,
    rotation: FloatNum,
}

impl From<(Vector, FloatNum)> for Transform {
    fn from((translation, rotation): (Vector, FloatNum)) -> Self {
        Self {
            translation,
            rotation,
        }
    }
}

#[derive(Clone, Fields, Builder, Debug)]
#[r]
pub struct Meta {
    #[w]
    velocity: Speed,
    #[w]
    angle_velocity: FloatNum,
    #[r(skip)]
    #[builder(skip)]
    #[default(ValueWithInv::new(1.))]
    mass: ValueWithInv,
    #[r(skip)]
    #[builder(skip)]
    #[default(ValueWithInv::new(1.))]
    moment_of_inertia: ValueWithInv,

    #[builder(skip)]
    #[w(vis(pub(crate)))]
    transform: Transform,

    #[w]
    #[default = 0.1]
    factor_friction: FloatNum,
    #[w]
    #[default = 0.5]
    factor_static_friction: FloatNum,
    #[w]
    #[default = 0.]
    factor_restitution: FloatNum,
    // fraction of the velocity removed every tick
    #[w]
    #[default = 0.01]
    friction_air: FloatNum,

    #[w]
    is_fixed: bool,
    #[w]
    is_transparent: bool,
    #[w]
    is_ignore_gravity: bool,

    #[builder(skip)]
    #[r(vis(pub(crate)))]
    #[w(vis(pub(crate)))]
    force_accumulator: ForceAccumulator,
}

#[derive(Deref, Clone, Copy, Fields, Debug)]
#[r]
struct ValueWithInv {
    #[deref]
    value: FloatNum,
    inv: FloatNum,
}

impl ValueWithInv {
    fn new(value: FloatNum) -> Self {
        let mut this = Self { value, inv: 0. };
        this.set_value(value);
        this
    }

    fn set_value(&mut self, new_value: FloatNum) {
        self.value = new_value;
        // zero or broken mass behaves like an immovable body
        self.inv = if new_value.is_finite() && new_value > 0. {
            new_value.recip()
        } else {
            0.
        };
    }
}

impl Meta {
    pub fn mass(&self) -> Mass {
        *self.mass
    }

    pub fn inv_mass(&self) -> Mass {
        if self.is_fixed {
            0.
        } else {
            self.mass.inv()
        }
    }

    pub fn set_mass(&mut self, mass: FloatNum) -> &mut Self {
        self.mass.set_value(mass);
        self
    }

    pub fn moment_of_inertia(&self) -> Mass {
        *self.moment_of_inertia
    }

    pub fn inv_moment_of_inertia(&self) -> Mass {
        if self.is_fixed {
            0.
        } else {
            self.moment_of_inertia.inv()
        }
    }

    pub(crate) fn set_moment_of_inertia(
        &mut self,
        reducer: impl FnOnce(Mass) -> Mass,
    ) -> &mut Self {
        self.moment_of_inertia
            .set_value(reducer(*self.moment_of_inertia));
        self
    }

    // r is vector from shape center_point to contact_point
    pub fn apply_impulse(&mut self, impulse: Vector, r: Vector) {
        // can't apply impulse to element when element fixed
        if self.is_fixed() {
            return;
        }

        let inv_mass = self.inv_mass();

        *self.velocity_mut() += impulse * inv_mass;

        let inv_moment_of_inertia = self.inv_moment_of_inertia();

        *self.angle_velocity_mut() += (r ^ impulse) * inv_moment_of_inertia
    }

    /// accumulate a force for the next integration, r is relative to the center point
    pub fn apply_force(&mut self, force: Vector, r: Vector) {
        if self.is_fixed() {
            return;
        }
        self.force_accumulator.add(force, r);
    }

    pub(crate) fn silent(&mut self) {
        *self.angle_velocity_mut() = Default::default();
        *self.velocity_mut() = Default::default();
    }
}

impl MetaBuilder {
    pub fn mass(mut self, mass: FloatNum) -> Self {
        self.mass.set_value(mass);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_meta_has_no_inverse_mass() {
        let meta: Meta = MetaBuilder::new().mass(4.).is_fixed(true).into();
        assert_eq!(meta.mass(), 4.);
        assert_eq!(meta.inv_mass(), 0.);
        assert_eq!(meta.inv_moment_of_inertia(), 0.);
    }

    #[test]
    fn test_apply_impulse() {
        let mut meta: Meta = MetaBuilder::new().mass(2.).into();
        meta.set_moment_of_inertia(|_| 4.);
        meta.apply_impulse((2., 0.).into(), (0., 1.).into());
        assert_eq!(*meta.velocity(), (1., 0.).into());
        // (0, 1) x (2, 0) = -2
        assert!((meta.angle_velocity() + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_zero_mass_is_immovable() {
        let mut meta: Meta = MetaBuilder::new().mass(0.).into();
        meta.apply_impulse((10., 0.).into(), Default::default());
        assert!(meta.velocity().is_zero());
    }
}
