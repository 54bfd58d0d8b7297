use physbox_macro_tools::Fields;

use crate::math::{vector::Vector, FloatNum};

#[derive(Debug, Clone, Fields)]
#[r]
#[w]
pub struct ConstraintParameters {
    // sequential impulse iterations per tick
    velocity_iterations: u8,
    // fraction of the remaining penetration removed per tick
    factor_position_fix: FloatNum,
    // penetration kept so resting contacts stay detected
    max_allow_permeate: FloatNum,
    // approaching speed below this never bounces
    min_restitution_speed: FloatNum,
    // sliding speed below this uses static friction
    static_friction_speed: FloatNum,
    skip_friction_constraints: bool,
}

impl Default for ConstraintParameters {
    fn default() -> Self {
        Self {
            velocity_iterations: 10,
            factor_position_fix: 0.4,
            max_allow_permeate: 0.5,
            min_restitution_speed: 20.,
            static_friction_speed: 5.,
            skip_friction_constraints: false,
        }
    }
}

#[derive(Debug, Clone, Fields)]
#[r]
/// define global config and state
pub struct Context {
    #[w]
    constraint_parameters: ConstraintParameters,
    #[w]
    enable_gravity: bool,
    #[w]
    default_gravity: Vector,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            constraint_parameters: Default::default(),
            enable_gravity: true,
            // canvas coordinates, y grows downward
            default_gravity: (0., 980.).into(),
        }
    }
}
