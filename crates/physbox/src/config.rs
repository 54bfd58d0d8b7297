use physbox_engine::math::{vector::Vector, FloatNum};
use physbox_macro_tools::{Builder, Fields};
use serde::{Deserialize, Serialize};

/// tunables of the sandbox, a partial json object fills the rest with defaults
#[derive(Clone, Debug, Fields, Builder, Serialize, Deserialize)]
#[r]
#[serde(default, rename_all = "camelCase")]
pub struct SandboxConfig {
    #[default(1. / 60.)]
    fixed_time_step: FloatNum,
    #[default = 5]
    max_sub_steps: u32,
    // longer frames are clamped, a stalled tab must not explode the scene
    #[default = 0.25]
    max_frame_delta: FloatNum,

    #[default = 10]
    pbd_iterations: u32,
    // fraction of the re-stretching velocity removed per iteration
    #[default = 0.5]
    pbd_velocity_damping: FloatNum,

    #[default = 0.1]
    min_spring_distance: FloatNum,
    #[default = 1e6]
    max_spring_force: FloatNum,

    #[default = 12.]
    conveyor_gain: FloatNum,

    #[default = 2.]
    slice_separation: FloatNum,

    #[default = 2.]
    point_mass_radius: FloatNum,
    #[default = 24]
    ellipse_segments: u32,
    #[default = 4]
    capsule_corner_segments: u32,

    #[default(Vector::new(0., 980.))]
    side_gravity: Vector,
    top_view_gravity: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SandboxConfig =
            serde_json::from_str(r#"{"pbdIterations": 20, "topViewGravity": true}"#).unwrap();

        assert_eq!(config.pbd_iterations(), 20);
        assert!(config.top_view_gravity());
        assert_eq!(config.max_sub_steps(), 5);
        assert_eq!(*config.side_gravity(), Vector::new(0., 980.));
        assert!((config.fixed_time_step() - 1. / 60.).abs() < 1e-6);
    }

    #[test]
    fn test_builder() {
        let config = SandboxConfigBuilder::new()
            .conveyor_gain(6.)
            .slice_separation(0.)
            .build();

        assert_eq!(config.conveyor_gain(), 6.);
        assert_eq!(config.slice_separation(), 0.);
        assert_eq!(config.pbd_velocity_damping(), 0.5);
    }
}
