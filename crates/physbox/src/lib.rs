pub mod config;
pub mod constraint;
mod conveyor;
pub mod geometry;
pub mod object;
pub mod projection;
pub mod sandbox;
mod slicing;
mod solver;
pub mod state;
pub mod store;
mod world;

pub use physbox_engine as engine;

pub mod prelude {
    pub use super::config::{SandboxConfig, SandboxConfigBuilder};
    pub use super::constraint::{
        Constraint, ConstraintId, ConstraintKind, ConstraintPatch, Endpoint, PulleyOptions,
        PulleyOptionsBuilder, RopeOptions, RopeOptionsBuilder, SpringOptions,
        SpringOptionsBuilder,
    };
    pub use super::object::{ObjectDescriptor, ObjectId, ObjectKind, ObjectPatch, SceneObject};
    pub use super::projection::ViewMode;
    pub use super::sandbox::Sandbox;
    pub use super::state::{BodyTelemetry, SceneState};

    pub use physbox_engine::math::{point::Point, vector::Vector, FloatNum};
}
