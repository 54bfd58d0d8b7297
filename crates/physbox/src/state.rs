use physbox_engine::math::{point::Point, vector::Vector, FloatNum};
use serde::{Deserialize, Serialize};

use crate::{
    constraint::Constraint,
    object::{ObjectId, SceneObject},
    projection::ViewMode,
};

/// serializable snapshot of the whole sandbox
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneState {
    pub objects: Vec<SceneObject>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    pub gravity: Vector,
    #[serde(default)]
    pub view_mode: ViewMode,
}

/// per body values for visualization, position is the bounding box center
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyTelemetry {
    pub id: ObjectId,
    pub position: Point,
    pub velocity: Vector,
    pub angle: FloatNum,
    pub angular_velocity: FloatNum,
}
