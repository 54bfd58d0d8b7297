use std::{
    cell::{Cell, RefCell},
    panic,
    rc::Rc,
};

use js_sys::Function;
use physbox::prelude::*;
use wasm_bindgen::prelude::*;

use crate::common::{
    from_js, from_js_or_default, to_js, WebBodyTelemetry, WebConstraintData,
    WebConstraintPatch, WebEndpoint, WebObjectDescriptor, WebObjectPatch, WebPoint,
    WebPulleyOptions, WebRopeOptions, WebSandboxConfig, WebSceneObject, WebSceneState,
    WebSpringOptions, WebVector,
};

#[wasm_bindgen(js_name = "setPanicConsoleHook")]
pub fn set_panic_console_hook() {
    panic::set_hook(Box::new(console_error_panic_hook::hook));
}

/// route `log` output to the browser console, level is one of error, warn, info, debug, trace
#[wasm_bindgen(js_name = "initLogger")]
pub fn init_logger(level: Option<String>) {
    let level = level
        .and_then(|level| level.parse().ok())
        .unwrap_or(log::Level::Info);
    // a second call keeps the first logger
    let _ = console_log::init_with_level(level);
}

#[wasm_bindgen(typescript_custom_section)]
const _: &str = include_str!("./type.d.ts");

type SharedSandbox = Rc<RefCell<Sandbox>>;

fn parse_view_mode(mode: &str) -> Option<ViewMode> {
    match mode {
        "side" => Some(ViewMode::Side),
        "top" => Some(ViewMode::Top),
        _ => None,
    }
}

fn view_mode_name(mode: ViewMode) -> &'static str {
    match mode {
        ViewMode::Side => "side",
        ViewMode::Top => "top",
    }
}

/// js handle of one connector, stays valid after the connector is gone
#[wasm_bindgen]
pub struct SandboxConstraint {
    id: ConstraintId,
    sandbox: SharedSandbox,
    is_dispose: Cell<bool>,
}

#[wasm_bindgen]
impl SandboxConstraint {
    pub(crate) fn new(id: ConstraintId, sandbox: SharedSandbox) -> Self {
        Self {
            id,
            sandbox,
            is_dispose: Cell::new(false),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn id(&self) -> ConstraintId {
        self.id
    }

    /// serialized connector, null once removed or broken
    pub fn data(&self) -> WebConstraintData {
        self.sandbox
            .borrow()
            .constraint(self.id)
            .map(to_js)
            .unwrap_or(JsValue::NULL)
            .into()
    }

    #[wasm_bindgen(js_name = "isAlive")]
    pub fn is_alive(&self) -> bool {
        self.sandbox.borrow().constraint(self.id).is_some()
    }

    /// anchors for drawing, pulleys also give both pulley points
    #[wasm_bindgen(js_name = "getPointPair")]
    pub fn get_point_pair(&self) -> Vec<WebPoint> {
        self.sandbox
            .borrow()
            .constraint_endpoints(self.id)
            .map(|points| points.iter().map(WebPoint::from).collect())
            .unwrap_or_default()
    }

    #[wasm_bindgen(js_name = "updateConfig")]
    pub fn update_config(&self, patch: WebConstraintPatch) -> bool {
        match from_js::<ConstraintPatch>(patch, "invalid constraint patch") {
            Ok(patch) => self.sandbox.borrow_mut().update_constraint(self.id, &patch),
            Err(err) => {
                log::warn!("{}", err);
                false
            }
        }
    }

    pub fn dispose(&self) {
        if self.is_dispose.replace(true) {
            return;
        }
        self.sandbox.borrow_mut().remove_constraint(self.id);
    }
}

#[wasm_bindgen]
pub struct WebSandbox {
    sandbox: SharedSandbox,
}

#[wasm_bindgen]
impl WebSandbox {
    #[wasm_bindgen(js_name = "createObject")]
    pub fn create_object(&self, id: ObjectId, descriptor: WebObjectDescriptor) -> Option<ObjectId> {
        let descriptor: ObjectDescriptor = self.read(descriptor, "invalid object descriptor")?;
        Some(self.sandbox.borrow_mut().create_object(id, descriptor))
    }

    #[wasm_bindgen(js_name = "addObject")]
    pub fn add_object(&self, descriptor: WebObjectDescriptor) -> Option<ObjectId> {
        let descriptor: ObjectDescriptor = self.read(descriptor, "invalid object descriptor")?;
        Some(self.sandbox.borrow_mut().add_object(descriptor))
    }

    #[wasm_bindgen(js_name = "nextObjectId")]
    pub fn next_object_id(&self) -> ObjectId {
        self.sandbox.borrow_mut().next_object_id()
    }

    #[wasm_bindgen(js_name = "updateObject")]
    pub fn update_object(&self, id: ObjectId, patch: WebObjectPatch) -> bool {
        let Some(patch) = self.read::<ObjectPatch>(patch, "invalid object patch") else {
            return false;
        };
        self.sandbox.borrow_mut().update_object(id, &patch)
    }

    #[wasm_bindgen(js_name = "removeObject")]
    pub fn remove_object(&self, id: ObjectId) -> bool {
        self.sandbox.borrow_mut().remove_object(id).is_some()
    }

    #[wasm_bindgen(js_name = "getObject")]
    pub fn get_object(&self, id: ObjectId) -> Option<WebSceneObject> {
        self.sandbox
            .borrow()
            .object(id)
            .map(|object| to_js(object).into())
    }

    #[wasm_bindgen(js_name = "getObjectIds")]
    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.sandbox.borrow().objects().map(|object| object.id()).collect()
    }

    #[wasm_bindgen(js_name = "hasBody")]
    pub fn has_body(&self, id: ObjectId) -> bool {
        self.sandbox.borrow().has_body(id)
    }

    #[wasm_bindgen(js_name = "createIdealRope")]
    pub fn create_ideal_rope(
        &self,
        a: WebEndpoint,
        b: WebEndpoint,
        options: Option<WebRopeOptions>,
    ) -> Option<SandboxConstraint> {
        let (a, b) = self.endpoints(a, b)?;
        let options: RopeOptions = self.read_or_default(options, "invalid rope options")?;
        let id = self.sandbox.borrow_mut().create_ideal_rope(a, b, options)?;
        Some(self.handle(id))
    }

    #[wasm_bindgen(js_name = "createSpring")]
    pub fn create_spring(
        &self,
        a: WebEndpoint,
        b: WebEndpoint,
        options: Option<WebSpringOptions>,
    ) -> Option<SandboxConstraint> {
        let (a, b) = self.endpoints(a, b)?;
        let options: SpringOptions = self.read_or_default(options, "invalid spring options")?;
        let id = self.sandbox.borrow_mut().create_spring(a, b, options)?;
        Some(self.handle(id))
    }

    #[wasm_bindgen(js_name = "createPulley")]
    pub fn create_pulley(
        &self,
        a: WebEndpoint,
        b: WebEndpoint,
        pulley_a: WebPoint,
        pulley_b: WebPoint,
        options: Option<WebPulleyOptions>,
    ) -> Option<SandboxConstraint> {
        let (a, b) = self.endpoints(a, b)?;
        let pulley_a: Point = Self::ok(pulley_a.try_into())?;
        let pulley_b: Point = Self::ok(pulley_b.try_into())?;
        let options: PulleyOptions = self.read_or_default(options, "invalid pulley options")?;
        let id = self
            .sandbox
            .borrow_mut()
            .create_pulley(a, b, pulley_a, pulley_b, options)?;
        Some(self.handle(id))
    }

    #[wasm_bindgen(js_name = "createFrictionConstraint")]
    pub fn create_friction_constraint(
        &self,
        body_a: ObjectId,
        body_b: ObjectId,
        friction: FloatNum,
    ) -> Option<SandboxConstraint> {
        let id = self
            .sandbox
            .borrow_mut()
            .create_friction_constraint(body_a, body_b, friction)?;
        Some(self.handle(id))
    }

    #[wasm_bindgen(js_name = "createForce")]
    pub fn create_force(&self, body: ObjectId, force: WebVector) -> Option<SandboxConstraint> {
        let force: Vector = Self::ok(force.try_into())?;
        let id = self.sandbox.borrow_mut().create_force(body, force)?;
        Some(self.handle(id))
    }

    pub fn constraints(&self) -> Vec<SandboxConstraint> {
        let ids: Vec<ConstraintId> = self
            .sandbox
            .borrow()
            .constraints()
            .map(|constraint| constraint.id())
            .collect();
        ids.into_iter().map(|id| self.handle(id)).collect()
    }

    #[wasm_bindgen(js_name = "setViewMode")]
    pub fn set_view_mode(&self, mode: &str) {
        match parse_view_mode(mode) {
            Some(mode) => self.sandbox.borrow_mut().set_view_mode(mode),
            None => log::warn!("unknown view mode {}", mode),
        }
    }

    #[wasm_bindgen(getter, js_name = "viewMode")]
    pub fn view_mode(&self) -> String {
        view_mode_name(self.sandbox.borrow().view_mode()).to_owned()
    }

    /// returns the ids of the pieces that were created
    #[wasm_bindgen(js_name = "cutObject")]
    pub fn cut_object(&self, start: WebPoint, end: WebPoint) -> Vec<ObjectId> {
        let (Some(start), Some(end)) = (
            Self::ok::<Point>(start.try_into()),
            Self::ok::<Point>(end.try_into()),
        ) else {
            return Vec::new();
        };
        self.sandbox.borrow_mut().cut_object(start, end)
    }

    #[wasm_bindgen(js_name = "getState")]
    pub fn get_state(&self) -> WebSceneState {
        to_js(&self.sandbox.borrow_mut().get_state()).into()
    }

    #[wasm_bindgen(js_name = "restoreState")]
    pub fn restore_state(&self, state: WebSceneState) -> bool {
        match self.read::<SceneState>(state, "invalid scene state") {
            Some(state) => {
                self.sandbox.borrow_mut().restore_state(state);
                true
            }
            None => false,
        }
    }

    /// advance by the frame's elapsed seconds, returns the fixed ticks run
    pub fn step(&self, frame_delta: FloatNum) -> u32 {
        self.sandbox.borrow_mut().step(frame_delta)
    }

    pub fn tick(&self) {
        self.sandbox.borrow_mut().tick();
    }

    #[wasm_bindgen(js_name = "syncToSceneData")]
    pub fn sync_to_scene_data(&self) {
        self.sandbox.borrow_mut().sync_to_scene_data();
    }

    #[wasm_bindgen(js_name = "getTelemetry")]
    pub fn get_telemetry(&self) -> Vec<WebBodyTelemetry> {
        self.sandbox
            .borrow()
            .get_telemetry()
            .iter()
            .map(|telemetry| to_js(telemetry).into())
            .collect()
    }

    #[wasm_bindgen(js_name = "getBodyTelemetry")]
    pub fn get_body_telemetry(&self, id: ObjectId) -> Option<WebBodyTelemetry> {
        self.sandbox
            .borrow()
            .body_telemetry(id)
            .map(|telemetry| to_js(&telemetry).into())
    }

    #[wasm_bindgen(js_name = "getBodyVertices")]
    pub fn get_body_vertices(&self, id: ObjectId) -> Vec<WebPoint> {
        self.sandbox
            .borrow()
            .body_vertices(id)
            .map(|vertices| vertices.iter().map(WebPoint::from).collect())
            .unwrap_or_default()
    }

    /// callback(telemetry, vertices), vertices is empty for round bodies
    #[wasm_bindgen(skip_typescript, js_name = "forEachBody")]
    pub fn for_each_body(&self, callback: Function) {
        let this = JsValue::null();
        // collect first so the callback may call back into the sandbox
        let bodies: Vec<(JsValue, JsValue)> = {
            let sandbox = self.sandbox.borrow();
            sandbox
                .get_telemetry()
                .iter()
                .map(|telemetry| {
                    let vertices = sandbox.body_vertices(telemetry.id).unwrap_or_default();
                    (to_js(telemetry), to_js(&vertices))
                })
                .collect()
        };

        for (telemetry, vertices) in bodies {
            if let Err(err) = callback.call2(&this, &telemetry, &vertices) {
                log::warn!("forEachBody callback failed: {:?}", err);
            }
        }
    }

    #[wasm_bindgen(js_name = "queryRegion")]
    pub fn query_region(&self, min: WebPoint, max: WebPoint) -> Vec<ObjectId> {
        let (Some(min), Some(max)) = (
            Self::ok::<Point>(min.try_into()),
            Self::ok::<Point>(max.try_into()),
        ) else {
            return Vec::new();
        };
        self.sandbox.borrow().query_region(min, max)
    }

    #[wasm_bindgen(js_name = "setGravity")]
    pub fn set_gravity(&self, gravity: WebVector) {
        if let Some(gravity) = Self::ok::<Vector>(gravity.try_into()) {
            self.sandbox.borrow_mut().set_gravity(gravity);
        }
    }

    pub fn gravity(&self) -> WebVector {
        (&self.sandbox.borrow().gravity()).into()
    }

    pub fn clear(&self) {
        self.sandbox.borrow_mut().clear();
    }

    #[wasm_bindgen(getter, js_name = "frameCount")]
    pub fn frame_count(&self) -> u64 {
        self.sandbox.borrow().frame_count()
    }
}

impl WebSandbox {
    fn handle(&self, id: ConstraintId) -> SandboxConstraint {
        SandboxConstraint::new(id, self.sandbox.clone())
    }

    fn endpoints(&self, a: WebEndpoint, b: WebEndpoint) -> Option<(Endpoint, Endpoint)> {
        Some((Self::ok(a.try_into())?, Self::ok(b.try_into())?))
    }

    fn read<T: serde::de::DeserializeOwned>(
        &self,
        value: impl Into<JsValue>,
        what: &'static str,
    ) -> Option<T> {
        Self::ok(from_js(value, what))
    }

    fn read_or_default<T: serde::de::DeserializeOwned + Default>(
        &self,
        value: Option<impl Into<JsValue>>,
        what: &'static str,
    ) -> Option<T> {
        Self::ok(from_js_or_default(value, what))
    }

    // js callers get a no-op, the reason goes to the console
    fn ok<T>(result: Result<T, &'static str>) -> Option<T> {
        result
            .map_err(|err| log::warn!("{}", err))
            .ok()
    }
}

#[wasm_bindgen(js_name = "createSandbox")]
pub fn create_sandbox(config: Option<WebSandboxConfig>) -> WebSandbox {
    let config: SandboxConfig =
        WebSandbox::ok(from_js_or_default(config, "invalid sandbox config")).unwrap_or_default();
    WebSandbox {
        sandbox: Rc::new(RefCell::new(Sandbox::new(config))),
    }
}
