use physbox_engine::math::{point::Point, segment::Segment, vector::Vector, FloatNum, EPSILON};

use crate::{
    config::SandboxConfig,
    constraint::{
        ConstantForce, Constraint, ConstraintId, ConstraintKind, ConstraintPatch, Endpoint,
        FrictionOverride, Pulley, PulleyOptions, Rope, RopeOptions, Spring, SpringOptions,
    },
    conveyor::ContactListener,
    object::{ObjectDescriptor, ObjectId, ObjectPatch, SceneObject},
    projection::{self, ViewMode},
    slicing,
    solver::{self, resolve_endpoint},
    state::{BodyTelemetry, SceneState},
    store::SceneStore,
    world::World,
};

/// the sandbox core, every mutation from the driver goes through here
///
/// nothing returns an error: operations on missing objects or degenerate geometry are
/// logged no-ops so a broken frame never halts the interactive loop
pub struct Sandbox {
    config: SandboxConfig,
    store: SceneStore,
    world: World,
    view_mode: ViewMode,
    gravity: Vector,
    // simulated time not yet consumed by fixed ticks
    accumulator: FloatNum,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new(Default::default())
    }
}

impl Sandbox {
    pub fn new(config: SandboxConfig) -> Self {
        let gravity = *config.side_gravity();
        let mut sandbox = Self {
            config,
            store: Default::default(),
            world: Default::default(),
            view_mode: Default::default(),
            gravity,
            accumulator: 0.,
        };
        sandbox.apply_gravity();
        sandbox
    }

    #[inline]
    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    #[inline]
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    #[inline]
    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    pub fn next_object_id(&mut self) -> ObjectId {
        self.store.next_object_id()
    }

    /// insert a scene object under a driver chosen id, an existing object is replaced
    pub fn create_object(&mut self, id: ObjectId, descriptor: ObjectDescriptor) -> ObjectId {
        self.world.remove(id);
        let object = self.store.create_object(id, descriptor);
        self.world.insert(object, self.view_mode, &self.config);
        id
    }

    /// same as `create_object` with a freshly allocated id
    pub fn add_object(&mut self, descriptor: ObjectDescriptor) -> ObjectId {
        let id = self.store.next_object_id();
        self.create_object(id, descriptor)
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.store.object(id)
    }

    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.store.objects()
    }

    pub fn has_body(&self, id: ObjectId) -> bool {
        self.world.has_body(id)
    }

    /// merge a partial update, returns false when nothing changed
    ///
    /// material and pose edits go straight to the live body, size edits rebuild it
    pub fn update_object(&mut self, id: ObjectId, patch: &ObjectPatch) -> bool {
        let Some(object) = self.store.object(id) else {
            log::debug!("update of missing object {}", id);
            return false;
        };

        let view = self.view_mode;

        // scene data is inert while simulating, compare against the live pose
        let mut preview = object.clone();
        if let Some(element) = self.world.body(id) {
            projection::unproject(&mut preview, element, view);
        }
        if preview.apply_patch(patch).is_empty() {
            return false;
        }

        let Some(object) = self.store.object_mut(id) else {
            return false;
        };

        if let Some(element) = self.world.body(id) {
            projection::unproject(object, element, view);
        }

        let effect = object.apply_patch(patch);

        if effect.rebuild || !self.world.has_body(id) {
            let motion = self
                .world
                .body(id)
                .map(|element| (*element.meta().velocity(), element.meta().angle_velocity()));

            if self.world.insert(object, view, &self.config) && !object.is_static() {
                if let (Some((velocity, angle_velocity)), Some(element)) =
                    (motion, self.world.body_mut(id))
                {
                    *element.meta_mut().velocity_mut() = velocity;
                    *element.meta_mut().angle_velocity_mut() = angle_velocity;
                }
            }
        } else if let Some(element) = self.world.body_mut(id) {
            if effect.material {
                projection::apply_material(object, element);
            }
            if effect.pose {
                projection::apply_pose(object, element, view);
            }
        }

        true
    }

    /// removes the object, its body and every constraint attached to it
    pub fn remove_object(&mut self, id: ObjectId) -> Option<SceneObject> {
        self.world.remove(id);
        let object = self.store.remove_object(id);
        if object.is_none() {
            log::debug!("remove of missing object {}", id);
        }
        object
    }

    fn check_endpoint(&self, endpoint: &Endpoint) -> bool {
        match endpoint.object_id() {
            Some(id) if !self.store.has_object(id) => {
                log::debug!("connector endpoint {} does not exist", id);
                false
            }
            _ => true,
        }
    }

    fn current_distance(&self, a: &Endpoint, b: &Endpoint) -> Option<FloatNum> {
        let a = resolve_endpoint(&self.world, a)?;
        let b = resolve_endpoint(&self.world, b)?;
        Some(a.point.distance(&b.point))
    }

    /// inextensible rope (or one sided spring when elastic), length defaults to the current distance
    pub fn create_ideal_rope(
        &mut self,
        a: Endpoint,
        b: Endpoint,
        options: RopeOptions,
    ) -> Option<ConstraintId> {
        if !(self.check_endpoint(&a) && self.check_endpoint(&b)) {
            return None;
        }
        let length = options
            .length
            .or_else(|| self.current_distance(&a, &b))?;
        let rope = Rope::new(a, b, length, options);
        Some(self.store.add_constraint(ConstraintKind::Rope(rope)))
    }

    pub fn create_spring(
        &mut self,
        a: Endpoint,
        b: Endpoint,
        options: SpringOptions,
    ) -> Option<ConstraintId> {
        if !(self.check_endpoint(&a) && self.check_endpoint(&b)) {
            return None;
        }
        let length = options
            .length
            .or_else(|| self.current_distance(&a, &b))?;
        let spring = Spring::new(a, b, length, options);
        Some(self.store.add_constraint(ConstraintKind::Spring(spring)))
    }

    /// `a` hangs from `pulley_a`, `b` from `pulley_b`, both share one rope length
    pub fn create_pulley(
        &mut self,
        a: Endpoint,
        b: Endpoint,
        pulley_a: impl Into<Point>,
        pulley_b: impl Into<Point>,
        options: PulleyOptions,
    ) -> Option<ConstraintId> {
        if !(self.check_endpoint(&a) && self.check_endpoint(&b)) {
            return None;
        }
        let (pulley_a, pulley_b) = (pulley_a.into(), pulley_b.into());
        let length = options.length.or_else(|| {
            let a = resolve_endpoint(&self.world, &a)?;
            let b = resolve_endpoint(&self.world, &b)?;
            Some(a.point.distance(&pulley_a) + b.point.distance(&pulley_b))
        })?;
        let pulley = Pulley::new(a, b, (pulley_a, pulley_b), length, options);
        Some(self.store.add_constraint(ConstraintKind::Pulley(pulley)))
    }

    /// contacts between the two objects use `friction` instead of their own coefficients
    pub fn create_friction_constraint(
        &mut self,
        body_a: ObjectId,
        body_b: ObjectId,
        friction: FloatNum,
    ) -> Option<ConstraintId> {
        if !(self.store.has_object(body_a) && self.store.has_object(body_b)) {
            log::debug!("friction override between missing objects {} {}", body_a, body_b);
            return None;
        }
        let friction = FrictionOverride::new(body_a, body_b, friction);
        Some(self.store.add_constraint(ConstraintKind::Friction(friction)))
    }

    /// world space force applied at the center every tick
    pub fn create_force(
        &mut self,
        body: ObjectId,
        force: impl Into<Vector>,
    ) -> Option<ConstraintId> {
        if !self.store.has_object(body) {
            log::debug!("force on missing object {}", body);
            return None;
        }
        let force = ConstantForce::new(body, force.into());
        Some(self.store.add_constraint(ConstraintKind::Force(force)))
    }

    pub fn constraint(&self, id: ConstraintId) -> Option<&Constraint> {
        self.store.constraint(id)
    }

    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.store.constraints()
    }

    pub fn update_constraint(&mut self, id: ConstraintId, patch: &ConstraintPatch) -> bool {
        match self.store.constraint_mut(id) {
            Some(constraint) => constraint.apply_patch(patch),
            None => {
                log::debug!("update of missing constraint {}", id);
                false
            }
        }
    }

    pub fn remove_constraint(&mut self, id: ConstraintId) -> Option<Constraint> {
        self.store.remove_constraint(id)
    }

    /// world points a renderer needs to draw the connector
    ///
    /// ropes and springs give both anchors, pulleys give anchor a, both pulley points and anchor b
    pub fn constraint_endpoints(&self, id: ConstraintId) -> Option<Vec<Point>> {
        let constraint = self.store.constraint(id)?;
        let resolve = |endpoint: &Endpoint| resolve_endpoint(&self.world, endpoint).map(|a| a.point);

        match constraint.kind() {
            ConstraintKind::Rope(rope) => Some(vec![resolve(&rope.a())?, resolve(&rope.b())?]),
            ConstraintKind::Spring(spring) => {
                Some(vec![resolve(&spring.a())?, resolve(&spring.b())?])
            }
            ConstraintKind::Pulley(pulley) => Some(vec![
                resolve(&pulley.a())?,
                *pulley.pulley_a(),
                *pulley.pulley_b(),
                resolve(&pulley.b())?,
            ]),
            ConstraintKind::Force(force) => {
                let center = self.world.body(force.body())?.center_point();
                Some(vec![center, center + force.force()])
            }
            ConstraintKind::Friction(_) => None,
        }
    }

    fn apply_gravity(&mut self) {
        let enable = match self.view_mode {
            ViewMode::Side => true,
            ViewMode::Top => self.config.top_view_gravity(),
        };
        self.world.set_gravity(self.gravity, enable);
    }

    pub fn gravity(&self) -> Vector {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: impl Into<Vector>) {
        let gravity = gravity.into();
        if !gravity.is_finite() {
            log::warn!("ignore non finite gravity {}", gravity);
            return;
        }
        self.gravity = gravity;
        self.apply_gravity();
    }

    /// copy every live body pose into its object, only the active view's fields change
    pub fn sync_to_scene_data(&mut self) {
        let view = self.view_mode;
        for (object_id, element) in self.world.bodies() {
            if let Some(object) = self.store.object_mut(object_id) {
                projection::unproject(object, element, view);
            }
        }
    }

    /// throw away every body and project the scene data again
    pub fn rebuild_world(&mut self) {
        self.world.clear();
        for object in self.store.objects() {
            self.world.insert(object, self.view_mode, &self.config);
        }
        self.apply_gravity();
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if mode == self.view_mode {
            return;
        }
        self.sync_to_scene_data();
        self.view_mode = mode;
        self.rebuild_world();
    }

    /// advance by a frame's wall time in fixed ticks, returns how many ran
    pub fn step(&mut self, frame_delta: FloatNum) -> u32 {
        let time_step = self.config.fixed_time_step();
        if !(frame_delta.is_finite() && frame_delta > 0.) || !(time_step > 0.) {
            log::warn!("skip step of {} with time step {}", frame_delta, time_step);
            return 0;
        }

        self.accumulator += frame_delta.min(self.config.max_frame_delta());

        let mut ticks = 0;
        while self.accumulator >= time_step && ticks < self.config.max_sub_steps() {
            self.accumulator -= time_step;
            self.tick();
            ticks += 1;
        }

        if ticks == self.config.max_sub_steps() {
            // drop the backlog instead of spiraling
            self.accumulator = self.accumulator.min(time_step);
        }

        ticks
    }

    /// one fixed tick: connectors first, then the engine with the contact hook
    pub fn tick(&mut self) {
        let time_step = self.config.fixed_time_step();

        let broken = solver::solve(
            &mut self.world,
            self.store.constraint_map(),
            &self.config,
            time_step,
        );
        for id in broken {
            if self.store.remove_constraint(id).is_some() {
                log::info!("constraint {} broke", id);
            }
        }

        let mut listener = ContactListener::new(&self.store, self.config.conveyor_gain());
        self.world.tick(time_step, &mut listener);
    }

    /// cut every dynamic polygon body the segment crosses twice, returns the new object ids
    pub fn cut_object(&mut self, start: impl Into<Point>, end: impl Into<Point>) -> Vec<ObjectId> {
        let (start, end) = (start.into(), end.into());
        let mut created = Vec::new();

        if self.view_mode != ViewMode::Side {
            log::debug!("cutting is only available in side view");
            return created;
        }

        let segment = Segment::new(start, end);
        if !(segment.length() > EPSILON) {
            log::debug!("cut segment is degenerate");
            return created;
        }

        for object_id in self.world.query_segment(start, end) {
            let Some(origin) = self.store.object(object_id) else {
                continue;
            };
            if !slicing::is_sliceable(origin) {
                log::debug!("object {} can not be cut", object_id);
                continue;
            }
            let Some(element) = self.world.body(object_id) else {
                continue;
            };
            let Some(vertices) = element.vertices() else {
                continue;
            };
            let Some(pieces) = slicing::split(vertices, &segment, self.config.slice_separation())
            else {
                log::debug!("cut of object {} does not cross it exactly twice", object_id);
                continue;
            };

            let velocity = *element.meta().velocity();
            let angle_velocity = element.meta().angle_velocity();
            let origin = origin.clone();

            self.remove_object(object_id);

            for piece in pieces {
                let id = self.store.next_object_id();
                let object = slicing::piece_object(id, &origin, piece);
                self.world.insert(&object, self.view_mode, &self.config);
                self.store.insert_object(object);

                if let Some(element) = self.world.body_mut(id) {
                    *element.meta_mut().velocity_mut() = velocity;
                    *element.meta_mut().angle_velocity_mut() = angle_velocity;
                }
                created.push(id);
            }
        }

        created
    }

    /// snapshot of scene data, constraints, gravity and view, live poses are synced first
    pub fn get_state(&mut self) -> SceneState {
        self.sync_to_scene_data();
        SceneState {
            objects: self.store.objects().cloned().collect(),
            constraints: self.store.constraints().cloned().collect(),
            gravity: self.gravity,
            view_mode: self.view_mode,
        }
    }

    pub fn restore_state(&mut self, state: SceneState) {
        let SceneState {
            objects,
            constraints,
            gravity,
            view_mode,
        } = state;

        self.store.restore(objects, constraints);
        self.view_mode = view_mode;
        self.gravity = if gravity.is_finite() {
            gravity
        } else {
            *self.config.side_gravity()
        };
        self.accumulator = 0.;
        self.rebuild_world();
    }

    pub fn get_telemetry(&self) -> Vec<BodyTelemetry> {
        self.world
            .bodies()
            .filter_map(|(object_id, element)| {
                let object = self.store.object(object_id)?;
                Some(BodyTelemetry {
                    id: object_id,
                    position: projection::resolved_position(object, element, self.view_mode),
                    velocity: *element.meta().velocity(),
                    angle: element.angle(),
                    angular_velocity: element.meta().angle_velocity(),
                })
            })
            .collect()
    }

    pub fn body_telemetry(&self, id: ObjectId) -> Option<BodyTelemetry> {
        let object = self.store.object(id)?;
        let element = self.world.body(id)?;
        Some(BodyTelemetry {
            id,
            position: projection::resolved_position(object, element, self.view_mode),
            velocity: *element.meta().velocity(),
            angle: element.angle(),
            angular_velocity: element.meta().angle_velocity(),
        })
    }

    /// objects whose body overlaps the region
    pub fn query_region(&self, min: impl Into<Point>, max: impl Into<Point>) -> Vec<ObjectId> {
        self.world.query_region(min.into(), max.into())
    }

    /// outline of a live body in world space, circles have none
    pub fn body_vertices(&self, id: ObjectId) -> Option<Vec<Point>> {
        self.world
            .body(id)
            .and_then(|element| element.vertices())
            .map(|vertices| vertices.to_vec())
    }

    pub fn clear(&mut self) {
        self.store.clear();
        self.world.clear();
        self.accumulator = 0.;
    }

    pub fn frame_count(&self) -> u64 {
        self.world.scene().frame_count()
    }
}
