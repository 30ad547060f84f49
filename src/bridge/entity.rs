//! A simulated object: one body, one render node, one responder.

use std::any::{Any, TypeId};

use super::dispatch::ContactResponder;
use crate::engine::{
    BodyHandle, BodyKind, FixtureDef, FixtureHandle, PhysicsWorld,
};
use crate::foundation::math::{Point2, Vec2};
use crate::foundation::units::{render_rotation, CoordinateMapper};
use crate::render::RenderNode;

/// One object in a simulation world.
///
/// Ties together an optional rigid body, an optional scene-graph node and an
/// optional [`ContactResponder`]. Mutators that touch the body take the
/// engine world as a parameter; the owning
/// [`SimulationWorld`](super::SimulationWorld) hands both out through
/// [`entity_engine_mut`](super::SimulationWorld::entity_engine_mut).
///
/// Body-touching methods panic if the body has been destroyed; using a dead
/// object is a bug in the caller, not a runtime condition to recover from.
pub struct PhysicsEntity {
    body: Option<BodyHandle>,
    tag: i32,
    node: Option<Box<dyn RenderNode>>,
    delete_later: bool,
    pub(crate) responder: Option<Box<dyn ContactResponder>>,
}

impl PhysicsEntity {
    pub(crate) fn new(
        tag: i32,
        node: Option<Box<dyn RenderNode>>,
        responder: Option<Box<dyn ContactResponder>>,
    ) -> Self {
        Self {
            body: None,
            tag,
            node,
            delete_later: false,
            responder,
        }
    }

    pub(crate) fn attach_body(&mut self, body: BodyHandle) {
        self.body = Some(body);
    }

    pub(crate) fn clear_body(&mut self) {
        self.body = None;
    }

    #[track_caller]
    fn body_or_panic(&self) -> BodyHandle {
        match self.body {
            Some(body) => body,
            None => panic!("operation on an entity whose body has been destroyed"),
        }
    }

    /// Whether the entity still has a live body.
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Handle of the entity's body, if it still has one.
    pub fn body_handle(&self) -> Option<BodyHandle> {
        self.body
    }

    /// Application-assigned tag.
    pub fn tag(&self) -> i32 {
        self.tag
    }

    /// Replace the application-assigned tag.
    pub fn set_tag(&mut self, tag: i32) {
        self.tag = tag;
    }

    /// Whether the entity is flagged for the end-of-step sweep.
    pub fn delete_later(&self) -> bool {
        self.delete_later
    }

    /// Flag or unflag the entity for the end-of-step sweep. The entity stays
    /// fully usable until the sweep actually runs, so this is safe from
    /// inside contact notifications.
    pub fn set_delete_later(&mut self, delete: bool) {
        self.delete_later = delete;
    }

    // --- body state ---

    /// Position of the body origin, in meters.
    #[track_caller]
    pub fn position(&self, engine: &PhysicsWorld) -> Vec2 {
        engine.position(self.body_or_panic())
    }

    /// Body angle in radians.
    #[track_caller]
    pub fn angle(&self, engine: &PhysicsWorld) -> f32 {
        engine.angle(self.body_or_panic())
    }

    /// Set position and angle at once.
    #[track_caller]
    pub fn set_transform(&self, engine: &mut PhysicsWorld, position: Vec2, angle: f32) {
        engine.set_transform(self.body_or_panic(), position, angle);
    }

    /// Move the body, keeping its angle.
    #[track_caller]
    pub fn set_position(&self, engine: &mut PhysicsWorld, position: Vec2) {
        let body = self.body_or_panic();
        let angle = engine.angle(body);
        engine.set_transform(body, position, angle);
    }

    /// Rotate the body, keeping its position.
    #[track_caller]
    pub fn set_angle(&self, engine: &mut PhysicsWorld, angle: f32) {
        let body = self.body_or_panic();
        let position = engine.position(body);
        engine.set_transform(body, position, angle);
    }

    /// Position of the body origin, in render units.
    #[track_caller]
    pub fn render_position(
        &self,
        engine: &PhysicsWorld,
        mapper: &CoordinateMapper,
    ) -> Point2 {
        mapper.to_render(self.position(engine))
    }

    /// Move the body to a render-space position, keeping its angle.
    #[track_caller]
    pub fn set_render_position(
        &self,
        engine: &mut PhysicsWorld,
        mapper: &CoordinateMapper,
        position: Point2,
    ) {
        self.set_position(engine, mapper.to_simulation(position));
    }

    /// Linear velocity in meters per second.
    #[track_caller]
    pub fn linear_velocity(&self, engine: &PhysicsWorld) -> Vec2 {
        engine.linear_velocity(self.body_or_panic())
    }

    /// Set the linear velocity.
    #[track_caller]
    pub fn set_linear_velocity(&self, engine: &mut PhysicsWorld, velocity: Vec2) {
        engine.set_linear_velocity(self.body_or_panic(), velocity);
    }

    /// Angular velocity in radians per second.
    #[track_caller]
    pub fn angular_velocity(&self, engine: &PhysicsWorld) -> f32 {
        engine.angular_velocity(self.body_or_panic())
    }

    /// Set the angular velocity.
    #[track_caller]
    pub fn set_angular_velocity(&self, engine: &mut PhysicsWorld, velocity: f32) {
        engine.set_angular_velocity(self.body_or_panic(), velocity);
    }

    /// Set linear velocity damping.
    #[track_caller]
    pub fn set_linear_damping(&self, engine: &mut PhysicsWorld, damping: f32) {
        engine.set_linear_damping(self.body_or_panic(), damping);
    }

    /// Set angular velocity damping.
    #[track_caller]
    pub fn set_angular_damping(&self, engine: &mut PhysicsWorld, damping: f32) {
        engine.set_angular_damping(self.body_or_panic(), damping);
    }

    /// Suppress or allow rotation.
    #[track_caller]
    pub fn set_fixed_rotation(&self, engine: &mut PhysicsWorld, fixed: bool) {
        engine.set_fixed_rotation(self.body_or_panic(), fixed);
    }

    /// Continuous-collision hint for fast bodies.
    #[track_caller]
    pub fn set_bullet(&self, engine: &mut PhysicsWorld, bullet: bool) {
        engine.set_bullet(self.body_or_panic(), bullet);
    }

    /// Whether the bullet flag is set.
    #[track_caller]
    pub fn is_bullet(&self, engine: &PhysicsWorld) -> bool {
        engine.is_bullet(self.body_or_panic())
    }

    /// Include or exclude the body from simulation and collision detection.
    #[track_caller]
    pub fn set_active(&self, engine: &mut PhysicsWorld, active: bool) {
        engine.set_active(self.body_or_panic(), active);
    }

    /// Whether the body participates in the simulation.
    #[track_caller]
    pub fn is_active(&self, engine: &PhysicsWorld) -> bool {
        engine.is_active(self.body_or_panic())
    }

    /// Whether the body is awake.
    #[track_caller]
    pub fn is_awake(&self, engine: &PhysicsWorld) -> bool {
        engine.is_awake(self.body_or_panic())
    }

    /// Body kind.
    #[track_caller]
    pub fn body_kind(&self, engine: &PhysicsWorld) -> BodyKind {
        engine.body_kind(self.body_or_panic())
    }

    /// Change the body kind, keeping the current fixtures. Use the shape
    /// replacement methods on [`SimulationWorld`](super::SimulationWorld) to
    /// change kind and shape together.
    #[track_caller]
    pub fn set_body_kind(&self, engine: &mut PhysicsWorld, kind: BodyKind) {
        engine.set_body_kind(self.body_or_panic(), kind);
    }

    /// Body mass in kilograms.
    #[track_caller]
    pub fn mass(&self, engine: &PhysicsWorld) -> f32 {
        engine.mass(self.body_or_panic())
    }

    /// World-space center of mass.
    #[track_caller]
    pub fn world_center(&self, engine: &PhysicsWorld) -> Vec2 {
        engine.world_center(self.body_or_panic())
    }

    /// Accumulate a force applied at a world-space point.
    #[track_caller]
    pub fn apply_force(&self, engine: &mut PhysicsWorld, force: Vec2, point: Vec2) {
        engine.apply_force(self.body_or_panic(), force, point);
    }

    /// Apply an instantaneous impulse at a world-space point.
    #[track_caller]
    pub fn apply_linear_impulse(&self, engine: &mut PhysicsWorld, impulse: Vec2, point: Vec2) {
        engine.apply_linear_impulse(self.body_or_panic(), impulse, point);
    }

    // --- fixtures ---

    /// Fixtures currently attached to the body.
    #[track_caller]
    pub fn fixtures<'e>(&self, engine: &'e PhysicsWorld) -> &'e [FixtureHandle] {
        engine.body_fixtures(self.body_or_panic())
    }

    /// Attach one more fixture to the body, keeping existing ones. The
    /// caller is responsible for registering the returned handle with the
    /// owning world; [`SimulationWorld::add_fixture`](super::SimulationWorld::add_fixture)
    /// does both.
    #[track_caller]
    pub(crate) fn add_fixture(&self, engine: &mut PhysicsWorld, def: &FixtureDef) -> FixtureHandle {
        engine.create_fixture(self.body_or_panic(), def)
    }

    // --- collision filters ---

    /// Overwrite the category bits on every fixture.
    #[track_caller]
    pub fn set_collision_category_bits(&self, engine: &mut PhysicsWorld, bits: u16) {
        self.update_filters(engine, None, |f| f.category = bits);
    }

    /// Overwrite the mask bits on every fixture.
    #[track_caller]
    pub fn set_collision_mask_bits(&self, engine: &mut PhysicsWorld, bits: u16) {
        self.update_filters(engine, None, |f| f.mask = bits);
    }

    /// OR additional category bits into every fixture.
    #[track_caller]
    pub fn add_collision_category_bits(&self, engine: &mut PhysicsWorld, bits: u16) {
        self.update_filters(engine, None, |f| f.category |= bits);
    }

    /// OR additional mask bits into every fixture.
    #[track_caller]
    pub fn add_collision_mask_bits(&self, engine: &mut PhysicsWorld, bits: u16) {
        self.update_filters(engine, None, |f| f.mask |= bits);
    }

    /// Clear category bits on every fixture.
    #[track_caller]
    pub fn clr_collision_category_bits(&self, engine: &mut PhysicsWorld, bits: u16) {
        self.update_filters(engine, None, |f| f.category &= !bits);
    }

    /// Clear mask bits on every fixture.
    #[track_caller]
    pub fn clr_collision_mask_bits(&self, engine: &mut PhysicsWorld, bits: u16) {
        self.update_filters(engine, None, |f| f.mask &= !bits);
    }

    /// Overwrite the category bits on fixtures with the given id.
    #[track_caller]
    pub fn set_collision_category_bits_for_id(
        &self,
        engine: &mut PhysicsWorld,
        id: &str,
        bits: u16,
    ) {
        self.update_filters(engine, Some(id), |f| f.category = bits);
    }

    /// Overwrite the mask bits on fixtures with the given id.
    #[track_caller]
    pub fn set_collision_mask_bits_for_id(&self, engine: &mut PhysicsWorld, id: &str, bits: u16) {
        self.update_filters(engine, Some(id), |f| f.mask = bits);
    }

    /// OR additional category bits into fixtures with the given id.
    #[track_caller]
    pub fn add_collision_category_bits_for_id(
        &self,
        engine: &mut PhysicsWorld,
        id: &str,
        bits: u16,
    ) {
        self.update_filters(engine, Some(id), |f| f.category |= bits);
    }

    /// OR additional mask bits into fixtures with the given id.
    #[track_caller]
    pub fn add_collision_mask_bits_for_id(&self, engine: &mut PhysicsWorld, id: &str, bits: u16) {
        self.update_filters(engine, Some(id), |f| f.mask |= bits);
    }

    /// Clear category bits on fixtures with the given id.
    #[track_caller]
    pub fn clr_collision_category_bits_for_id(
        &self,
        engine: &mut PhysicsWorld,
        id: &str,
        bits: u16,
    ) {
        self.update_filters(engine, Some(id), |f| f.category &= !bits);
    }

    /// Clear mask bits on fixtures with the given id.
    #[track_caller]
    pub fn clr_collision_mask_bits_for_id(&self, engine: &mut PhysicsWorld, id: &str, bits: u16) {
        self.update_filters(engine, Some(id), |f| f.mask &= !bits);
    }

    #[track_caller]
    fn update_filters(
        &self,
        engine: &mut PhysicsWorld,
        id: Option<&str>,
        apply: impl Fn(&mut crate::engine::Filter),
    ) {
        let fixtures: Vec<FixtureHandle> = self.fixtures(engine).to_vec();
        for fixture in fixtures {
            if let Some(id) = id {
                if engine.fixture_id(fixture) != Some(id) {
                    continue;
                }
            }
            let mut filter = engine.filter(fixture);
            apply(&mut filter);
            engine.set_filter(fixture, filter);
        }
    }

    // --- render node ---

    /// The render node, if the entity has one.
    pub fn node(&self) -> Option<&dyn RenderNode> {
        self.node.as_deref()
    }

    /// Mutable access to the render node.
    pub fn node_mut(&mut self) -> Option<&mut dyn RenderNode> {
        self.node.as_deref_mut()
    }

    /// Downcast the render node to its concrete type.
    pub fn node_as<T: RenderNode>(&self) -> Option<&T> {
        let node: &dyn Any = self.node.as_deref()?;
        node.downcast_ref::<T>()
    }

    /// Downcast the render node mutably to its concrete type.
    pub fn node_as_mut<T: RenderNode>(&mut self) -> Option<&mut T> {
        let node: &mut dyn Any = self.node.as_deref_mut()?;
        node.downcast_mut::<T>()
    }

    /// Replace the render node, returning the previous one.
    pub fn set_node(&mut self, node: Option<Box<dyn RenderNode>>) -> Option<Box<dyn RenderNode>> {
        std::mem::replace(&mut self.node, node)
    }

    /// Show or hide the render node. No-op without a node.
    pub fn set_visible(&mut self, visible: bool) {
        if let Some(node) = self.node.as_deref_mut() {
            node.set_visible(visible);
        }
    }

    /// Scale the render node's graphics. No-op without a node.
    pub fn set_scale(&mut self, scale: f32) {
        if let Some(node) = self.node.as_deref_mut() {
            node.set_scale(scale);
        }
    }

    /// Push the body's transform into the render node, converting meters to
    /// render units and radians to clockwise degrees. No-op without a body
    /// or without a node.
    pub fn update_render_from_physics(&mut self, engine: &PhysicsWorld, mapper: &CoordinateMapper) {
        let (Some(body), Some(node)) = (self.body, self.node.as_deref_mut()) else {
            return;
        };
        node.set_position(mapper.to_render(engine.position(body)));
        node.set_rotation(render_rotation(engine.angle(body)));
    }

    // --- responder ---

    /// The contact responder, if the entity has one.
    pub fn responder(&self) -> Option<&dyn ContactResponder> {
        self.responder.as_deref()
    }

    /// Mutable access to the contact responder.
    pub fn responder_mut(&mut self) -> Option<&mut dyn ContactResponder> {
        self.responder.as_deref_mut()
    }

    /// Replace the contact responder, returning the previous one.
    pub fn set_responder(
        &mut self,
        responder: Option<Box<dyn ContactResponder>>,
    ) -> Option<Box<dyn ContactResponder>> {
        std::mem::replace(&mut self.responder, responder)
    }

    /// Runtime type of the responder, if the entity has one. This is what
    /// opponents see as [`ContactEvent::other_type`](super::ContactEvent::other_type).
    pub fn responder_type(&self) -> Option<TypeId> {
        self.responder.as_deref().map(|responder| {
            let any: &dyn Any = responder;
            any.type_id()
        })
    }
}

/// Everything needed to spawn an entity.
///
/// Built fluently and handed to
/// [`SimulationWorld::spawn`](super::SimulationWorld::spawn):
///
/// ```no_run
/// # use bridge2d::bridge::{EntityDef, SimulationWorld};
/// # use bridge2d::foundation::math::Vec2;
/// # let mut world = SimulationWorld::default();
/// let key = world
///     .spawn(
///         EntityDef::dynamic_body("rock")
///             .at(Vec2::new(3.0, 8.0))
///             .with_tag(7),
///     )
///     .unwrap();
/// ```
pub struct EntityDef {
    pub(crate) shape: Option<String>,
    pub(crate) kind: BodyKind,
    pub(crate) position: Vec2,
    pub(crate) angle: f32,
    pub(crate) tag: i32,
    pub(crate) node: Option<Box<dyn RenderNode>>,
    pub(crate) responder: Option<Box<dyn ContactResponder>>,
    pub(crate) bullet: bool,
    pub(crate) fixed_rotation: bool,
}

impl EntityDef {
    fn empty() -> Self {
        Self {
            shape: None,
            kind: BodyKind::Static,
            position: Vec2::zeros(),
            angle: 0.0,
            tag: 0,
            node: None,
            responder: None,
            bullet: false,
            fixed_rotation: false,
        }
    }

    /// An entity with a render node and no body, for decorations that live
    /// alongside simulated objects.
    pub fn node_only(node: impl RenderNode) -> Self {
        let mut def = Self::empty();
        def.node = Some(Box::new(node));
        def
    }

    /// A fully simulated entity with the named shape.
    pub fn dynamic_body(shape: impl Into<String>) -> Self {
        Self::with_shape(shape, BodyKind::Dynamic)
    }

    /// An immovable entity with the named shape.
    pub fn static_body(shape: impl Into<String>) -> Self {
        Self::with_shape(shape, BodyKind::Static)
    }

    /// A velocity-driven entity with the named shape.
    pub fn kinematic_body(shape: impl Into<String>) -> Self {
        Self::with_shape(shape, BodyKind::Kinematic)
    }

    /// An entity of the given kind with the named shape.
    pub fn with_shape(shape: impl Into<String>, kind: BodyKind) -> Self {
        let mut def = Self::empty();
        def.shape = Some(shape.into());
        def.kind = kind;
        def
    }

    /// Initial position in meters.
    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Initial angle in radians.
    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    /// Application-assigned tag, visible to opponents in contact events.
    pub fn with_tag(mut self, tag: i32) -> Self {
        self.tag = tag;
        self
    }

    /// Attach a render node.
    pub fn with_node(mut self, node: impl RenderNode) -> Self {
        self.node = Some(Box::new(node));
        self
    }

    /// Attach a contact responder.
    pub fn with_responder(mut self, responder: impl ContactResponder) -> Self {
        self.responder = Some(Box::new(responder));
        self
    }

    /// Request continuous collision detection for the body.
    pub fn as_bullet(mut self) -> Self {
        self.bullet = true;
        self
    }

    /// Suppress body rotation.
    pub fn with_fixed_rotation(mut self) -> Self {
        self.fixed_rotation = true;
        self
    }
}
