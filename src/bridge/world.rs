//! The simulation world owning entities, engine and shape library.

use slotmap::{SecondaryMap, SlotMap};

use super::dispatch::ContactDispatcher;
use super::entity::{EntityDef, PhysicsEntity};
use super::event::ContactPhase;
use super::EntityKey;
use crate::engine::{
    BodyDef, BodyHandle, BodyKind, ContactId, FixtureDef, FixtureHandle, PhysicsWorld,
};
use crate::foundation::math::Vec2;
use crate::foundation::units::CoordinateMapper;
use crate::shapes::{ShapeCache, ShapeCacheError};

/// Owns the physics engine, the entity arena and the shape library, and
/// keeps all three in sync.
///
/// A typical frame:
///
/// 1. application code spawns, despawns and mutates entities;
/// 2. [`step`](Self::step) advances the engine, dispatching contact
///    notifications to entity responders as they happen;
/// 3. entities flagged for deletion during the step are swept;
/// 4. every entity's render node is updated from its body transform.
///
/// All destructive operations go through the world rather than the entity so
/// that end-of-contact notifications can be delivered before fixtures die.
pub struct SimulationWorld {
    engine: PhysicsWorld,
    entities: SlotMap<EntityKey, PhysicsEntity>,
    owners: SecondaryMap<FixtureHandle, EntityKey>,
    mapper: CoordinateMapper,
    shapes: ShapeCache,
}

impl SimulationWorld {
    /// World with standard downward gravity of 10 m/s².
    pub fn new(mapper: CoordinateMapper) -> Self {
        Self::with_gravity(mapper, Vec2::new(0.0, -10.0))
    }

    /// World with explicit gravity.
    pub fn with_gravity(mapper: CoordinateMapper, gravity: Vec2) -> Self {
        log::info!(
            "simulation world created (scale {}, gravity ({}, {}))",
            mapper.scale(),
            gravity.x,
            gravity.y
        );
        Self {
            engine: PhysicsWorld::new(gravity),
            entities: SlotMap::with_key(),
            owners: SecondaryMap::new(),
            mapper,
            shapes: ShapeCache::new(),
        }
    }

    // --- accessors ---

    /// The underlying engine world.
    pub fn engine(&self) -> &PhysicsWorld {
        &self.engine
    }

    /// Mutable access to the underlying engine world.
    pub fn engine_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.engine
    }

    /// The coordinate mapper used for render synchronization.
    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    /// The shape library consulted at spawn time.
    pub fn shape_cache(&self) -> &ShapeCache {
        &self.shapes
    }

    /// Mutable access to the shape library.
    pub fn shape_cache_mut(&mut self) -> &mut ShapeCache {
        &mut self.shapes
    }

    /// Replace the shape library wholesale, e.g. with one loaded from RON.
    /// Already-spawned entities keep their fixtures.
    pub fn set_shape_cache(&mut self, shapes: ShapeCache) {
        self.shapes = shapes;
    }

    /// An entity by key.
    pub fn entity(&self, key: EntityKey) -> Option<&PhysicsEntity> {
        self.entities.get(key)
    }

    /// Mutable access to an entity.
    pub fn entity_mut(&mut self, key: EntityKey) -> Option<&mut PhysicsEntity> {
        self.entities.get_mut(key)
    }

    /// Split borrow of one entity and the engine, for body-touching entity
    /// methods.
    ///
    /// ```no_run
    /// # use bridge2d::bridge::{EntityDef, SimulationWorld};
    /// # use bridge2d::foundation::math::Vec2;
    /// # let mut world = SimulationWorld::default();
    /// # let key = world.spawn(EntityDef::dynamic_body("rock")).unwrap();
    /// let (entity, engine) = world.entity_engine_mut(key).unwrap();
    /// entity.set_linear_velocity(engine, Vec2::new(3.0, 0.0));
    /// ```
    pub fn entity_engine_mut(
        &mut self,
        key: EntityKey,
    ) -> Option<(&mut PhysicsEntity, &mut PhysicsWorld)> {
        let entity = self.entities.get_mut(key)?;
        Some((entity, &mut self.engine))
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the world holds no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Whether an entity with the given key is alive.
    pub fn contains(&self, key: EntityKey) -> bool {
        self.entities.contains_key(key)
    }

    // --- spawning ---

    /// Create an entity from a definition. If the definition names a shape,
    /// a body is created and the shape's fixtures instantiated on it;
    /// an unknown shape name fails without leaving anything behind.
    pub fn spawn(&mut self, def: EntityDef) -> Result<EntityKey, ShapeCacheError> {
        let EntityDef {
            shape,
            kind,
            position,
            angle,
            tag,
            node,
            responder,
            bullet,
            fixed_rotation,
        } = def;

        let key = self.entities.insert(PhysicsEntity::new(tag, node, responder));
        if let Some(shape) = shape {
            let defs = match self.shapes.fixture_defs(&shape) {
                Ok(defs) => defs.to_vec(),
                Err(err) => {
                    self.entities.remove(key);
                    return Err(err);
                }
            };
            let mut body_def = BodyDef::new(kind).at(position).with_angle(angle);
            body_def.bullet = bullet;
            body_def.fixed_rotation = fixed_rotation;
            let body = self.engine.create_body(&body_def);
            for fixture_def in &defs {
                let fixture = self.engine.create_fixture(body, fixture_def);
                self.owners.insert(fixture, key);
            }
            self.entities[key].attach_body(body);
            log::debug!("spawned entity {key:?} with shape {shape:?} (tag {tag})");
        } else {
            log::debug!("spawned bodiless entity {key:?} (tag {tag})");
        }
        Ok(key)
    }

    /// Attach one more fixture to an entity's body, keeping existing ones.
    ///
    /// # Panics
    ///
    /// Panics if the entity is unknown or has no body.
    #[track_caller]
    pub fn add_fixture(&mut self, key: EntityKey, def: &FixtureDef) -> FixtureHandle {
        self.expect_body(key, "add_fixture");
        let fixture = self.entities[key].add_fixture(&mut self.engine, def);
        self.owners.insert(fixture, key);
        fixture
    }

    /// Attach an edge fixture between two points in body-local meters.
    #[track_caller]
    pub fn add_edge(&mut self, key: EntityKey, start: Vec2, end: Vec2) -> FixtureHandle {
        self.add_fixture(key, &FixtureDef::edge(start, end))
    }

    // --- stepping ---

    /// Advance the simulation by `dt` seconds: step the engine with contact
    /// dispatch, sweep entities flagged for deletion, then synchronize
    /// render nodes.
    pub fn step(&mut self, dt: f32) {
        {
            let mut dispatcher = ContactDispatcher::new(&mut self.entities, &self.owners);
            self.engine.step(dt, &mut dispatcher);
        }
        self.sweep();
        self.sync_render();
    }

    /// Visit every live entity. The key set is snapshotted first, so the
    /// callback may spawn or despawn freely; entities spawned during the
    /// iteration are not visited, entities despawned before their turn are
    /// skipped.
    pub fn iterate(&mut self, mut callback: impl FnMut(&mut Self, EntityKey)) {
        let keys: Vec<EntityKey> = self.entities.keys().collect();
        for key in keys {
            if self.entities.contains_key(key) {
                callback(self, key);
            }
        }
    }

    // --- destruction ---

    /// Destroy an entity's body, firing end notifications for its live
    /// contacts first. The entity itself survives without a body; further
    /// body-touching calls on it panic.
    ///
    /// # Panics
    ///
    /// Panics if the entity is unknown or its body is already destroyed.
    #[track_caller]
    pub fn destroy_body(&mut self, key: EntityKey) {
        let body = self.expect_body(key, "destroy_body");
        let ended = self.engine.contacts_involving(body);
        self.dispatch_ends(&ended);

        let fixtures: Vec<FixtureHandle> = self.engine.body_fixtures(body).to_vec();
        for fixture in fixtures {
            self.owners.remove(fixture);
        }
        self.engine.destroy_body(body);
        self.entities[key].clear_body();
        log::debug!("destroyed body of entity {key:?}");
    }

    /// Remove an entity entirely: destroy its body (with end notifications)
    /// and detach its render node from the scene graph. Unknown keys are
    /// ignored, so despawning twice is harmless.
    pub fn despawn(&mut self, key: EntityKey) {
        if self
            .entities
            .get(key)
            .is_some_and(|entity| entity.has_body())
        {
            self.destroy_body(key);
        }
        let Some(mut entity) = self.entities.remove(key) else {
            return;
        };
        if let Some(node) = entity.node_mut() {
            node.detach_from_parent();
        }
        log::debug!("despawned entity {key:?}");
    }

    /// Despawn every entity. The world itself stays usable.
    pub fn delete_all_objects(&mut self) {
        let keys: Vec<EntityKey> = self.entities.keys().collect();
        let count = keys.len();
        for key in keys {
            self.despawn(key);
        }
        log::info!("deleted all {count} simulation objects");
    }

    // --- shape replacement ---

    /// Replace an entity's fixtures with the named shape, keeping the body
    /// and its motion state. Contacts on the old fixtures get end
    /// notifications; fixture-level state such as collision filters starts
    /// over from the shape's definitions.
    ///
    /// # Panics
    ///
    /// Panics if the entity is unknown or has no body.
    #[track_caller]
    pub fn set_body_shape(&mut self, key: EntityKey, shape: &str) -> Result<(), ShapeCacheError> {
        let defs = self.shapes.fixture_defs(shape)?.to_vec();
        let body = self.expect_body(key, "set_body_shape");
        let ended = self.engine.contacts_involving(body);
        self.dispatch_ends(&ended);

        for fixture in self.engine.destroy_body_fixtures(body) {
            self.owners.remove(fixture);
        }
        for def in &defs {
            let fixture = self.engine.create_fixture(body, def);
            self.owners.insert(fixture, key);
        }
        Ok(())
    }

    /// Turn the entity into an immovable body with the named shape at the
    /// given position.
    #[track_caller]
    pub fn set_static_body(
        &mut self,
        key: EntityKey,
        shape: &str,
        position: Vec2,
    ) -> Result<(), ShapeCacheError> {
        self.replace_body(key, BodyKind::Static, shape, position)
    }

    /// Turn the entity into a velocity-driven body with the named shape at
    /// the given position.
    #[track_caller]
    pub fn set_kinematic_body(
        &mut self,
        key: EntityKey,
        shape: &str,
        position: Vec2,
    ) -> Result<(), ShapeCacheError> {
        self.replace_body(key, BodyKind::Kinematic, shape, position)
    }

    /// Turn the entity into a fully simulated body with the named shape at
    /// the given position.
    #[track_caller]
    pub fn set_dynamic_body(
        &mut self,
        key: EntityKey,
        shape: &str,
        position: Vec2,
    ) -> Result<(), ShapeCacheError> {
        self.replace_body(key, BodyKind::Dynamic, shape, position)
    }

    #[track_caller]
    fn replace_body(
        &mut self,
        key: EntityKey,
        kind: BodyKind,
        shape: &str,
        position: Vec2,
    ) -> Result<(), ShapeCacheError> {
        let body = self.expect_body(key, "body replacement");
        self.engine.set_body_kind(body, kind);
        self.set_body_shape(key, shape)?;
        let angle = self.engine.angle(body);
        self.engine.set_transform(body, position, angle);
        Ok(())
    }

    // --- internals ---

    #[track_caller]
    fn expect_body(&self, key: EntityKey, operation: &str) -> BodyHandle {
        match self.entities.get(key) {
            Some(entity) => match entity.body_handle() {
                Some(body) => body,
                None => panic!("{operation} on an entity whose body is already destroyed"),
            },
            None => panic!("{operation} on an unknown entity"),
        }
    }

    /// Fire end notifications for contacts that are about to be dropped by
    /// a structural change, while their fixtures are still alive.
    fn dispatch_ends(&mut self, ended: &[ContactId]) {
        if ended.is_empty() {
            return;
        }
        let mut dispatcher = ContactDispatcher::new(&mut self.entities, &self.owners);
        for &id in ended {
            dispatcher.notify(ContactPhase::End, id, id.fixture_a, id.fixture_b, None, None);
        }
    }

    /// Despawn entities flagged for deletion during the last step.
    fn sweep(&mut self) {
        let doomed: Vec<EntityKey> = self
            .entities
            .iter()
            .filter(|(_, entity)| entity.delete_later())
            .map(|(key, _)| key)
            .collect();
        if doomed.is_empty() {
            return;
        }
        log::debug!("sweeping {} entities flagged for deletion", doomed.len());
        for key in doomed {
            self.despawn(key);
        }
    }

    /// Push every entity's body transform into its render node.
    fn sync_render(&mut self) {
        let engine = &self.engine;
        let mapper = &self.mapper;
        for (_, entity) in &mut self.entities {
            entity.update_render_from_physics(engine, mapper);
        }
    }
}

impl Default for SimulationWorld {
    fn default() -> Self {
        Self::new(CoordinateMapper::default())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use approx::assert_relative_eq;

    use super::*;
    use crate::bridge::{ContactEvent, ContactResponder, Dispatch};
    use crate::foundation::math::Point2;
    use crate::render::RenderNode;

    type EventLog = Rc<RefCell<Vec<String>>>;

    fn count(log: &EventLog, entry: &str) -> usize {
        log.borrow().iter().filter(|e| e.as_str() == entry).count()
    }

    #[derive(Default)]
    struct NodeState {
        position: Option<Point2>,
        rotation: Option<f32>,
        visible: Option<bool>,
        detached: bool,
    }

    struct TestNode(Rc<RefCell<NodeState>>);

    impl RenderNode for TestNode {
        fn set_position(&mut self, position: Point2) {
            self.0.borrow_mut().position = Some(position);
        }
        fn set_rotation(&mut self, degrees: f32) {
            self.0.borrow_mut().rotation = Some(degrees);
        }
        fn set_visible(&mut self, visible: bool) {
            self.0.borrow_mut().visible = Some(visible);
        }
        fn set_scale(&mut self, _scale: f32) {}
        fn detach_from_parent(&mut self) {
            self.0.borrow_mut().detached = true;
        }
    }

    struct Floor {
        log: EventLog,
    }

    impl ContactResponder for Floor {
        fn begin_contact(&mut self, _own: &mut PhysicsEntity, _contact: &mut ContactEvent<'_>) {
            self.log.borrow_mut().push("floor.begin".into());
        }
        fn end_contact(&mut self, _own: &mut PhysicsEntity, _contact: &mut ContactEvent<'_>) {
            self.log.borrow_mut().push("floor.end".into());
        }
    }

    struct Rock {
        log: EventLog,
    }

    impl ContactResponder for Rock {
        fn begin_contact_with(
            &mut self,
            _own: &mut PhysicsEntity,
            contact: &mut ContactEvent<'_>,
        ) -> Dispatch {
            if contact.is_other::<Floor>() {
                self.log.borrow_mut().push("rock.begin_with_floor".into());
                return Dispatch::Handled;
            }
            Dispatch::Fallthrough
        }
        fn begin_contact(&mut self, _own: &mut PhysicsEntity, contact: &mut ContactEvent<'_>) {
            self.log
                .borrow_mut()
                .push(format!("rock.begin_generic tag={}", contact.other_tag()));
        }
        fn end_contact(&mut self, _own: &mut PhysicsEntity, _contact: &mut ContactEvent<'_>) {
            self.log.borrow_mut().push("rock.end".into());
        }
    }

    /// Disables every contact during pre-solve.
    struct Ghost {
        log: EventLog,
    }

    impl ContactResponder for Ghost {
        fn begin_contact(&mut self, _own: &mut PhysicsEntity, _contact: &mut ContactEvent<'_>) {
            self.log.borrow_mut().push("ghost.begin".into());
        }
        fn presolve_contact(&mut self, _own: &mut PhysicsEntity, contact: &mut ContactEvent<'_>) {
            contact.set_enabled(false);
        }
    }

    /// Flags itself for deletion when touched, recording whether its body
    /// was still live inside the callback.
    struct Fragile {
        log: EventLog,
    }

    impl ContactResponder for Fragile {
        fn begin_contact(&mut self, own: &mut PhysicsEntity, _contact: &mut ContactEvent<'_>) {
            own.set_delete_later(true);
            self.log
                .borrow_mut()
                .push(format!("fragile.begin has_body={}", own.has_body()));
        }
    }

    /// Deletes whatever it touches.
    struct Spike;

    impl ContactResponder for Spike {
        fn begin_contact(&mut self, _own: &mut PhysicsEntity, contact: &mut ContactEvent<'_>) {
            contact.delete_other_later();
        }
    }

    fn test_world() -> SimulationWorld {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut world =
            SimulationWorld::with_gravity(CoordinateMapper::new(32.0), Vec2::zeros());
        world
            .shape_cache_mut()
            .insert("ball", vec![FixtureDef::circle(Vec2::zeros(), 0.5)]);
        world.shape_cache_mut().insert(
            "two_part",
            vec![
                FixtureDef::circle(Vec2::new(-0.3, 0.0), 0.3).with_id("left"),
                FixtureDef::circle(Vec2::new(0.3, 0.0), 0.3).with_id("right"),
            ],
        );
        world
    }

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn spawn_instantiates_shape_fixtures() {
        let mut world = test_world();
        let key = world
            .spawn(EntityDef::dynamic_body("two_part").at(Vec2::new(1.0, 2.0)))
            .unwrap();

        let entity = world.entity(key).unwrap();
        assert_eq!(entity.fixtures(world.engine()).len(), 2);
        assert_relative_eq!(entity.position(world.engine()).x, 1.0);
        assert_eq!(world.engine().body_count(), 1);
    }

    #[test]
    fn spawn_with_unknown_shape_leaves_nothing_behind() {
        let mut world = test_world();
        let err = world.spawn(EntityDef::dynamic_body("missing")).unwrap_err();
        assert!(matches!(err, ShapeCacheError::NotFound(_)));
        assert!(world.is_empty());
        assert_eq!(world.engine().body_count(), 0);
    }

    #[test]
    fn typed_hook_preempts_generic_and_generic_falls_through() {
        let log: EventLog = EventLog::default();
        let mut world = test_world();
        world
            .spawn(
                EntityDef::dynamic_body("ball")
                    .with_responder(Rock { log: log.clone() }),
            )
            .unwrap();
        world
            .spawn(
                EntityDef::dynamic_body("ball")
                    .at(Vec2::new(0.6, 0.0))
                    .with_tag(9)
                    .with_responder(Floor { log: log.clone() }),
            )
            .unwrap();

        world.step(DT);

        // The rock recognizes the floor by type; the floor only has the
        // generic hook, which sees the rock exactly once.
        assert_eq!(count(&log, "rock.begin_with_floor"), 1);
        assert_eq!(count(&log, "floor.begin"), 1);
        assert!(!log.borrow().iter().any(|e| e.starts_with("rock.begin_generic")));
    }

    #[test]
    fn generic_hook_sees_opponent_tag() {
        let log: EventLog = EventLog::default();
        let mut world = test_world();
        world
            .spawn(EntityDef::dynamic_body("ball").with_responder(Rock { log: log.clone() }))
            .unwrap();
        // No responder on the opponent, so the typed hook falls through.
        world
            .spawn(EntityDef::dynamic_body("ball").at(Vec2::new(0.6, 0.0)).with_tag(42))
            .unwrap();

        world.step(DT);
        assert_eq!(count(&log, "rock.begin_generic tag=42"), 1);
    }

    #[test]
    fn separation_fires_matching_end() {
        let log: EventLog = EventLog::default();
        let mut world = test_world();
        let rock = world
            .spawn(EntityDef::dynamic_body("ball").with_responder(Rock { log: log.clone() }))
            .unwrap();
        world
            .spawn(
                EntityDef::static_body("ball")
                    .at(Vec2::new(0.6, 0.0))
                    .with_responder(Floor { log: log.clone() }),
            )
            .unwrap();

        world.step(DT);
        assert_eq!(count(&log, "rock.begin_with_floor"), 1);
        assert_eq!(count(&log, "floor.end"), 0);

        let (entity, engine) = world.entity_engine_mut(rock).unwrap();
        entity.set_transform(engine, Vec2::new(100.0, 0.0), 0.0);
        world.step(DT);

        assert_eq!(count(&log, "floor.end"), 1);
        assert_eq!(count(&log, "rock.end"), 1);
    }

    #[test]
    fn despawn_fires_end_before_fixtures_die() {
        let log: EventLog = EventLog::default();
        let mut world = test_world();
        let rock = world
            .spawn(EntityDef::dynamic_body("ball").with_responder(Ghost { log: log.clone() }))
            .unwrap();
        world
            .spawn(
                EntityDef::static_body("ball")
                    .at(Vec2::new(0.6, 0.0))
                    .with_responder(Floor { log: log.clone() }),
            )
            .unwrap();

        world.step(DT);
        assert_eq!(count(&log, "floor.begin"), 1);

        // No step in between; the end notification comes from the despawn
        // itself, while both fixtures still exist.
        world.despawn(rock);
        assert_eq!(count(&log, "floor.end"), 1);
        assert!(!world.contains(rock));
        assert_eq!(world.engine().body_count(), 1);
        assert_eq!(world.engine().contact_count(), 0);
    }

    #[test]
    fn presolve_disable_skips_resolution_but_still_begins() {
        let log: EventLog = EventLog::default();
        let mut world = test_world();
        let a = world
            .spawn(EntityDef::dynamic_body("ball").with_responder(Ghost { log: log.clone() }))
            .unwrap();
        let b = world
            .spawn(EntityDef::dynamic_body("ball").at(Vec2::new(0.6, 0.0)))
            .unwrap();

        world.step(DT);

        assert_eq!(count(&log, "ghost.begin"), 1);
        let engine = world.engine();
        let pos_a = world.entity(a).unwrap().position(engine);
        let pos_b = world.entity(b).unwrap().position(engine);
        assert_relative_eq!(pos_a.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(pos_b.x, 0.6, epsilon = 1e-6);
    }

    #[test]
    fn enabled_overlap_pushes_bodies_apart() {
        let mut world = test_world();
        let a = world.spawn(EntityDef::dynamic_body("ball")).unwrap();
        let b = world
            .spawn(EntityDef::dynamic_body("ball").at(Vec2::new(0.6, 0.0)))
            .unwrap();

        world.step(DT);
        let engine = world.engine();
        assert!(world.entity(a).unwrap().position(engine).x < 0.0);
        assert!(world.entity(b).unwrap().position(engine).x > 0.6);
    }

    #[test]
    fn flagged_entity_survives_callback_and_dies_at_sweep() {
        let log: EventLog = EventLog::default();
        let mut world = test_world();
        let fragile = world
            .spawn(EntityDef::dynamic_body("ball").with_responder(Fragile { log: log.clone() }))
            .unwrap();
        let other = world
            .spawn(EntityDef::dynamic_body("ball").at(Vec2::new(0.6, 0.0)))
            .unwrap();

        world.step(DT);

        // Inside the callback the body was still live; after the sweep the
        // entity is gone and only the opponent remains.
        assert_eq!(count(&log, "fragile.begin has_body=true"), 1);
        assert!(!world.contains(fragile));
        assert!(world.contains(other));
        assert_eq!(world.engine().body_count(), 1);
    }

    #[test]
    fn responder_can_delete_the_opponent() {
        let mut world = test_world();
        let spike = world
            .spawn(EntityDef::static_body("ball").with_responder(Spike))
            .unwrap();
        let victim = world
            .spawn(EntityDef::dynamic_body("ball").at(Vec2::new(0.6, 0.0)))
            .unwrap();

        world.step(DT);
        assert!(!world.contains(victim));
        assert!(world.contains(spike));
    }

    #[test]
    fn filter_updates_are_idempotent_and_reversible() {
        let mut world = test_world();
        let key = world.spawn(EntityDef::dynamic_body("ball")).unwrap();

        let (entity, engine) = world.entity_engine_mut(key).unwrap();
        entity.set_collision_mask_bits(engine, 0x00F0);
        entity.set_collision_mask_bits(engine, 0x00F0);
        let fixture = entity.fixtures(engine)[0];
        assert_eq!(engine.filter(fixture).mask, 0x00F0);

        entity.add_collision_mask_bits(engine, 0x0004);
        assert_eq!(engine.filter(fixture).mask, 0x00F4);
        entity.clr_collision_mask_bits(engine, 0x0004);
        assert_eq!(engine.filter(fixture).mask, 0x00F0);
    }

    #[test]
    fn id_scoped_filters_touch_only_matching_fixtures() {
        let mut world = test_world();
        let key = world.spawn(EntityDef::dynamic_body("two_part")).unwrap();

        let (entity, engine) = world.entity_engine_mut(key).unwrap();
        entity.set_collision_category_bits_for_id(engine, "left", 0x0002);

        let fixtures: Vec<FixtureHandle> = entity.fixtures(engine).to_vec();
        for fixture in fixtures {
            let expected = if engine.fixture_id(fixture) == Some("left") {
                0x0002
            } else {
                0x0001
            };
            assert_eq!(engine.filter(fixture).category, expected);
        }
    }

    #[test]
    fn filtered_out_pair_never_begins() {
        let log: EventLog = EventLog::default();
        let mut world = test_world();
        let a = world
            .spawn(EntityDef::dynamic_body("ball").with_responder(Floor { log: log.clone() }))
            .unwrap();
        world
            .spawn(EntityDef::dynamic_body("ball").at(Vec2::new(0.6, 0.0)))
            .unwrap();

        let (entity, engine) = world.entity_engine_mut(a).unwrap();
        entity.set_collision_mask_bits(engine, 0x0000);
        world.step(DT);
        assert_eq!(count(&log, "floor.begin"), 0);
    }

    #[test]
    fn shape_replacement_resets_fixture_state() {
        let mut world = test_world();
        let key = world.spawn(EntityDef::static_body("ball")).unwrap();

        let (entity, engine) = world.entity_engine_mut(key).unwrap();
        entity.set_collision_category_bits(engine, 0x0040);

        world
            .set_dynamic_body(key, "two_part", Vec2::new(5.0, 5.0))
            .unwrap();

        let entity = world.entity(key).unwrap();
        let engine = world.engine();
        assert_eq!(entity.body_kind(engine), BodyKind::Dynamic);
        assert_relative_eq!(entity.position(engine).x, 5.0);
        let fixtures = entity.fixtures(engine);
        assert_eq!(fixtures.len(), 2);
        for &fixture in fixtures {
            // Filters come from the shape definitions, not the old body.
            assert_eq!(engine.filter(fixture).category, 0x0001);
        }
    }

    #[test]
    fn render_nodes_follow_bodies() {
        let state = Rc::new(RefCell::new(NodeState::default()));
        let mut world = test_world();
        let key = world
            .spawn(
                EntityDef::kinematic_body("ball")
                    .at(Vec2::new(1.0, 2.0))
                    .with_node(TestNode(state.clone())),
            )
            .unwrap();

        let (entity, engine) = world.entity_engine_mut(key).unwrap();
        entity.set_angular_velocity(engine, std::f32::consts::PI);
        world.step(DT);

        let state = state.borrow();
        let position = state.position.expect("node position synced");
        assert_relative_eq!(position.x, 32.0, epsilon = 1e-3);
        assert_relative_eq!(position.y, 64.0, epsilon = 1e-3);
        // One step of spin, reported clockwise-positive in degrees.
        let expected = -(std::f32::consts::PI * DT).to_degrees();
        assert_relative_eq!(state.rotation.expect("node rotation synced"), expected, epsilon = 1e-3);
    }

    #[test]
    fn bodiless_entity_steps_without_render_sync() {
        let state = Rc::new(RefCell::new(NodeState::default()));
        let mut world = test_world();
        world
            .spawn(EntityDef::node_only(TestNode(state.clone())))
            .unwrap();

        world.step(DT);
        assert!(state.borrow().position.is_none());
    }

    #[test]
    fn despawn_detaches_the_render_node() {
        let state = Rc::new(RefCell::new(NodeState::default()));
        let mut world = test_world();
        let key = world
            .spawn(EntityDef::dynamic_body("ball").with_node(TestNode(state.clone())))
            .unwrap();

        world.despawn(key);
        assert!(state.borrow().detached);
        assert_eq!(world.engine().body_count(), 0);
    }

    #[test]
    fn iterate_snapshots_keys_and_allows_despawn() {
        let mut world = test_world();
        let a = world.spawn(EntityDef::dynamic_body("ball")).unwrap();
        let b = world
            .spawn(EntityDef::dynamic_body("ball").at(Vec2::new(10.0, 0.0)))
            .unwrap();

        let mut visited = 0;
        world.iterate(|world, key| {
            visited += 1;
            world.despawn(key);
        });
        assert_eq!(visited, 2);
        assert!(!world.contains(a));
        assert!(!world.contains(b));
    }

    #[test]
    fn delete_all_objects_leaves_a_usable_world() {
        let mut world = test_world();
        world.spawn(EntityDef::dynamic_body("ball")).unwrap();
        world.spawn(EntityDef::static_body("ball").at(Vec2::new(3.0, 0.0))).unwrap();

        world.delete_all_objects();
        assert!(world.is_empty());
        assert_eq!(world.engine().body_count(), 0);

        let key = world.spawn(EntityDef::dynamic_body("ball")).unwrap();
        world.step(DT);
        assert!(world.contains(key));
    }

    #[test]
    #[should_panic(expected = "body has been destroyed")]
    fn body_use_after_destroy_panics() {
        let mut world = test_world();
        let key = world.spawn(EntityDef::dynamic_body("ball")).unwrap();
        world.destroy_body(key);
        let (entity, engine) = world.entity_engine_mut(key).unwrap();
        let _ = entity.position(engine);
    }

    #[test]
    fn add_edge_extends_an_existing_body() {
        let mut world = test_world();
        let key = world.spawn(EntityDef::static_body("ball")).unwrap();
        world.add_edge(key, Vec2::new(-5.0, -1.0), Vec2::new(5.0, -1.0));

        assert_eq!(world.entity(key).unwrap().fixtures(world.engine()).len(), 2);
    }
}
