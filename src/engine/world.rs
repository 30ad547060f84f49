//! The simulation world: body/fixture arenas, contact tracking, stepping.

use std::collections::{HashMap, HashSet};

use slotmap::SlotMap;

use super::body::{Body, BodyFlags};
use super::contact::ContactState;
use super::fixture::{Fixture, Geometry};
use super::{
    BodyDef, BodyHandle, BodyKind, ContactId, ContactListener, Filter, FixtureDef, FixtureHandle,
};
use crate::foundation::math::{cross, cross_scalar, rotate, Vec2};

const POSITION_CORRECTION: f32 = 0.2;
const PENETRATION_SLOP: f32 = 0.005;
const RESTITUTION_THRESHOLD: f32 = 1.0;
const TIME_TO_SLEEP: f32 = 0.5;
const LINEAR_SLEEP_TOLERANCE_SQ: f32 = 1e-4;
const ANGULAR_SLEEP_TOLERANCE_SQ: f32 = 1e-3;

/// A 2D rigid-body world.
///
/// Bodies and fixtures live in slot-map arenas and are addressed by stable
/// handles. [`step`](Self::step) advances the simulation and drives the
/// given [`ContactListener`] synchronously: begin and end callbacks as
/// contacts appear and disappear, pre-solve before constraint resolution
/// (where a contact may be disabled for the current step), post-solve with
/// the applied normal impulse.
///
/// Structural mutation (creating or destroying bodies and fixtures) is only
/// possible between steps; the borrow taken by `step` makes mid-step
/// mutation unrepresentable.
pub struct PhysicsWorld {
    gravity: Vec2,
    bodies: SlotMap<BodyHandle, Body>,
    fixtures: SlotMap<FixtureHandle, Fixture>,
    contacts: HashMap<ContactId, ContactState>,
}

impl PhysicsWorld {
    /// Create an empty world with the given gravity.
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            bodies: SlotMap::with_key(),
            fixtures: SlotMap::with_key(),
            contacts: HashMap::new(),
        }
    }

    /// Current gravity vector.
    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    /// Replace the gravity vector.
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    /// Number of live bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of persistent contacts.
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    // --- structure ---

    /// Create a body from a definition.
    pub fn create_body(&mut self, def: &BodyDef) -> BodyHandle {
        let mut body = Body::from_def(def);
        body.reset_mass(&self.fixtures);
        self.bodies.insert(body)
    }

    /// Destroy a body and all of its fixtures. Persistent contacts involving
    /// those fixtures are dropped silently; query them beforehand with
    /// [`contacts_involving`](Self::contacts_involving) if end notifications
    /// are needed.
    ///
    /// # Panics
    ///
    /// Panics if the handle is unknown (double destroy is a programming
    /// error).
    pub fn destroy_body(&mut self, handle: BodyHandle) {
        let Some(body) = self.bodies.remove(handle) else {
            panic!("destroy_body on unknown or already destroyed body");
        };
        for fixture in body.fixtures {
            self.fixtures.remove(fixture);
            self.contacts
                .retain(|id, _| id.fixture_a != fixture && id.fixture_b != fixture);
        }
    }

    /// Create a fixture on a body.
    pub fn create_fixture(&mut self, body: BodyHandle, def: &FixtureDef) -> FixtureHandle {
        let handle = self.fixtures.insert(Fixture::from_def(body, def));
        let owner = &mut self.bodies[body];
        owner.fixtures.push(handle);
        owner.wake();
        self.reset_body_mass(body);
        handle
    }

    /// Destroy every fixture on a body, returning the removed handles.
    /// Contacts involving them are dropped silently, as for
    /// [`destroy_body`](Self::destroy_body).
    pub fn destroy_body_fixtures(&mut self, body: BodyHandle) -> Vec<FixtureHandle> {
        let removed = std::mem::take(&mut self.bodies[body].fixtures);
        for &fixture in &removed {
            self.fixtures.remove(fixture);
            self.contacts
                .retain(|id, _| id.fixture_a != fixture && id.fixture_b != fixture);
        }
        self.reset_body_mass(body);
        removed
    }

    /// Fixtures currently attached to a body.
    pub fn body_fixtures(&self, body: BodyHandle) -> &[FixtureHandle] {
        &self.bodies[body].fixtures
    }

    /// The body a fixture is attached to.
    pub fn fixture_body(&self, fixture: FixtureHandle) -> BodyHandle {
        self.fixtures[fixture].body
    }

    /// Application-assigned id of a fixture, if any.
    pub fn fixture_id(&self, fixture: FixtureHandle) -> Option<&str> {
        self.fixtures[fixture].id.as_deref()
    }

    /// Collision filter of a fixture.
    pub fn filter(&self, fixture: FixtureHandle) -> Filter {
        self.fixtures[fixture].filter
    }

    /// Replace the collision filter of a fixture. Takes effect at the next
    /// step; a persistent contact whose pair is no longer allowed ends then.
    pub fn set_filter(&mut self, fixture: FixtureHandle, filter: Filter) {
        self.fixtures[fixture].filter = filter;
    }

    /// Persistent contacts involving any fixture of the given body, in
    /// deterministic order.
    pub fn contacts_involving(&self, body: BodyHandle) -> Vec<ContactId> {
        let fixtures: HashSet<FixtureHandle> =
            self.bodies[body].fixtures.iter().copied().collect();
        let mut ids: Vec<ContactId> = self
            .contacts
            .keys()
            .filter(|id| fixtures.contains(&id.fixture_a) || fixtures.contains(&id.fixture_b))
            .copied()
            .collect();
        ids.sort();
        ids
    }

    // --- body state ---

    /// Body kind.
    pub fn body_kind(&self, body: BodyHandle) -> BodyKind {
        self.bodies[body].kind
    }

    /// Change the body kind. Static bodies get their velocities zeroed.
    pub fn set_body_kind(&mut self, body: BodyHandle, kind: BodyKind) {
        let b = &mut self.bodies[body];
        b.kind = kind;
        if kind == BodyKind::Static {
            b.linear_velocity = Vec2::zeros();
            b.angular_velocity = 0.0;
            b.flags.remove(BodyFlags::AWAKE);
        } else {
            b.wake();
        }
        self.reset_body_mass(body);
    }

    /// Position of the body origin.
    pub fn position(&self, body: BodyHandle) -> Vec2 {
        self.bodies[body].position
    }

    /// Body angle in radians.
    pub fn angle(&self, body: BodyHandle) -> f32 {
        self.bodies[body].angle
    }

    /// Set position and angle at once.
    pub fn set_transform(&mut self, body: BodyHandle, position: Vec2, angle: f32) {
        let b = &mut self.bodies[body];
        b.position = position;
        b.angle = angle;
        b.wake();
    }

    /// Linear velocity.
    pub fn linear_velocity(&self, body: BodyHandle) -> Vec2 {
        self.bodies[body].linear_velocity
    }

    /// Set the linear velocity.
    pub fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec2) {
        let b = &mut self.bodies[body];
        b.linear_velocity = velocity;
        b.wake();
    }

    /// Angular velocity in radians per second.
    pub fn angular_velocity(&self, body: BodyHandle) -> f32 {
        self.bodies[body].angular_velocity
    }

    /// Set the angular velocity.
    pub fn set_angular_velocity(&mut self, body: BodyHandle, velocity: f32) {
        let b = &mut self.bodies[body];
        b.angular_velocity = velocity;
        b.wake();
    }

    /// Set linear velocity damping.
    pub fn set_linear_damping(&mut self, body: BodyHandle, damping: f32) {
        self.bodies[body].linear_damping = damping;
    }

    /// Set angular velocity damping.
    pub fn set_angular_damping(&mut self, body: BodyHandle, damping: f32) {
        self.bodies[body].angular_damping = damping;
    }

    /// Suppress or allow rotation.
    pub fn set_fixed_rotation(&mut self, body: BodyHandle, fixed: bool) {
        self.bodies[body]
            .flags
            .set(BodyFlags::FIXED_ROTATION, fixed);
        self.reset_body_mass(body);
    }

    /// Continuous-collision hint for fast bodies.
    pub fn set_bullet(&mut self, body: BodyHandle, bullet: bool) {
        self.bodies[body].flags.set(BodyFlags::BULLET, bullet);
    }

    /// Whether the bullet flag is set.
    pub fn is_bullet(&self, body: BodyHandle) -> bool {
        self.bodies[body].flags.contains(BodyFlags::BULLET)
    }

    /// Include or exclude the body from simulation and collision detection.
    /// Contacts of a deactivated body end at the next step.
    pub fn set_active(&mut self, body: BodyHandle, active: bool) {
        self.bodies[body].flags.set(BodyFlags::ACTIVE, active);
    }

    /// Whether the body participates in the simulation.
    pub fn is_active(&self, body: BodyHandle) -> bool {
        self.bodies[body].is_active()
    }

    /// Whether the body is awake (not put to sleep by inactivity).
    pub fn is_awake(&self, body: BodyHandle) -> bool {
        self.bodies[body].is_awake()
    }

    /// Body mass in kilograms (zero for static and kinematic bodies).
    pub fn mass(&self, body: BodyHandle) -> f32 {
        self.bodies[body].mass
    }

    /// World-space center of mass.
    pub fn world_center(&self, body: BodyHandle) -> Vec2 {
        self.bodies[body].world_center()
    }

    /// Accumulate a force applied at a world-space point. Cleared after the
    /// next step.
    pub fn apply_force(&mut self, body: BodyHandle, force: Vec2, point: Vec2) {
        let b = &mut self.bodies[body];
        if b.is_dynamic() {
            b.force += force;
            let center = b.world_center();
            b.torque += cross(point - center, force);
            b.wake();
        }
    }

    /// Apply an instantaneous impulse at a world-space point.
    pub fn apply_linear_impulse(&mut self, body: BodyHandle, impulse: Vec2, point: Vec2) {
        let b = &mut self.bodies[body];
        if b.is_dynamic() {
            b.linear_velocity += impulse * b.inv_mass;
            let center = b.world_center();
            b.angular_velocity += b.inv_inertia * cross(point - center, impulse);
            b.wake();
        }
    }

    // --- stepping ---

    /// Advance the simulation by `dt` seconds, driving `listener`
    /// synchronously. Contact `enabled` flags are reset to `true` at the
    /// start of every step before pre-solve runs.
    pub fn step(&mut self, dt: f32, listener: &mut dyn ContactListener) {
        if dt <= 0.0 {
            return;
        }
        self.integrate_forces(dt);
        self.update_contacts(listener);

        let mut ids: Vec<ContactId> = self.contacts.keys().copied().collect();
        ids.sort();

        for &id in &ids {
            if let Some(state) = self.contacts.get_mut(&id) {
                state.enabled = true;
                state.normal_impulse = 0.0;
                listener.pre_solve(id, id.fixture_a, id.fixture_b, &mut state.enabled);
            }
        }
        for &id in &ids {
            self.solve_contact(id);
        }
        self.integrate_positions(dt);
        for &id in &ids {
            self.correct_positions(id);
        }
        for &id in &ids {
            if let Some(state) = self.contacts.get(&id) {
                if state.enabled {
                    listener.post_solve(id, id.fixture_a, id.fixture_b, state.normal_impulse);
                }
            }
        }
        self.update_sleep(dt);
        self.clear_forces();
    }

    fn reset_body_mass(&mut self, body: BodyHandle) {
        self.bodies[body].reset_mass(&self.fixtures);
    }

    fn integrate_forces(&mut self, dt: f32) {
        let gravity = self.gravity;
        for (_, body) in &mut self.bodies {
            if !body.is_dynamic() || !body.is_awake() || !body.is_active() {
                continue;
            }
            body.linear_velocity += dt * (gravity + body.force * body.inv_mass);
            body.angular_velocity += dt * body.torque * body.inv_inertia;
            body.linear_velocity /= 1.0 + dt * body.linear_damping;
            body.angular_velocity /= 1.0 + dt * body.angular_damping;
        }
    }

    fn integrate_positions(&mut self, dt: f32) {
        for (_, body) in &mut self.bodies {
            if body.kind == BodyKind::Static || !body.is_awake() || !body.is_active() {
                continue;
            }
            body.position += dt * body.linear_velocity;
            if body.flags.contains(BodyFlags::FIXED_ROTATION) {
                body.angular_velocity = 0.0;
            } else {
                body.angle += dt * body.angular_velocity;
            }
        }
    }

    /// Refresh the persistent contact set against current positions, firing
    /// end callbacks for lost contacts and begin callbacks for new ones.
    fn update_contacts(&mut self, listener: &mut dyn ContactListener) {
        let mut keys: Vec<FixtureHandle> = self.fixtures.keys().collect();
        keys.sort();

        let mut fresh: Vec<(ContactId, Vec2, f32, Vec2)> = Vec::new();
        for (i, &fa) in keys.iter().enumerate() {
            for &fb in &keys[i + 1..] {
                let (a, b) = (&self.fixtures[fa], &self.fixtures[fb]);
                if a.body == b.body {
                    continue;
                }
                let (body_a, body_b) = (&self.bodies[a.body], &self.bodies[b.body]);
                if !body_a.is_active() || !body_b.is_active() {
                    continue;
                }
                if !body_a.is_dynamic() && !body_b.is_dynamic() {
                    continue;
                }
                if !Filter::allows(a.filter, b.filter) {
                    continue;
                }
                if let Some((normal, penetration, point)) = manifold(a, body_a, b, body_b) {
                    fresh.push((ContactId::new(fa, fb), normal, penetration, point));
                }
            }
        }

        let fresh_ids: HashSet<ContactId> = fresh.iter().map(|c| c.0).collect();
        let mut ended: Vec<ContactId> = self
            .contacts
            .keys()
            .filter(|id| !fresh_ids.contains(id))
            .copied()
            .collect();
        ended.sort();
        for id in ended {
            self.contacts.remove(&id);
            listener.end_contact(id, id.fixture_a, id.fixture_b);
        }

        for (id, normal, penetration, point) in fresh {
            let is_new = !self.contacts.contains_key(&id);
            let state = self.contacts.entry(id).or_insert(ContactState {
                enabled: true,
                normal,
                penetration,
                point,
                normal_impulse: 0.0,
            });
            state.normal = normal;
            state.penetration = penetration;
            state.point = point;
            if is_new {
                self.bodies[self.fixtures[id.fixture_a].body].wake();
                self.bodies[self.fixtures[id.fixture_b].body].wake();
                listener.begin_contact(id, id.fixture_a, id.fixture_b);
            }
        }
    }

    fn solve_contact(&mut self, id: ContactId) {
        let Some(state) = self.contacts.get(&id) else {
            return;
        };
        if !state.enabled {
            return;
        }
        let (normal, point) = (state.normal, state.point);

        let (fix_a, fix_b) = (&self.fixtures[id.fixture_a], &self.fixtures[id.fixture_b]);
        let friction = (fix_a.friction * fix_b.friction).sqrt();
        let restitution = fix_a.restitution.max(fix_b.restitution);
        let (ha, hb) = (fix_a.body, fix_b.body);

        let Some([a, b]) = self.bodies.get_disjoint_mut([ha, hb]) else {
            return;
        };
        let ra = point - a.world_center();
        let rb = point - b.world_center();

        let relative = |a: &Body, b: &Body| {
            b.linear_velocity + cross_scalar(b.angular_velocity, rb)
                - a.linear_velocity
                - cross_scalar(a.angular_velocity, ra)
        };

        let vn = relative(a, b).dot(&normal);
        if vn >= 0.0 {
            return;
        }

        let rna = cross(ra, normal);
        let rnb = cross(rb, normal);
        let k = a.inv_mass + b.inv_mass + a.inv_inertia * rna * rna + b.inv_inertia * rnb * rnb;
        if k <= 0.0 {
            return;
        }

        let e = if -vn > RESTITUTION_THRESHOLD {
            restitution
        } else {
            0.0
        };
        let j = -(1.0 + e) * vn / k;
        let p = j * normal;
        a.linear_velocity -= p * a.inv_mass;
        a.angular_velocity -= a.inv_inertia * cross(ra, p);
        b.linear_velocity += p * b.inv_mass;
        b.angular_velocity += b.inv_inertia * cross(rb, p);

        let tangent = Vec2::new(-normal.y, normal.x);
        let vt = relative(a, b).dot(&tangent);
        let rta = cross(ra, tangent);
        let rtb = cross(rb, tangent);
        let kt = a.inv_mass + b.inv_mass + a.inv_inertia * rta * rta + b.inv_inertia * rtb * rtb;
        if kt > 0.0 {
            let max_friction = friction * j;
            let jt = (-vt / kt).clamp(-max_friction, max_friction);
            let pt = jt * tangent;
            a.linear_velocity -= pt * a.inv_mass;
            a.angular_velocity -= a.inv_inertia * cross(ra, pt);
            b.linear_velocity += pt * b.inv_mass;
            b.angular_velocity += b.inv_inertia * cross(rb, pt);
        }

        if let Some(state) = self.contacts.get_mut(&id) {
            state.normal_impulse += j;
        }
    }

    fn correct_positions(&mut self, id: ContactId) {
        let Some(state) = self.contacts.get(&id) else {
            return;
        };
        if !state.enabled {
            return;
        }
        let (normal, penetration) = (state.normal, state.penetration);
        let (ha, hb) = (
            self.fixtures[id.fixture_a].body,
            self.fixtures[id.fixture_b].body,
        );
        let Some([a, b]) = self.bodies.get_disjoint_mut([ha, hb]) else {
            return;
        };
        let inv_mass = a.inv_mass + b.inv_mass;
        if inv_mass <= 0.0 {
            return;
        }
        let correction =
            POSITION_CORRECTION * (penetration - PENETRATION_SLOP).max(0.0) / inv_mass;
        a.position -= normal * (correction * a.inv_mass);
        b.position += normal * (correction * b.inv_mass);
    }

    fn update_sleep(&mut self, dt: f32) {
        for (_, body) in &mut self.bodies {
            if body.kind == BodyKind::Static || !body.is_awake() {
                continue;
            }
            let still = body.linear_velocity.norm_squared() < LINEAR_SLEEP_TOLERANCE_SQ
                && body.angular_velocity * body.angular_velocity < ANGULAR_SLEEP_TOLERANCE_SQ;
            if still {
                body.sleep_time += dt;
                if body.sleep_time > TIME_TO_SLEEP {
                    body.flags.remove(BodyFlags::AWAKE);
                    body.linear_velocity = Vec2::zeros();
                    body.angular_velocity = 0.0;
                }
            } else {
                body.sleep_time = 0.0;
            }
        }
    }

    fn clear_forces(&mut self) {
        for (_, body) in &mut self.bodies {
            body.force = Vec2::zeros();
            body.torque = 0.0;
        }
    }
}

/// Contact manifold between two fixtures at their bodies' current
/// transforms. The normal points from `a` toward `b`.
fn manifold(a: &Fixture, body_a: &Body, b: &Fixture, body_b: &Body) -> Option<(Vec2, f32, Vec2)> {
    match (&a.geometry, &b.geometry) {
        (
            Geometry::Circle {
                offset: oa,
                radius: ra,
            },
            Geometry::Circle {
                offset: ob,
                radius: rb,
            },
        ) => {
            let ca = body_a.position + rotate(*oa, body_a.angle);
            let cb = body_b.position + rotate(*ob, body_b.angle);
            let d = cb - ca;
            let dist = d.norm();
            let total = ra + rb;
            if dist >= total {
                return None;
            }
            let normal = if dist > 1e-6 {
                d / dist
            } else {
                Vec2::new(1.0, 0.0)
            };
            let penetration = total - dist;
            Some((normal, penetration, ca + normal * (*ra - penetration * 0.5)))
        }
        (Geometry::Circle { offset, radius }, Geometry::Edge { start, end }) => {
            let center = body_a.position + rotate(*offset, body_a.angle);
            let p1 = body_b.position + rotate(*start, body_b.angle);
            let p2 = body_b.position + rotate(*end, body_b.angle);
            circle_segment(center, *radius, p1, p2)
                .map(|(to_circle, penetration, point)| (-to_circle, penetration, point))
        }
        (Geometry::Edge { start, end }, Geometry::Circle { offset, radius }) => {
            let p1 = body_a.position + rotate(*start, body_a.angle);
            let p2 = body_a.position + rotate(*end, body_a.angle);
            let center = body_b.position + rotate(*offset, body_b.angle);
            circle_segment(center, *radius, p1, p2)
        }
        // Edges are infinitely thin; edge-edge pairs never touch.
        (Geometry::Edge { .. }, Geometry::Edge { .. }) => None,
    }
}

/// Circle-versus-segment overlap. The returned normal points from the
/// segment toward the circle center.
fn circle_segment(center: Vec2, radius: f32, p1: Vec2, p2: Vec2) -> Option<(Vec2, f32, Vec2)> {
    let edge = p2 - p1;
    let len_sq = edge.norm_squared();
    let t = if len_sq > 1e-12 {
        ((center - p1).dot(&edge) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let closest = p1 + edge * t;
    let d = center - closest;
    let dist = d.norm();
    if dist >= radius {
        return None;
    }
    let normal = if dist > 1e-6 {
        d / dist
    } else {
        let fallback = Vec2::new(-edge.y, edge.x);
        let n = fallback.norm();
        if n > 1e-6 {
            fallback / n
        } else {
            Vec2::new(0.0, 1.0)
        }
    };
    Some((normal, radius - dist, closest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::NoopListener;

    use approx::assert_relative_eq;

    #[derive(Default)]
    struct RecordingListener {
        begins: Vec<ContactId>,
        ends: Vec<ContactId>,
        presolves: usize,
        postsolves: usize,
        disable: bool,
    }

    impl ContactListener for RecordingListener {
        fn begin_contact(&mut self, id: ContactId, _a: FixtureHandle, _b: FixtureHandle) {
            self.begins.push(id);
        }
        fn end_contact(&mut self, id: ContactId, _a: FixtureHandle, _b: FixtureHandle) {
            self.ends.push(id);
        }
        fn pre_solve(
            &mut self,
            _id: ContactId,
            _a: FixtureHandle,
            _b: FixtureHandle,
            enabled: &mut bool,
        ) {
            self.presolves += 1;
            if self.disable {
                *enabled = false;
            }
        }
        fn post_solve(&mut self, _id: ContactId, _a: FixtureHandle, _b: FixtureHandle, _j: f32) {
            self.postsolves += 1;
        }
    }

    fn dynamic_circle(world: &mut PhysicsWorld, at: Vec2, radius: f32) -> BodyHandle {
        let body = world.create_body(&BodyDef::new(BodyKind::Dynamic).at(at));
        world.create_fixture(body, &FixtureDef::circle(Vec2::zeros(), radius));
        body
    }

    #[test]
    fn dynamic_body_falls_under_gravity() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, -10.0));
        let body = dynamic_circle(&mut world, Vec2::new(0.0, 10.0), 0.5);
        for _ in 0..30 {
            world.step(1.0 / 60.0, &mut NoopListener);
        }
        assert!(world.position(body).y < 10.0);
        assert!(world.linear_velocity(body).y < 0.0);
    }

    #[test]
    fn static_pairs_do_not_collide() {
        let mut world = PhysicsWorld::new(Vec2::zeros());
        let a = world.create_body(&BodyDef::new(BodyKind::Static));
        world.create_fixture(a, &FixtureDef::circle(Vec2::zeros(), 1.0));
        let b = world.create_body(&BodyDef::new(BodyKind::Static).at(Vec2::new(0.5, 0.0)));
        world.create_fixture(b, &FixtureDef::circle(Vec2::zeros(), 1.0));

        let mut listener = RecordingListener::default();
        world.step(1.0 / 60.0, &mut listener);
        assert!(listener.begins.is_empty());
    }

    #[test]
    fn begin_and_end_fire_once_per_contact() {
        let mut world = PhysicsWorld::new(Vec2::zeros());
        let a = dynamic_circle(&mut world, Vec2::zeros(), 0.5);
        let _b = dynamic_circle(&mut world, Vec2::new(0.6, 0.0), 0.5);

        let mut listener = RecordingListener::default();
        listener.disable = true; // keep the solver from separating them
        world.step(1.0 / 60.0, &mut listener);
        assert_eq!(listener.begins.len(), 1);
        assert!(listener.ends.is_empty());
        assert!(listener.presolves >= 1);

        // Persisting contact must not fire begin again.
        world.step(1.0 / 60.0, &mut listener);
        assert_eq!(listener.begins.len(), 1);

        world.set_transform(a, Vec2::new(100.0, 0.0), 0.0);
        world.step(1.0 / 60.0, &mut listener);
        assert_eq!(listener.ends.len(), 1);
        assert_eq!(listener.begins[0], listener.ends[0]);
    }

    #[test]
    fn disabled_contact_applies_no_impulse() {
        let mut world = PhysicsWorld::new(Vec2::zeros());
        let a = dynamic_circle(&mut world, Vec2::zeros(), 0.5);
        let b = dynamic_circle(&mut world, Vec2::new(0.6, 0.0), 0.5);

        let mut listener = RecordingListener::default();
        listener.disable = true;
        world.step(1.0 / 60.0, &mut listener);

        assert_relative_eq!(world.position(a).x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(world.position(b).x, 0.6, epsilon = 1e-6);
        assert_eq!(listener.postsolves, 0);
    }

    #[test]
    fn enabled_contact_separates_overlap() {
        let mut world = PhysicsWorld::new(Vec2::zeros());
        let a = dynamic_circle(&mut world, Vec2::zeros(), 0.5);
        let b = dynamic_circle(&mut world, Vec2::new(0.6, 0.0), 0.5);

        let mut listener = RecordingListener::default();
        world.step(1.0 / 60.0, &mut listener);
        assert!(world.position(a).x < 0.0);
        assert!(world.position(b).x > 0.6);
        assert!(listener.postsolves >= 1);
    }

    #[test]
    fn filters_suppress_contacts() {
        let mut world = PhysicsWorld::new(Vec2::zeros());
        let a = world.create_body(&BodyDef::new(BodyKind::Dynamic));
        world.create_fixture(
            a,
            &FixtureDef::circle(Vec2::zeros(), 0.5).with_filter(Filter {
                category: 0x0002,
                mask: 0x0004,
            }),
        );
        let b = world.create_body(&BodyDef::new(BodyKind::Dynamic).at(Vec2::new(0.6, 0.0)));
        world.create_fixture(
            b,
            &FixtureDef::circle(Vec2::zeros(), 0.5).with_filter(Filter {
                category: 0x0008,
                mask: 0xFFFF,
            }),
        );

        let mut listener = RecordingListener::default();
        world.step(1.0 / 60.0, &mut listener);
        assert!(listener.begins.is_empty());
    }

    #[test]
    fn circle_rests_on_edge() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, -10.0));
        let ground = world.create_body(&BodyDef::new(BodyKind::Static));
        world.create_fixture(
            ground,
            &FixtureDef::edge(Vec2::new(-10.0, 0.0), Vec2::new(10.0, 0.0)),
        );
        let ball = dynamic_circle(&mut world, Vec2::new(0.0, 2.0), 0.5);

        for _ in 0..240 {
            world.step(1.0 / 60.0, &mut NoopListener);
        }
        // Resting height is the radius, give or take solver slop.
        assert_relative_eq!(world.position(ball).y, 0.5, epsilon = 0.1);
    }

    #[test]
    fn destroying_a_body_drops_its_contacts() {
        let mut world = PhysicsWorld::new(Vec2::zeros());
        let a = dynamic_circle(&mut world, Vec2::zeros(), 0.5);
        let _b = dynamic_circle(&mut world, Vec2::new(0.6, 0.0), 0.5);
        let mut listener = RecordingListener::default();
        listener.disable = true;
        world.step(1.0 / 60.0, &mut listener);
        assert_eq!(world.contacts_involving(a).len(), 1);

        world.destroy_body(a);
        assert_eq!(world.contact_count(), 0);
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    #[should_panic(expected = "destroy_body")]
    fn double_destroy_panics() {
        let mut world = PhysicsWorld::new(Vec2::zeros());
        let body = world.create_body(&BodyDef::default());
        world.destroy_body(body);
        world.destroy_body(body);
    }

    #[test]
    fn circle_mass_follows_density() {
        let mut world = PhysicsWorld::new(Vec2::zeros());
        let body = world.create_body(&BodyDef::new(BodyKind::Dynamic));
        world.create_fixture(
            body,
            &FixtureDef::circle(Vec2::zeros(), 1.0).with_density(2.0),
        );
        assert_relative_eq!(world.mass(body), 2.0 * std::f32::consts::PI, epsilon = 1e-4);
    }

    #[test]
    fn impulse_wakes_and_moves_a_sleeping_body() {
        let mut world = PhysicsWorld::new(Vec2::zeros());
        let body = dynamic_circle(&mut world, Vec2::zeros(), 0.5);
        for _ in 0..60 {
            world.step(1.0 / 60.0, &mut NoopListener);
        }
        assert!(!world.is_awake(body));

        let center = world.world_center(body);
        world.apply_linear_impulse(body, Vec2::new(world.mass(body), 0.0), center);
        assert!(world.is_awake(body));
        world.step(1.0 / 60.0, &mut NoopListener);
        assert!(world.position(body).x > 0.0);
    }
}
