//! Rigid body state.

use bitflags::bitflags;
use slotmap::SlotMap;

use super::fixture::{Fixture, Geometry};
use super::FixtureHandle;
use crate::foundation::math::{rotate, Vec2};

/// How a body participates in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BodyKind {
    /// Immovable; collides but never integrates.
    Static,
    /// Moved only by directly set velocity or transform; ignores forces.
    Kinematic,
    /// Fully simulated.
    Dynamic,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct BodyFlags: u8 {
        const ACTIVE = 1 << 0;
        const AWAKE = 1 << 1;
        const FIXED_ROTATION = 1 << 2;
        const BULLET = 1 << 3;
    }
}

/// Everything needed to create a body.
#[derive(Debug, Clone)]
pub struct BodyDef {
    /// Body kind.
    pub kind: BodyKind,
    /// Initial position in meters.
    pub position: Vec2,
    /// Initial angle in radians.
    pub angle: f32,
    /// Initial linear velocity.
    pub linear_velocity: Vec2,
    /// Initial angular velocity in radians per second.
    pub angular_velocity: f32,
    /// Linear velocity damping.
    pub linear_damping: f32,
    /// Angular velocity damping.
    pub angular_damping: f32,
    /// Suppress all rotation.
    pub fixed_rotation: bool,
    /// Continuous-collision hint for fast bodies.
    pub bullet: bool,
}

impl BodyDef {
    /// Definition of a body of the given kind at the origin.
    pub fn new(kind: BodyKind) -> Self {
        Self {
            kind,
            position: Vec2::zeros(),
            angle: 0.0,
            linear_velocity: Vec2::zeros(),
            angular_velocity: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            fixed_rotation: false,
            bullet: false,
        }
    }

    /// Set the initial position.
    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Set the initial angle in radians.
    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }
}

impl Default for BodyDef {
    fn default() -> Self {
        Self::new(BodyKind::Static)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Body {
    pub kind: BodyKind,
    pub position: Vec2,
    pub angle: f32,
    pub linear_velocity: Vec2,
    pub angular_velocity: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub force: Vec2,
    pub torque: f32,
    pub flags: BodyFlags,
    pub fixtures: Vec<FixtureHandle>,
    pub mass: f32,
    pub inv_mass: f32,
    pub inv_inertia: f32,
    pub local_center: Vec2,
    pub sleep_time: f32,
}

impl Body {
    pub fn from_def(def: &BodyDef) -> Self {
        let mut flags = BodyFlags::ACTIVE;
        if def.kind != BodyKind::Static {
            flags |= BodyFlags::AWAKE;
        }
        flags.set(BodyFlags::FIXED_ROTATION, def.fixed_rotation);
        flags.set(BodyFlags::BULLET, def.bullet);
        Self {
            kind: def.kind,
            position: def.position,
            angle: def.angle,
            linear_velocity: def.linear_velocity,
            angular_velocity: def.angular_velocity,
            linear_damping: def.linear_damping,
            angular_damping: def.angular_damping,
            force: Vec2::zeros(),
            torque: 0.0,
            flags,
            fixtures: Vec::new(),
            mass: 0.0,
            inv_mass: 0.0,
            inv_inertia: 0.0,
            local_center: Vec2::zeros(),
            sleep_time: 0.0,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    pub fn is_awake(&self) -> bool {
        self.flags.contains(BodyFlags::AWAKE)
    }

    pub fn is_active(&self) -> bool {
        self.flags.contains(BodyFlags::ACTIVE)
    }

    pub fn wake(&mut self) {
        if self.kind != BodyKind::Static {
            self.flags.insert(BodyFlags::AWAKE);
        }
        self.sleep_time = 0.0;
    }

    /// World-space center of mass.
    pub fn world_center(&self) -> Vec2 {
        self.position + rotate(self.local_center, self.angle)
    }

    /// Recompute mass, center of mass and rotational inertia from the
    /// body's circle fixtures. Dynamic bodies with no massive fixture get a
    /// fallback mass of one kilogram so they still respond to forces.
    pub fn reset_mass(&mut self, fixtures: &SlotMap<FixtureHandle, Fixture>) {
        self.mass = 0.0;
        self.inv_mass = 0.0;
        self.inv_inertia = 0.0;
        self.local_center = Vec2::zeros();

        if self.kind != BodyKind::Dynamic {
            return;
        }

        let mut inertia = 0.0;
        for &handle in &self.fixtures {
            let fixture = &fixtures[handle];
            if let Geometry::Circle { offset, radius } = fixture.geometry {
                let m = fixture.density * std::f32::consts::PI * radius * radius;
                self.mass += m;
                self.local_center += m * offset;
                inertia += m * (0.5 * radius * radius + offset.norm_squared());
            }
        }

        if self.mass > 0.0 {
            self.local_center /= self.mass;
        } else {
            self.mass = 1.0;
            inertia = 1.0;
        }
        self.inv_mass = 1.0 / self.mass;
        if !self.flags.contains(BodyFlags::FIXED_ROTATION) && inertia > 0.0 {
            self.inv_inertia = 1.0 / inertia;
        }
    }
}
