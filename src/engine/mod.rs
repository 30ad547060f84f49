//! Minimal deterministic 2D rigid-body engine.
//!
//! This module is the simulation-side boundary the bridge layer is written
//! against: body and fixture arenas with stable handles, per-fixture
//! category/mask filters, and per-step contact callbacks (begin, end,
//! pre-solve, post-solve) delivered through [`ContactListener`]. The solver
//! is intentionally small (circle and edge geometry, one impulse pass plus
//! positional correction); everything above it only depends on the callback
//! contract, not on simulation quality.

mod body;
mod contact;
mod fixture;
mod world;

pub use body::{BodyDef, BodyKind};
pub use contact::{ContactId, ContactListener, NoopListener};
pub use fixture::{Filter, FixtureDef, Geometry};
pub use world::PhysicsWorld;

slotmap::new_key_type! {
    /// Stable handle to a rigid body.
    pub struct BodyHandle;

    /// Stable handle to a fixture (one collision shape on a body).
    pub struct FixtureHandle;
}
