//! Bridge between a 2D rigid-body simulation and a scene-graph renderer.
//!
//! The crate pairs every simulated body with an application-supplied render
//! node and an optional typed contact responder, and keeps the three in
//! lockstep:
//!
//! - [`bridge::SimulationWorld`] owns the engine world and the entity set,
//!   steps the simulation, delivers contact notifications, sweeps entities
//!   flagged for deletion and pushes body transforms into render nodes;
//! - [`bridge::PhysicsEntity`] is one simulated object with convenience
//!   mutators for motion state and collision filters;
//! - [`bridge::ContactResponder`] receives begin/end/pre-solve/post-solve
//!   notifications, with per-opponent-type hooks resolved at runtime;
//! - [`shapes::ShapeCache`] maps shape names to fixture definitions, loaded
//!   from RON or built programmatically;
//! - [`foundation::units::CoordinateMapper`] converts between simulation
//!   meters and render points.
//!
//! The engine itself lives behind the [`engine`] module boundary; nothing
//! above it depends on more than handles and the contact callback contract.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bridge;
pub mod engine;
pub mod foundation;
pub mod render;
pub mod shapes;

pub mod prelude {
    //! The types nearly every consumer needs.
    pub use crate::bridge::{
        ContactEvent, ContactPhase, ContactResponder, Dispatch, EntityDef, EntityKey,
        PhysicsEntity, SimulationWorld,
    };
    pub use crate::engine::{BodyKind, Filter, FixtureDef, Geometry};
    pub use crate::foundation::math::{Point2, Vec2};
    pub use crate::foundation::units::CoordinateMapper;
    pub use crate::render::{NullNode, RenderNode};
    pub use crate::shapes::{ShapeCache, ShapeCacheError};
}
