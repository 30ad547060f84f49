//! The object-level bridge between simulation and scene graph.
//!
//! [`SimulationWorld`] owns the engine world and the live set of
//! [`PhysicsEntity`] values. Each step, raw engine contact callbacks are
//! translated by the contact dispatcher into typed notifications on the
//! entities' [`ContactResponder`]s, entities flagged for deletion are swept
//! once the step completes, and the resulting transforms are pushed into
//! the render nodes.

pub mod dispatch;
pub mod entity;
pub mod event;
pub mod world;

pub use dispatch::{ContactResponder, Dispatch};
pub use entity::{EntityDef, PhysicsEntity};
pub use event::{ContactEvent, ContactPhase};
pub use world::SimulationWorld;

slotmap::new_key_type! {
    /// Stable handle to a live entity in a [`SimulationWorld`].
    pub struct EntityKey;
}
