//! Contact bookkeeping and the per-step callback boundary.

use super::FixtureHandle;
use crate::foundation::math::Vec2;

/// Identifier of one native contact: the ordered pair of touching fixtures.
///
/// Stable for the whole life of the contact, so callbacks across phases and
/// steps can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContactId {
    /// Smaller fixture handle of the pair.
    pub fixture_a: FixtureHandle,
    /// Larger fixture handle of the pair.
    pub fixture_b: FixtureHandle,
}

impl ContactId {
    pub(crate) fn new(a: FixtureHandle, b: FixtureHandle) -> Self {
        if a <= b {
            Self {
                fixture_a: a,
                fixture_b: b,
            }
        } else {
            Self {
                fixture_a: b,
                fixture_b: a,
            }
        }
    }
}

/// Receiver for per-step contact callbacks.
///
/// All four callbacks fire synchronously inside [`PhysicsWorld::step`],
/// once per contact point (the engine's circle/edge manifolds carry one
/// point per fixture pair). A listener must not assume any ordering between
/// the two fixtures of a pair beyond the [`ContactId`] convention.
///
/// [`PhysicsWorld::step`]: super::PhysicsWorld::step
pub trait ContactListener {
    /// Two fixtures started touching.
    fn begin_contact(&mut self, id: ContactId, a: FixtureHandle, b: FixtureHandle) {
        let _ = (id, a, b);
    }

    /// Two fixtures stopped touching.
    fn end_contact(&mut self, id: ContactId, a: FixtureHandle, b: FixtureHandle) {
        let _ = (id, a, b);
    }

    /// Called before the contact is solved this step. Clearing `enabled`
    /// skips constraint resolution for this step only; the flag is reset to
    /// `true` at the start of every step while the contact persists.
    fn pre_solve(&mut self, id: ContactId, a: FixtureHandle, b: FixtureHandle, enabled: &mut bool) {
        let _ = (id, a, b, enabled);
    }

    /// Called after the contact was solved, with the accumulated normal
    /// impulse applied this step. Not called for disabled contacts.
    fn post_solve(&mut self, id: ContactId, a: FixtureHandle, b: FixtureHandle, impulse: f32) {
        let _ = (id, a, b, impulse);
    }
}

/// Listener that ignores every callback.
pub struct NoopListener;

impl ContactListener for NoopListener {}

/// Persistent per-contact solver state.
#[derive(Debug, Clone)]
pub(crate) struct ContactState {
    /// Reset to `true` each step; cleared by pre-solve listeners.
    pub enabled: bool,
    /// Contact normal, pointing from `fixture_a` toward `fixture_b`.
    pub normal: Vec2,
    /// Overlap depth in meters.
    pub penetration: f32,
    /// World-space contact point.
    pub point: Vec2,
    /// Normal impulse accumulated during the current solve.
    pub normal_impulse: f32,
}
