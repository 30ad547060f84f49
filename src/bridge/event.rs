//! The collision record handed to contact notifications.

use std::any::{Any, TypeId};

use super::EntityKey;
use crate::engine::{ContactId, FixtureHandle};

/// Which callback of the contact's life this event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    /// The fixtures started touching.
    Begin,
    /// The fixtures stopped touching (or one of them is being destroyed).
    End,
    /// Before constraint resolution; the contact may be disabled here.
    PreSolve,
    /// After constraint resolution.
    PostSolve,
}

/// One side's view of a single collision point.
///
/// Constructed fresh for every notification and valid only for the duration
/// of the callback that receives it; the borrow it holds on the step's
/// contact state makes keeping it around impossible. The mirrored view
/// handed to the opponent wraps the same native contact, so disabling the
/// contact from either side affects both.
pub struct ContactEvent<'a> {
    phase: ContactPhase,
    contact: ContactId,
    own_entity: EntityKey,
    own_fixture: FixtureHandle,
    other_entity: EntityKey,
    other_fixture: FixtureHandle,
    other_tag: i32,
    other_type: Option<TypeId>,
    enabled: Option<&'a mut bool>,
    normal_impulse: Option<f32>,
    deletions: &'a mut Vec<EntityKey>,
}

impl<'a> ContactEvent<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        phase: ContactPhase,
        contact: ContactId,
        own_entity: EntityKey,
        own_fixture: FixtureHandle,
        other_entity: EntityKey,
        other_fixture: FixtureHandle,
        other_tag: i32,
        other_type: Option<TypeId>,
        enabled: Option<&'a mut bool>,
        normal_impulse: Option<f32>,
        deletions: &'a mut Vec<EntityKey>,
    ) -> Self {
        Self {
            phase,
            contact,
            own_entity,
            own_fixture,
            other_entity,
            other_fixture,
            other_tag,
            other_type,
            enabled,
            normal_impulse,
            deletions,
        }
    }

    /// The callback phase this event was built for.
    pub fn phase(&self) -> ContactPhase {
        self.phase
    }

    /// Identifier of the underlying native contact, shared by both views.
    pub fn contact_id(&self) -> ContactId {
        self.contact
    }

    /// The receiving entity.
    pub fn own_entity(&self) -> EntityKey {
        self.own_entity
    }

    /// The receiving entity's fixture involved in the collision.
    pub fn own_fixture(&self) -> FixtureHandle {
        self.own_fixture
    }

    /// The opposing entity.
    pub fn other_entity(&self) -> EntityKey {
        self.other_entity
    }

    /// The opposing entity's fixture involved in the collision.
    pub fn other_fixture(&self) -> FixtureHandle {
        self.other_fixture
    }

    /// Application-assigned tag of the opposing entity.
    pub fn other_tag(&self) -> i32 {
        self.other_tag
    }

    /// Runtime type of the opposing entity's responder, if it has one.
    pub fn other_type(&self) -> Option<TypeId> {
        self.other_type
    }

    /// True if the opposing entity's responder is a `T`.
    pub fn is_other<T: Any>(&self) -> bool {
        self.other_type == Some(TypeId::of::<T>())
    }

    /// Enable or disable the contact for the current step.
    ///
    /// Only effective during [`ContactPhase::PreSolve`]; a disabled contact
    /// skips constraint resolution this step, letting the objects pass
    /// through each other, and is re-enabled automatically at the next
    /// step. Calls in any other phase are ignored with a warning.
    pub fn set_enabled(&mut self, enabled: bool) {
        match (self.phase, self.enabled.as_deref_mut()) {
            (ContactPhase::PreSolve, Some(flag)) => *flag = enabled,
            _ => log::warn!(
                "set_enabled is only effective during pre-solve; ignoring (phase {:?})",
                self.phase
            ),
        }
    }

    /// Normal impulse applied by the solver, available during
    /// [`ContactPhase::PostSolve`] only.
    pub fn normal_impulse(&self) -> Option<f32> {
        self.normal_impulse
    }

    /// Flag the opposing entity for deletion at the end-of-step sweep.
    pub fn delete_other_later(&mut self) {
        self.deletions.push(self.other_entity);
    }

    /// Flag any entity for deletion at the end-of-step sweep. Safe to call
    /// from inside the notification; the entity stays fully valid until the
    /// sweep runs.
    pub fn delete_entity_later(&mut self, key: EntityKey) {
        self.deletions.push(key);
    }
}
