//! Typed contact dispatch.
//!
//! The engine reports contacts as fixture pairs. The dispatcher resolves
//! each fixture to its owning entity and notifies both entities' responders,
//! each through its own mirrored [`ContactEvent`] view of the same native
//! contact. For every notification the typed hook runs first; if it returns
//! [`Dispatch::Fallthrough`] the generic hook runs as well.

use slotmap::{SecondaryMap, SlotMap};
use std::any::Any;

use super::entity::PhysicsEntity;
use super::event::{ContactEvent, ContactPhase};
use super::EntityKey;
use crate::engine::{ContactId, ContactListener, FixtureHandle};

/// What a typed contact hook decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The typed hook handled the contact; skip the generic hook.
    Handled,
    /// Fall through to the generic hook.
    Fallthrough,
}

/// Per-entity contact behavior.
///
/// All hooks have no-op defaults; implement the ones the entity cares
/// about. `own` is the entity the responder is attached to, temporarily
/// detached from its responder for the duration of the call so both can be
/// borrowed mutably. Discriminate opponents by type through
/// [`ContactEvent::is_other`] or by tag through
/// [`ContactEvent::other_tag`]:
///
/// ```ignore
/// fn begin_contact_with(
///     &mut self,
///     own: &mut PhysicsEntity,
///     contact: &mut ContactEvent<'_>,
/// ) -> Dispatch {
///     if contact.is_other::<Bullet>() {
///         contact.delete_other_later();
///         own.set_delete_later(true);
///         return Dispatch::Handled;
///     }
///     Dispatch::Fallthrough
/// }
/// ```
#[allow(unused_variables)]
pub trait ContactResponder: Any {
    /// Typed begin hook; return [`Dispatch::Handled`] to suppress
    /// [`begin_contact`](Self::begin_contact).
    fn begin_contact_with(
        &mut self,
        own: &mut PhysicsEntity,
        contact: &mut ContactEvent<'_>,
    ) -> Dispatch {
        Dispatch::Fallthrough
    }

    /// Generic begin hook, for contacts the typed hook fell through on.
    fn begin_contact(&mut self, own: &mut PhysicsEntity, contact: &mut ContactEvent<'_>) {}

    /// Typed end hook; return [`Dispatch::Handled`] to suppress
    /// [`end_contact`](Self::end_contact).
    fn end_contact_with(
        &mut self,
        own: &mut PhysicsEntity,
        contact: &mut ContactEvent<'_>,
    ) -> Dispatch {
        Dispatch::Fallthrough
    }

    /// Generic end hook.
    fn end_contact(&mut self, own: &mut PhysicsEntity, contact: &mut ContactEvent<'_>) {}

    /// Typed pre-solve hook; the only place
    /// [`ContactEvent::set_enabled`] works.
    fn presolve_contact_with(
        &mut self,
        own: &mut PhysicsEntity,
        contact: &mut ContactEvent<'_>,
    ) -> Dispatch {
        Dispatch::Fallthrough
    }

    /// Generic pre-solve hook.
    fn presolve_contact(&mut self, own: &mut PhysicsEntity, contact: &mut ContactEvent<'_>) {}

    /// Typed post-solve hook; [`ContactEvent::normal_impulse`] carries the
    /// solver's applied impulse.
    fn postsolve_contact_with(
        &mut self,
        own: &mut PhysicsEntity,
        contact: &mut ContactEvent<'_>,
    ) -> Dispatch {
        Dispatch::Fallthrough
    }

    /// Generic post-solve hook.
    fn postsolve_contact(&mut self, own: &mut PhysicsEntity, contact: &mut ContactEvent<'_>) {}
}

/// Adapts raw engine callbacks to entity notifications for one step.
///
/// Borrows the entity arena and the fixture ownership table from the
/// simulation world, leaving the engine itself free to be stepped.
pub(crate) struct ContactDispatcher<'w> {
    entities: &'w mut SlotMap<EntityKey, PhysicsEntity>,
    owners: &'w SecondaryMap<FixtureHandle, EntityKey>,
}

impl<'w> ContactDispatcher<'w> {
    pub(crate) fn new(
        entities: &'w mut SlotMap<EntityKey, PhysicsEntity>,
        owners: &'w SecondaryMap<FixtureHandle, EntityKey>,
    ) -> Self {
        Self { entities, owners }
    }

    /// Notify both sides of one contact callback. If either fixture has no
    /// owning entity the whole callback is skipped.
    pub(crate) fn notify(
        &mut self,
        phase: ContactPhase,
        id: ContactId,
        fixture_a: FixtureHandle,
        fixture_b: FixtureHandle,
        mut enabled: Option<&mut bool>,
        normal_impulse: Option<f32>,
    ) {
        let (Some(&key_a), Some(&key_b)) = (self.owners.get(fixture_a), self.owners.get(fixture_b))
        else {
            log::trace!("contact {id:?} touches a fixture with no entity; skipping dispatch");
            return;
        };

        let mut deletions: Vec<EntityKey> = Vec::new();
        let views = [
            (key_a, fixture_a, key_b, fixture_b),
            (key_b, fixture_b, key_a, fixture_a),
        ];
        for (own_key, own_fixture, other_key, other_fixture) in views {
            let Some((other_tag, other_type)) = self
                .entities
                .get(other_key)
                .map(|other| (other.tag(), other.responder_type()))
            else {
                continue;
            };
            let Some(own) = self.entities.get_mut(own_key) else {
                continue;
            };
            // Detach the responder so it and the entity can both be borrowed
            // mutably across the hook call.
            let Some(mut responder) = own.responder.take() else {
                continue;
            };
            let mut event = ContactEvent::new(
                phase,
                id,
                own_key,
                own_fixture,
                other_key,
                other_fixture,
                other_tag,
                other_type,
                enabled.as_deref_mut(),
                normal_impulse,
                &mut deletions,
            );
            match phase {
                ContactPhase::Begin => {
                    if responder.begin_contact_with(own, &mut event) == Dispatch::Fallthrough {
                        responder.begin_contact(own, &mut event);
                    }
                }
                ContactPhase::End => {
                    if responder.end_contact_with(own, &mut event) == Dispatch::Fallthrough {
                        responder.end_contact(own, &mut event);
                    }
                }
                ContactPhase::PreSolve => {
                    if responder.presolve_contact_with(own, &mut event) == Dispatch::Fallthrough {
                        responder.presolve_contact(own, &mut event);
                    }
                }
                ContactPhase::PostSolve => {
                    if responder.postsolve_contact_with(own, &mut event) == Dispatch::Fallthrough {
                        responder.postsolve_contact(own, &mut event);
                    }
                }
            }
            // The hook may have installed a replacement responder; keep it.
            if own.responder.is_none() {
                own.responder = Some(responder);
            }
        }

        for key in deletions {
            if let Some(entity) = self.entities.get_mut(key) {
                entity.set_delete_later(true);
            }
        }
    }
}

impl ContactListener for ContactDispatcher<'_> {
    fn begin_contact(&mut self, id: ContactId, fixture_a: FixtureHandle, fixture_b: FixtureHandle) {
        self.notify(ContactPhase::Begin, id, fixture_a, fixture_b, None, None);
    }

    fn end_contact(&mut self, id: ContactId, fixture_a: FixtureHandle, fixture_b: FixtureHandle) {
        self.notify(ContactPhase::End, id, fixture_a, fixture_b, None, None);
    }

    fn pre_solve(
        &mut self,
        id: ContactId,
        fixture_a: FixtureHandle,
        fixture_b: FixtureHandle,
        enabled: &mut bool,
    ) {
        self.notify(
            ContactPhase::PreSolve,
            id,
            fixture_a,
            fixture_b,
            Some(enabled),
            None,
        );
    }

    fn post_solve(
        &mut self,
        id: ContactId,
        fixture_a: FixtureHandle,
        fixture_b: FixtureHandle,
        normal_impulse: f32,
    ) {
        self.notify(
            ContactPhase::PostSolve,
            id,
            fixture_a,
            fixture_b,
            None,
            Some(normal_impulse),
        );
    }
}
