//! Trip access policy.
//!
//! A [`TripAccess`] is built once per request from the trip owner and the
//! caller's own participant record, then answers every authorization
//! question without touching the database.
//!
//! | predicate                 | owner | organizer (accepted) | accepted | pending / declined |
//! |---------------------------|-------|----------------------|----------|--------------------|
//! | `can_view`                | yes   | yes                  | yes      | yes                |
//! | `can_access`              | yes   | yes                  | yes      | no                 |
//! | `can_edit`                | yes   | yes                  | no       | no                 |
//! | `can_manage_participants` | yes   | yes                  | no       | no                 |

use uuid::Uuid;

use crate::{Participant, ParticipantRole, ParticipantStatus};

/// The caller's participant snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Membership {
    pub role: ParticipantRole,
    pub status: ParticipantStatus,
}

impl From<&Participant> for Membership {
    fn from(value: &Participant) -> Self {
        Self {
            role: value.role,
            status: value.status,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TripAccess {
    pub owner_id: Uuid,
    pub user_id: Uuid,
    pub membership: Option<Membership>,
}

impl TripAccess {
    #[must_use]
    pub fn new(owner_id: Uuid, user_id: Uuid, membership: Option<Membership>) -> Self {
        Self {
            owner_id,
            user_id,
            membership,
        }
    }

    #[must_use]
    pub fn is_owner(&self) -> bool {
        self.owner_id == self.user_id
    }

    /// Owner, or any participant record whatever its status. Used for chat.
    #[must_use]
    pub fn can_view(&self) -> bool {
        self.is_owner() || self.membership.is_some()
    }

    /// Owner, or an accepted participant.
    #[must_use]
    pub fn can_access(&self) -> bool {
        self.is_owner()
            || self
                .membership
                .is_some_and(|m| m.status == ParticipantStatus::Accepted)
    }

    /// Owner, or an accepted organizer.
    #[must_use]
    pub fn can_edit(&self) -> bool {
        self.is_owner()
            || self.membership.is_some_and(|m| {
                m.status == ParticipantStatus::Accepted && m.role == ParticipantRole::Organizer
            })
    }

    #[must_use]
    pub fn can_manage_participants(&self) -> bool {
        self.can_edit()
    }

    /// Expenses and itinerary items: their creator, or anyone who can edit
    /// the trip.
    #[must_use]
    pub fn can_modify_item(&self, created_by: Uuid) -> bool {
        (self.can_access() && created_by == self.user_id) || self.can_edit()
    }
}
