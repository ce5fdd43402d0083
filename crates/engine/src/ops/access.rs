use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Membership, Participant, ResultEngine, Trip, TripAccess, participants, trips,
};

use super::Engine;

/// A trip plus the caller's standing on it, loaded once per operation.
pub(super) struct TripContext {
    pub(super) trip: Trip,
    pub(super) access: TripAccess,
    pub(super) participant: Option<Participant>,
}

impl TripContext {
    fn require(&self, allowed: bool, action: &str) -> ResultEngine<&Self> {
        if !allowed {
            return Err(EngineError::Forbidden(format!(
                "{action} on trip {}",
                self.trip.id
            )));
        }
        Ok(self)
    }

    pub(super) fn require_view(&self) -> ResultEngine<&Self> {
        self.require(self.access.can_view(), "view")
    }

    pub(super) fn require_access(&self) -> ResultEngine<&Self> {
        self.require(self.access.can_access(), "access")
    }

    pub(super) fn require_edit(&self) -> ResultEngine<&Self> {
        self.require(self.access.can_edit(), "edit")
    }

    pub(super) fn require_manage_participants(&self) -> ResultEngine<&Self> {
        self.require(self.access.can_manage_participants(), "manage participants")
    }

    pub(super) fn require_owner(&self) -> ResultEngine<&Self> {
        self.require(self.access.is_owner(), "owner action")
    }

    pub(super) fn require_item_owner(&self, created_by: Uuid) -> ResultEngine<&Self> {
        self.require(self.access.can_modify_item(created_by), "modify item")
    }
}

impl Engine {
    pub(super) async fn require_trip(
        &self,
        db: &DatabaseTransaction,
        trip_id: Uuid,
    ) -> ResultEngine<Trip> {
        trips::Entity::find_by_id(trip_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("trip not exists".to_string()))?
            .try_into()
    }

    pub(super) async fn participant_of(
        &self,
        db: &DatabaseTransaction,
        trip_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Option<Participant>> {
        participants::Entity::find()
            .filter(participants::Column::TripId.eq(trip_id))
            .filter(participants::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .map(Participant::try_from)
            .transpose()
    }

    pub(super) async fn trip_context(
        &self,
        db: &DatabaseTransaction,
        trip_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<TripContext> {
        let trip = self.require_trip(db, trip_id).await?;
        let participant = self.participant_of(db, trip_id, user_id).await?;
        let access = TripAccess::new(
            trip.owner_id,
            user_id,
            participant.as_ref().map(Membership::from),
        );
        Ok(TripContext {
            trip,
            access,
            participant,
        })
    }
}
