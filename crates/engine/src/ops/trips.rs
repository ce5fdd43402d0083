use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sea_orm::{
    Condition, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    EngineError, Expense, ItineraryItem, MessageAuthor, MoneyCents, NewTrip, Participant,
    ParticipantRole, ParticipantStatus, ResultEngine, Trip, TripStats, TripUpdate, expenses,
    itineraries, messages, participants, trips, users,
};

use super::{Engine, with_tx};

const RECENT_ITEMS: u64 = 5;

/// Trips a user works on, plus the ones they are invited to.
#[derive(Clone, Debug, Serialize)]
pub struct TripListing {
    /// Owned or accepted, latest start date first.
    pub trips: Vec<Trip>,
    pub pending_invitations: Vec<PendingInvitation>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PendingInvitation {
    pub participant: Participant,
    pub trip: Trip,
    pub owner: MessageAuthor,
}

#[derive(Clone, Debug, Serialize)]
pub struct TripSummary {
    pub trip: Trip,
    pub stats: TripStats,
    pub participants_count: u64,
    pub itinerary_count: u64,
    pub expense_count: u64,
    pub recent_expenses: Vec<Expense>,
    pub recent_itineraries: Vec<ItineraryItem>,
}

impl Engine {
    /// Create a trip owned by `owner_id`, who joins as accepted organizer.
    ///
    /// Each e-mail in `participant_emails` is invited as a pending participant.
    /// Unknown e-mails, the owner's own address and duplicates are skipped.
    pub async fn create_trip(
        &self,
        owner_id: Uuid,
        input: NewTrip,
        now: DateTime<Utc>,
    ) -> ResultEngine<Trip> {
        let trip = Trip::create(owner_id, &input, now)?;

        with_tx!(self, |db_tx| {
            let owner = users::Entity::find_by_id(owner_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;

            trips::ActiveModel::from(&trip).insert(&db_tx).await?;

            let organizer = Participant {
                id: Uuid::new_v4(),
                trip_id: trip.id,
                user_id: owner_id,
                role: ParticipantRole::Organizer,
                status: ParticipantStatus::Accepted,
                invited_at: Some(now),
                joined_at: Some(now),
            };
            participants::ActiveModel::from(&organizer)
                .insert(&db_tx)
                .await?;

            let mut invited = HashSet::from([owner.id]);
            for email in &input.participant_emails {
                let email = email.trim().to_lowercase();
                let Some(user) = users::Entity::find()
                    .filter(users::Column::Email.eq(email.clone()))
                    .one(&db_tx)
                    .await?
                else {
                    tracing::debug!("skipping invite for unknown e-mail {email}");
                    continue;
                };
                if !invited.insert(user.id) {
                    continue;
                }
                let participant = Participant {
                    id: Uuid::new_v4(),
                    trip_id: trip.id,
                    user_id: user.id,
                    role: ParticipantRole::Participant,
                    status: ParticipantStatus::Pending,
                    invited_at: Some(now),
                    joined_at: None,
                };
                participants::ActiveModel::from(&participant)
                    .insert(&db_tx)
                    .await?;
            }

            tracing::info!("created trip {} for {owner_id}", trip.id);
            Ok(trip)
        })
    }

    pub async fn list_trips(&self, user_id: Uuid) -> ResultEngine<TripListing> {
        with_tx!(self, |db_tx| {
            let accepted: Vec<Uuid> = participants::Entity::find()
                .select_only()
                .column(participants::Column::TripId)
                .filter(participants::Column::UserId.eq(user_id))
                .filter(participants::Column::Status.eq(ParticipantStatus::Accepted.as_str()))
                .into_tuple()
                .all(&db_tx)
                .await?;

            let trips = trips::Entity::find()
                .filter(
                    Condition::any()
                        .add(trips::Column::OwnerId.eq(user_id))
                        .add(trips::Column::Id.is_in(accepted)),
                )
                .order_by_desc(trips::Column::StartDate)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Trip::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            let pending_invitations = self.pending_invitations_in(&db_tx, user_id, None).await?;

            Ok(TripListing {
                trips,
                pending_invitations,
            })
        })
    }

    pub async fn trip(&self, trip_id: Uuid, user_id: Uuid) -> ResultEngine<Trip> {
        with_tx!(self, |db_tx| {
            let ctx = self.trip_context(&db_tx, trip_id, user_id).await?;
            ctx.require_access()?;
            Ok(ctx.trip)
        })
    }

    pub async fn update_trip(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
        update: TripUpdate,
    ) -> ResultEngine<Trip> {
        with_tx!(self, |db_tx| {
            let ctx = self.trip_context(&db_tx, trip_id, user_id).await?;
            ctx.require_edit()?;
            let mut trip = ctx.trip;
            trip.apply(&update)?;
            trips::ActiveModel::from(&trip).update(&db_tx).await?;
            Ok(trip)
        })
    }

    /// Owner only. Removes the trip with its participants, expenses,
    /// itinerary and messages.
    pub async fn delete_trip(&self, trip_id: Uuid, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let ctx = self.trip_context(&db_tx, trip_id, user_id).await?;
            ctx.require_owner()?;

            messages::Entity::delete_many()
                .filter(messages::Column::TripId.eq(trip_id))
                .exec(&db_tx)
                .await?;
            expenses::Entity::delete_many()
                .filter(expenses::Column::TripId.eq(trip_id))
                .exec(&db_tx)
                .await?;
            itineraries::Entity::delete_many()
                .filter(itineraries::Column::TripId.eq(trip_id))
                .exec(&db_tx)
                .await?;
            participants::Entity::delete_many()
                .filter(participants::Column::TripId.eq(trip_id))
                .exec(&db_tx)
                .await?;
            trips::Entity::delete_by_id(trip_id).exec(&db_tx).await?;

            tracing::info!("deleted trip {trip_id}");
            Ok(())
        })
    }

    pub async fn trip_summary(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> ResultEngine<TripSummary> {
        with_tx!(self, |db_tx| {
            let ctx = self.trip_context(&db_tx, trip_id, user_id).await?;
            ctx.require_access()?;

            let amounts: Vec<i64> = expenses::Entity::find()
                .select_only()
                .column(expenses::Column::AmountMinor)
                .filter(expenses::Column::TripId.eq(trip_id))
                .into_tuple()
                .all(&db_tx)
                .await?;
            let expense_count = amounts.len() as u64;
            let stats = TripStats::compute(
                &ctx.trip,
                amounts.into_iter().map(MoneyCents::new),
                now,
            )?;

            let participants_count = participants::Entity::find()
                .filter(participants::Column::TripId.eq(trip_id))
                .filter(participants::Column::Status.eq(ParticipantStatus::Accepted.as_str()))
                .count(&db_tx)
                .await?;
            let itinerary_count = itineraries::Entity::find()
                .filter(itineraries::Column::TripId.eq(trip_id))
                .count(&db_tx)
                .await?;

            let recent_expenses = expenses::Entity::find()
                .filter(expenses::Column::TripId.eq(trip_id))
                .order_by_desc(expenses::Column::CreatedAt)
                .limit(RECENT_ITEMS)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Expense::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            let recent_itineraries = itineraries::Entity::find()
                .filter(itineraries::Column::TripId.eq(trip_id))
                .order_by_desc(itineraries::Column::CreatedAt)
                .limit(RECENT_ITEMS)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(ItineraryItem::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            Ok(TripSummary {
                trip: ctx.trip,
                stats,
                participants_count,
                itinerary_count,
                expense_count,
                recent_expenses,
                recent_itineraries,
            })
        })
    }

    /// Pending invitations of `user_id`, each with its trip.
    pub async fn pending_invitations(
        &self,
        user_id: Uuid,
    ) -> ResultEngine<Vec<PendingInvitation>> {
        with_tx!(self, |db_tx| {
            self.pending_invitations_in(&db_tx, user_id, None).await
        })
    }

    /// The trip a pending invitation points to, visible before accepting.
    pub async fn pending_invitation_trip(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<PendingInvitation> {
        with_tx!(self, |db_tx| {
            self.pending_invitations_in(&db_tx, user_id, Some(trip_id))
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| {
                    EngineError::KeyNotFound("pending invitation not exists".to_string())
                })
        })
    }

    async fn pending_invitations_in(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
        trip_id: Option<Uuid>,
    ) -> ResultEngine<Vec<PendingInvitation>> {
        let mut query = participants::Entity::find()
            .filter(participants::Column::UserId.eq(user_id))
            .filter(participants::Column::Status.eq(ParticipantStatus::Pending.as_str()));
        if let Some(trip_id) = trip_id {
            query = query.filter(participants::Column::TripId.eq(trip_id));
        }
        let rows = query
            .find_also_related(trips::Entity)
            .order_by_desc(participants::Column::InvitedAt)
            .all(db)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for (participant, trip) in rows {
            let Some(trip) = trip else {
                continue;
            };
            let owner = users::Entity::find_by_id(trip.owner_id)
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
            out.push(PendingInvitation {
                participant: participant.try_into()?,
                trip: trip.try_into()?,
                owner: MessageAuthor {
                    id: owner.id,
                    name: owner.name,
                },
            });
        }
        Ok(out)
    }
}
