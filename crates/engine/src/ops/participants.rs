//! Participant lifecycle: invitations, responses, role changes, removal.
//!
//! Every change that could demote or remove an accepted organizer counts the
//! remaining ones inside the same transaction; the last one cannot go.

use chrono::{DateTime, Utc};
use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    EngineError, Participant, ParticipantRole, ParticipantStatus, ParticipantUpdate,
    ResultEngine, participants, users,
};

use super::{Engine, with_tx};

/// A participant record with the member's public profile.
#[derive(Clone, Debug, Serialize)]
pub struct ParticipantDetails {
    #[serde(flatten)]
    pub participant: Participant,
    pub name: String,
    pub email: String,
}

impl Engine {
    /// Participants of a trip. A caller whose own invitation is still
    /// pending sees only their own record.
    pub async fn list_participants(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Vec<ParticipantDetails>> {
        with_tx!(self, |db_tx| {
            let ctx = self.trip_context(&db_tx, trip_id, user_id).await?;
            let own_pending = ctx
                .participant
                .as_ref()
                .is_some_and(|p| p.status == ParticipantStatus::Pending);
            if !own_pending {
                ctx.require_access()?;
            }

            let mut query = participants::Entity::find()
                .filter(participants::Column::TripId.eq(trip_id));
            if own_pending && !ctx.access.is_owner() {
                query = query.filter(participants::Column::UserId.eq(user_id));
            }
            let rows = query
                .find_also_related(users::Entity)
                .order_by_asc(participants::Column::InvitedAt)
                .all(&db_tx)
                .await?;

            rows.into_iter()
                .map(|(participant, user)| -> ResultEngine<ParticipantDetails> {
                    let user = user
                        .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
                    Ok(ParticipantDetails {
                        participant: participant.try_into()?,
                        name: user.name,
                        email: user.email,
                    })
                })
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    pub async fn invite_participant(
        &self,
        trip_id: Uuid,
        actor_id: Uuid,
        email: &str,
        role: ParticipantRole,
        now: DateTime<Utc>,
    ) -> ResultEngine<Participant> {
        with_tx!(self, |db_tx| {
            let ctx = self.trip_context(&db_tx, trip_id, actor_id).await?;
            ctx.require_manage_participants()?;

            let email = email.trim().to_lowercase();
            let invitee = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(email.clone()))?;

            if self.participant_of(&db_tx, trip_id, invitee.id).await?.is_some() {
                return Err(EngineError::ExistingKey(email));
            }

            let participant = Participant {
                id: Uuid::new_v4(),
                trip_id,
                user_id: invitee.id,
                role,
                status: ParticipantStatus::Pending,
                invited_at: Some(now),
                joined_at: None,
            };
            participants::ActiveModel::from(&participant)
                .insert(&db_tx)
                .await?;
            tracing::info!("invited {} to trip {trip_id}", invitee.id);
            Ok(participant)
        })
    }

    pub async fn accept_invitation(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> ResultEngine<Participant> {
        self.respond_to_invitation(trip_id, user_id, ParticipantStatus::Accepted, now)
            .await
    }

    pub async fn decline_invitation(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> ResultEngine<Participant> {
        self.respond_to_invitation(trip_id, user_id, ParticipantStatus::Declined, now)
            .await
    }

    async fn respond_to_invitation(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
        target: ParticipantStatus,
        now: DateTime<Utc>,
    ) -> ResultEngine<Participant> {
        with_tx!(self, |db_tx| {
            let mut participant = self
                .participant_of(&db_tx, trip_id, user_id)
                .await?
                .filter(|p| p.status == ParticipantStatus::Pending)
                .ok_or_else(|| {
                    EngineError::KeyNotFound("pending invitation not exists".to_string())
                })?;
            participant.respond(target, now)?;
            participants::ActiveModel::from(&participant)
                .update(&db_tx)
                .await?;
            Ok(participant)
        })
    }

    /// Change a participant's role and/or status.
    ///
    /// The role needs participant-management rights. The status can only be
    /// set by the participant themself and follows the invitation rules.
    pub async fn update_participant(
        &self,
        trip_id: Uuid,
        actor_id: Uuid,
        participant_id: Uuid,
        update: ParticipantUpdate,
        now: DateTime<Utc>,
    ) -> ResultEngine<Participant> {
        if update.role.is_none() && update.status.is_none() {
            return Err(EngineError::InvalidInput(
                "nothing to update: provide role or status".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let ctx = self.trip_context(&db_tx, trip_id, actor_id).await?;
            let mut participant = self
                .require_participant(&db_tx, trip_id, participant_id)
                .await?;

            if update.role.is_some() {
                ctx.require_manage_participants()?;
            }
            if update.status.is_some() && participant.user_id != actor_id {
                return Err(EngineError::Forbidden(
                    "only the participant can change their own status".to_string(),
                ));
            }

            if let Some(status) = update.status {
                participant.respond(status, now)?;
            }
            if let Some(role) = update.role {
                if participant.is_accepted_organizer() && role != ParticipantRole::Organizer {
                    self.ensure_other_organizer(&db_tx, trip_id, participant.id)
                        .await?;
                }
                participant.role = role;
            }

            participants::ActiveModel::from(&participant)
                .update(&db_tx)
                .await?;
            Ok(participant)
        })
    }

    /// Remove a participant. Allowed to the participant themself and to
    /// whoever manages participants.
    pub async fn remove_participant(
        &self,
        trip_id: Uuid,
        actor_id: Uuid,
        participant_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let ctx = self.trip_context(&db_tx, trip_id, actor_id).await?;
            let participant = self
                .require_participant(&db_tx, trip_id, participant_id)
                .await?;
            if participant.user_id != actor_id {
                ctx.require_manage_participants()?;
            }
            if participant.is_accepted_organizer() {
                self.ensure_other_organizer(&db_tx, trip_id, participant.id)
                    .await?;
            }

            participants::Entity::delete_by_id(participant.id)
                .exec(&db_tx)
                .await?;
            tracing::info!("removed participant {participant_id} from trip {trip_id}");
            Ok(())
        })
    }

    async fn require_participant(
        &self,
        db: &DatabaseTransaction,
        trip_id: Uuid,
        participant_id: Uuid,
    ) -> ResultEngine<Participant> {
        participants::Entity::find_by_id(participant_id)
            .filter(participants::Column::TripId.eq(trip_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("participant not exists".to_string()))?
            .try_into()
    }

    /// Fail unless an accepted organizer other than `excluded` remains.
    async fn ensure_other_organizer(
        &self,
        db: &DatabaseTransaction,
        trip_id: Uuid,
        excluded: Uuid,
    ) -> ResultEngine<()> {
        let remaining = participants::Entity::find()
            .filter(participants::Column::TripId.eq(trip_id))
            .filter(participants::Column::Id.ne(excluded))
            .filter(participants::Column::Role.eq(ParticipantRole::Organizer.as_str()))
            .filter(participants::Column::Status.eq(ParticipantStatus::Accepted.as_str()))
            .count(db)
            .await?;
        if remaining == 0 {
            return Err(EngineError::InvariantViolation(
                "cannot remove last organizer".to_string(),
            ));
        }
        Ok(())
    }
}
