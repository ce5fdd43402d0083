//! Trip membership: one record per (trip, user) with a role and a status.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Organizer,
    Participant,
    Viewer,
}

impl ParticipantRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Organizer => "organizer",
            Self::Participant => "participant",
            Self::Viewer => "viewer",
        }
    }
}

impl TryFrom<&str> for ParticipantRole {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "organizer" => Ok(Self::Organizer),
            "participant" => Ok(Self::Participant),
            "viewer" => Ok(Self::Viewer),
            other => Err(EngineError::InvalidInput(format!(
                "invalid participant role: {other}"
            ))),
        }
    }
}

/// Invitation lifecycle: `pending` moves to `accepted` or `declined`, never
/// back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    Pending,
    Accepted,
    Declined,
}

impl ParticipantStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }
}

impl TryFrom<&str> for ParticipantStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            other => Err(EngineError::InvalidInput(format!(
                "invalid participant status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Participant {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub user_id: Uuid,
    pub role: ParticipantRole,
    pub status: ParticipantStatus,
    pub invited_at: Option<DateTime<Utc>>,
    pub joined_at: Option<DateTime<Utc>>,
}

impl Participant {
    /// Accepted organizers keep a trip manageable; at least one must exist.
    #[must_use]
    pub fn is_accepted_organizer(&self) -> bool {
        self.role == ParticipantRole::Organizer && self.status == ParticipantStatus::Accepted
    }

    /// Move a pending invitation forward. Anything but `pending` has no
    /// outgoing transition.
    pub(crate) fn respond(
        &mut self,
        target: ParticipantStatus,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        if target == ParticipantStatus::Pending {
            return Err(EngineError::InvalidInput(
                "status cannot go back to pending".to_string(),
            ));
        }
        if self.status != ParticipantStatus::Pending {
            return Err(EngineError::KeyNotFound(
                "pending invitation not exists".to_string(),
            ));
        }
        match target {
            ParticipantStatus::Pending => Ok(()),
            ParticipantStatus::Accepted => {
                self.status = ParticipantStatus::Accepted;
                self.joined_at = Some(now);
                Ok(())
            }
            ParticipantStatus::Declined => {
                self.status = ParticipantStatus::Declined;
                Ok(())
            }
        }
    }
}

/// Partial update of a participant record.
#[derive(Clone, Debug, Default)]
pub struct ParticipantUpdate {
    pub role: Option<ParticipantRole>,
    pub status: Option<ParticipantStatus>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "trip_participants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub trip_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub status: String,
    pub invited_at: Option<DateTimeUtc>,
    pub joined_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::trips::Entity",
        from = "Column::TripId",
        to = "super::trips::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Trips,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::trips::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trips.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Participant {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            trip_id: model.trip_id,
            user_id: model.user_id,
            role: ParticipantRole::try_from(model.role.as_str())?,
            status: ParticipantStatus::try_from(model.status.as_str())?,
            invited_at: model.invited_at,
            joined_at: model.joined_at,
        })
    }
}

impl From<&Participant> for ActiveModel {
    fn from(value: &Participant) -> Self {
        Self {
            id: ActiveValue::Set(value.id),
            trip_id: ActiveValue::Set(value.trip_id),
            user_id: ActiveValue::Set(value.user_id),
            role: ActiveValue::Set(value.role.as_str().to_string()),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            invited_at: ActiveValue::Set(value.invited_at),
            joined_at: ActiveValue::Set(value.joined_at),
        }
    }
}
