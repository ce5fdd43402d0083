//! Trip chat messages.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::{ResultEngine, util::normalize_required};

pub(crate) const MAX_MESSAGE_CHARS: usize = 1000;
pub(crate) const DEFAULT_PAGE: u64 = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessageAuthor {
    pub id: Uuid,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub user: MessageAuthor,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub(crate) fn from_model(model: Model, author: MessageAuthor) -> Self {
        Self {
            id: model.id,
            trip_id: model.trip_id,
            user: author,
            message: model.message,
            created_at: model.created_at,
        }
    }
}

pub(crate) fn normalize_message(text: &str) -> ResultEngine<String> {
    normalize_required(text, "message", MAX_MESSAGE_CHARS)
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "trip_messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub trip_id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub created_at: DateTimeUtc,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_trimmed_and_bounded() {
        assert_eq!(normalize_message("  hi there ").unwrap(), "hi there");
        assert!(normalize_message("   ").is_err());
        assert!(normalize_message(&"x".repeat(MAX_MESSAGE_CHARS)).is_ok());
        assert!(normalize_message(&"x".repeat(MAX_MESSAGE_CHARS + 1)).is_err());
    }
}
