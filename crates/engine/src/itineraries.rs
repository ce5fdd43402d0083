//! Itinerary items of a trip.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{normalize_optional_text, normalize_required},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItineraryKind {
    Flight,
    Hotel,
    Meal,
    Activity,
    Transport,
    Meeting,
}

impl ItineraryKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flight => "flight",
            Self::Hotel => "hotel",
            Self::Meal => "meal",
            Self::Activity => "activity",
            Self::Transport => "transport",
            Self::Meeting => "meeting",
        }
    }
}

impl TryFrom<&str> for ItineraryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "flight" => Ok(Self::Flight),
            "hotel" => Ok(Self::Hotel),
            "meal" => Ok(Self::Meal),
            "activity" => Ok(Self::Activity),
            "transport" => Ok(Self::Transport),
            "meeting" => Ok(Self::Meeting),
            other => Err(EngineError::InvalidInput(format!(
                "invalid itinerary type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ItineraryItem {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub location: Option<String>,
    pub kind: ItineraryKind,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewItineraryItem {
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub location: Option<String>,
    pub kind: ItineraryKind,
    pub notes: Option<String>,
}

/// Partial update. Empty strings clear the optional text fields.
#[derive(Clone, Debug, Default)]
pub struct ItineraryUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub location: Option<String>,
    pub kind: Option<ItineraryKind>,
    pub notes: Option<String>,
}

impl ItineraryItem {
    pub(crate) fn create(
        trip_id: Uuid,
        user_id: Uuid,
        input: &NewItineraryItem,
        now: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            trip_id,
            user_id,
            title: normalize_required(&input.title, "title", 255)?,
            description: normalize_optional_text(input.description.as_deref()),
            date: input.date,
            time: input.time,
            location: normalize_optional_text(input.location.as_deref()),
            kind: input.kind,
            notes: normalize_optional_text(input.notes.as_deref()),
            created_at: now,
        })
    }

    pub(crate) fn apply(&mut self, update: &ItineraryUpdate) -> ResultEngine<()> {
        if let Some(title) = &update.title {
            self.title = normalize_required(title, "title", 255)?;
        }
        if let Some(description) = &update.description {
            self.description = normalize_optional_text(Some(description));
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if update.time.is_some() {
            self.time = update.time;
        }
        if let Some(location) = &update.location {
            self.location = normalize_optional_text(Some(location));
        }
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(notes) = &update.notes {
            self.notes = normalize_optional_text(Some(notes));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "itineraries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub trip_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub date: Date,
    pub time: Option<Time>,
    pub location: Option<String>,
    pub kind: String,
    pub notes: Option<String>,
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
}

impl Related<super::trips::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trips.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for ItineraryItem {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            trip_id: model.trip_id,
            user_id: model.user_id,
            title: model.title,
            description: model.description,
            date: model.date,
            time: model.time,
            location: model.location,
            kind: ItineraryKind::try_from(model.kind.as_str())?,
            notes: model.notes,
            created_at: model.created_at,
        })
    }
}

impl From<&ItineraryItem> for ActiveModel {
    fn from(value: &ItineraryItem) -> Self {
        Self {
            id: ActiveValue::Set(value.id),
            trip_id: ActiveValue::Set(value.trip_id),
            user_id: ActiveValue::Set(value.user_id),
            title: ActiveValue::Set(value.title.clone()),
            description: ActiveValue::Set(value.description.clone()),
            date: ActiveValue::Set(value.date),
            time: ActiveValue::Set(value.time),
            location: ActiveValue::Set(value.location.clone()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            notes: ActiveValue::Set(value.notes.clone()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}
