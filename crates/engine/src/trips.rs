//! Trips and their derived statistics.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, EngineError, MoneyCents, ResultEngine,
    util::{normalize_optional_text, normalize_required},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
}

impl TripStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl TryFrom<&str> for TripStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::InvalidInput(format!(
                "invalid trip status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Trip {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: Option<MoneyCents>,
    pub currency: Currency,
    pub status: TripStatus,
    pub created_at: DateTime<Utc>,
}

/// Input for a new trip.
#[derive(Clone, Debug)]
pub struct NewTrip {
    pub name: String,
    pub description: Option<String>,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: Option<MoneyCents>,
    pub currency: Option<Currency>,
    /// Invited as pending participants; unknown addresses are skipped.
    pub participant_emails: Vec<String>,
}

/// Partial update of a trip. An empty description clears it.
#[derive(Clone, Debug, Default)]
pub struct TripUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub destination: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<MoneyCents>,
    pub currency: Option<Currency>,
    pub status: Option<TripStatus>,
}

fn validate_budget(budget: Option<MoneyCents>) -> ResultEngine<()> {
    if budget.is_some_and(MoneyCents::is_negative) {
        return Err(EngineError::InvalidInput(
            "budget must be >= 0".to_string(),
        ));
    }
    Ok(())
}

fn validate_range(start: NaiveDate, end: NaiveDate) -> ResultEngine<()> {
    if end < start {
        return Err(EngineError::InvalidInput(
            "end date must be on or after start date".to_string(),
        ));
    }
    Ok(())
}

impl Trip {
    /// Validate `input` and build an `active` trip owned by `owner_id`.
    pub(crate) fn create(owner_id: Uuid, input: &NewTrip, now: DateTime<Utc>) -> ResultEngine<Self> {
        let name = normalize_required(&input.name, "trip name", 255)?;
        let destination = normalize_required(&input.destination, "destination", 255)?;
        if input.start_date < now.date_naive() {
            return Err(EngineError::InvalidInput(
                "start date must be today or later".to_string(),
            ));
        }
        validate_range(input.start_date, input.end_date)?;
        validate_budget(input.budget)?;

        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            description: normalize_optional_text(input.description.as_deref()),
            destination,
            start_date: input.start_date,
            end_date: input.end_date,
            budget: input.budget,
            currency: input.currency.unwrap_or_default(),
            status: TripStatus::Active,
            created_at: now,
        })
    }

    pub(crate) fn apply(&mut self, update: &TripUpdate) -> ResultEngine<()> {
        if let Some(name) = &update.name {
            self.name = normalize_required(name, "trip name", 255)?;
        }
        if let Some(description) = &update.description {
            self.description = normalize_optional_text(Some(description));
        }
        if let Some(destination) = &update.destination {
            self.destination = normalize_required(destination, "destination", 255)?;
        }
        let start = update.start_date.unwrap_or(self.start_date);
        let end = update.end_date.unwrap_or(self.end_date);
        validate_range(start, end)?;
        self.start_date = start;
        self.end_date = end;
        if update.budget.is_some() {
            validate_budget(update.budget)?;
            self.budget = update.budget;
        }
        if let Some(currency) = update.currency {
            self.currency = currency;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        Ok(())
    }

    /// Both dates inclusive.
    #[must_use]
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    fn start_instant(&self) -> DateTime<Utc> {
        self.start_date.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    fn end_instant(&self) -> DateTime<Utc> {
        self.end_date.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    #[must_use]
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start_instant() > now
    }

    #[must_use]
    pub fn is_ongoing(&self, now: DateTime<Utc>) -> bool {
        self.start_instant() < now && self.end_instant() > now
    }

    #[must_use]
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.end_instant() < now
    }
}

/// Numbers derived from a trip and its expenses. The lifecycle flags ignore
/// `status`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TripStats {
    pub duration_days: i64,
    /// Every expense counts, whatever its status.
    pub total_expenses: MoneyCents,
    /// `None` when the trip has no budget.
    pub remaining_budget: Option<MoneyCents>,
    pub is_upcoming: bool,
    pub is_ongoing: bool,
    pub is_past: bool,
}

impl TripStats {
    pub fn compute(
        trip: &Trip,
        amounts: impl IntoIterator<Item = MoneyCents>,
        now: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        let total_expenses = MoneyCents::checked_total(amounts)?;
        let remaining_budget = trip
            .budget
            .map(|budget| budget.try_sub(total_expenses))
            .transpose()?;
        Ok(Self {
            duration_days: trip.duration_days(),
            total_expenses,
            remaining_budget,
            is_upcoming: trip.is_upcoming(now),
            is_ongoing: trip.is_ongoing(now),
            is_past: trip.is_past(now),
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "trips")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub destination: String,
    pub start_date: Date,
    pub end_date: Date,
    pub budget_minor: Option<i64>,
    pub currency: String,
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Owner,
    #[sea_orm(has_many = "super::participants::Entity")]
    Participants,
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
    #[sea_orm(has_many = "super::itineraries::Entity")]
    Itineraries,
    #[sea_orm(has_many = "super::messages::Entity")]
    Messages,
}

impl Related<super::participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::itineraries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Itineraries.def()
    }
}

impl Related<super::messages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Trip {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            owner_id: model.owner_id,
            name: model.name,
            description: model.description,
            destination: model.destination,
            start_date: model.start_date,
            end_date: model.end_date,
            budget: model.budget_minor.map(MoneyCents::new),
            currency: Currency::try_from(model.currency.as_str())?,
            status: TripStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
        })
    }
}

impl From<&Trip> for ActiveModel {
    fn from(value: &Trip) -> Self {
        Self {
            id: ActiveValue::Set(value.id),
            owner_id: ActiveValue::Set(value.owner_id),
            name: ActiveValue::Set(value.name.clone()),
            description: ActiveValue::Set(value.description.clone()),
            destination: ActiveValue::Set(value.destination.clone()),
            start_date: ActiveValue::Set(value.start_date),
            end_date: ActiveValue::Set(value.end_date),
            budget_minor: ActiveValue::Set(value.budget.map(MoneyCents::cents)),
            currency: ActiveValue::Set(value.currency.code().to_string()),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn trip(start: NaiveDate, end: NaiveDate, budget: Option<i64>) -> Trip {
        Trip {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Lisbon".to_string(),
            description: None,
            destination: "Portugal".to_string(),
            start_date: start,
            end_date: end,
            budget: budget.map(MoneyCents::new),
            currency: Currency::USD,
            status: TripStatus::Active,
            created_at: Utc::now(),
        }
    }

    fn new_trip(start: NaiveDate, end: NaiveDate) -> NewTrip {
        NewTrip {
            name: " Lisbon ".to_string(),
            description: Some("  ".to_string()),
            destination: "Portugal".to_string(),
            start_date: start,
            end_date: end,
            budget: None,
            currency: None,
            participant_emails: Vec::new(),
        }
    }

    #[test]
    fn duration_is_inclusive() {
        let t = trip(date(2025, 1, 1), date(2025, 1, 3), None);
        assert_eq!(t.duration_days(), 3);
        let single = trip(date(2025, 1, 1), date(2025, 1, 1), None);
        assert_eq!(single.duration_days(), 1);
    }

    #[test]
    fn remaining_budget_is_none_without_budget() {
        let now = Utc::now();
        let t = trip(date(2025, 1, 1), date(2025, 1, 3), None);
        let stats = TripStats::compute(&t, [MoneyCents::new(500)], now).unwrap();
        assert_eq!(stats.total_expenses, MoneyCents::new(500));
        assert_eq!(stats.remaining_budget, None);

        let budgeted = trip(date(2025, 1, 1), date(2025, 1, 3), Some(1_000));
        let stats = TripStats::compute(
            &budgeted,
            [MoneyCents::new(500), MoneyCents::new(700)],
            now,
        )
        .unwrap();
        assert_eq!(stats.remaining_budget, Some(MoneyCents::new(-200)));
    }

    #[test]
    fn overflowing_totals_are_rejected() {
        let now = Utc::now();
        let t = trip(date(2025, 1, 1), date(2025, 1, 3), None);
        let err = TripStats::compute(&t, [MoneyCents::new(i64::MAX), MoneyCents::new(1)], now)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));

        let in_debt = trip(date(2025, 1, 1), date(2025, 1, 3), Some(-2));
        assert!(TripStats::compute(&in_debt, [MoneyCents::new(i64::MAX)], now).is_err());
    }

    #[test]
    fn lifecycle_flags_compare_against_midnight() {
        let t = trip(date(2025, 1, 10), date(2025, 1, 12), None);

        let before = Utc.with_ymd_and_hms(2025, 1, 9, 23, 0, 0).unwrap();
        assert!(t.is_upcoming(before));
        assert!(!t.is_ongoing(before));
        assert!(!t.is_past(before));

        let during = Utc.with_ymd_and_hms(2025, 1, 11, 12, 0, 0).unwrap();
        assert!(!t.is_upcoming(during));
        assert!(t.is_ongoing(during));
        assert!(!t.is_past(during));

        let last_day = Utc.with_ymd_and_hms(2025, 1, 12, 8, 0, 0).unwrap();
        assert!(!t.is_ongoing(last_day));
        assert!(t.is_past(last_day));
    }

    #[test]
    fn create_validates_dates_and_defaults_currency() {
        let now = Utc.with_ymd_and_hms(2025, 1, 5, 9, 0, 0).unwrap();
        let owner = Uuid::new_v4();

        let created = Trip::create(owner, &new_trip(date(2025, 1, 5), date(2025, 1, 7)), now)
            .unwrap();
        assert_eq!(created.name, "Lisbon");
        assert_eq!(created.description, None);
        assert_eq!(created.currency, Currency::USD);
        assert_eq!(created.status, TripStatus::Active);

        let past = Trip::create(owner, &new_trip(date(2025, 1, 4), date(2025, 1, 7)), now);
        assert!(matches!(past, Err(EngineError::InvalidInput(_))));

        let reversed = Trip::create(owner, &new_trip(date(2025, 1, 8), date(2025, 1, 7)), now);
        assert!(matches!(reversed, Err(EngineError::InvalidInput(_))));
    }

    #[test]
    fn update_revalidates_range() {
        let mut t = trip(date(2025, 1, 10), date(2025, 1, 12), Some(100));
        let err = t
            .apply(&TripUpdate {
                end_date: Some(date(2025, 1, 9)),
                ..TripUpdate::default()
            })
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));

        t.apply(&TripUpdate {
            status: Some(TripStatus::Completed),
            budget: Some(MoneyCents::new(5_000)),
            ..TripUpdate::default()
        })
        .unwrap();
        assert_eq!(t.status, TripStatus::Completed);
        assert_eq!(t.budget, Some(MoneyCents::new(5_000)));
    }
}
