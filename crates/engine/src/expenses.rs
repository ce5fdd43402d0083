//! Expenses and the split calculator.
//!
//! A shared expense carries a [`Split`] describing how its amount is
//! apportioned. The split is stored in two nullable columns, `split_type`
//! and `split_data` (JSON without the tag):
//!
//! | `split_type` | `split_data`                          |
//! |--------------|---------------------------------------|
//! | `equal`      | `{"participants": [user_id, ...]}`    |
//! | `custom`     | `{"amounts": {user_id: minor, ...}}`  |
//! | `percentage` | `{"percentages": {user_id: pct, ...}}`|
//!
//! Decoding never fails: an unknown type or a malformed payload reads back
//! as no split, and no split owes nothing.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    Currency, EngineError, MoneyCents, ResultEngine,
    util::{normalize_optional_text, normalize_required},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    Pending,
    #[default]
    Approved,
    Rejected,
}

impl ExpenseStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl TryFrom<&str> for ExpenseStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(EngineError::InvalidInput(format!(
                "invalid expense status: {other}"
            ))),
        }
    }
}

/// How a shared expense is apportioned among users.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Split {
    /// Every listed user owes `amount / len`. Duplicates count.
    Equal { participants: Vec<Uuid> },
    /// Absolute amounts in minor units.
    Custom { amounts: BTreeMap<Uuid, i64> },
    /// Percentages in `0..=100`.
    Percentage { percentages: BTreeMap<Uuid, f64> },
}

impl Split {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Equal { .. } => "equal",
            Self::Custom { .. } => "custom",
            Self::Percentage { .. } => "percentage",
        }
    }

    /// Share of `amount` owed by `user`. Never fails; absent users owe 0.
    #[must_use]
    pub fn owed(&self, amount: MoneyCents, user: Uuid) -> MoneyCents {
        match self {
            Self::Equal { participants } => amount.share_of(participants.len()),
            Self::Custom { amounts } => amounts
                .get(&user)
                .copied()
                .map(MoneyCents::new)
                .unwrap_or(MoneyCents::ZERO),
            Self::Percentage { percentages } => percentages
                .get(&user)
                .map(|pct| amount.percent(*pct))
                .unwrap_or(MoneyCents::ZERO),
        }
    }

    /// Shape checks only; sums are not compared with the expense amount.
    pub(crate) fn validate(&self) -> ResultEngine<()> {
        match self {
            Self::Equal { .. } => Ok(()),
            Self::Custom { amounts } => {
                if amounts.values().any(|amount| *amount < 0) {
                    return Err(EngineError::InvalidInput(
                        "custom split amounts must be >= 0".to_string(),
                    ));
                }
                Ok(())
            }
            Self::Percentage { percentages } => {
                if percentages
                    .values()
                    .any(|pct| !pct.is_finite() || !(0.0..=100.0).contains(pct))
                {
                    return Err(EngineError::InvalidInput(
                        "split percentages must be between 0 and 100".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Split into the stored `(split_type, split_data)` pair.
    pub(crate) fn encode(&self) -> ResultEngine<(String, String)> {
        let mut value = serde_json::to_value(self)
            .map_err(|err| EngineError::InvalidInput(format!("invalid split: {err}")))?;
        if let Value::Object(map) = &mut value {
            map.remove("type");
        }
        Ok((self.kind().to_string(), value.to_string()))
    }

    /// Rebuild a split from its stored columns.
    #[must_use]
    pub fn decode(split_type: Option<&str>, split_data: Option<&str>) -> Option<Split> {
        let kind = split_type?;
        let mut value: Value = serde_json::from_str(split_data?).ok()?;
        let Value::Object(map) = &mut value else {
            return None;
        };
        map.insert("type".to_string(), Value::String(kind.to_string()));
        match serde_json::from_value(value) {
            Ok(split) => Some(split),
            Err(err) => {
                tracing::debug!("ignoring malformed split_data for '{kind}': {err}");
                None
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Expense {
    pub id: Uuid,
    pub trip_id: Uuid,
    /// Creator and payer.
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub amount: MoneyCents,
    pub currency: Currency,
    pub expense_date: NaiveDate,
    pub receipt_url: Option<String>,
    pub is_shared: bool,
    pub split: Option<Split>,
    pub status: ExpenseStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewExpense {
    pub category_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub amount: MoneyCents,
    /// Defaults to the trip currency.
    pub currency: Option<Currency>,
    pub expense_date: NaiveDate,
    pub receipt_url: Option<String>,
    pub is_shared: bool,
    pub split: Option<Split>,
    /// Defaults to `approved`.
    pub status: Option<ExpenseStatus>,
}

/// Partial update of an expense. Turning `is_shared` off drops the split.
#[derive(Clone, Debug, Default)]
pub struct ExpenseUpdate {
    pub category_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub amount: Option<MoneyCents>,
    pub currency: Option<Currency>,
    pub expense_date: Option<NaiveDate>,
    pub receipt_url: Option<String>,
    pub is_shared: Option<bool>,
    pub split: Option<Split>,
    pub status: Option<ExpenseStatus>,
}

fn validate_amount(amount: MoneyCents) -> ResultEngine<()> {
    if amount.is_negative() {
        return Err(EngineError::InvalidInput(
            "amount must be >= 0".to_string(),
        ));
    }
    Ok(())
}

fn validate_split(is_shared: bool, split: Option<&Split>) -> ResultEngine<()> {
    match split {
        Some(_) if !is_shared => Err(EngineError::InvalidInput(
            "split requires a shared expense".to_string(),
        )),
        Some(split) => split.validate(),
        None => Ok(()),
    }
}

impl Expense {
    pub(crate) fn create(
        trip_id: Uuid,
        user_id: Uuid,
        trip_currency: Currency,
        input: &NewExpense,
        now: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        let title = normalize_required(&input.title, "title", 255)?;
        validate_amount(input.amount)?;
        validate_split(input.is_shared, input.split.as_ref())?;

        Ok(Self {
            id: Uuid::new_v4(),
            trip_id,
            user_id,
            category_id: input.category_id,
            title,
            description: normalize_optional_text(input.description.as_deref()),
            amount: input.amount,
            currency: input.currency.unwrap_or(trip_currency),
            expense_date: input.expense_date,
            receipt_url: normalize_optional_text(input.receipt_url.as_deref()),
            is_shared: input.is_shared,
            split: input.split.clone(),
            status: input.status.unwrap_or_default(),
            created_at: now,
        })
    }

    pub(crate) fn apply(&mut self, update: &ExpenseUpdate) -> ResultEngine<()> {
        if let Some(category_id) = update.category_id {
            self.category_id = category_id;
        }
        if let Some(title) = &update.title {
            self.title = normalize_required(title, "title", 255)?;
        }
        if let Some(description) = &update.description {
            self.description = normalize_optional_text(Some(description));
        }
        if let Some(amount) = update.amount {
            validate_amount(amount)?;
            self.amount = amount;
        }
        if let Some(currency) = update.currency {
            self.currency = currency;
        }
        if let Some(expense_date) = update.expense_date {
            self.expense_date = expense_date;
        }
        if let Some(receipt_url) = &update.receipt_url {
            self.receipt_url = normalize_optional_text(Some(receipt_url));
        }
        if let Some(is_shared) = update.is_shared {
            self.is_shared = is_shared;
            if !is_shared {
                self.split = None;
            }
        }
        if let Some(split) = &update.split {
            validate_split(self.is_shared, Some(split))?;
            self.split = Some(split.clone());
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        Ok(())
    }

    /// Portion of this expense owed by `user`.
    #[must_use]
    pub fn owed_by(&self, user: Uuid) -> MoneyCents {
        if !self.is_shared {
            return MoneyCents::ZERO;
        }
        self.split
            .as_ref()
            .map(|split| split.owed(self.amount, user))
            .unwrap_or(MoneyCents::ZERO)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub trip_id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
    pub expense_date: Date,
    pub receipt_url: Option<String>,
    pub is_shared: bool,
    pub split_type: Option<String>,
    pub split_data: Option<String>,
    pub status: String,
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
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Categories,
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

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let split = Split::decode(model.split_type.as_deref(), model.split_data.as_deref());
        Ok(Self {
            id: model.id,
            trip_id: model.trip_id,
            user_id: model.user_id,
            category_id: model.category_id,
            title: model.title,
            description: model.description,
            amount: MoneyCents::new(model.amount_minor),
            currency: Currency::try_from(model.currency.as_str())?,
            expense_date: model.expense_date,
            receipt_url: model.receipt_url,
            is_shared: model.is_shared,
            split,
            status: ExpenseStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
        })
    }
}

impl TryFrom<&Expense> for ActiveModel {
    type Error = EngineError;

    fn try_from(value: &Expense) -> Result<Self, Self::Error> {
        let (split_type, split_data) = match &value.split {
            Some(split) => {
                let (kind, data) = split.encode()?;
                (Some(kind), Some(data))
            }
            None => (None, None),
        };
        Ok(Self {
            id: ActiveValue::Set(value.id),
            trip_id: ActiveValue::Set(value.trip_id),
            user_id: ActiveValue::Set(value.user_id),
            category_id: ActiveValue::Set(value.category_id),
            title: ActiveValue::Set(value.title.clone()),
            description: ActiveValue::Set(value.description.clone()),
            amount_minor: ActiveValue::Set(value.amount.cents()),
            currency: ActiveValue::Set(value.currency.code().to_string()),
            expense_date: ActiveValue::Set(value.expense_date),
            receipt_url: ActiveValue::Set(value.receipt_url.clone()),
            is_shared: ActiveValue::Set(value.is_shared),
            split_type: ActiveValue::Set(split_type),
            split_data: ActiveValue::Set(split_data),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            created_at: ActiveValue::Set(value.created_at),
        })
    }
}
