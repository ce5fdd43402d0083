use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    EngineError, Expense, ExpenseUpdate, MoneyCents, NewExpense, ResultEngine, categories,
    expenses, users,
};

use super::{Engine, with_tx};

const RECENT_EXPENSES: usize = 10;

/// Total and count for one group of expenses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GroupTotal {
    pub name: String,
    pub total: MoneyCents,
    pub count: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct ExpenseSummary {
    pub total: MoneyCents,
    pub remaining_budget: Option<MoneyCents>,
    pub expense_count: u64,
    pub by_category: Vec<GroupTotal>,
    pub by_user: Vec<GroupTotal>,
    pub recent: Vec<Expense>,
}

fn add_to_group(
    groups: &mut BTreeMap<String, GroupTotal>,
    name: &str,
    amount: MoneyCents,
) -> ResultEngine<()> {
    let entry = groups
        .entry(name.to_string())
        .or_insert_with(|| GroupTotal {
            name: name.to_string(),
            total: MoneyCents::ZERO,
            count: 0,
        });
    entry.total = MoneyCents::checked_total([entry.total, amount])?;
    entry.count += 1;
    Ok(())
}

impl Engine {
    /// Expenses of a trip, latest expense date first.
    pub async fn list_expenses(&self, trip_id: Uuid, user_id: Uuid) -> ResultEngine<Vec<Expense>> {
        with_tx!(self, |db_tx| {
            self.trip_context(&db_tx, trip_id, user_id)
                .await?
                .require_access()?;
            self.trip_expenses(&db_tx, trip_id).await
        })
    }

    pub async fn create_expense(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
        input: NewExpense,
        now: DateTime<Utc>,
    ) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            let ctx = self.trip_context(&db_tx, trip_id, user_id).await?;
            ctx.require_access()?;
            self.require_category(&db_tx, input.category_id).await?;

            let expense = Expense::create(trip_id, user_id, ctx.trip.currency, &input, now)?;
            expenses::ActiveModel::try_from(&expense)?
                .insert(&db_tx)
                .await?;
            Ok(expense)
        })
    }

    pub async fn expense(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
        expense_id: Uuid,
    ) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            self.trip_context(&db_tx, trip_id, user_id)
                .await?
                .require_access()?;
            self.require_expense(&db_tx, trip_id, expense_id).await
        })
    }

    /// Creator or trip editor only.
    pub async fn update_expense(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
        expense_id: Uuid,
        update: ExpenseUpdate,
    ) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            let ctx = self.trip_context(&db_tx, trip_id, user_id).await?;
            let mut expense = self.require_expense(&db_tx, trip_id, expense_id).await?;
            ctx.require_item_owner(expense.user_id)?;
            if let Some(category_id) = update.category_id {
                self.require_category(&db_tx, category_id).await?;
            }

            expense.apply(&update)?;
            expenses::ActiveModel::try_from(&expense)?
                .update(&db_tx)
                .await?;
            Ok(expense)
        })
    }

    /// Creator or trip editor only.
    pub async fn delete_expense(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
        expense_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let ctx = self.trip_context(&db_tx, trip_id, user_id).await?;
            let expense = self.require_expense(&db_tx, trip_id, expense_id).await?;
            ctx.require_item_owner(expense.user_id)?;
            expenses::Entity::delete_by_id(expense.id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Share of an expense owed by `debtor` (the caller when `None`).
    pub async fn expense_share(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
        expense_id: Uuid,
        debtor: Option<Uuid>,
    ) -> ResultEngine<MoneyCents> {
        let expense = self.expense(trip_id, user_id, expense_id).await?;
        Ok(expense.owed_by(debtor.unwrap_or(user_id)))
    }

    /// Totals by category and by payer, plus the ten latest expenses.
    pub async fn expense_summary(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<ExpenseSummary> {
        with_tx!(self, |db_tx| {
            let ctx = self.trip_context(&db_tx, trip_id, user_id).await?;
            ctx.require_access()?;

            let expenses = self.trip_expenses(&db_tx, trip_id).await?;
            let category_names: BTreeMap<Uuid, String> = categories::Entity::find()
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect();
            let payer_ids: Vec<Uuid> = expenses.iter().map(|e| e.user_id).collect();
            let payer_names: BTreeMap<Uuid, String> = users::Entity::find()
                .filter(users::Column::Id.is_in(payer_ids))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|u| (u.id, u.name))
                .collect();

            let mut by_category = BTreeMap::new();
            let mut by_user = BTreeMap::new();
            for expense in &expenses {
                let category = category_names
                    .get(&expense.category_id)
                    .map_or("Uncategorized", String::as_str);
                add_to_group(&mut by_category, category, expense.amount)?;
                let payer = payer_names
                    .get(&expense.user_id)
                    .map_or("Unknown", String::as_str);
                add_to_group(&mut by_user, payer, expense.amount)?;
            }

            let total = MoneyCents::checked_total(expenses.iter().map(|e| e.amount))?;
            let remaining_budget = ctx
                .trip
                .budget
                .map(|budget| budget.try_sub(total))
                .transpose()?;
            let mut recent = expenses.clone();
            recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            recent.truncate(RECENT_EXPENSES);

            Ok(ExpenseSummary {
                total,
                remaining_budget,
                expense_count: expenses.len() as u64,
                by_category: by_category.into_values().collect(),
                by_user: by_user.into_values().collect(),
                recent,
            })
        })
    }

    async fn trip_expenses(
        &self,
        db: &DatabaseTransaction,
        trip_id: Uuid,
    ) -> ResultEngine<Vec<Expense>> {
        expenses::Entity::find()
            .filter(expenses::Column::TripId.eq(trip_id))
            .order_by_desc(expenses::Column::ExpenseDate)
            .order_by_desc(expenses::Column::CreatedAt)
            .all(db)
            .await?
            .into_iter()
            .map(Expense::try_from)
            .collect()
    }

    async fn require_expense(
        &self,
        db: &DatabaseTransaction,
        trip_id: Uuid,
        expense_id: Uuid,
    ) -> ResultEngine<Expense> {
        expenses::Entity::find_by_id(expense_id)
            .filter(expenses::Column::TripId.eq(trip_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?
            .try_into()
    }

    pub(super) async fn require_category(
        &self,
        db: &DatabaseTransaction,
        category_id: Uuid,
    ) -> ResultEngine<categories::Model> {
        categories::Entity::find_by_id(category_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))
    }
}
