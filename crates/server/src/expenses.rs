//! Expenses API endpoints.

use api_types::expense::{
    ExpenseListResponse, ExpenseNew, ExpenseShareQuery, ExpenseShareResponse,
    ExpenseSummaryResponse, ExpenseUpdate, ExpenseView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{MoneyCents, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let expenses = state
        .engine
        .list_expenses(trip_id, user.id)
        .await?
        .into_iter()
        .map(views::expense)
        .collect();
    Ok(Json(ExpenseListResponse { expenses }))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let input = engine::NewExpense {
        category_id: payload.category_id,
        title: payload.title,
        description: payload.description,
        amount: MoneyCents::new(payload.amount_minor),
        currency: views::parse_currency(payload.currency.as_deref())?,
        expense_date: payload.expense_date,
        receipt_url: payload.receipt_url,
        is_shared: payload.is_shared,
        split: payload.split.map(views::parse_split),
        status: payload
            .status
            .map(views::parse_expense_status)
            .transpose()?,
    };
    let expense = state
        .engine
        .create_expense(trip_id, user.id, input, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(views::expense(expense))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((trip_id, expense_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.expense(trip_id, user.id, expense_id).await?;
    Ok(Json(views::expense(expense)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((trip_id, expense_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<ExpenseView>, ServerError> {
    let update = engine::ExpenseUpdate {
        category_id: payload.category_id,
        title: payload.title,
        description: payload.description,
        amount: payload.amount_minor.map(MoneyCents::new),
        currency: views::parse_currency(payload.currency.as_deref())?,
        expense_date: payload.expense_date,
        receipt_url: payload.receipt_url,
        is_shared: payload.is_shared,
        split: payload.split.map(views::parse_split),
        status: payload
            .status
            .map(views::parse_expense_status)
            .transpose()?,
    };
    let expense = state
        .engine
        .update_expense(trip_id, user.id, expense_id, update)
        .await?;
    Ok(Json(views::expense(expense)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((trip_id, expense_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_expense(trip_id, user.id, expense_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// What `user_id` (the caller by default) owes for one expense.
pub async fn share(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((trip_id, expense_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<ExpenseShareQuery>,
) -> Result<Json<ExpenseShareResponse>, ServerError> {
    let debtor = query.user_id.unwrap_or(user.id);
    let amount = state
        .engine
        .expense_share(trip_id, user.id, expense_id, Some(debtor))
        .await?;
    Ok(Json(ExpenseShareResponse {
        expense_id,
        user_id: debtor,
        amount_minor: amount.cents(),
    }))
}

pub async fn summary(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<ExpenseSummaryResponse>, ServerError> {
    let summary = state.engine.expense_summary(trip_id, user.id).await?;
    Ok(Json(ExpenseSummaryResponse {
        total_minor: summary.total.cents(),
        remaining_budget_minor: summary.remaining_budget.map(MoneyCents::cents),
        expense_count: summary.expense_count,
        by_category: summary
            .by_category
            .into_iter()
            .map(views::group_total)
            .collect(),
        by_user: summary.by_user.into_iter().map(views::group_total).collect(),
        recent: summary.recent.into_iter().map(views::expense).collect(),
    }))
}
