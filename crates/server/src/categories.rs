//! Categories API endpoints.
//!
//! Categories are shared by every trip: listing is public, changes need an
//! authenticated user.

use api_types::category::{CategoryListResponse, CategoryNew, CategoryUpdate, CategoryView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::User;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<CategoryListResponse>, ServerError> {
    let categories = state
        .engine
        .list_categories()
        .await?
        .into_iter()
        .map(views::category)
        .collect();

    Ok(Json(CategoryListResponse { categories }))
}

pub async fn get(
    _: Extension<User>,
    State(state): State<ServerState>,
    Path(category_id): Path<Uuid>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state.engine.category(category_id).await?;
    Ok(Json(views::category(category)))
}

pub async fn create(
    _: Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state
        .engine
        .create_category(engine::NewCategory {
            name: payload.name,
            color: payload.color,
            icon: payload.icon,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(views::category(category))))
}

pub async fn update(
    _: Extension<User>,
    State(state): State<ServerState>,
    Path(category_id): Path<Uuid>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<CategoryView>, ServerError> {
    if payload.name.is_none() && payload.color.is_none() && payload.icon.is_none() {
        return Err(ServerError::Generic(
            "provide at least one of name, color or icon".to_string(),
        ));
    }

    let category = state
        .engine
        .update_category(
            category_id,
            engine::CategoryUpdate {
                name: payload.name,
                color: payload.color,
                icon: payload.icon,
            },
        )
        .await?;
    Ok(Json(views::category(category)))
}

pub async fn delete(
    _: Extension<User>,
    State(state): State<ServerState>,
    Path(category_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_category(category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
