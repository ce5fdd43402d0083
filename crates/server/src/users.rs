//! Registration and the authenticated user.

use api_types::user::{UserRegister, UserView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;
use engine::User;

use crate::{ServerError, server::ServerState, views};

pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<UserRegister>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state
        .engine
        .register_user(&payload.name, &payload.email, &payload.password, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(views::user(user))))
}

pub async fn me(Extension(user): Extension<User>) -> Json<UserView> {
    Json(views::user(user))
}
