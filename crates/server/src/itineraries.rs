//! Itinerary API endpoints.

use api_types::itinerary::{ItineraryListResponse, ItineraryNew, ItineraryUpdate, ItineraryView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::User;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<ItineraryListResponse>, ServerError> {
    let items = state
        .engine
        .list_itinerary(trip_id, user.id)
        .await?
        .into_iter()
        .map(views::itinerary)
        .collect();
    Ok(Json(ItineraryListResponse { items }))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
    Json(payload): Json<ItineraryNew>,
) -> Result<(StatusCode, Json<ItineraryView>), ServerError> {
    let input = engine::NewItineraryItem {
        title: payload.title,
        description: payload.description,
        date: payload.date,
        time: payload.time,
        location: payload.location,
        kind: views::parse_kind(payload.kind)?,
        notes: payload.notes,
    };
    let item = state
        .engine
        .create_itinerary_item(trip_id, user.id, input, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(views::itinerary(item))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((trip_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ItineraryView>, ServerError> {
    let item = state
        .engine
        .itinerary_item(trip_id, user.id, item_id)
        .await?;
    Ok(Json(views::itinerary(item)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((trip_id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ItineraryUpdate>,
) -> Result<Json<ItineraryView>, ServerError> {
    let update = engine::ItineraryUpdate {
        title: payload.title,
        description: payload.description,
        date: payload.date,
        time: payload.time,
        location: payload.location,
        kind: payload.kind.map(views::parse_kind).transpose()?,
        notes: payload.notes,
    };
    let item = state
        .engine
        .update_itinerary_item(trip_id, user.id, item_id, update)
        .await?;
    Ok(Json(views::itinerary(item)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((trip_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_itinerary_item(trip_id, user.id, item_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
