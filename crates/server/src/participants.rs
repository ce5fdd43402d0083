//! Participants API endpoints.

use api_types::participant::{
    ParticipantInvite, ParticipantListResponse, ParticipantRecord, ParticipantUpdate,
};
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
) -> Result<Json<ParticipantListResponse>, ServerError> {
    let participants = state
        .engine
        .list_participants(trip_id, user.id)
        .await?
        .into_iter()
        .map(views::participant)
        .collect();
    Ok(Json(ParticipantListResponse { participants }))
}

pub async fn invite(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
    Json(payload): Json<ParticipantInvite>,
) -> Result<(StatusCode, Json<ParticipantRecord>), ServerError> {
    let role = match payload.role {
        Some(role) => views::parse_role(role)?,
        None => engine::ParticipantRole::Participant,
    };
    let participant = state
        .engine
        .invite_participant(trip_id, user.id, &payload.email, role, Utc::now())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(views::participant_record(participant)),
    ))
}

pub async fn accept(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<ParticipantRecord>, ServerError> {
    let participant = state
        .engine
        .accept_invitation(trip_id, user.id, Utc::now())
        .await?;
    Ok(Json(views::participant_record(participant)))
}

pub async fn decline(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<ParticipantRecord>, ServerError> {
    let participant = state
        .engine
        .decline_invitation(trip_id, user.id, Utc::now())
        .await?;
    Ok(Json(views::participant_record(participant)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((trip_id, participant_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ParticipantUpdate>,
) -> Result<Json<ParticipantRecord>, ServerError> {
    let update = engine::ParticipantUpdate {
        role: payload.role.map(views::parse_role).transpose()?,
        status: payload.status.map(views::parse_status).transpose()?,
    };
    let participant = state
        .engine
        .update_participant(trip_id, user.id, participant_id, update, Utc::now())
        .await?;
    Ok(Json(views::participant_record(participant)))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((trip_id, participant_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .remove_participant(trip_id, user.id, participant_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
