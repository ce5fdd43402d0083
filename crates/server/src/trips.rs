//! Trips API endpoints, including the caller's pending invitations.

use api_types::trip::{
    PendingInvitationView, TripListResponse, TripNew, TripSummaryResponse, TripUpdate, TripView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{MoneyCents, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<TripListResponse>, ServerError> {
    let listing = state.engine.list_trips(user.id).await?;
    Ok(Json(TripListResponse {
        trips: listing.trips.into_iter().map(views::trip).collect(),
        pending_invitations: listing
            .pending_invitations
            .into_iter()
            .map(views::pending_invitation)
            .collect(),
    }))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<TripNew>,
) -> Result<(StatusCode, Json<TripView>), ServerError> {
    let input = engine::NewTrip {
        name: payload.name,
        description: payload.description,
        destination: payload.destination,
        start_date: payload.start_date,
        end_date: payload.end_date,
        budget: payload.budget_minor.map(MoneyCents::new),
        currency: views::parse_currency(payload.currency.as_deref())?,
        participant_emails: payload.participant_emails,
    };
    let trip = state.engine.create_trip(user.id, input, Utc::now()).await?;
    tracing::info!("trip {} created by {}", trip.id, user.id);
    Ok((StatusCode::CREATED, Json(views::trip(trip))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<TripView>, ServerError> {
    let trip = state.engine.trip(trip_id, user.id).await?;
    Ok(Json(views::trip(trip)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
    Json(payload): Json<TripUpdate>,
) -> Result<Json<TripView>, ServerError> {
    let update = engine::TripUpdate {
        name: payload.name,
        description: payload.description,
        destination: payload.destination,
        start_date: payload.start_date,
        end_date: payload.end_date,
        budget: payload.budget_minor.map(MoneyCents::new),
        currency: views::parse_currency(payload.currency.as_deref())?,
        status: payload.status.map(views::parse_trip_status).transpose()?,
    };
    let trip = state.engine.update_trip(trip_id, user.id, update).await?;
    Ok(Json(views::trip(trip)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_trip(trip_id, user.id).await?;
    tracing::info!("trip {trip_id} deleted by {}", user.id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn summary(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<TripSummaryResponse>, ServerError> {
    let summary = state
        .engine
        .trip_summary(trip_id, user.id, Utc::now())
        .await?;
    Ok(Json(TripSummaryResponse {
        trip: views::trip(summary.trip),
        stats: views::trip_stats(summary.stats),
        participants_count: summary.participants_count,
        itinerary_count: summary.itinerary_count,
        expense_count: summary.expense_count,
        recent_expenses: summary
            .recent_expenses
            .into_iter()
            .map(views::expense)
            .collect(),
        recent_itineraries: summary
            .recent_itineraries
            .into_iter()
            .map(views::itinerary)
            .collect(),
    }))
}

pub async fn pending_invitations(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<PendingInvitationView>>, ServerError> {
    let invitations = state
        .engine
        .pending_invitations(user.id)
        .await?
        .into_iter()
        .map(views::pending_invitation)
        .collect();
    Ok(Json(invitations))
}

/// Trip preview for an invitee who has not answered yet.
pub async fn pending_invitation_trip(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<PendingInvitationView>, ServerError> {
    let invitation = state
        .engine
        .pending_invitation_trip(trip_id, user.id)
        .await?;
    Ok(Json(views::pending_invitation(invitation)))
}
