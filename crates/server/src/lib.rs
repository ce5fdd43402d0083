use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use realtime::TripChannels;
pub use server::{ServerState, app, run_with_listener};

mod categories;
mod expenses;
mod itineraries;
mod messages;
mod participants;
mod realtime;
mod server;
mod trips;
mod users;
mod views;

pub mod types {
    pub use api_types::UserRef;

    pub mod user {
        pub use api_types::user::{UserRegister, UserView};
    }

    pub mod category {
        pub use api_types::category::{
            CategoryListResponse, CategoryNew, CategoryUpdate, CategoryView,
        };
    }

    pub mod trip {
        pub use api_types::trip::{
            PendingInvitationView, TripListResponse, TripNew, TripStatsView, TripStatus,
            TripSummaryResponse, TripUpdate, TripView,
        };
    }

    pub mod participant {
        pub use api_types::participant::{
            ParticipantInvite, ParticipantListResponse, ParticipantRecord, ParticipantRole,
            ParticipantStatus, ParticipantUpdate, ParticipantView,
        };
    }

    pub mod expense {
        pub use api_types::expense::{
            ExpenseListResponse, ExpenseNew, ExpenseShareQuery, ExpenseShareResponse,
            ExpenseStatus, ExpenseSummaryResponse, ExpenseUpdate, ExpenseView, GroupTotalView,
            Split,
        };
    }

    pub mod itinerary {
        pub use api_types::itinerary::{
            ItineraryKind, ItineraryListResponse, ItineraryNew, ItineraryUpdate, ItineraryView,
        };
    }

    pub mod message {
        pub use api_types::message::{
            MessageList, MessageListResponse, MessageNew, MessageView, RealtimeEvent, Typing,
        };
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidInput(_) | EngineError::InvariantViolation(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res = ServerError::from(EngineError::Forbidden("forbidden".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::InvalidInput("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn last_organizer_maps_to_422() {
        let res = ServerError::from(EngineError::InvariantViolation(
            "cannot remove last organizer".to_string(),
        ))
        .into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn database_error_maps_to_500() {
        let res = ServerError::from(EngineError::Database(sea_orm::DbErr::Custom(
            "disk".to_string(),
        )))
        .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
