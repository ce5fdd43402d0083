use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::sync::Arc;

use crate::{
    categories, expenses, itineraries, messages, participants,
    realtime::{PRUNE_INTERVAL, TripChannels},
    trips, users,
};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub channels: TripChannels,
}

impl ServerState {
    pub fn new(engine: Engine, channels: TripChannels) -> Self {
        Self {
            engine: Arc::new(engine),
            channels,
        }
    }
}

/// HTTP Basic authentication with e-mail and password.
///
/// On success the authenticated [`engine::User`] is available to handlers as
/// an `Extension`.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user = state
        .engine
        .authenticate(auth_header.username(), auth_header.password())
        .await
        .map_err(|err| {
            tracing::error!("authentication failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    let public = Router::new()
        .route("/register", post(users::register))
        .route("/categories", get(categories::list));

    let protected = Router::new()
        .route("/user", get(users::me))
        .route("/categories", post(categories::create))
        .route(
            "/categories/{id}",
            get(categories::get)
                .put(categories::update)
                .patch(categories::update)
                .delete(categories::delete),
        )
        .route("/trips", get(trips::list).post(trips::create))
        .route(
            "/trips/{id}",
            get(trips::get)
                .put(trips::update)
                .patch(trips::update)
                .delete(trips::delete),
        )
        .route("/trips/{id}/summary", get(trips::summary))
        .route("/pending-invitations", get(trips::pending_invitations))
        .route(
            "/pending-invitations/{id}",
            get(trips::pending_invitation_trip),
        )
        .route(
            "/trips/{id}/participants",
            get(participants::list).post(participants::invite),
        )
        .route("/trips/{id}/participants/accept", post(participants::accept))
        .route(
            "/trips/{id}/participants/decline",
            post(participants::decline),
        )
        .route(
            "/trips/{id}/participants/{pid}",
            put(participants::update)
                .patch(participants::update)
                .delete(participants::remove),
        )
        .route(
            "/trips/{id}/itineraries",
            get(itineraries::list).post(itineraries::create),
        )
        .route(
            "/trips/{id}/itineraries/{iid}",
            get(itineraries::get)
                .put(itineraries::update)
                .patch(itineraries::update)
                .delete(itineraries::delete),
        )
        .route(
            "/trips/{id}/expenses",
            get(expenses::list).post(expenses::create),
        )
        .route(
            "/trips/{id}/expenses/{eid}",
            get(expenses::get)
                .put(expenses::update)
                .patch(expenses::update)
                .delete(expenses::delete),
        )
        .route("/trips/{id}/expenses/{eid}/share", get(expenses::share))
        .route("/trips/{id}/expenses-summary", get(expenses::summary))
        .route(
            "/trips/{id}/messages",
            get(messages::list).post(messages::create),
        )
        .route("/trips/{id}/messages/last", get(messages::last))
        .route("/trips/{id}/typing", post(messages::typing))
        .route("/trips/{id}/events", get(messages::events))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    public.merge(protected).with_state(state)
}

/// Router with all routes, for serving or for driving with `tower::ServiceExt`.
pub fn app(state: ServerState) -> Router {
    router(state)
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let pruner = state.channels.spawn_pruner(PRUNE_INTERVAL);
    let served = axum::serve(listener, router(state)).await;
    pruner.abort();
    served
}
