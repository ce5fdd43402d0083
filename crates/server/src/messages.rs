//! Trip chat: message history, typing indicators and the event stream.

use api_types::message::{
    MessageList, MessageListResponse, MessageNew, MessageView, RealtimeEvent, Typing,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use chrono::Utc;
use engine::User;
use tokio_stream::{Stream, StreamExt};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
    Query(query): Query<MessageList>,
) -> Result<Json<MessageListResponse>, ServerError> {
    let messages = state
        .engine
        .list_messages(trip_id, user.id, query.limit, query.before)
        .await?
        .into_iter()
        .map(views::message)
        .collect();
    Ok(Json(MessageListResponse { messages }))
}

pub async fn last(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<Option<MessageView>>, ServerError> {
    let message = state.engine.last_message(trip_id, user.id).await?;
    Ok(Json(message.map(views::message)))
}

/// Stores the message, then pushes it to the other subscribers of the trip.
pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
    Json(payload): Json<MessageNew>,
) -> Result<(StatusCode, Json<MessageView>), ServerError> {
    let message = state
        .engine
        .post_message(trip_id, user.id, &payload.message, Utc::now())
        .await?;
    let view = views::message(message);
    state.channels.publish(
        trip_id,
        RealtimeEvent::NewMessage {
            message: view.clone(),
        },
    );
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn typing(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
    Json(payload): Json<Typing>,
) -> Result<StatusCode, ServerError> {
    let author = state.engine.authorize_channel(trip_id, user.id).await?;
    state.channels.publish(
        trip_id,
        RealtimeEvent::Typing {
            user: views::author(author),
            is_typing: payload.is_typing,
        },
    );
    Ok(StatusCode::ACCEPTED)
}

/// Server-sent events of `trip-chat.{trip_id}`, without the caller's own.
pub async fn events(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ServerError> {
    state.engine.authorize_channel(trip_id, user.id).await?;
    tracing::debug!("trip-chat.{trip_id}: {} subscribed", user.id);

    let stream = state
        .channels
        .subscribe(trip_id, user.id)
        .map(|event| Event::default().event(event.name()).json_data(&event));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
