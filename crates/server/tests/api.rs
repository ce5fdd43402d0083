use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine as _;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use server::{ServerState, TripChannels};

async fn test_app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = engine::Engine::builder()
        .database(db)
        .password_cost(4)
        .build()
        .await
        .unwrap();
    server::app(ServerState::new(engine, TripChannels::default()))
}

fn basic(email: &str, password: &str) -> String {
    let token = base64::engine::general_purpose::STANDARD.encode(format!("{email}:{password}"));
    format!("Basic {token}")
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(email) = auth {
        builder = builder.header(header::AUTHORIZATION, basic(email, "password123"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, name: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/register",
        None,
        Some(json!({
            "name": name,
            "email": format!("{name}@example.com"),
            "password": "password123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

async fn create_trip(app: &Router, owner: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/trips",
        Some(&format!("{owner}@example.com")),
        Some(json!({
            "name": "Crete",
            "destination": "Greece",
            "start_date": "2099-06-01",
            "end_date": "2099-06-10",
            "budget_minor": 250000,
            "currency": "EUR",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["currency"], "EUR");
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn basic_auth_guards_private_routes() {
    let app = test_app().await;
    register(&app, "alice").await;

    let (status, body) = send(&app, "GET", "/user", Some("alice@example.com"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "alice");

    let (status, _) = send(&app, "GET", "/user", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/user")
        .header(header::AUTHORIZATION, basic("alice@example.com", "wrong-password"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = test_app().await;
    register(&app, "alice").await;

    let (status, body) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({
            "name": "Alice again",
            "email": "ALICE@example.com",
            "password": "password123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn categories_are_public_to_read() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/categories", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categories"].as_array().unwrap().len(), 8);

    let (status, _) = send(
        &app,
        "POST",
        "/categories",
        None,
        Some(json!({ "name": "Art" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invitation_flow_and_last_organizer() {
    let app = test_app().await;
    register(&app, "alice").await;
    register(&app, "bob").await;
    let trip = create_trip(&app, "alice").await;

    let (status, invited) = send(
        &app,
        "POST",
        &format!("/trips/{trip}/participants"),
        Some("alice@example.com"),
        Some(json!({ "email": "bob@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(invited["status"], "pending");
    assert_eq!(invited["role"], "participant");

    let (status, _) = send(&app, "GET", &format!("/trips/{trip}"), Some("bob@example.com"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, pending) = send(
        &app,
        "GET",
        &format!("/pending-invitations/{trip}"),
        Some("bob@example.com"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending["owner"]["name"], "alice");

    let (status, accepted) = send(
        &app,
        "POST",
        &format!("/trips/{trip}/participants/accept"),
        Some("bob@example.com"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["status"], "accepted");
    assert!(accepted["joined_at"].is_string());

    let (status, _) = send(&app, "GET", &format!("/trips/{trip}"), Some("bob@example.com"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = send(
        &app,
        "GET",
        &format!("/trips/{trip}/participants"),
        Some("alice@example.com"),
        None,
    )
    .await;
    let organizer = list["participants"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["role"] == "organizer")
        .unwrap()
        .clone();

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/trips/{trip}/participants/{}", organizer["id"].as_str().unwrap()),
        Some("alice@example.com"),
        Some(json!({ "role": "viewer" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("cannot remove last organizer")
    );
}

#[tokio::test]
async fn unknown_trip_is_not_found() {
    let app = test_app().await;
    register(&app, "alice").await;

    let (status, _) = send(
        &app,
        "GET",
        "/trips/00000000-0000-0000-0000-000000000000",
        Some("alice@example.com"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn expenses_share_and_summary() {
    let app = test_app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let trip = create_trip(&app, "alice").await;

    send(
        &app,
        "POST",
        &format!("/trips/{trip}/participants"),
        Some("alice@example.com"),
        Some(json!({ "email": "bob@example.com" })),
    )
    .await;
    send(
        &app,
        "POST",
        &format!("/trips/{trip}/participants/accept"),
        Some("bob@example.com"),
        None,
    )
    .await;

    let (_, categories) = send(&app, "GET", "/categories", None, None).await;
    let category = categories["categories"][0]["id"].clone();

    let (status, expense) = send(
        &app,
        "POST",
        &format!("/trips/{trip}/expenses"),
        Some("alice@example.com"),
        Some(json!({
            "category_id": category,
            "title": "Ferry",
            "amount_minor": 9001,
            "expense_date": "2099-06-02",
            "is_shared": true,
            "split": {
                "type": "equal",
                "participants": [alice["id"], bob["id"]],
            },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(expense["status"], "approved");
    assert_eq!(expense["currency"], "EUR");
    let expense_id = expense["id"].as_str().unwrap();

    let (status, share) = send(
        &app,
        "GET",
        &format!("/trips/{trip}/expenses/{expense_id}/share"),
        Some("bob@example.com"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(share["amount_minor"], 4500);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/trips/{trip}/expenses/{expense_id}"),
        Some("bob@example.com"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, summary) = send(
        &app,
        "GET",
        &format!("/trips/{trip}/expenses-summary"),
        Some("bob@example.com"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_minor"], 9001);
    assert_eq!(summary["remaining_budget_minor"], 250000 - 9001);

    let (status, stats) = send(
        &app,
        "GET",
        &format!("/trips/{trip}/summary"),
        Some("alice@example.com"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["stats"]["duration_days"], 10);
    assert_eq!(stats["stats"]["is_upcoming"], true);
    assert_eq!(stats["participants_count"], 2);
}

#[tokio::test]
async fn negative_amount_is_unprocessable() {
    let app = test_app().await;
    register(&app, "alice").await;
    let trip = create_trip(&app, "alice").await;
    let (_, categories) = send(&app, "GET", "/categories", None, None).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/trips/{trip}/expenses"),
        Some("alice@example.com"),
        Some(json!({
            "category_id": categories["categories"][0]["id"],
            "title": "Refund",
            "amount_minor": -5,
            "expense_date": "2099-06-02",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn itinerary_round_trip() {
    let app = test_app().await;
    register(&app, "alice").await;
    let trip = create_trip(&app, "alice").await;

    let (status, item) = send(
        &app,
        "POST",
        &format!("/trips/{trip}/itineraries"),
        Some("alice@example.com"),
        Some(json!({
            "title": "Knossos",
            "date": "2099-06-03",
            "time": "10:30:00",
            "type": "activity",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["type"], "activity");

    let (status, list) = send(
        &app,
        "GET",
        &format!("/trips/{trip}/itineraries"),
        Some("alice@example.com"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["items"][0]["title"], "Knossos");
}

#[tokio::test]
async fn chat_history_and_last_message() {
    let app = test_app().await;
    register(&app, "alice").await;
    register(&app, "mallory").await;
    let trip = create_trip(&app, "alice").await;

    for text in ["first", "second"] {
        let (status, message) = send(
            &app,
            "POST",
            &format!("/trips/{trip}/messages"),
            Some("alice@example.com"),
            Some(json!({ "message": text })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(message["user"]["name"], "alice");
    }

    let (status, last) = send(
        &app,
        "GET",
        &format!("/trips/{trip}/messages/last"),
        Some("alice@example.com"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(last["message"].is_string());

    let (status, list) = send(
        &app,
        "GET",
        &format!("/trips/{trip}/messages?limit=10"),
        Some("alice@example.com"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["messages"].as_array().unwrap().len(), 2);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/trips/{trip}/typing"),
        Some("mallory@example.com"),
        Some(json!({ "is_typing": true })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/trips/{trip}/typing"),
        Some("alice@example.com"),
        Some(json!({ "is_typing": true })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
}

#[tokio::test]
async fn pending_invitees_join_the_chat_channel() {
    let app = test_app().await;
    register(&app, "alice").await;
    register(&app, "bob").await;
    register(&app, "mallory").await;
    let trip = create_trip(&app, "alice").await;
    send(
        &app,
        "POST",
        &format!("/trips/{trip}/participants"),
        Some("alice@example.com"),
        Some(json!({ "email": "bob@example.com" })),
    )
    .await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/trips/{trip}/typing"),
        Some("bob@example.com"),
        Some(json!({ "is_typing": true })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/trips/{trip}/events"),
        Some("mallory@example.com"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let request = Request::builder()
        .uri(format!("/trips/{trip}/events"))
        .header(header::AUTHORIZATION, basic("bob@example.com", "password123"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );

    let (status, _) = send(
        &app,
        "POST",
        &format!("/trips/{trip}/messages"),
        Some("alice@example.com"),
        Some(json!({ "message": "ferry at nine" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let mut body = response.into_body();
    let frame = tokio::time::timeout(std::time::Duration::from_secs(5), body.frame())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let text = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
    assert!(text.contains("event: new-message"));
    assert!(text.contains("ferry at nine"));
}

#[tokio::test]
async fn put_updates_like_patch() {
    let app = test_app().await;
    register(&app, "alice").await;
    register(&app, "bob").await;
    let trip = create_trip(&app, "alice").await;

    let (_, invited) = send(
        &app,
        "POST",
        &format!("/trips/{trip}/participants"),
        Some("alice@example.com"),
        Some(json!({ "email": "bob@example.com" })),
    )
    .await;
    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/trips/{trip}/participants/{}", invited["id"].as_str().unwrap()),
        Some("alice@example.com"),
        Some(json!({ "role": "viewer" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["role"], "viewer");

    let (status, category) = send(
        &app,
        "POST",
        "/categories",
        Some("alice@example.com"),
        Some(json!({ "name": "Museums" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, renamed) = send(
        &app,
        "PUT",
        &format!("/categories/{}", category["id"].as_str().unwrap()),
        Some("alice@example.com"),
        Some(json!({ "name": "Galleries" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["name"], "Galleries");
}
