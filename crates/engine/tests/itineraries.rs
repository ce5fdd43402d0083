use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{
    Engine, EngineError, ItineraryKind, ItineraryUpdate, NewItineraryItem, NewTrip,
    ParticipantRole, Trip, User,
};
use migration::MigratorTrait;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap()
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .password_cost(4)
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn user(engine: &Engine, name: &str) -> User {
    engine
        .register_user(name, &format!("{name}@example.com"), "password123", now())
        .await
        .unwrap()
}

async fn trip(engine: &Engine, owner: &User) -> Trip {
    engine
        .create_trip(
            owner.id,
            NewTrip {
                name: "Kyoto".to_string(),
                description: None,
                destination: "Japan".to_string(),
                start_date: date(1),
                end_date: date(10),
                budget: None,
                currency: None,
                participant_emails: Vec::new(),
            },
            now(),
        )
        .await
        .unwrap()
}

async fn join(engine: &Engine, trip: &Trip, owner: &User, who: &User, role: ParticipantRole) {
    engine
        .invite_participant(trip.id, owner.id, &who.email, role, now())
        .await
        .unwrap();
    engine.accept_invitation(trip.id, who.id, now()).await.unwrap();
}

fn item(title: &str, day: u32, at: Option<NaiveTime>) -> NewItineraryItem {
    NewItineraryItem {
        title: title.to_string(),
        description: None,
        date: date(day),
        time: at,
        location: Some("  Gion ".to_string()),
        kind: ItineraryKind::Activity,
        notes: None,
    }
}

#[tokio::test]
async fn itinerary_is_ordered_by_date_then_time() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let t = trip(&engine, &alice).await;

    for (title, day, at) in [
        ("Dinner", 2, Some(time(19, 0))),
        ("Temple", 3, Some(time(9, 0))),
        ("Breakfast", 2, Some(time(8, 30))),
        ("Arrival", 1, None),
    ] {
        engine
            .create_itinerary_item(t.id, alice.id, item(title, day, at), now())
            .await
            .unwrap();
    }

    let titles: Vec<String> = engine
        .list_itinerary(t.id, alice.id)
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.title)
        .collect();
    assert_eq!(titles, ["Arrival", "Breakfast", "Dinner", "Temple"]);
}

#[tokio::test]
async fn optional_text_is_trimmed_and_cleared() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let t = trip(&engine, &alice).await;

    let created = engine
        .create_itinerary_item(t.id, alice.id, item("Walk", 2, None), now())
        .await
        .unwrap();
    assert_eq!(created.location.as_deref(), Some("Gion"));

    let updated = engine
        .update_itinerary_item(
            t.id,
            alice.id,
            created.id,
            ItineraryUpdate {
                location: Some(String::new()),
                kind: Some(ItineraryKind::Meal),
                ..ItineraryUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.location, None);
    assert_eq!(updated.kind, ItineraryKind::Meal);
    assert_eq!(
        engine
            .itinerary_item(t.id, alice.id, created.id)
            .await
            .unwrap(),
        updated
    );
}

#[tokio::test]
async fn accepted_viewers_add_items_but_pending_invitees_do_not() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let vera = user(&engine, "vera").await;
    let pete = user(&engine, "pete").await;
    let t = trip(&engine, &alice).await;
    join(&engine, &t, &alice, &vera, ParticipantRole::Viewer).await;
    engine
        .invite_participant(t.id, alice.id, &pete.email, ParticipantRole::Participant, now())
        .await
        .unwrap();

    let walk = engine
        .create_itinerary_item(t.id, alice.id, item("Walk", 2, None), now())
        .await
        .unwrap();
    assert_eq!(engine.list_itinerary(t.id, vera.id).await.unwrap().len(), 1);

    let nap = engine
        .create_itinerary_item(t.id, vera.id, item("Nap", 2, None), now())
        .await
        .unwrap();
    assert_eq!(nap.user_id, vera.id);

    let err = engine
        .delete_itinerary_item(t.id, vera.id, walk.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = engine
        .create_itinerary_item(t.id, pete.id, item("Sake", 3, None), now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn participants_modify_only_their_items() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let bob = user(&engine, "bob").await;
    let carol = user(&engine, "carol").await;
    let t = trip(&engine, &alice).await;
    join(&engine, &t, &alice, &bob, ParticipantRole::Participant).await;
    join(&engine, &t, &alice, &carol, ParticipantRole::Participant).await;

    let bobs = engine
        .create_itinerary_item(t.id, bob.id, item("Karaoke", 4, Some(time(22, 0))), now())
        .await
        .unwrap();

    let err = engine
        .delete_itinerary_item(t.id, carol.id, bobs.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    engine
        .delete_itinerary_item(t.id, bob.id, bobs.id)
        .await
        .unwrap();
    let err = engine
        .itinerary_item(t.id, bob.id, bobs.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn strangers_are_forbidden_and_missing_trip_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let mallory = user(&engine, "mallory").await;
    let t = trip(&engine, &alice).await;

    let err = engine.list_itinerary(t.id, mallory.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = engine
        .list_itinerary(uuid::Uuid::new_v4(), alice.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}
