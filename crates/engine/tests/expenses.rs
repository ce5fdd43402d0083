use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    Currency, Engine, EngineError, ExpenseStatus, ExpenseUpdate, MoneyCents, NewExpense, NewTrip,
    ParticipantRole, Split, Trip, User,
};
use migration::MigratorTrait;
use uuid::Uuid;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap()
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, d).unwrap()
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

/// Trip owned by `owner` with `members` as accepted participants.
async fn trip_with(engine: &Engine, owner: &User, members: &[&User]) -> Trip {
    let trip = engine
        .create_trip(
            owner.id,
            NewTrip {
                name: "Rome".to_string(),
                description: None,
                destination: "Italy".to_string(),
                start_date: date(1),
                end_date: date(5),
                budget: Some(MoneyCents::new(100_000)),
                currency: Some(Currency::try_from("EUR").unwrap()),
                participant_emails: Vec::new(),
            },
            now(),
        )
        .await
        .unwrap();
    for member in members {
        engine
            .invite_participant(
                trip.id,
                owner.id,
                &member.email,
                ParticipantRole::Participant,
                now(),
            )
            .await
            .unwrap();
        engine
            .accept_invitation(trip.id, member.id, now())
            .await
            .unwrap();
    }
    trip
}

async fn category_named(engine: &Engine, name: &str) -> Uuid {
    engine
        .list_categories()
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.name == name)
        .unwrap()
        .id
}

fn expense(category_id: Uuid, title: &str, amount: i64) -> NewExpense {
    NewExpense {
        category_id,
        title: title.to_string(),
        description: None,
        amount: MoneyCents::new(amount),
        currency: None,
        expense_date: date(2),
        receipt_url: None,
        is_shared: false,
        split: None,
        status: None,
    }
}

#[tokio::test]
async fn create_defaults_status_and_currency() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let trip = trip_with(&engine, &alice, &[]).await;
    let food = category_named(&engine, "Food & Dining").await;

    let created = engine
        .create_expense(trip.id, alice.id, expense(food, "Pizza", 3_000), now())
        .await
        .unwrap();
    assert_eq!(created.status, ExpenseStatus::Approved);
    assert_eq!(created.currency.code(), "EUR");

    let fetched = engine.expense(trip.id, alice.id, created.id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn create_checks_category_and_access() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let mallory = user(&engine, "mallory").await;
    let trip = trip_with(&engine, &alice, &[]).await;
    let food = category_named(&engine, "Food & Dining").await;

    let err = engine
        .create_expense(trip.id, alice.id, expense(Uuid::new_v4(), "Pizza", 3_000), now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine
        .create_expense(trip.id, mallory.id, expense(food, "Pizza", 3_000), now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = engine
        .create_expense(trip.id, alice.id, expense(food, "Refund", -1), now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn only_creator_or_organizer_modifies() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let bob = user(&engine, "bob").await;
    let carol = user(&engine, "carol").await;
    let trip = trip_with(&engine, &alice, &[&bob, &carol]).await;
    let food = category_named(&engine, "Food & Dining").await;

    let bobs = engine
        .create_expense(trip.id, bob.id, expense(food, "Gelato", 800), now())
        .await
        .unwrap();

    let err = engine
        .delete_expense(trip.id, carol.id, bobs.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let updated = engine
        .update_expense(
            trip.id,
            bob.id,
            bobs.id,
            ExpenseUpdate {
                amount: Some(MoneyCents::new(900)),
                ..ExpenseUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.amount, MoneyCents::new(900));

    // Organizer (the owner here) may delete anyone's expense.
    engine.delete_expense(trip.id, alice.id, bobs.id).await.unwrap();
    let err = engine.expense(trip.id, alice.id, bobs.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn expense_from_other_trip_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let t1 = trip_with(&engine, &alice, &[]).await;
    let t2 = trip_with(&engine, &alice, &[]).await;
    let food = category_named(&engine, "Food & Dining").await;

    let e = engine
        .create_expense(t1.id, alice.id, expense(food, "Pizza", 1_000), now())
        .await
        .unwrap();
    let err = engine.expense(t2.id, alice.id, e.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn shares_follow_split() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let bob = user(&engine, "bob").await;
    let carol = user(&engine, "carol").await;
    let trip = trip_with(&engine, &alice, &[&bob, &carol]).await;
    let food = category_named(&engine, "Food & Dining").await;

    let mut equal = expense(food, "Dinner", 30_000);
    equal.is_shared = true;
    equal.split = Some(Split::Equal {
        participants: vec![alice.id, bob.id, carol.id],
    });
    let equal = engine
        .create_expense(trip.id, alice.id, equal, now())
        .await
        .unwrap();
    let share = engine
        .expense_share(trip.id, bob.id, equal.id, None)
        .await
        .unwrap();
    assert_eq!(share, MoneyCents::new(10_000));

    let mut pct = expense(food, "Wine", 20_000);
    pct.is_shared = true;
    pct.split = Some(Split::Percentage {
        percentages: BTreeMap::from([(alice.id, 25.0)]),
    });
    let pct = engine.create_expense(trip.id, alice.id, pct, now()).await.unwrap();
    let share = engine
        .expense_share(trip.id, bob.id, pct.id, Some(alice.id))
        .await
        .unwrap();
    assert_eq!(share, MoneyCents::new(5_000));
    let share = engine
        .expense_share(trip.id, bob.id, pct.id, None)
        .await
        .unwrap();
    assert_eq!(share, MoneyCents::ZERO);
}

#[tokio::test]
async fn split_requires_shared_expense() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let trip = trip_with(&engine, &alice, &[]).await;
    let food = category_named(&engine, "Food & Dining").await;

    let mut input = expense(food, "Dinner", 1_000);
    input.split = Some(Split::Equal {
        participants: vec![alice.id],
    });
    let err = engine
        .create_expense(trip.id, alice.id, input, now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn malformed_stored_split_reads_as_zero() {
    let (engine, db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let trip = trip_with(&engine, &alice, &[]).await;
    let food = category_named(&engine, "Food & Dining").await;

    let mut input = expense(food, "Dinner", 1_000);
    input.is_shared = true;
    input.split = Some(Split::Equal {
        participants: vec![alice.id],
    });
    let created = engine
        .create_expense(trip.id, alice.id, input, now())
        .await
        .unwrap();

    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "UPDATE expenses SET split_data = ? WHERE id = ?",
        vec!["{broken".into(), created.id.into()],
    ))
    .await
    .unwrap();

    let fetched = engine.expense(trip.id, alice.id, created.id).await.unwrap();
    assert_eq!(fetched.split, None);
    assert_eq!(fetched.owed_by(alice.id), MoneyCents::ZERO);
}

#[tokio::test]
async fn summary_groups_by_category_and_payer() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let bob = user(&engine, "bob").await;
    let trip = trip_with(&engine, &alice, &[&bob]).await;
    let food = category_named(&engine, "Food & Dining").await;
    let transport = category_named(&engine, "Transportation").await;

    engine
        .create_expense(trip.id, alice.id, expense(food, "Lunch", 2_000), now())
        .await
        .unwrap();
    engine
        .create_expense(
            trip.id,
            bob.id,
            expense(food, "Dinner", 3_000),
            now() + Duration::minutes(1),
        )
        .await
        .unwrap();
    let mut rejected = expense(transport, "Taxi", 5_000);
    rejected.status = Some(ExpenseStatus::Rejected);
    engine
        .create_expense(trip.id, bob.id, rejected, now() + Duration::minutes(2))
        .await
        .unwrap();

    let summary = engine.expense_summary(trip.id, alice.id).await.unwrap();
    // Every status counts toward the total.
    assert_eq!(summary.total, MoneyCents::new(10_000));
    assert_eq!(summary.remaining_budget, Some(MoneyCents::new(90_000)));
    assert_eq!(summary.expense_count, 3);

    let food_group = summary
        .by_category
        .iter()
        .find(|g| g.name == "Food & Dining")
        .unwrap();
    assert_eq!(food_group.total, MoneyCents::new(5_000));
    assert_eq!(food_group.count, 2);

    let bob_group = summary.by_user.iter().find(|g| g.name == "bob").unwrap();
    assert_eq!(bob_group.total, MoneyCents::new(8_000));
    assert_eq!(summary.recent[0].title, "Taxi");
}

#[tokio::test]
async fn referenced_category_cannot_be_deleted() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let trip = trip_with(&engine, &alice, &[]).await;

    let custom = engine
        .create_category(engine::NewCategory {
            name: "Souvenirs".to_string(),
            color: Some("#112233".to_string()),
            icon: Some("gift".to_string()),
        })
        .await
        .unwrap();
    let e = engine
        .create_expense(trip.id, alice.id, expense(custom.id, "Magnet", 500), now())
        .await
        .unwrap();

    let err = engine.delete_category(custom.id).await.unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    engine.delete_expense(trip.id, alice.id, e.id).await.unwrap();
    engine.delete_category(custom.id).await.unwrap();
}

#[tokio::test]
async fn totals_that_do_not_fit_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let trip = trip_with(&engine, &alice, &[]).await;
    let food = category_named(&engine, "Food & Dining").await;

    engine
        .create_expense(trip.id, alice.id, expense(food, "Huge", i64::MAX), now())
        .await
        .unwrap();
    engine
        .create_expense(trip.id, alice.id, expense(food, "Coffee", 1), now())
        .await
        .unwrap();

    let err = engine
        .trip_summary(trip.id, alice.id, now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
    let err = engine.expense_summary(trip.id, alice.id).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}
