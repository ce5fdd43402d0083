use chrono::{TimeZone, Utc};
use sea_orm::Database;

use engine::{Engine, EngineError};
use migration::MigratorTrait;

async fn engine() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder()
        .database(db)
        .password_cost(4)
        .build()
        .await
        .unwrap()
}

#[tokio::test]
async fn register_and_authenticate() {
    let engine = engine().await;
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

    let user = engine
        .register_user(" Ada ", "Ada@Example.com", "correct horse", now)
        .await
        .unwrap();
    assert_eq!(user.name, "Ada");
    assert_eq!(user.email, "ada@example.com");

    let found = engine
        .authenticate("ADA@example.com", "correct horse")
        .await
        .unwrap();
    assert_eq!(found, Some(user.clone()));
    assert_eq!(
        engine.authenticate("ada@example.com", "wrong").await.unwrap(),
        None
    );
    assert_eq!(
        engine.authenticate("nobody@example.com", "correct horse").await.unwrap(),
        None
    );

    assert_eq!(engine.user(user.id).await.unwrap(), user);
    assert_eq!(engine.user_by_email("ada@example.com").await.unwrap(), user);
}

#[tokio::test]
async fn registration_rules() {
    let engine = engine().await;
    let now = Utc::now();

    let err = engine
        .register_user("Bob", "bob@example.com", "short", now)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let err = engine
        .register_user("Bob", "not-an-email", "long enough", now)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    engine
        .register_user("Bob", "bob@example.com", "long enough", now)
        .await
        .unwrap();
    let err = engine
        .register_user("Bobby", "BOB@example.com", "long enough", now)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let err = engine.user_by_email("ghost@example.com").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}
