use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, User, users,
    users::{hash_password, normalize_email, verify_password},
    util::normalize_required,
};

use super::{Engine, with_tx};

const MIN_PASSWORD_CHARS: usize = 8;

impl Engine {
    /// Create a user with a bcrypt-hashed password.
    pub async fn register_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<User> {
        let name = normalize_required(name, "name", 255)?;
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(EngineError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_CHARS} characters"
            )));
        }
        let password_hash = hash_password(password, self.password_cost)?;

        with_tx!(self, |db_tx| {
            let existing = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(email));
            }

            let model = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                name: ActiveValue::Set(name),
                email: ActiveValue::Set(email),
                password_hash: ActiveValue::Set(Some(password_hash)),
                google_id: ActiveValue::Set(None),
                created_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            tracing::info!("registered user {}", model.id);
            Ok(User::from(model))
        })
    }

    /// Check credentials. Unknown e-mails, external identities and wrong
    /// passwords all yield `None`.
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<Option<User>> {
        let email = email.trim().to_lowercase();
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?;
        Ok(model.and_then(|model| {
            let hash = model.password_hash.as_deref()?;
            verify_password(password, hash).then(|| User::from(model.clone()))
        }))
    }

    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?
            .map(User::from)
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    pub async fn user_by_email(&self, email: &str) -> ResultEngine<User> {
        let email = normalize_email(email)?;
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?
            .map(User::from)
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }
}
