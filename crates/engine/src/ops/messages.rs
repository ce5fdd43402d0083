use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, Message, MessageAuthor, ResultEngine,
    messages::{self, DEFAULT_PAGE, normalize_message},
    users,
};

use super::{Engine, with_tx};

const MAX_PAGE: u64 = 100;

impl Engine {
    /// The newest `limit` messages (5 by default) older than `before`, in
    /// chronological order.
    pub async fn list_messages(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
        limit: Option<u64>,
        before: Option<Uuid>,
    ) -> ResultEngine<Vec<Message>> {
        let limit = limit.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE);
        with_tx!(self, |db_tx| {
            self.trip_context(&db_tx, trip_id, user_id)
                .await?
                .require_view()?;

            let mut query =
                messages::Entity::find().filter(messages::Column::TripId.eq(trip_id));
            if let Some(before) = before {
                let anchor = messages::Entity::find_by_id(before)
                    .filter(messages::Column::TripId.eq(trip_id))
                    .one(&db_tx)
                    .await?
                    .ok_or_else(|| EngineError::KeyNotFound("message not exists".to_string()))?;
                query = query.filter(messages::Column::CreatedAt.lt(anchor.created_at));
            }
            let rows = query
                .order_by_desc(messages::Column::CreatedAt)
                .limit(limit)
                .all(&db_tx)
                .await?;

            let mut out = self.with_authors(&db_tx, rows).await?;
            out.reverse();
            Ok(out)
        })
    }

    pub async fn last_message(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Option<Message>> {
        with_tx!(self, |db_tx| {
            self.trip_context(&db_tx, trip_id, user_id)
                .await?
                .require_view()?;
            let row = messages::Entity::find()
                .filter(messages::Column::TripId.eq(trip_id))
                .order_by_desc(messages::Column::CreatedAt)
                .one(&db_tx)
                .await?;
            let out = self.with_authors(&db_tx, row.into_iter().collect()).await?;
            Ok(out.into_iter().next())
        })
    }

    pub async fn post_message(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
        text: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Message> {
        let text = normalize_message(text)?;
        with_tx!(self, |db_tx| {
            self.trip_context(&db_tx, trip_id, user_id)
                .await?
                .require_view()?;
            let author = self.author(&db_tx, user_id).await?;
            let model = messages::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                trip_id: ActiveValue::Set(trip_id),
                user_id: ActiveValue::Set(user_id),
                message: ActiveValue::Set(text),
                created_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            Ok(Message::from_model(model, author))
        })
    }

    /// Check that `user_id` may join the trip's realtime channel and return
    /// the identity to attach to its events.
    pub async fn authorize_channel(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<MessageAuthor> {
        with_tx!(self, |db_tx| {
            self.trip_context(&db_tx, trip_id, user_id)
                .await?
                .require_view()?;
            self.author(&db_tx, user_id).await
        })
    }

    async fn author(&self, db: &DatabaseTransaction, user_id: Uuid) -> ResultEngine<MessageAuthor> {
        let user = users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        Ok(MessageAuthor {
            id: user.id,
            name: user.name,
        })
    }

    async fn with_authors(
        &self,
        db: &DatabaseTransaction,
        rows: Vec<messages::Model>,
    ) -> ResultEngine<Vec<Message>> {
        let ids: Vec<Uuid> = rows.iter().map(|m| m.user_id).collect();
        let names: std::collections::HashMap<Uuid, String> = users::Entity::find()
            .filter(users::Column::Id.is_in(ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();
        Ok(rows
            .into_iter()
            .map(|model| {
                let author = MessageAuthor {
                    id: model.user_id,
                    name: names.get(&model.user_id).cloned().unwrap_or_default(),
                };
                Message::from_model(model, author)
            })
            .collect())
    }
}
