use chrono::{DateTime, Utc};
use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ItineraryItem, ItineraryUpdate, NewItineraryItem, ResultEngine, itineraries,
};

use super::{Engine, with_tx};

impl Engine {
    /// Itinerary of a trip ordered by date, then time.
    pub async fn list_itinerary(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Vec<ItineraryItem>> {
        with_tx!(self, |db_tx| {
            self.trip_context(&db_tx, trip_id, user_id)
                .await?
                .require_access()?;
            itineraries::Entity::find()
                .filter(itineraries::Column::TripId.eq(trip_id))
                .order_by_asc(itineraries::Column::Date)
                .order_by_asc(itineraries::Column::Time)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(ItineraryItem::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    pub async fn create_itinerary_item(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
        input: NewItineraryItem,
        now: DateTime<Utc>,
    ) -> ResultEngine<ItineraryItem> {
        with_tx!(self, |db_tx| {
            self.trip_context(&db_tx, trip_id, user_id)
                .await?
                .require_access()?;
            let item = ItineraryItem::create(trip_id, user_id, &input, now)?;
            itineraries::ActiveModel::from(&item).insert(&db_tx).await?;
            Ok(item)
        })
    }

    pub async fn itinerary_item(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
        item_id: Uuid,
    ) -> ResultEngine<ItineraryItem> {
        with_tx!(self, |db_tx| {
            self.trip_context(&db_tx, trip_id, user_id)
                .await?
                .require_access()?;
            self.require_itinerary_item(&db_tx, trip_id, item_id).await
        })
    }

    pub async fn update_itinerary_item(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
        item_id: Uuid,
        update: ItineraryUpdate,
    ) -> ResultEngine<ItineraryItem> {
        with_tx!(self, |db_tx| {
            let ctx = self.trip_context(&db_tx, trip_id, user_id).await?;
            let mut item = self
                .require_itinerary_item(&db_tx, trip_id, item_id)
                .await?;
            ctx.require_item_owner(item.user_id)?;
            item.apply(&update)?;
            itineraries::ActiveModel::from(&item).update(&db_tx).await?;
            Ok(item)
        })
    }

    pub async fn delete_itinerary_item(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
        item_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let ctx = self.trip_context(&db_tx, trip_id, user_id).await?;
            let item = self
                .require_itinerary_item(&db_tx, trip_id, item_id)
                .await?;
            ctx.require_item_owner(item.user_id)?;
            itineraries::Entity::delete_by_id(item.id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    async fn require_itinerary_item(
        &self,
        db: &DatabaseTransaction,
        trip_id: Uuid,
        item_id: Uuid,
    ) -> ResultEngine<ItineraryItem> {
        itineraries::Entity::find_by_id(item_id)
            .filter(itineraries::Column::TripId.eq(trip_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("itinerary item not exists".to_string()))?
            .try_into()
    }
}
