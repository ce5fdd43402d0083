use sea_orm::{
    ActiveModelTrait, DatabaseTransaction, IntoActiveModel, QueryFilter, QueryOrder,
    TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Category, CategoryUpdate, EngineError, NewCategory, ResultEngine, categories,
    categories::CategoryName, expenses,
};

use super::{Engine, with_tx};

impl Engine {
    /// Defaults first, then by name.
    pub async fn list_categories(&self) -> ResultEngine<Vec<Category>> {
        let models = categories::Entity::find()
            .order_by_desc(categories::Column::IsDefault)
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Category::from).collect())
    }

    pub async fn category(&self, category_id: Uuid) -> ResultEngine<Category> {
        categories::Entity::find_by_id(category_id)
            .one(&self.database)
            .await?
            .map(Category::from)
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))
    }

    pub async fn create_category(&self, input: NewCategory) -> ResultEngine<Category> {
        let name = CategoryName::parse(&input.name)?;
        with_tx!(self, |db_tx| {
            self.ensure_category_name_free(&db_tx, &name, None).await?;
            let model = input.into_active(name)?.insert(&db_tx).await?;
            tracing::info!("created category {}", model.id);
            Ok(Category::from(model))
        })
    }

    /// Default categories are read-only.
    pub async fn update_category(
        &self,
        category_id: Uuid,
        update: CategoryUpdate,
    ) -> ResultEngine<Category> {
        let name = update
            .name
            .as_deref()
            .map(CategoryName::parse)
            .transpose()?;
        with_tx!(self, |db_tx| {
            let model = self.require_custom_category(&db_tx, category_id).await?;
            if let Some(name) = &name {
                self.ensure_category_name_free(&db_tx, name, Some(category_id))
                    .await?;
            }
            let mut active = model.into_active_model();
            update.apply(&mut active, name)?;
            let model = active.update(&db_tx).await?;
            Ok(Category::from(model))
        })
    }

    /// Default categories and categories used by an expense cannot be
    /// deleted.
    pub async fn delete_category(&self, category_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_custom_category(&db_tx, category_id).await?;
            let in_use = expenses::Entity::find()
                .filter(expenses::Column::CategoryId.eq(category_id))
                .count(&db_tx)
                .await?;
            if in_use > 0 {
                return Err(EngineError::ExistingKey(format!(
                    "category '{}' is used by {in_use} expenses",
                    model.name
                )));
            }
            categories::Entity::delete_by_id(category_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    async fn require_custom_category(
        &self,
        db: &DatabaseTransaction,
        category_id: Uuid,
    ) -> ResultEngine<categories::Model> {
        let model = self.require_category(db, category_id).await?;
        if model.is_default {
            return Err(EngineError::Forbidden(format!(
                "default category '{}' is read-only",
                model.name
            )));
        }
        Ok(model)
    }

    async fn ensure_category_name_free(
        &self,
        db: &DatabaseTransaction,
        name: &CategoryName,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query =
            categories::Entity::find().filter(categories::Column::NameNorm.eq(name.key.clone()));
        if let Some(id) = except {
            query = query.filter(categories::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::ExistingKey(name.display.clone()));
        }
        Ok(())
    }
}
