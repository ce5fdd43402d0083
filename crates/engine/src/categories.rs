//! Global expense categories.
//!
//! Names are unique by their normalized key (`name_norm`). Default
//! categories are seeded by the migrations and are read-only.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{normalize_category_display, normalize_category_key, parse_color},
};

pub const DEFAULT_COLOR: &str = "#6B7280";
pub const DEFAULT_ICON: &str = "folder";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub icon: String,
    pub is_default: bool,
}

#[derive(Clone, Debug)]
pub struct NewCategory {
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

fn normalize_icon(icon: &str) -> ResultEngine<String> {
    let icon = icon.trim();
    if icon.is_empty() || icon.len() > 64 {
        return Err(EngineError::InvalidInput(format!("invalid icon: {icon}")));
    }
    Ok(icon.to_string())
}

/// A validated name with its comparison key.
pub(crate) struct CategoryName {
    pub(crate) display: String,
    pub(crate) key: String,
}

impl CategoryName {
    pub(crate) fn parse(input: &str) -> ResultEngine<Self> {
        let display = normalize_category_display(input)?;
        let key = normalize_category_key(&display)?;
        Ok(Self { display, key })
    }
}

impl NewCategory {
    pub(crate) fn into_active(self, name: CategoryName) -> ResultEngine<ActiveModel> {
        let color = match self.color.as_deref() {
            Some(color) => parse_color(color)?,
            None => DEFAULT_COLOR.to_string(),
        };
        let icon = match self.icon.as_deref() {
            Some(icon) => normalize_icon(icon)?,
            None => DEFAULT_ICON.to_string(),
        };
        Ok(ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            name: ActiveValue::Set(name.display),
            name_norm: ActiveValue::Set(name.key),
            color: ActiveValue::Set(color),
            icon: ActiveValue::Set(icon),
            is_default: ActiveValue::Set(false),
        })
    }
}

impl CategoryUpdate {
    pub(crate) fn apply(
        &self,
        active: &mut ActiveModel,
        name: Option<CategoryName>,
    ) -> ResultEngine<()> {
        if let Some(name) = name {
            active.name = ActiveValue::Set(name.display);
            active.name_norm = ActiveValue::Set(name.key);
        }
        if let Some(color) = self.color.as_deref() {
            active.color = ActiveValue::Set(parse_color(color)?);
        }
        if let Some(icon) = self.icon.as_deref() {
            active.icon = ActiveValue::Set(normalize_icon(icon)?);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub name_norm: String,
    pub color: String,
    pub icon: String,
    pub is_default: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Category {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            color: model.color,
            icon: model.icon,
            is_default: model.is_default,
        }
    }
}
