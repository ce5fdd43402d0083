//! Seeds the read-only default expense categories.

use sea_orm::ConnectionTrait;
use sea_orm_migration::prelude::*;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use uuid::Uuid;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
    NameNorm,
    Color,
    Icon,
    IsDefault,
}

/// (name, color, icon)
const DEFAULTS: [(&str, &str, &str); 8] = [
    ("Transportation", "#3B82F6", "plane"),
    ("Accommodation", "#10B981", "home"),
    ("Food & Dining", "#F59E0B", "utensils"),
    ("Activities", "#8B5CF6", "ticket"),
    ("Shopping", "#EC4899", "shopping-bag"),
    ("Health & Safety", "#EF4444", "heart"),
    ("Communication", "#06B6D4", "phone"),
    ("Miscellaneous", "#6B7280", "more-horizontal"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = manager.get_database_backend();

        for (name, color, icon) in DEFAULTS {
            let stmt = Query::insert()
                .into_table(Categories::Table)
                .columns([
                    Categories::Id,
                    Categories::Name,
                    Categories::NameNorm,
                    Categories::Color,
                    Categories::Icon,
                    Categories::IsDefault,
                ])
                .values([
                    Uuid::new_v4().as_bytes().to_vec().into(),
                    name.into(),
                    normalize_key(name).into(),
                    color.into(),
                    icon.into(),
                    true.into(),
                ])
                .map_err(|err| DbErr::Custom(err.to_string()))?
                .to_owned();
            db.execute(backend.build(&stmt)).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let stmt = Query::delete()
            .from_table(Categories::Table)
            .and_where(Expr::col(Categories::IsDefault).eq(true))
            .to_owned();
        manager.exec_stmt(stmt).await
    }
}

/// Same key the engine computes for category names.
fn normalize_key(input: &str) -> String {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in input.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    out.trim_end().to_string()
}
