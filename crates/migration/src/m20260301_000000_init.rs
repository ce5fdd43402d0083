//! Initial schema: creates every table of Tripboard.
//!
//! - `users`: accounts (bcrypt hash or external identity)
//! - `trips`: owned by one user
//! - `trip_participants`: membership per (trip, user) with role and status
//! - `categories`: global expense categories
//! - `expenses`: trip expenses with optional split
//! - `itineraries`: dated plan items
//! - `trip_messages`: chat history
//!
//! Everything hanging off a trip is removed with it. Categories referenced by
//! an expense cannot be deleted.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    GoogleId,
    CreatedAt,
}

#[derive(Iden)]
enum Trips {
    Table,
    Id,
    OwnerId,
    Name,
    Description,
    Destination,
    StartDate,
    EndDate,
    BudgetMinor,
    Currency,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum TripParticipants {
    Table,
    Id,
    TripId,
    UserId,
    Role,
    Status,
    InvitedAt,
    JoinedAt,
}

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

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    TripId,
    UserId,
    CategoryId,
    Title,
    Description,
    AmountMinor,
    Currency,
    ExpenseDate,
    ReceiptUrl,
    IsShared,
    SplitType,
    SplitData,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum Itineraries {
    Table,
    Id,
    TripId,
    UserId,
    Title,
    Description,
    Date,
    Time,
    Location,
    Kind,
    Notes,
    CreatedAt,
}

#[derive(Iden)]
enum TripMessages {
    Table,
    Id,
    TripId,
    UserId,
    Message,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string())
                    .col(ColumnDef::new(Users::GoogleId).string())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-email-unique")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Trips
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Trips::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Trips::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Trips::OwnerId).blob().not_null())
                    .col(ColumnDef::new(Trips::Name).string().not_null())
                    .col(ColumnDef::new(Trips::Description).text())
                    .col(ColumnDef::new(Trips::Destination).string().not_null())
                    .col(ColumnDef::new(Trips::StartDate).date().not_null())
                    .col(ColumnDef::new(Trips::EndDate).date().not_null())
                    .col(ColumnDef::new(Trips::BudgetMinor).big_integer())
                    .col(
                        ColumnDef::new(Trips::Currency)
                            .string()
                            .not_null()
                            .default("USD"),
                    )
                    .col(
                        ColumnDef::new(Trips::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Trips::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-trips-owner_id")
                            .from(Trips::Table, Trips::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-trips-owner_id")
                    .table(Trips::Table)
                    .col(Trips::OwnerId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Participants
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(TripParticipants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TripParticipants::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TripParticipants::TripId).blob().not_null())
                    .col(ColumnDef::new(TripParticipants::UserId).blob().not_null())
                    .col(
                        ColumnDef::new(TripParticipants::Role)
                            .string()
                            .not_null()
                            .default("participant"),
                    )
                    .col(
                        ColumnDef::new(TripParticipants::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(TripParticipants::InvitedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(TripParticipants::JoinedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-trip_participants-trip_id")
                            .from(TripParticipants::Table, TripParticipants::TripId)
                            .to(Trips::Table, Trips::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-trip_participants-user_id")
                            .from(TripParticipants::Table, TripParticipants::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-trip_participants-trip_id-user_id-unique")
                    .table(TripParticipants::Table)
                    .col(TripParticipants::TripId)
                    .col(TripParticipants::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::NameNorm).string().not_null())
                    .col(
                        ColumnDef::new(Categories::Color)
                            .string()
                            .not_null()
                            .default("#6B7280"),
                    )
                    .col(
                        ColumnDef::new(Categories::Icon)
                            .string()
                            .not_null()
                            .default("folder"),
                    )
                    .col(
                        ColumnDef::new(Categories::IsDefault)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-name_norm-unique")
                    .table(Categories::Table)
                    .col(Categories::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Expenses::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Expenses::TripId).blob().not_null())
                    .col(ColumnDef::new(Expenses::UserId).blob().not_null())
                    .col(ColumnDef::new(Expenses::CategoryId).blob().not_null())
                    .col(ColumnDef::new(Expenses::Title).string().not_null())
                    .col(ColumnDef::new(Expenses::Description).text())
                    .col(ColumnDef::new(Expenses::AmountMinor).big_integer().not_null())
                    .col(
                        ColumnDef::new(Expenses::Currency)
                            .string()
                            .not_null()
                            .default("USD"),
                    )
                    .col(ColumnDef::new(Expenses::ExpenseDate).date().not_null())
                    .col(ColumnDef::new(Expenses::ReceiptUrl).string())
                    .col(
                        ColumnDef::new(Expenses::IsShared)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Expenses::SplitType).string())
                    .col(ColumnDef::new(Expenses::SplitData).text())
                    .col(
                        ColumnDef::new(Expenses::Status)
                            .string()
                            .not_null()
                            .default("approved"),
                    )
                    .col(
                        ColumnDef::new(Expenses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-trip_id")
                            .from(Expenses::Table, Expenses::TripId)
                            .to(Trips::Table, Trips::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-user_id")
                            .from(Expenses::Table, Expenses::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-category_id")
                            .from(Expenses::Table, Expenses::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-trip_id-expense_date")
                    .table(Expenses::Table)
                    .col(Expenses::TripId)
                    .col(Expenses::ExpenseDate)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Itinerary
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Itineraries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Itineraries::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Itineraries::TripId).blob().not_null())
                    .col(ColumnDef::new(Itineraries::UserId).blob().not_null())
                    .col(ColumnDef::new(Itineraries::Title).string().not_null())
                    .col(ColumnDef::new(Itineraries::Description).text())
                    .col(ColumnDef::new(Itineraries::Date).date().not_null())
                    .col(ColumnDef::new(Itineraries::Time).time())
                    .col(ColumnDef::new(Itineraries::Location).string())
                    .col(ColumnDef::new(Itineraries::Kind).string().not_null())
                    .col(ColumnDef::new(Itineraries::Notes).text())
                    .col(
                        ColumnDef::new(Itineraries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-itineraries-trip_id")
                            .from(Itineraries::Table, Itineraries::TripId)
                            .to(Trips::Table, Trips::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-itineraries-user_id")
                            .from(Itineraries::Table, Itineraries::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-itineraries-trip_id-date")
                    .table(Itineraries::Table)
                    .col(Itineraries::TripId)
                    .col(Itineraries::Date)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Chat messages
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(TripMessages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TripMessages::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TripMessages::TripId).blob().not_null())
                    .col(ColumnDef::new(TripMessages::UserId).blob().not_null())
                    .col(ColumnDef::new(TripMessages::Message).text().not_null())
                    .col(
                        ColumnDef::new(TripMessages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-trip_messages-trip_id")
                            .from(TripMessages::Table, TripMessages::TripId)
                            .to(Trips::Table, Trips::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-trip_messages-user_id")
                            .from(TripMessages::Table, TripMessages::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-trip_messages-trip_id-created_at")
                    .table(TripMessages::Table)
                    .col(TripMessages::TripId)
                    .col(TripMessages::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Reverse order of creation (FK dependencies)
        manager
            .drop_table(Table::drop().table(TripMessages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Itineraries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TripParticipants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Trips::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
