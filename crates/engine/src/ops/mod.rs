use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod access;
mod categories;
mod expenses;
mod itineraries;
mod messages;
mod participants;
mod trips;
mod users;

pub use expenses::{ExpenseSummary, GroupTotal};
pub use participants::ParticipantDetails;
pub use trips::{PendingInvitation, TripListing, TripSummary};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// Inside the block every query must go through the transaction handle: an
/// in-memory SQLite database has a single connection.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    password_cost: u32,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    password_cost: u32,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            password_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// bcrypt cost for new password hashes. Lower it in tests only.
    pub fn password_cost(mut self, cost: u32) -> EngineBuilder {
        self.password_cost = cost;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            password_cost: self.password_cost,
        })
    }
}
