//! Domain core of Tripboard.
//!
//! Every operation is a method on [`Engine`] and runs inside one database
//! transaction. Authorization is answered by [`TripAccess`], share
//! computation by [`Split`], and derived trip numbers by [`TripStats`].

pub use access::{Membership, TripAccess};
pub use categories::{Category, CategoryUpdate, NewCategory};
pub use currency::Currency;
pub use error::EngineError;
pub use expenses::{Expense, ExpenseStatus, ExpenseUpdate, NewExpense, Split};
pub use itineraries::{ItineraryItem, ItineraryKind, ItineraryUpdate, NewItineraryItem};
pub use messages::{Message, MessageAuthor};
pub use money::MoneyCents;
pub use ops::{
    Engine, EngineBuilder, ExpenseSummary, GroupTotal, ParticipantDetails, PendingInvitation,
    TripListing, TripSummary,
};
pub use participants::{Participant, ParticipantRole, ParticipantStatus, ParticipantUpdate};
pub use trips::{NewTrip, Trip, TripStats, TripStatus, TripUpdate};
pub use users::User;

mod access;
mod categories;
mod currency;
mod error;
mod expenses;
mod itineraries;
mod messages;
mod money;
mod ops;
mod participants;
mod trips;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
