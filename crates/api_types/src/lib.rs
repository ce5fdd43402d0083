use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimal view of a user attached to messages, invitations and events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: Uuid,
    pub name: String,
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserRegister {
        pub name: String,
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub name: String,
        pub email: String,
        pub created_at: DateTime<Utc>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        /// `#RRGGBB`, defaults to grey.
        pub color: Option<String>,
        pub icon: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        pub color: Option<String>,
        pub icon: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub color: String,
        pub icon: String,
        pub is_default: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryListResponse {
        pub categories: Vec<CategoryView>,
    }
}

pub mod trip {
    use super::*;
    use crate::participant::{ParticipantRole, ParticipantStatus};

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TripStatus {
        Active,
        Completed,
        Cancelled,
    }

    impl TripStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Active => "active",
                Self::Completed => "completed",
                Self::Cancelled => "cancelled",
            }
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TripNew {
        pub name: String,
        pub description: Option<String>,
        pub destination: String,
        pub start_date: NaiveDate,
        pub end_date: NaiveDate,
        pub budget_minor: Option<i64>,
        /// ISO 4217 code, `USD` when absent.
        pub currency: Option<String>,
        /// E-mails to invite as pending participants.
        #[serde(default)]
        pub participant_emails: Vec<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TripUpdate {
        pub name: Option<String>,
        pub description: Option<String>,
        pub destination: Option<String>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
        pub budget_minor: Option<i64>,
        pub currency: Option<String>,
        pub status: Option<TripStatus>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TripView {
        pub id: Uuid,
        pub owner_id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub destination: String,
        pub start_date: NaiveDate,
        pub end_date: NaiveDate,
        pub budget_minor: Option<i64>,
        pub currency: String,
        pub status: TripStatus,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TripStatsView {
        pub duration_days: i64,
        pub total_expenses_minor: i64,
        pub remaining_budget_minor: Option<i64>,
        pub is_upcoming: bool,
        pub is_ongoing: bool,
        pub is_past: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TripSummaryResponse {
        pub trip: TripView,
        pub stats: TripStatsView,
        pub participants_count: u64,
        pub itinerary_count: u64,
        pub expense_count: u64,
        pub recent_expenses: Vec<crate::expense::ExpenseView>,
        pub recent_itineraries: Vec<crate::itinerary::ItineraryView>,
    }

    /// An invitation the caller has not answered yet.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PendingInvitationView {
        pub participant_id: Uuid,
        pub role: ParticipantRole,
        pub status: ParticipantStatus,
        pub invited_at: Option<DateTime<Utc>>,
        pub trip: TripView,
        pub owner: UserRef,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TripListResponse {
        pub trips: Vec<TripView>,
        pub pending_invitations: Vec<PendingInvitationView>,
    }
}

pub mod participant {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ParticipantRole {
        Organizer,
        Participant,
        Viewer,
    }

    impl ParticipantRole {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Organizer => "organizer",
                Self::Participant => "participant",
                Self::Viewer => "viewer",
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ParticipantStatus {
        Pending,
        Accepted,
        Declined,
    }

    impl ParticipantStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Pending => "pending",
                Self::Accepted => "accepted",
                Self::Declined => "declined",
            }
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantInvite {
        pub email: String,
        /// `participant` when absent.
        pub role: Option<ParticipantRole>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ParticipantUpdate {
        pub role: Option<ParticipantRole>,
        pub status: Option<ParticipantStatus>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantView {
        pub id: Uuid,
        pub trip_id: Uuid,
        pub user_id: Uuid,
        pub name: String,
        pub email: String,
        pub role: ParticipantRole,
        pub status: ParticipantStatus,
        pub invited_at: Option<DateTime<Utc>>,
        pub joined_at: Option<DateTime<Utc>>,
    }

    /// A participant record without user details, returned by invitations
    /// and state changes.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantRecord {
        pub id: Uuid,
        pub trip_id: Uuid,
        pub user_id: Uuid,
        pub role: ParticipantRole,
        pub status: ParticipantStatus,
        pub invited_at: Option<DateTime<Utc>>,
        pub joined_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantListResponse {
        pub participants: Vec<ParticipantView>,
    }
}

pub mod expense {
    use std::collections::BTreeMap;

    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ExpenseStatus {
        Pending,
        Approved,
        Rejected,
    }

    impl ExpenseStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Pending => "pending",
                Self::Approved => "approved",
                Self::Rejected => "rejected",
            }
        }
    }

    /// How a shared expense is divided.
    ///
    /// JSON shape: `{"type": "equal", "participants": [..]}`,
    /// `{"type": "custom", "amounts": {user: minor}}` or
    /// `{"type": "percentage", "percentages": {user: 25.0}}`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "type", rename_all = "snake_case")]
    pub enum Split {
        Equal { participants: Vec<Uuid> },
        Custom { amounts: BTreeMap<Uuid, i64> },
        Percentage { percentages: BTreeMap<Uuid, f64> },
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub category_id: Uuid,
        pub title: String,
        pub description: Option<String>,
        pub amount_minor: i64,
        /// Trip currency when absent.
        pub currency: Option<String>,
        pub expense_date: NaiveDate,
        pub receipt_url: Option<String>,
        #[serde(default)]
        pub is_shared: bool,
        pub split: Option<Split>,
        pub status: Option<ExpenseStatus>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub category_id: Option<Uuid>,
        pub title: Option<String>,
        pub description: Option<String>,
        pub amount_minor: Option<i64>,
        pub currency: Option<String>,
        pub expense_date: Option<NaiveDate>,
        pub receipt_url: Option<String>,
        pub is_shared: Option<bool>,
        pub split: Option<Split>,
        pub status: Option<ExpenseStatus>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub trip_id: Uuid,
        pub user_id: Uuid,
        pub category_id: Uuid,
        pub title: String,
        pub description: Option<String>,
        pub amount_minor: i64,
        pub currency: String,
        pub expense_date: NaiveDate,
        pub receipt_url: Option<String>,
        pub is_shared: bool,
        pub split: Option<Split>,
        pub status: ExpenseStatus,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListResponse {
        pub expenses: Vec<ExpenseView>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseShareQuery {
        /// Caller when absent.
        pub user_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseShareResponse {
        pub expense_id: Uuid,
        pub user_id: Uuid,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupTotalView {
        pub name: String,
        pub total_minor: i64,
        pub count: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseSummaryResponse {
        pub total_minor: i64,
        pub remaining_budget_minor: Option<i64>,
        pub expense_count: u64,
        pub by_category: Vec<GroupTotalView>,
        pub by_user: Vec<GroupTotalView>,
        pub recent: Vec<ExpenseView>,
    }
}

pub mod itinerary {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ItineraryKind {
        Flight,
        Hotel,
        Meal,
        Activity,
        Transport,
        Meeting,
    }

    impl ItineraryKind {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Flight => "flight",
                Self::Hotel => "hotel",
                Self::Meal => "meal",
                Self::Activity => "activity",
                Self::Transport => "transport",
                Self::Meeting => "meeting",
            }
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItineraryNew {
        pub title: String,
        pub description: Option<String>,
        pub date: NaiveDate,
        pub time: Option<NaiveTime>,
        pub location: Option<String>,
        #[serde(rename = "type")]
        pub kind: ItineraryKind,
        pub notes: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ItineraryUpdate {
        pub title: Option<String>,
        pub description: Option<String>,
        pub date: Option<NaiveDate>,
        pub time: Option<NaiveTime>,
        pub location: Option<String>,
        #[serde(rename = "type")]
        pub kind: Option<ItineraryKind>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItineraryView {
        pub id: Uuid,
        pub trip_id: Uuid,
        pub user_id: Uuid,
        pub title: String,
        pub description: Option<String>,
        pub date: NaiveDate,
        pub time: Option<NaiveTime>,
        pub location: Option<String>,
        #[serde(rename = "type")]
        pub kind: ItineraryKind,
        pub notes: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItineraryListResponse {
        pub items: Vec<ItineraryView>,
    }
}

pub mod message {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MessageNew {
        pub message: String,
    }

    /// Query string of `GET /trips/{id}/messages`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MessageList {
        /// 5 when absent, at most 100.
        pub limit: Option<u64>,
        /// Only messages older than this one.
        pub before: Option<Uuid>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct MessageView {
        pub id: Uuid,
        pub trip_id: Uuid,
        pub user: UserRef,
        pub message: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MessageListResponse {
        pub messages: Vec<MessageView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Typing {
        pub is_typing: bool,
    }

    /// Payload of the `trip-chat.{trip_id}` stream.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(tag = "event", rename_all = "kebab-case")]
    pub enum RealtimeEvent {
        NewMessage { message: MessageView },
        Typing { user: UserRef, is_typing: bool },
    }

    impl RealtimeEvent {
        /// SSE event name.
        pub fn name(&self) -> &'static str {
            match self {
                Self::NewMessage { .. } => "new-message",
                Self::Typing { .. } => "typing",
            }
        }

        /// User whose action produced the event.
        pub fn sender(&self) -> Uuid {
            match self {
                Self::NewMessage { message } => message.user.id,
                Self::Typing { user, .. } => user.id,
            }
        }
    }
}
