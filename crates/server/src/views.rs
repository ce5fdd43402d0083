//! Conversions between engine values and the wire types of `api_types`.

use api_types::{
    UserRef,
    category::CategoryView,
    expense::{ExpenseStatus, ExpenseView, GroupTotalView, Split},
    itinerary::{ItineraryKind, ItineraryView},
    message::MessageView,
    participant::{ParticipantRecord, ParticipantRole, ParticipantStatus, ParticipantView},
    trip::{PendingInvitationView, TripStatsView, TripStatus, TripView},
    user::UserView,
};
use engine::{Currency, EngineError, MoneyCents};

use crate::ServerError;

pub fn user(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        name: user.name,
        email: user.email,
        created_at: user.created_at,
    }
}

pub fn author(author: engine::MessageAuthor) -> UserRef {
    UserRef {
        id: author.id,
        name: author.name,
    }
}

pub fn category(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        color: category.color,
        icon: category.icon,
        is_default: category.is_default,
    }
}

fn trip_status(status: engine::TripStatus) -> TripStatus {
    match status {
        engine::TripStatus::Active => TripStatus::Active,
        engine::TripStatus::Completed => TripStatus::Completed,
        engine::TripStatus::Cancelled => TripStatus::Cancelled,
    }
}

pub fn trip(trip: engine::Trip) -> TripView {
    TripView {
        id: trip.id,
        owner_id: trip.owner_id,
        name: trip.name,
        description: trip.description,
        destination: trip.destination,
        start_date: trip.start_date,
        end_date: trip.end_date,
        budget_minor: trip.budget.map(MoneyCents::cents),
        currency: trip.currency.code().to_string(),
        status: trip_status(trip.status),
        created_at: trip.created_at,
    }
}

pub fn trip_stats(stats: engine::TripStats) -> TripStatsView {
    TripStatsView {
        duration_days: stats.duration_days,
        total_expenses_minor: stats.total_expenses.cents(),
        remaining_budget_minor: stats.remaining_budget.map(MoneyCents::cents),
        is_upcoming: stats.is_upcoming,
        is_ongoing: stats.is_ongoing,
        is_past: stats.is_past,
    }
}

fn role(role: engine::ParticipantRole) -> ParticipantRole {
    match role {
        engine::ParticipantRole::Organizer => ParticipantRole::Organizer,
        engine::ParticipantRole::Participant => ParticipantRole::Participant,
        engine::ParticipantRole::Viewer => ParticipantRole::Viewer,
    }
}

fn status(status: engine::ParticipantStatus) -> ParticipantStatus {
    match status {
        engine::ParticipantStatus::Pending => ParticipantStatus::Pending,
        engine::ParticipantStatus::Accepted => ParticipantStatus::Accepted,
        engine::ParticipantStatus::Declined => ParticipantStatus::Declined,
    }
}

pub fn pending_invitation(invitation: engine::PendingInvitation) -> PendingInvitationView {
    PendingInvitationView {
        participant_id: invitation.participant.id,
        role: role(invitation.participant.role),
        status: status(invitation.participant.status),
        invited_at: invitation.participant.invited_at,
        trip: trip(invitation.trip),
        owner: author(invitation.owner),
    }
}

pub fn participant(details: engine::ParticipantDetails) -> ParticipantView {
    let p = details.participant;
    ParticipantView {
        id: p.id,
        trip_id: p.trip_id,
        user_id: p.user_id,
        name: details.name,
        email: details.email,
        role: role(p.role),
        status: status(p.status),
        invited_at: p.invited_at,
        joined_at: p.joined_at,
    }
}

pub fn participant_record(p: engine::Participant) -> ParticipantRecord {
    ParticipantRecord {
        id: p.id,
        trip_id: p.trip_id,
        user_id: p.user_id,
        role: role(p.role),
        status: status(p.status),
        invited_at: p.invited_at,
        joined_at: p.joined_at,
    }
}

fn split(split: engine::Split) -> Split {
    match split {
        engine::Split::Equal { participants } => Split::Equal { participants },
        engine::Split::Custom { amounts } => Split::Custom { amounts },
        engine::Split::Percentage { percentages } => Split::Percentage { percentages },
    }
}

fn expense_status(status: engine::ExpenseStatus) -> ExpenseStatus {
    match status {
        engine::ExpenseStatus::Pending => ExpenseStatus::Pending,
        engine::ExpenseStatus::Approved => ExpenseStatus::Approved,
        engine::ExpenseStatus::Rejected => ExpenseStatus::Rejected,
    }
}

pub fn expense(expense: engine::Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        trip_id: expense.trip_id,
        user_id: expense.user_id,
        category_id: expense.category_id,
        title: expense.title,
        description: expense.description,
        amount_minor: expense.amount.cents(),
        currency: expense.currency.code().to_string(),
        expense_date: expense.expense_date,
        receipt_url: expense.receipt_url,
        is_shared: expense.is_shared,
        split: expense.split.map(split),
        status: expense_status(expense.status),
        created_at: expense.created_at,
    }
}

pub fn group_total(group: engine::GroupTotal) -> GroupTotalView {
    GroupTotalView {
        name: group.name,
        total_minor: group.total.cents(),
        count: group.count,
    }
}

fn kind(kind: engine::ItineraryKind) -> ItineraryKind {
    match kind {
        engine::ItineraryKind::Flight => ItineraryKind::Flight,
        engine::ItineraryKind::Hotel => ItineraryKind::Hotel,
        engine::ItineraryKind::Meal => ItineraryKind::Meal,
        engine::ItineraryKind::Activity => ItineraryKind::Activity,
        engine::ItineraryKind::Transport => ItineraryKind::Transport,
        engine::ItineraryKind::Meeting => ItineraryKind::Meeting,
    }
}

pub fn itinerary(item: engine::ItineraryItem) -> ItineraryView {
    ItineraryView {
        id: item.id,
        trip_id: item.trip_id,
        user_id: item.user_id,
        title: item.title,
        description: item.description,
        date: item.date,
        time: item.time,
        location: item.location,
        kind: kind(item.kind),
        notes: item.notes,
        created_at: item.created_at,
    }
}

pub fn message(message: engine::Message) -> MessageView {
    MessageView {
        id: message.id,
        trip_id: message.trip_id,
        user: author(message.user),
        message: message.message,
        created_at: message.created_at,
    }
}

// Wire -> engine.

pub fn parse_currency(raw: Option<&str>) -> Result<Option<Currency>, ServerError> {
    raw.map(Currency::try_from)
        .transpose()
        .map_err(ServerError::from)
}

pub fn parse_role(role: ParticipantRole) -> Result<engine::ParticipantRole, EngineError> {
    engine::ParticipantRole::try_from(role.as_str())
}

pub fn parse_status(status: ParticipantStatus) -> Result<engine::ParticipantStatus, EngineError> {
    engine::ParticipantStatus::try_from(status.as_str())
}

pub fn parse_trip_status(status: TripStatus) -> Result<engine::TripStatus, EngineError> {
    engine::TripStatus::try_from(status.as_str())
}

pub fn parse_expense_status(status: ExpenseStatus) -> Result<engine::ExpenseStatus, EngineError> {
    engine::ExpenseStatus::try_from(status.as_str())
}

pub fn parse_kind(kind: ItineraryKind) -> Result<engine::ItineraryKind, EngineError> {
    engine::ItineraryKind::try_from(kind.as_str())
}

pub fn parse_split(split: Split) -> engine::Split {
    match split {
        Split::Equal { participants } => engine::Split::Equal { participants },
        Split::Custom { amounts } => engine::Split::Custom { amounts },
        Split::Percentage { percentages } => engine::Split::Percentage { percentages },
    }
}
