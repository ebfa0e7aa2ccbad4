//! Event domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EventStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    /// Calendar date of the event; time of day is kept as entered text
    /// (e.g. "7:30 PM") because drafts carry free-form schedules.
    pub date: DateTime<Utc>,
    pub time: String,
    pub venue: String,
    pub price_cents: i64,
    pub description: String,
    pub status: EventStatus,
    pub rejection_comment: Option<String>,
    pub created_by: Uuid,
    /// Defaulted to 100 on approval when the draft left it unset.
    pub max_capacity: Option<u32>,
    pub current_participants: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEvent {
    pub title: String,
    pub date: DateTime<Utc>,
    pub time: String,
    pub venue: String,
    pub price_cents: i64,
    pub description: String,
    pub created_by: Uuid,
    pub max_capacity: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateEvent {
    pub status: Option<EventStatus>,
    pub rejection_comment: Option<Option<String>>,
    pub max_capacity: Option<u32>,
    pub current_participants: Option<u32>,
}
