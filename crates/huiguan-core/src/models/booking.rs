//! Ticket-booking domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookingStatus {
    Active,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub attendees: u32,
    pub total_price_cents: i64,
    pub payment_method: String,
    /// Entry pass shown at the door: two uppercase letters + five digits.
    pub pass_code: String,
    pub status: BookingStatus,
    pub booked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBooking {
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub attendees: u32,
    pub total_price_cents: i64,
    pub payment_method: String,
    pub pass_code: String,
}
