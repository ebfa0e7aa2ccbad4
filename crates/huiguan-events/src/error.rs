//! Event-service error types.

use huiguan_core::error::PortalError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("event is not pending review")]
    EventNotPending,

    #[error("event is not open for booking")]
    EventNotApproved,

    #[error("a rejection reason is required")]
    BlankRejectionComment,

    #[error("booking must include at least one attendee")]
    NoAttendees,

    #[error("capacity exceeded: {requested} requested, {available} available")]
    CapacityExceeded { requested: u32, available: u32 },
}

impl From<EventError> for PortalError {
    fn from(err: EventError) -> Self {
        PortalError::Validation {
            message: err.to_string(),
        }
    }
}
