//! Event lifecycle — sub-editors draft, super-admins approve or reject.

use huiguan_core::error::PortalResult;
use huiguan_core::models::event::{CreateEvent, Event, EventStatus, UpdateEvent};
use huiguan_core::repository::EventRepository;
use tracing::info;
use uuid::Uuid;

use crate::error::EventError;

/// Capacity assigned on approval when the draft left it unset.
pub const DEFAULT_MAX_CAPACITY: u32 = 100;

/// Event service.
///
/// Generic over the event repository so the lifecycle layer has no
/// dependency on the database crate.
pub struct EventService<E: EventRepository> {
    event_repo: E,
}

impl<E: EventRepository> EventService<E> {
    pub fn new(event_repo: E) -> Self {
        Self { event_repo }
    }

    /// Draft a new event; it stays Pending until a super-admin acts.
    pub async fn draft_event(&self, input: CreateEvent) -> PortalResult<Event> {
        let event = self.event_repo.create(input).await?;
        info!(event_id = %event.id, title = %event.title, "Event drafted");
        Ok(event)
    }

    /// Approve a pending event, defaulting its capacity to
    /// [`DEFAULT_MAX_CAPACITY`] when the draft left it unset.
    pub async fn approve_event(&self, event_id: Uuid) -> PortalResult<Event> {
        let event = self.event_repo.get_by_id(event_id).await?;
        if event.status != EventStatus::Pending {
            return Err(EventError::EventNotPending.into());
        }

        let approved = self
            .event_repo
            .update(
                event_id,
                UpdateEvent {
                    status: Some(EventStatus::Approved),
                    max_capacity: Some(event.max_capacity.unwrap_or(DEFAULT_MAX_CAPACITY)),
                    ..Default::default()
                },
            )
            .await?;

        info!(event_id = %event_id, "Event approved");
        Ok(approved)
    }

    /// Reject a pending event with a reason the drafting sub-editor
    /// will see.
    pub async fn reject_event(&self, event_id: Uuid, comment: &str) -> PortalResult<Event> {
        if comment.trim().is_empty() {
            return Err(EventError::BlankRejectionComment.into());
        }

        let event = self.event_repo.get_by_id(event_id).await?;
        if event.status != EventStatus::Pending {
            return Err(EventError::EventNotPending.into());
        }

        let rejected = self
            .event_repo
            .update(
                event_id,
                UpdateEvent {
                    status: Some(EventStatus::Rejected),
                    rejection_comment: Some(Some(comment.trim().to_string())),
                    ..Default::default()
                },
            )
            .await?;

        info!(event_id = %event_id, "Event rejected");
        Ok(rejected)
    }

    /// Events awaiting super-admin review.
    pub async fn pending_events(&self) -> PortalResult<Vec<Event>> {
        self.event_repo.list_by_status(EventStatus::Pending).await
    }

    /// Events open to members.
    pub async fn approved_events(&self) -> PortalResult<Vec<Event>> {
        self.event_repo.list_by_status(EventStatus::Approved).await
    }
}
