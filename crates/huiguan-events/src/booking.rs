//! Ticket booking against approved events.

use huiguan_core::error::PortalResult;
use huiguan_core::models::booking::{Booking, CreateBooking};
use huiguan_core::models::event::{EventStatus, UpdateEvent};
use huiguan_core::models::user::{UpdateUser, loyalty_points};
use huiguan_core::repository::{BookingRepository, EventRepository, UserRepository};
use rand::Rng;
use tracing::info;
use uuid::Uuid;

use crate::error::EventError;

/// Generate an entry pass code: two uppercase letters + five digits.
pub fn generate_pass_code() -> String {
    let mut rng = rand::rng();
    let letters: String = (0..2)
        .map(|_| char::from(b'A' + rng.random_range(0..26)))
        .collect();
    let number: u32 = rng.random_range(10_000..100_000);
    format!("{letters}{number}")
}

/// Booking service.
///
/// Generic over repository implementations so the booking layer has no
/// dependency on the database crate.
pub struct BookingService<B, E, U>
where
    B: BookingRepository,
    E: EventRepository,
    U: UserRepository,
{
    booking_repo: B,
    event_repo: E,
    user_repo: U,
}

impl<B, E, U> BookingService<B, E, U>
where
    B: BookingRepository,
    E: EventRepository,
    U: UserRepository,
{
    pub fn new(booking_repo: B, event_repo: E, user_repo: U) -> Self {
        Self {
            booking_repo,
            event_repo,
            user_repo,
        }
    }

    /// Book seats on an approved event.
    ///
    /// Fails without side effects when the event is not approved or the
    /// requested seats exceed what is left. On success: writes the
    /// booking with a fresh pass code, bumps the event's participant
    /// count, and credits the booker one point per whole RM 10 spent.
    pub async fn book_event(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        attendees: u32,
        payment_method: String,
    ) -> PortalResult<Booking> {
        if attendees == 0 {
            return Err(EventError::NoAttendees.into());
        }

        let event = self.event_repo.get_by_id(event_id).await?;
        if event.status != EventStatus::Approved {
            return Err(EventError::EventNotApproved.into());
        }

        let capacity = event.max_capacity.unwrap_or(u32::MAX);
        let available = capacity.saturating_sub(event.current_participants);
        if attendees > available {
            return Err(EventError::CapacityExceeded {
                requested: attendees,
                available,
            }
            .into());
        }

        let total_price_cents = event.price_cents * i64::from(attendees);

        let booking = self
            .booking_repo
            .create(CreateBooking {
                user_id,
                event_id,
                attendees,
                total_price_cents,
                payment_method,
                pass_code: generate_pass_code(),
            })
            .await?;

        self.event_repo
            .update(
                event_id,
                UpdateEvent {
                    current_participants: Some(event.current_participants + attendees),
                    ..Default::default()
                },
            )
            .await?;

        let booker = self.user_repo.get_by_id(user_id).await?;
        self.user_repo
            .update(
                user_id,
                UpdateUser {
                    points: Some(booker.points + loyalty_points(total_price_cents)),
                    ..Default::default()
                },
            )
            .await?;

        info!(
            booking_id = %booking.id,
            event_id = %event_id,
            attendees,
            "Event booked"
        );
        Ok(booking)
    }

    /// A member's bookings, newest first.
    pub async fn bookings_for(&self, user_id: Uuid) -> PortalResult<Vec<Booking>> {
        self.booking_repo.list_by_user(user_id).await
    }
}
