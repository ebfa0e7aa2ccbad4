//! SurrealDB implementation of [`BookingRepository`].

use chrono::{DateTime, Utc};
use huiguan_core::error::PortalResult;
use huiguan_core::models::booking::{Booking, BookingStatus, CreateBooking};
use huiguan_core::repository::BookingRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct BookingRow {
    user_id: String,
    event_id: String,
    attendees: u32,
    total_price_cents: i64,
    payment_method: String,
    pass_code: String,
    status: String,
    booked_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct BookingRowWithId {
    record_id: String,
    user_id: String,
    event_id: String,
    attendees: u32,
    total_price_cents: i64,
    payment_method: String,
    pass_code: String,
    status: String,
    booked_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<BookingStatus, DbError> {
    match s {
        "Active" => Ok(BookingStatus::Active),
        "Cancelled" => Ok(BookingStatus::Cancelled),
        other => Err(DbError::Migration(format!(
            "unknown booking status: {other}"
        ))),
    }
}

impl BookingRow {
    fn into_booking(self, id: Uuid) -> Result<Booking, DbError> {
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
        let event_id = Uuid::parse_str(&self.event_id)
            .map_err(|e| DbError::Migration(format!("invalid event UUID: {e}")))?;
        Ok(Booking {
            id,
            user_id,
            event_id,
            attendees: self.attendees,
            total_price_cents: self.total_price_cents,
            payment_method: self.payment_method,
            pass_code: self.pass_code,
            status: parse_status(&self.status)?,
            booked_at: self.booked_at,
        })
    }
}

impl BookingRowWithId {
    fn try_into_booking(self) -> Result<Booking, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
        let event_id = Uuid::parse_str(&self.event_id)
            .map_err(|e| DbError::Migration(format!("invalid event UUID: {e}")))?;
        Ok(Booking {
            id,
            user_id,
            event_id,
            attendees: self.attendees,
            total_price_cents: self.total_price_cents,
            payment_method: self.payment_method,
            pass_code: self.pass_code,
            status: parse_status(&self.status)?,
            booked_at: self.booked_at,
        })
    }
}

/// SurrealDB implementation of the Booking repository.
#[derive(Clone)]
pub struct SurrealBookingRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealBookingRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> BookingRepository for SurrealBookingRepository<C> {
    async fn create(&self, input: CreateBooking) -> PortalResult<Booking> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('booking', $id) SET \
                 user_id = $user_id, \
                 event_id = $event_id, \
                 attendees = $attendees, \
                 total_price_cents = $total_price_cents, \
                 payment_method = $payment_method, \
                 pass_code = $pass_code, \
                 status = 'Active'",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("event_id", input.event_id.to_string()))
            .bind(("attendees", input.attendees))
            .bind(("total_price_cents", input.total_price_cents))
            .bind(("payment_method", input.payment_method))
            .bind(("pass_code", input.pass_code))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<BookingRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "booking".into(),
            id: id_str,
        })?;

        Ok(row.into_booking(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> PortalResult<Booking> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('booking', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BookingRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "booking".into(),
            id: id_str,
        })?;

        Ok(row.into_booking(id)?)
    }

    async fn list_by_user(&self, user_id: Uuid) -> PortalResult<Vec<Booking>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM booking \
                 WHERE user_id = $user_id \
                 ORDER BY booked_at DESC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BookingRowWithId> = result.take(0).map_err(DbError::from)?;

        let bookings = rows
            .into_iter()
            .map(|row| row.try_into_booking())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(bookings)
    }
}
