//! SurrealDB implementation of [`EventRepository`].

use chrono::{DateTime, Utc};
use huiguan_core::error::PortalResult;
use huiguan_core::models::event::{CreateEvent, Event, EventStatus, UpdateEvent};
use huiguan_core::repository::EventRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct EventRow {
    title: String,
    date: DateTime<Utc>,
    time: String,
    venue: String,
    price_cents: i64,
    description: String,
    status: String,
    rejection_comment: Option<String>,
    created_by: String,
    max_capacity: Option<u32>,
    current_participants: u32,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct EventRowWithId {
    record_id: String,
    title: String,
    date: DateTime<Utc>,
    time: String,
    venue: String,
    price_cents: i64,
    description: String,
    status: String,
    rejection_comment: Option<String>,
    created_by: String,
    max_capacity: Option<u32>,
    current_participants: u32,
    created_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<EventStatus, DbError> {
    match s {
        "Pending" => Ok(EventStatus::Pending),
        "Approved" => Ok(EventStatus::Approved),
        "Rejected" => Ok(EventStatus::Rejected),
        other => Err(DbError::Migration(format!("unknown event status: {other}"))),
    }
}

fn status_to_string(s: &EventStatus) -> &'static str {
    match s {
        EventStatus::Pending => "Pending",
        EventStatus::Approved => "Approved",
        EventStatus::Rejected => "Rejected",
    }
}

impl EventRow {
    fn into_event(self, id: Uuid) -> Result<Event, DbError> {
        let created_by = Uuid::parse_str(&self.created_by)
            .map_err(|e| DbError::Migration(format!("invalid creator UUID: {e}")))?;
        Ok(Event {
            id,
            title: self.title,
            date: self.date,
            time: self.time,
            venue: self.venue,
            price_cents: self.price_cents,
            description: self.description,
            status: parse_status(&self.status)?,
            rejection_comment: self.rejection_comment,
            created_by,
            max_capacity: self.max_capacity,
            current_participants: self.current_participants,
            created_at: self.created_at,
        })
    }
}

impl EventRowWithId {
    fn try_into_event(self) -> Result<Event, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let created_by = Uuid::parse_str(&self.created_by)
            .map_err(|e| DbError::Migration(format!("invalid creator UUID: {e}")))?;
        Ok(Event {
            id,
            title: self.title,
            date: self.date,
            time: self.time,
            venue: self.venue,
            price_cents: self.price_cents,
            description: self.description,
            status: parse_status(&self.status)?,
            rejection_comment: self.rejection_comment,
            created_by,
            max_capacity: self.max_capacity,
            current_participants: self.current_participants,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Event repository.
#[derive(Clone)]
pub struct SurrealEventRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealEventRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> EventRepository for SurrealEventRepository<C> {
    async fn create(&self, input: CreateEvent) -> PortalResult<Event> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('event', $id) SET \
                 title = $title, \
                 date = $date, \
                 time = $time, \
                 venue = $venue, \
                 price_cents = $price_cents, \
                 description = $description, \
                 status = 'Pending', \
                 rejection_comment = NONE, \
                 created_by = $created_by, \
                 max_capacity = $max_capacity, \
                 current_participants = 0",
            )
            .bind(("id", id_str.clone()))
            .bind(("title", input.title))
            .bind(("date", input.date))
            .bind(("time", input.time))
            .bind(("venue", input.venue))
            .bind(("price_cents", input.price_cents))
            .bind(("description", input.description))
            .bind(("created_by", input.created_by.to_string()))
            .bind(("max_capacity", input.max_capacity))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<EventRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "event".into(),
            id: id_str,
        })?;

        Ok(row.into_event(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> PortalResult<Event> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('event', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EventRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "event".into(),
            id: id_str,
        })?;

        Ok(row.into_event(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateEvent) -> PortalResult<Event> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.rejection_comment.is_some() {
            sets.push("rejection_comment = $rejection_comment");
        }
        if input.max_capacity.is_some() {
            sets.push("max_capacity = $max_capacity");
        }
        if input.current_participants.is_some() {
            sets.push("current_participants = $current_participants");
        }

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!("UPDATE type::record('event', $id) SET {}", sets.join(", "));

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(ref status) = input.status {
            builder = builder.bind(("status", status_to_string(status).to_string()));
        }
        if let Some(rejection_comment) = input.rejection_comment {
            // Option<Option<String>>: Some(Some(v)) = set, Some(None) = clear
            builder = builder.bind(("rejection_comment", rejection_comment));
        }
        if let Some(max_capacity) = input.max_capacity {
            builder = builder.bind(("max_capacity", max_capacity));
        }
        if let Some(current_participants) = input.current_participants {
            builder = builder.bind(("current_participants", current_participants));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<EventRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "event".into(),
            id: id_str,
        })?;

        Ok(row.into_event(id)?)
    }

    async fn list_by_status(&self, status: EventStatus) -> PortalResult<Vec<Event>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM event \
                 WHERE status = $status \
                 ORDER BY created_at ASC",
            )
            .bind(("status", status_to_string(&status).to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EventRowWithId> = result.take(0).map_err(DbError::from)?;

        let events = rows
            .into_iter()
            .map(|row| row.try_into_event())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(events)
    }

    async fn list_by_creator(&self, created_by: Uuid) -> PortalResult<Vec<Event>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM event \
                 WHERE created_by = $created_by \
                 ORDER BY created_at ASC",
            )
            .bind(("created_by", created_by.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EventRowWithId> = result.take(0).map_err(DbError::from)?;

        let events = rows
            .into_iter()
            .map(|row| row.try_into_event())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(events)
    }
}
