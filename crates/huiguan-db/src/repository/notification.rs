//! SurrealDB implementation of [`NotificationRepository`].

use chrono::{DateTime, Utc};
use huiguan_core::error::PortalResult;
use huiguan_core::models::notification::{
    CreateNotification, Notification, NotificationCategory,
};
use huiguan_core::repository::NotificationRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct NotificationRow {
    user_id: String,
    title: String,
    body: String,
    category: String,
    created_at: DateTime<Utc>,
    read: bool,
}

#[derive(Debug, SurrealValue)]
struct NotificationRowWithId {
    record_id: String,
    user_id: String,
    title: String,
    body: String,
    category: String,
    created_at: DateTime<Utc>,
    read: bool,
}

fn parse_category(s: &str) -> Result<NotificationCategory, DbError> {
    match s {
        "Event" => Ok(NotificationCategory::Event),
        "Donation" => Ok(NotificationCategory::Donation),
        "Loan" => Ok(NotificationCategory::Loan),
        "System" => Ok(NotificationCategory::System),
        other => Err(DbError::Migration(format!(
            "unknown notification category: {other}"
        ))),
    }
}

fn category_to_string(c: &NotificationCategory) -> &'static str {
    match c {
        NotificationCategory::Event => "Event",
        NotificationCategory::Donation => "Donation",
        NotificationCategory::Loan => "Loan",
        NotificationCategory::System => "System",
    }
}

impl NotificationRow {
    fn into_notification(self, id: Uuid) -> Result<Notification, DbError> {
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
        Ok(Notification {
            id,
            user_id,
            title: self.title,
            body: self.body,
            category: parse_category(&self.category)?,
            created_at: self.created_at,
            read: self.read,
        })
    }
}

impl NotificationRowWithId {
    fn try_into_notification(self) -> Result<Notification, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
        Ok(Notification {
            id,
            user_id,
            title: self.title,
            body: self.body,
            category: parse_category(&self.category)?,
            created_at: self.created_at,
            read: self.read,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Notification repository.
///
/// Records are append-only; the only mutation is flipping the `read`
/// flag.
#[derive(Clone)]
pub struct SurrealNotificationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealNotificationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> NotificationRepository for SurrealNotificationRepository<C> {
    async fn append(&self, input: CreateNotification) -> PortalResult<Notification> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('notification', $id) SET \
                 user_id = $user_id, \
                 title = $title, \
                 body = $body, \
                 category = $category, \
                 read = false",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("title", input.title))
            .bind(("body", input.body))
            .bind(("category", category_to_string(&input.category).to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<NotificationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "notification".into(),
            id: id_str,
        })?;

        Ok(row.into_notification(id)?)
    }

    async fn list_for_user(&self, user_id: Uuid) -> PortalResult<Vec<Notification>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM notification \
                 WHERE user_id = $user_id \
                 ORDER BY created_at DESC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NotificationRowWithId> = result.take(0).map_err(DbError::from)?;

        let notifications = rows
            .into_iter()
            .map(|row| row.try_into_notification())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(notifications)
    }

    async fn unread_count(&self, user_id: Uuid) -> PortalResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM notification \
                 WHERE user_id = $user_id AND read = false \
                 GROUP ALL",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn mark_read(&self, id: Uuid) -> PortalResult<()> {
        let id_str = id.to_string();

        let result = self
            .db
            .query("UPDATE type::record('notification', $id) SET read = true")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<NotificationRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "notification".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn mark_all_read(&self, user_id: Uuid) -> PortalResult<u64> {
        // Count unread first, then flip them.
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM notification \
                 WHERE user_id = $user_id AND read = false \
                 GROUP ALL",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        self.db
            .query(
                "UPDATE notification SET read = true \
                 WHERE user_id = $user_id AND read = false",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(total)
    }
}
