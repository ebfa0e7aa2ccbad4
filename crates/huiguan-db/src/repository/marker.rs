//! SurrealDB implementation of [`OverdueMarkerRepository`].
//!
//! Markers are keyed deterministically by `loan_id-year-month`, so a
//! repeated append for the same billing month lands on the same record
//! instead of duplicating it. Markers are never pruned.

use huiguan_core::error::PortalResult;
use huiguan_core::repository::OverdueMarkerRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct MarkerRow {
    #[allow(dead_code)]
    loan_id: String,
    #[allow(dead_code)]
    year: i32,
    #[allow(dead_code)]
    month: u32,
}

fn marker_key(loan_id: Uuid, year: i32, month: u32) -> String {
    format!("{loan_id}-{year}-{month}")
}

/// SurrealDB implementation of the overdue-marker set.
#[derive(Clone)]
pub struct SurrealOverdueMarkerRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOverdueMarkerRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OverdueMarkerRepository for SurrealOverdueMarkerRepository<C> {
    async fn contains(&self, loan_id: Uuid, year: i32, month: u32) -> PortalResult<bool> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('overdue_marker', $key)")
            .bind(("key", marker_key(loan_id, year, month)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MarkerRow> = result.take(0).map_err(DbError::from)?;
        Ok(!rows.is_empty())
    }

    async fn append(&self, loan_id: Uuid, year: i32, month: u32) -> PortalResult<()> {
        self.db
            .query(
                "CREATE type::record('overdue_marker', $key) SET \
                 loan_id = $loan_id, \
                 year = $year, \
                 month = $month",
            )
            .bind(("key", marker_key(loan_id, year, month)))
            .bind(("loan_id", loan_id.to_string()))
            .bind(("year", year))
            .bind(("month", month))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
