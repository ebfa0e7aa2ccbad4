//! SurrealDB implementation of [`LoanApplicationRepository`].

use chrono::{DateTime, Utc};
use huiguan_core::error::PortalResult;
use huiguan_core::models::loan::{ApplicationStatus, CreateLoanApplication, LoanApplication};
use huiguan_core::repository::LoanApplicationRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ApplicationRow {
    user_id: String,
    amount_cents: i64,
    purpose: String,
    status: String,
    submitted_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ApplicationRowWithId {
    record_id: String,
    user_id: String,
    amount_cents: i64,
    purpose: String,
    status: String,
    submitted_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<ApplicationStatus, DbError> {
    match s {
        "Pending" => Ok(ApplicationStatus::Pending),
        "Accepted" => Ok(ApplicationStatus::Accepted),
        "Rejected" => Ok(ApplicationStatus::Rejected),
        other => Err(DbError::Migration(format!(
            "unknown application status: {other}"
        ))),
    }
}

fn status_to_string(s: &ApplicationStatus) -> &'static str {
    match s {
        ApplicationStatus::Pending => "Pending",
        ApplicationStatus::Accepted => "Accepted",
        ApplicationStatus::Rejected => "Rejected",
    }
}

impl ApplicationRow {
    fn into_application(self, id: Uuid) -> Result<LoanApplication, DbError> {
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
        Ok(LoanApplication {
            id,
            user_id,
            amount_cents: self.amount_cents,
            purpose: self.purpose,
            status: parse_status(&self.status)?,
            submitted_at: self.submitted_at,
        })
    }
}

impl ApplicationRowWithId {
    fn try_into_application(self) -> Result<LoanApplication, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
        Ok(LoanApplication {
            id,
            user_id,
            amount_cents: self.amount_cents,
            purpose: self.purpose,
            status: parse_status(&self.status)?,
            submitted_at: self.submitted_at,
        })
    }
}

/// SurrealDB implementation of the LoanApplication repository.
#[derive(Clone)]
pub struct SurrealLoanApplicationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealLoanApplicationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> LoanApplicationRepository for SurrealLoanApplicationRepository<C> {
    async fn create(&self, input: CreateLoanApplication) -> PortalResult<LoanApplication> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('loan_application', $id) SET \
                 user_id = $user_id, \
                 amount_cents = $amount_cents, \
                 purpose = $purpose, \
                 status = 'Pending'",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("amount_cents", input.amount_cents))
            .bind(("purpose", input.purpose))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<ApplicationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "loan_application".into(),
            id: id_str,
        })?;

        Ok(row.into_application(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> PortalResult<LoanApplication> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('loan_application', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ApplicationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "loan_application".into(),
            id: id_str,
        })?;

        Ok(row.into_application(id)?)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> PortalResult<LoanApplication> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('loan_application', $id) SET \
                 status = $status",
            )
            .bind(("id", id_str.clone()))
            .bind(("status", status_to_string(&status).to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<ApplicationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "loan_application".into(),
            id: id_str,
        })?;

        Ok(row.into_application(id)?)
    }

    async fn list_pending(&self) -> PortalResult<Vec<LoanApplication>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM loan_application \
                 WHERE status = 'Pending' \
                 ORDER BY submitted_at ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ApplicationRowWithId> = result.take(0).map_err(DbError::from)?;

        let applications = rows
            .into_iter()
            .map(|row| row.try_into_application())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(applications)
    }
}
