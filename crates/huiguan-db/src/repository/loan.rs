//! SurrealDB implementation of [`LoanRepository`].

use chrono::{DateTime, Utc};
use huiguan_core::error::PortalResult;
use huiguan_core::models::loan::{CreateLoan, Loan, LoanStatus, UpdateLoan};
use huiguan_core::repository::LoanRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct LoanRow {
    user_id: String,
    amount_cents: i64,
    purpose: String,
    monthly_payment_cents: i64,
    total_payments: u32,
    payments_made: u32,
    total_paid_cents: i64,
    remaining_balance_cents: i64,
    next_payment_date: Option<DateTime<Utc>>,
    status: String,
    applied_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct LoanRowWithId {
    record_id: String,
    user_id: String,
    amount_cents: i64,
    purpose: String,
    monthly_payment_cents: i64,
    total_payments: u32,
    payments_made: u32,
    total_paid_cents: i64,
    remaining_balance_cents: i64,
    next_payment_date: Option<DateTime<Utc>>,
    status: String,
    applied_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<LoanStatus, DbError> {
    match s {
        "Approved" => Ok(LoanStatus::Approved),
        "Completed" => Ok(LoanStatus::Completed),
        other => Err(DbError::Migration(format!("unknown loan status: {other}"))),
    }
}

fn status_to_string(s: &LoanStatus) -> &'static str {
    match s {
        LoanStatus::Approved => "Approved",
        LoanStatus::Completed => "Completed",
    }
}

impl LoanRow {
    fn into_loan(self, id: Uuid) -> Result<Loan, DbError> {
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
        Ok(Loan {
            id,
            user_id,
            amount_cents: self.amount_cents,
            purpose: self.purpose,
            monthly_payment_cents: self.monthly_payment_cents,
            total_payments: self.total_payments,
            payments_made: self.payments_made,
            total_paid_cents: self.total_paid_cents,
            remaining_balance_cents: self.remaining_balance_cents,
            next_payment_date: self.next_payment_date,
            status: parse_status(&self.status)?,
            applied_at: self.applied_at,
        })
    }
}

impl LoanRowWithId {
    fn try_into_loan(self) -> Result<Loan, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
        Ok(Loan {
            id,
            user_id,
            amount_cents: self.amount_cents,
            purpose: self.purpose,
            monthly_payment_cents: self.monthly_payment_cents,
            total_payments: self.total_payments,
            payments_made: self.payments_made,
            total_paid_cents: self.total_paid_cents,
            remaining_balance_cents: self.remaining_balance_cents,
            next_payment_date: self.next_payment_date,
            status: parse_status(&self.status)?,
            applied_at: self.applied_at,
        })
    }
}

/// SurrealDB implementation of the Loan repository.
#[derive(Clone)]
pub struct SurrealLoanRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealLoanRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> LoanRepository for SurrealLoanRepository<C> {
    async fn create(&self, input: CreateLoan) -> PortalResult<Loan> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('loan', $id) SET \
                 user_id = $user_id, \
                 amount_cents = $amount_cents, \
                 purpose = $purpose, \
                 monthly_payment_cents = $monthly_payment_cents, \
                 total_payments = $total_payments, \
                 payments_made = 0, \
                 total_paid_cents = 0, \
                 remaining_balance_cents = $amount_cents, \
                 next_payment_date = $next_payment_date, \
                 status = 'Approved'",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("amount_cents", input.amount_cents))
            .bind(("purpose", input.purpose))
            .bind(("monthly_payment_cents", input.monthly_payment_cents))
            .bind(("total_payments", input.total_payments))
            .bind(("next_payment_date", input.next_payment_date))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<LoanRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "loan".into(),
            id: id_str,
        })?;

        Ok(row.into_loan(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> PortalResult<Loan> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('loan', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LoanRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "loan".into(),
            id: id_str,
        })?;

        Ok(row.into_loan(id)?)
    }

    async fn list_by_user(&self, user_id: Uuid) -> PortalResult<Vec<Loan>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM loan \
                 WHERE user_id = $user_id \
                 ORDER BY applied_at ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LoanRowWithId> = result.take(0).map_err(DbError::from)?;

        let loans = rows
            .into_iter()
            .map(|row| row.try_into_loan())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(loans)
    }

    async fn list_open(&self) -> PortalResult<Vec<Loan>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM loan \
                 WHERE status = 'Approved' \
                 AND remaining_balance_cents > 0",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LoanRowWithId> = result.take(0).map_err(DbError::from)?;

        let loans = rows
            .into_iter()
            .map(|row| row.try_into_loan())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(loans)
    }

    async fn update(&self, id: Uuid, input: UpdateLoan) -> PortalResult<Loan> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('loan', $id) SET \
                 payments_made = $payments_made, \
                 total_paid_cents = $total_paid_cents, \
                 remaining_balance_cents = $remaining_balance_cents, \
                 next_payment_date = $next_payment_date, \
                 status = $status",
            )
            .bind(("id", id_str.clone()))
            .bind(("payments_made", input.payments_made))
            .bind(("total_paid_cents", input.total_paid_cents))
            .bind(("remaining_balance_cents", input.remaining_balance_cents))
            .bind(("next_payment_date", input.next_payment_date))
            .bind(("status", status_to_string(&input.status).to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<LoanRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "loan".into(),
            id: id_str,
        })?;

        Ok(row.into_loan(id)?)
    }
}
