//! Loan and loan-application domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LoanStatus {
    Approved,
    Completed,
}

/// An open or repaid member loan.
///
/// Invariants: `remaining_balance_cents = max(0, amount_cents -
/// total_paid_cents)`; `status == Completed` iff the remaining balance is
/// zero; `next_payment_date` is `None` iff completed. Loans are created
/// only by accepting an application, mutated only by payment application,
/// and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Principal.
    pub amount_cents: i64,
    pub purpose: String,
    pub monthly_payment_cents: i64,
    /// Scheduled number of payments over the loan's life.
    pub total_payments: u32,
    pub payments_made: u32,
    pub total_paid_cents: i64,
    pub remaining_balance_cents: i64,
    pub next_payment_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub applied_at: DateTime<Utc>,
}

impl Loan {
    /// Open = still owing and eligible for the deadline sweep.
    pub fn is_open(&self) -> bool {
        self.status == LoanStatus::Approved && self.remaining_balance_cents > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLoan {
    pub user_id: Uuid,
    pub amount_cents: i64,
    pub purpose: String,
    pub monthly_payment_cents: i64,
    pub total_payments: u32,
    pub next_payment_date: DateTime<Utc>,
}

/// Payment-application snapshot written back to the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateLoan {
    pub payments_made: u32,
    pub total_paid_cents: i64,
    pub remaining_balance_cents: i64,
    pub next_payment_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanApplication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount_cents: i64,
    pub purpose: String,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLoanApplication {
    pub user_id: Uuid,
    pub amount_cents: i64,
    pub purpose: String,
}
