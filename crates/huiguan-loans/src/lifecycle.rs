//! Loan lifecycle — application, acceptance, and payment application.
//!
//! [`apply_payment`] is a pure function over an in-memory snapshot; the
//! service wraps it with repository loads and writes. There is no retry
//! path: a failed store write simply propagates.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use huiguan_core::error::PortalResult;
use huiguan_core::models::loan::{
    ApplicationStatus, CreateLoan, CreateLoanApplication, Loan, LoanApplication, LoanStatus,
    UpdateLoan,
};
use huiguan_core::models::user::{UpdateUser, loyalty_points};
use huiguan_core::repository::{LoanApplicationRepository, LoanRepository, UserRepository};
use tracing::info;
use uuid::Uuid;

use crate::config::LoanConfig;
use crate::error::LoanError;

/// Midnight UTC on the 1st of the month after `reference`.
pub fn first_of_next_month(reference: DateTime<Utc>) -> DateTime<Utc> {
    let (year, month) = if reference.month() == 12 {
        (reference.year() + 1, 1)
    } else {
        (reference.year(), reference.month() + 1)
    };
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .expect("first of month is a valid instant")
}

/// Result of applying a payment to a loan snapshot.
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    pub loan: Loan,
    /// Points credited to the payer, awarded on the full submitted
    /// amount even when it overpays.
    pub points_awarded: i64,
}

/// Apply a payment to a loan snapshot.
///
/// The remaining balance is clamped at zero; any excess over the
/// outstanding balance is forfeited. When the loan is paid off the
/// status flips to Completed and the next due date is cleared,
/// otherwise the due date advances to the 1st of the month after `now`.
/// The amount is not checked against the scheduled monthly payment.
pub fn apply_payment(loan: &Loan, amount_cents: i64, now: DateTime<Utc>) -> PaymentOutcome {
    let total_paid = loan.total_paid_cents + amount_cents;
    let remaining = (loan.amount_cents - total_paid).max(0);

    let (status, next_payment_date) = if remaining == 0 {
        (LoanStatus::Completed, None)
    } else {
        (loan.status, Some(first_of_next_month(now)))
    };

    let mut updated = loan.clone();
    updated.total_paid_cents = total_paid;
    updated.remaining_balance_cents = remaining;
    updated.payments_made = loan.payments_made + 1;
    updated.status = status;
    updated.next_payment_date = next_payment_date;

    PaymentOutcome {
        loan: updated,
        points_awarded: loyalty_points(amount_cents),
    }
}

/// Loan service.
///
/// Generic over repository implementations so the loan layer has no
/// dependency on the database crate.
pub struct LoanService<L, A, U>
where
    L: LoanRepository,
    A: LoanApplicationRepository,
    U: UserRepository,
{
    loan_repo: L,
    application_repo: A,
    user_repo: U,
    config: LoanConfig,
}

impl<L, A, U> LoanService<L, A, U>
where
    L: LoanRepository,
    A: LoanApplicationRepository,
    U: UserRepository,
{
    pub fn new(loan_repo: L, application_repo: A, user_repo: U, config: LoanConfig) -> Self {
        Self {
            loan_repo,
            application_repo,
            user_repo,
            config,
        }
    }

    /// Submit an application for the standing study-loan program.
    ///
    /// A member with an open loan may not apply again.
    pub async fn submit_application(
        &self,
        user_id: Uuid,
        purpose: String,
    ) -> PortalResult<LoanApplication> {
        let existing = self.loan_repo.list_by_user(user_id).await?;
        if existing.iter().any(Loan::is_open) {
            return Err(LoanError::OpenLoanExists.into());
        }

        self.application_repo
            .create(CreateLoanApplication {
                user_id,
                amount_cents: self.config.principal_cents,
                purpose,
            })
            .await
    }

    /// Accept a pending application, creating the loan.
    ///
    /// The first payment falls due on the 1st of the month after
    /// acceptance.
    pub async fn accept_application(&self, application_id: Uuid) -> PortalResult<Loan> {
        let application = self.application_repo.get_by_id(application_id).await?;
        if application.status != ApplicationStatus::Pending {
            return Err(LoanError::ApplicationNotPending.into());
        }

        self.application_repo
            .set_status(application_id, ApplicationStatus::Accepted)
            .await?;

        let loan = self
            .loan_repo
            .create(CreateLoan {
                user_id: application.user_id,
                amount_cents: application.amount_cents,
                purpose: application.purpose,
                monthly_payment_cents: self.config.monthly_payment_cents,
                total_payments: self.config.total_payments_for(application.amount_cents),
                next_payment_date: first_of_next_month(Utc::now()),
            })
            .await?;

        info!(loan_id = %loan.id, user_id = %loan.user_id, "Loan opened");
        Ok(loan)
    }

    /// Reject a pending application.
    pub async fn reject_application(&self, application_id: Uuid) -> PortalResult<LoanApplication> {
        let application = self.application_repo.get_by_id(application_id).await?;
        if application.status != ApplicationStatus::Pending {
            return Err(LoanError::ApplicationNotPending.into());
        }

        self.application_repo
            .set_status(application_id, ApplicationStatus::Rejected)
            .await
    }

    /// Apply a payment to a loan and credit the payer's loyalty points.
    pub async fn make_payment(&self, loan_id: Uuid, amount_cents: i64) -> PortalResult<Loan> {
        if amount_cents <= 0 {
            return Err(LoanError::NonPositivePayment.into());
        }

        let loan = self.loan_repo.get_by_id(loan_id).await?;
        let outcome = apply_payment(&loan, amount_cents, Utc::now());

        let saved = self
            .loan_repo
            .update(
                loan_id,
                UpdateLoan {
                    payments_made: outcome.loan.payments_made,
                    total_paid_cents: outcome.loan.total_paid_cents,
                    remaining_balance_cents: outcome.loan.remaining_balance_cents,
                    next_payment_date: outcome.loan.next_payment_date,
                    status: outcome.loan.status,
                },
            )
            .await?;

        let payer = self.user_repo.get_by_id(loan.user_id).await?;
        self.user_repo
            .update(
                loan.user_id,
                UpdateUser {
                    points: Some(payer.points + outcome.points_awarded),
                    ..Default::default()
                },
            )
            .await?;

        info!(
            loan_id = %loan_id,
            amount_cents,
            remaining_cents = saved.remaining_balance_cents,
            "Payment applied"
        );
        Ok(saved)
    }
}
