//! Payment-deadline sweep.
//!
//! Scans every open loan against the monthly cutoff (end of day on the
//! 8th) and notifies the owner plus every admin-capable member, at most
//! once per loan per billing month. The marker set makes repeated runs
//! within the same month idempotent.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use huiguan_core::error::PortalResult;
use huiguan_core::models::loan::Loan;
use huiguan_core::models::notification::{CreateNotification, NotificationCategory};
use huiguan_core::models::user::User;
use huiguan_core::repository::{
    LoanRepository, NotificationRepository, OverdueMarkerRepository, UserRepository,
};
use tracing::{debug, info};

/// Payments fall due on the 1st; the grace period runs through end of
/// day on the 8th.
pub const PAYMENT_DEADLINE_DAY: u32 = 8;

/// End of day on the 8th of `reference`'s month.
pub fn payment_deadline(reference: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(
        reference.year(),
        reference.month(),
        PAYMENT_DEADLINE_DAY,
        23,
        59,
        59,
    )
    .single()
    .expect("deadline is a valid instant")
        + Duration::milliseconds(999)
}

/// Whether a loan payment is overdue as of `reference`.
///
/// Overdue means `reference` is past the deadline AND the due date fell
/// on or before it: a loan is flagged starting the 9th of the month,
/// and only if it was due by the 8th. A loan with no due date is never
/// overdue.
pub fn is_payment_overdue(
    next_payment_date: Option<DateTime<Utc>>,
    reference: DateTime<Utc>,
) -> bool {
    let Some(due) = next_payment_date else {
        return false;
    };
    let deadline = payment_deadline(reference);
    reference > deadline && due <= deadline
}

/// What a sweep run did.
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    pub loans_scanned: usize,
    pub loans_notified: usize,
    pub notifications_sent: usize,
}

fn fmt_rm(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

fn owner_notice(loan: &Loan, simulated: bool) -> CreateNotification {
    let (title, tag) = if simulated {
        ("Payment Overdue - Action Required (Simulated)", " [SIMULATED]")
    } else {
        ("Payment Overdue - Action Required", "")
    };
    CreateNotification {
        user_id: loan.user_id,
        title: title.into(),
        body: format!(
            "Your monthly loan payment of RM {} was due on the {}th. \
             Please make your payment as soon as possible.{}",
            fmt_rm(loan.monthly_payment_cents),
            PAYMENT_DEADLINE_DAY,
            tag,
        ),
        category: NotificationCategory::Loan,
    }
}

fn admin_notice(loan: &Loan, admin: &User, simulated: bool) -> CreateNotification {
    let (title, tag) = if simulated {
        ("Loan Payment Overdue Alert (Simulated)", " [SIMULATED]")
    } else {
        ("Loan Payment Overdue Alert", "")
    };
    CreateNotification {
        user_id: admin.id,
        title: title.into(),
        body: format!(
            "Member loan payment (RM {}) is overdue. Loan ID: {}{}",
            fmt_rm(loan.monthly_payment_cents),
            loan.id,
            tag,
        ),
        category: NotificationCategory::Loan,
    }
}

/// The deadline sweep.
///
/// Generic over repository implementations so it has no dependency on
/// the database crate.
pub struct DeadlineSweep<L, U, N, M>
where
    L: LoanRepository,
    U: UserRepository,
    N: NotificationRepository,
    M: OverdueMarkerRepository,
{
    loan_repo: L,
    user_repo: U,
    notification_repo: N,
    marker_repo: M,
}

impl<L, U, N, M> DeadlineSweep<L, U, N, M>
where
    L: LoanRepository,
    U: UserRepository,
    N: NotificationRepository,
    M: OverdueMarkerRepository,
{
    pub fn new(loan_repo: L, user_repo: U, notification_repo: N, marker_repo: M) -> Self {
        Self {
            loan_repo,
            user_repo,
            notification_repo,
            marker_repo,
        }
    }

    /// Run the sweep as of `reference`.
    ///
    /// For each open loan that is overdue and not yet marked for
    /// `(loan, year, month)`: notify the owner, notify every
    /// admin-capable member, then record the marker. Repeated runs in
    /// the same month send nothing new.
    pub async fn run(&self, reference: DateTime<Utc>) -> PortalResult<SweepReport> {
        let open = self.loan_repo.list_open().await?;
        let admins = self.user_repo.list_admins().await?;

        let mut report = SweepReport {
            loans_scanned: open.len(),
            ..Default::default()
        };

        for loan in &open {
            if !is_payment_overdue(loan.next_payment_date, reference) {
                continue;
            }

            let (year, month) = (reference.year(), reference.month());
            if self.marker_repo.contains(loan.id, year, month).await? {
                debug!(loan_id = %loan.id, year, month, "Already notified this month");
                continue;
            }

            self.notification_repo.append(owner_notice(loan, false)).await?;
            report.notifications_sent += 1;

            for admin in &admins {
                self.notification_repo
                    .append(admin_notice(loan, admin, false))
                    .await?;
                report.notifications_sent += 1;
            }

            self.marker_repo.append(loan.id, year, month).await?;
            report.loans_notified += 1;
        }

        info!(
            scanned = report.loans_scanned,
            notified = report.loans_notified,
            sent = report.notifications_sent,
            "Deadline sweep complete"
        );
        Ok(report)
    }

    /// Manual-testing variant: notifies owner and admins for every open
    /// loan, skipping both the overdue predicate and the marker check.
    /// Writes no markers, so it can be invoked repeatedly.
    pub async fn simulate(&self) -> PortalResult<SweepReport> {
        let open = self.loan_repo.list_open().await?;
        let admins = self.user_repo.list_admins().await?;

        let mut report = SweepReport {
            loans_scanned: open.len(),
            ..Default::default()
        };

        for loan in &open {
            self.notification_repo.append(owner_notice(loan, true)).await?;
            report.notifications_sent += 1;

            for admin in &admins {
                self.notification_repo
                    .append(admin_notice(loan, admin, true))
                    .await?;
                report.notifications_sent += 1;
            }

            report.loans_notified += 1;
        }

        info!(
            scanned = report.loans_scanned,
            sent = report.notifications_sent,
            "Simulated deadline sweep complete"
        );
        Ok(report)
    }
}
