//! Integration tests for the deadline sweep using in-memory SurrealDB.
//!
//! The invariant under test: within one calendar month, a loan produces
//! at most one overdue notice per recipient no matter how often the
//! sweep runs.

use chrono::{DateTime, TimeZone, Utc};
use huiguan_core::models::loan::CreateLoan;
use huiguan_core::models::user::{CreateUser, Role, User};
use huiguan_core::repository::{LoanRepository, NotificationRepository, UserRepository};
use huiguan_db::repository::{
    SurrealLoanRepository, SurrealNotificationRepository, SurrealOverdueMarkerRepository,
    SurrealUserRepository,
};
use huiguan_loans::DeadlineSweep;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

type MemDb = surrealdb::engine::local::Db;

struct Fixture {
    sweep: DeadlineSweep<
        SurrealLoanRepository<MemDb>,
        SurrealUserRepository<MemDb>,
        SurrealNotificationRepository<MemDb>,
        SurrealOverdueMarkerRepository<MemDb>,
    >,
    loan_repo: SurrealLoanRepository<MemDb>,
    notification_repo: SurrealNotificationRepository<MemDb>,
    borrower: User,
    admin: User,
}

/// Helper: in-memory DB, migrations, one borrower and one super-admin.
async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    huiguan_db::run_migrations(&db).await.unwrap();

    let user_repo = SurrealUserRepository::new(db.clone());
    let borrower = user_repo
        .create(CreateUser {
            email: "borrower@example.com".into(),
            name: "Borrower".into(),
            password: "password123".into(),
            primary_role: Role::Public,
            association_id: None,
        })
        .await
        .unwrap();
    let admin = user_repo
        .create(CreateUser {
            email: "admin@example.com".into(),
            name: "Admin".into(),
            password: "password123".into(),
            primary_role: Role::SuperAdmin,
            association_id: None,
        })
        .await
        .unwrap();

    let loan_repo = SurrealLoanRepository::new(db.clone());
    let notification_repo = SurrealNotificationRepository::new(db.clone());

    let sweep = DeadlineSweep::new(
        loan_repo.clone(),
        user_repo,
        notification_repo.clone(),
        SurrealOverdueMarkerRepository::new(db),
    );

    Fixture {
        sweep,
        loan_repo,
        notification_repo,
        borrower,
        admin,
    }
}

async fn open_loan(fixture: &Fixture, due: DateTime<Utc>) {
    fixture
        .loan_repo
        .create(CreateLoan {
            user_id: fixture.borrower.id,
            amount_cents: 400_000,
            purpose: "Tuition".into(),
            monthly_payment_cents: 20_000,
            total_payments: 20,
            next_payment_date: due,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn overdue_loan_notifies_owner_and_admins_once() {
    let fixture = setup().await;
    // Due on the 1st, swept on the 9th: overdue.
    open_loan(&fixture, Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap()).await;

    let reference = Utc.with_ymd_and_hms(2026, 5, 9, 0, 0, 0).unwrap();
    let report = fixture.sweep.run(reference).await.unwrap();

    assert_eq!(report.loans_scanned, 1);
    assert_eq!(report.loans_notified, 1);
    assert_eq!(report.notifications_sent, 2);

    let owner_inbox = fixture
        .notification_repo
        .list_for_user(fixture.borrower.id)
        .await
        .unwrap();
    assert_eq!(owner_inbox.len(), 1);
    assert!(owner_inbox[0].title.contains("Payment Overdue"));

    let admin_inbox = fixture
        .notification_repo
        .list_for_user(fixture.admin.id)
        .await
        .unwrap();
    assert_eq!(admin_inbox.len(), 1);
    assert!(admin_inbox[0].title.contains("Overdue Alert"));
}

#[tokio::test]
async fn repeated_sweeps_in_a_month_send_nothing_new() {
    let fixture = setup().await;
    open_loan(&fixture, Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap()).await;

    let first = Utc.with_ymd_and_hms(2026, 5, 9, 0, 0, 0).unwrap();
    let later = Utc.with_ymd_and_hms(2026, 5, 20, 15, 30, 0).unwrap();

    fixture.sweep.run(first).await.unwrap();
    let second = fixture.sweep.run(first).await.unwrap();
    let third = fixture.sweep.run(later).await.unwrap();

    assert_eq!(second.loans_notified, 0);
    assert_eq!(second.notifications_sent, 0);
    assert_eq!(third.loans_notified, 0);

    // Exactly one notice per recipient for the (loan, month) pair.
    let owner_inbox = fixture
        .notification_repo
        .list_for_user(fixture.borrower.id)
        .await
        .unwrap();
    assert_eq!(owner_inbox.len(), 1);
}

#[tokio::test]
async fn a_new_month_notifies_again() {
    let fixture = setup().await;
    open_loan(&fixture, Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap()).await;

    fixture
        .sweep
        .run(Utc.with_ymd_and_hms(2026, 5, 9, 0, 0, 0).unwrap())
        .await
        .unwrap();
    let june = fixture
        .sweep
        .run(Utc.with_ymd_and_hms(2026, 6, 9, 0, 0, 0).unwrap())
        .await
        .unwrap();

    assert_eq!(june.loans_notified, 1);

    let owner_inbox = fixture
        .notification_repo
        .list_for_user(fixture.borrower.id)
        .await
        .unwrap();
    assert_eq!(owner_inbox.len(), 2);
}

#[tokio::test]
async fn grace_period_boundary() {
    let fixture = setup().await;
    // Due on the 8th itself.
    open_loan(&fixture, Utc.with_ymd_and_hms(2026, 5, 8, 0, 0, 0).unwrap()).await;

    // 23:59:59 on the 8th: still inside the grace period.
    let in_grace = fixture
        .sweep
        .run(Utc.with_ymd_and_hms(2026, 5, 8, 23, 59, 59).unwrap())
        .await
        .unwrap();
    assert_eq!(in_grace.loans_notified, 0);

    // Midnight on the 9th: overdue.
    let past = fixture
        .sweep
        .run(Utc.with_ymd_and_hms(2026, 5, 9, 0, 0, 0).unwrap())
        .await
        .unwrap();
    assert_eq!(past.loans_notified, 1);
}

#[tokio::test]
async fn loans_due_after_the_cutoff_are_skipped() {
    let fixture = setup().await;
    // Due on the 15th: not due by the 8th cutoff, so never flagged
    // this month.
    open_loan(&fixture, Utc.with_ymd_and_hms(2026, 5, 15, 0, 0, 0).unwrap()).await;

    let report = fixture
        .sweep
        .run(Utc.with_ymd_and_hms(2026, 5, 20, 0, 0, 0).unwrap())
        .await
        .unwrap();

    assert_eq!(report.loans_scanned, 1);
    assert_eq!(report.loans_notified, 0);
}

#[tokio::test]
async fn simulation_bypasses_predicate_and_markers() {
    let fixture = setup().await;
    // Due well in the future; a real sweep would skip it.
    open_loan(&fixture, Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap()).await;

    let first = fixture.sweep.simulate().await.unwrap();
    assert_eq!(first.loans_notified, 1);
    assert_eq!(first.notifications_sent, 2);

    // No markers written: simulation repeats in full.
    let second = fixture.sweep.simulate().await.unwrap();
    assert_eq!(second.notifications_sent, 2);

    let owner_inbox = fixture
        .notification_repo
        .list_for_user(fixture.borrower.id)
        .await
        .unwrap();
    assert_eq!(owner_inbox.len(), 2);
    assert!(owner_inbox.iter().all(|n| n.title.contains("(Simulated)")));

    // A real sweep afterwards is unaffected by simulations.
    let real = fixture
        .sweep
        .run(Utc.with_ymd_and_hms(2026, 5, 9, 0, 0, 0).unwrap())
        .await
        .unwrap();
    assert_eq!(real.loans_notified, 0);
}
