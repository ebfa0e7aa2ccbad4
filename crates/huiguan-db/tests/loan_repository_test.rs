//! Integration tests for the Loan, LoanApplication, and overdue-marker
//! repositories using in-memory SurrealDB.

use chrono::{TimeZone, Utc};
use huiguan_core::models::loan::{
    ApplicationStatus, CreateLoan, CreateLoanApplication, LoanStatus, UpdateLoan,
};
use huiguan_core::repository::{
    LoanApplicationRepository, LoanRepository, OverdueMarkerRepository,
};
use huiguan_db::repository::{
    SurrealLoanApplicationRepository, SurrealLoanRepository, SurrealOverdueMarkerRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    huiguan_db::run_migrations(&db).await.unwrap();
    db
}

fn study_loan(user_id: Uuid) -> CreateLoan {
    CreateLoan {
        user_id,
        amount_cents: 400_000,
        purpose: "University tuition".into(),
        monthly_payment_cents: 20_000,
        total_payments: 20,
        next_payment_date: Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn create_and_get_loan() {
    let db = setup().await;
    let repo = SurrealLoanRepository::new(db);
    let user_id = Uuid::new_v4();

    let loan = repo.create(study_loan(user_id)).await.unwrap();

    assert_eq!(loan.user_id, user_id);
    assert_eq!(loan.amount_cents, 400_000);
    assert_eq!(loan.remaining_balance_cents, 400_000);
    assert_eq!(loan.total_paid_cents, 0);
    assert_eq!(loan.payments_made, 0);
    assert_eq!(loan.status, LoanStatus::Approved);
    assert!(loan.next_payment_date.is_some());

    let fetched = repo.get_by_id(loan.id).await.unwrap();
    assert_eq!(fetched.id, loan.id);
    assert_eq!(fetched.purpose, "University tuition");
}

#[tokio::test]
async fn update_writes_payment_snapshot() {
    let db = setup().await;
    let repo = SurrealLoanRepository::new(db);

    let loan = repo.create(study_loan(Uuid::new_v4())).await.unwrap();

    let updated = repo
        .update(
            loan.id,
            UpdateLoan {
                payments_made: 1,
                total_paid_cents: 20_000,
                remaining_balance_cents: 380_000,
                next_payment_date: Some(Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap()),
                status: LoanStatus::Approved,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.payments_made, 1);
    assert_eq!(updated.remaining_balance_cents, 380_000);

    // Completing clears the due date.
    let completed = repo
        .update(
            loan.id,
            UpdateLoan {
                payments_made: 20,
                total_paid_cents: 400_000,
                remaining_balance_cents: 0,
                next_payment_date: None,
                status: LoanStatus::Completed,
            },
        )
        .await
        .unwrap();

    assert_eq!(completed.status, LoanStatus::Completed);
    assert_eq!(completed.next_payment_date, None);
}

#[tokio::test]
async fn list_open_excludes_completed_loans() {
    let db = setup().await;
    let repo = SurrealLoanRepository::new(db);

    let open = repo.create(study_loan(Uuid::new_v4())).await.unwrap();
    let retired = repo.create(study_loan(Uuid::new_v4())).await.unwrap();

    repo.update(
        retired.id,
        UpdateLoan {
            payments_made: 20,
            total_paid_cents: 400_000,
            remaining_balance_cents: 0,
            next_payment_date: None,
            status: LoanStatus::Completed,
        },
    )
    .await
    .unwrap();

    let open_loans = repo.list_open().await.unwrap();
    assert_eq!(open_loans.len(), 1);
    assert_eq!(open_loans[0].id, open.id);
}

#[tokio::test]
async fn application_status_flow() {
    let db = setup().await;
    let repo = SurrealLoanApplicationRepository::new(db);
    let user_id = Uuid::new_v4();

    let application = repo
        .create(CreateLoanApplication {
            user_id,
            amount_cents: 400_000,
            purpose: "Books and accommodation".into(),
        })
        .await
        .unwrap();

    assert_eq!(application.status, ApplicationStatus::Pending);

    let pending = repo.list_pending().await.unwrap();
    assert_eq!(pending.len(), 1);

    let accepted = repo
        .set_status(application.id, ApplicationStatus::Accepted)
        .await
        .unwrap();
    assert_eq!(accepted.status, ApplicationStatus::Accepted);

    let pending_after = repo.list_pending().await.unwrap();
    assert!(pending_after.is_empty());
}

#[tokio::test]
async fn marker_set_membership() {
    let db = setup().await;
    let repo = SurrealOverdueMarkerRepository::new(db);
    let loan_id = Uuid::new_v4();

    assert!(!repo.contains(loan_id, 2026, 5).await.unwrap());

    repo.append(loan_id, 2026, 5).await.unwrap();

    assert!(repo.contains(loan_id, 2026, 5).await.unwrap());
    // Other billing months are unaffected.
    assert!(!repo.contains(loan_id, 2026, 6).await.unwrap());
    assert!(!repo.contains(Uuid::new_v4(), 2026, 5).await.unwrap());
}
