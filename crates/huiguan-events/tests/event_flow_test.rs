//! Integration tests for the event lifecycle and booking services
//! using in-memory SurrealDB.

use chrono::{TimeZone, Utc};
use huiguan_core::error::PortalError;
use huiguan_core::models::event::{CreateEvent, EventStatus};
use huiguan_core::models::user::{CreateUser, Role, User};
use huiguan_core::repository::UserRepository;
use huiguan_db::repository::{
    SurrealBookingRepository, SurrealEventRepository, SurrealUserRepository,
};
use huiguan_events::{BookingService, DEFAULT_MAX_CAPACITY, EventService};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

type MemDb = surrealdb::engine::local::Db;

struct Fixture {
    events: EventService<SurrealEventRepository<MemDb>>,
    bookings: BookingService<
        SurrealBookingRepository<MemDb>,
        SurrealEventRepository<MemDb>,
        SurrealUserRepository<MemDb>,
    >,
    user_repo: SurrealUserRepository<MemDb>,
    member: User,
}

async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    huiguan_db::run_migrations(&db).await.unwrap();

    let user_repo = SurrealUserRepository::new(db.clone());
    let member = user_repo
        .create(CreateUser {
            email: "member@example.com".into(),
            name: "Member".into(),
            password: "password123".into(),
            primary_role: Role::Public,
            association_id: None,
        })
        .await
        .unwrap();

    Fixture {
        events: EventService::new(SurrealEventRepository::new(db.clone())),
        bookings: BookingService::new(
            SurrealBookingRepository::new(db.clone()),
            SurrealEventRepository::new(db.clone()),
            user_repo.clone(),
        ),
        user_repo,
        member,
    }
}

fn gala(created_by: Uuid, max_capacity: Option<u32>) -> CreateEvent {
    CreateEvent {
        title: "Lunar New Year Gala".into(),
        date: Utc.with_ymd_and_hms(2027, 2, 6, 0, 0, 0).unwrap(),
        time: "7:30 PM".into(),
        venue: "Grand Hall".into(),
        price_cents: 8_000,
        description: "Annual celebration dinner".into(),
        created_by,
        max_capacity,
    }
}

#[tokio::test]
async fn approval_defaults_capacity() {
    let fixture = setup().await;

    let draft = fixture
        .events
        .draft_event(gala(Uuid::new_v4(), None))
        .await
        .unwrap();
    assert_eq!(draft.status, EventStatus::Pending);
    assert_eq!(fixture.events.pending_events().await.unwrap().len(), 1);

    let approved = fixture.events.approve_event(draft.id).await.unwrap();
    assert!(fixture.events.pending_events().await.unwrap().is_empty());
    assert_eq!(approved.status, EventStatus::Approved);
    assert_eq!(approved.max_capacity, Some(DEFAULT_MAX_CAPACITY));
    assert_eq!(approved.current_participants, 0);

    // A second approval is a validation error.
    let again = fixture.events.approve_event(draft.id).await;
    assert!(matches!(again, Err(PortalError::Validation { .. })));
}

#[tokio::test]
async fn approval_keeps_a_drafted_capacity() {
    let fixture = setup().await;

    let draft = fixture
        .events
        .draft_event(gala(Uuid::new_v4(), Some(40)))
        .await
        .unwrap();
    let approved = fixture.events.approve_event(draft.id).await.unwrap();

    assert_eq!(approved.max_capacity, Some(40));
}

#[tokio::test]
async fn rejection_requires_a_reason() {
    let fixture = setup().await;

    let draft = fixture
        .events
        .draft_event(gala(Uuid::new_v4(), None))
        .await
        .unwrap();

    let blank = fixture.events.reject_event(draft.id, "   ").await;
    assert!(matches!(blank, Err(PortalError::Validation { .. })));

    let rejected = fixture
        .events
        .reject_event(draft.id, "Venue double-booked")
        .await
        .unwrap();
    assert_eq!(rejected.status, EventStatus::Rejected);
    assert_eq!(
        rejected.rejection_comment.as_deref(),
        Some("Venue double-booked")
    );
}

#[tokio::test]
async fn booking_awards_points_and_bumps_participants() {
    let fixture = setup().await;

    let draft = fixture
        .events
        .draft_event(gala(Uuid::new_v4(), Some(50)))
        .await
        .unwrap();
    fixture.events.approve_event(draft.id).await.unwrap();

    let booking = fixture
        .bookings
        .book_event(fixture.member.id, draft.id, 2, "card".into())
        .await
        .unwrap();

    // RM 80 x 2 attendees = RM 160 -> 16 points.
    assert_eq!(booking.total_price_cents, 16_000);
    assert_eq!(booking.attendees, 2);
    assert_eq!(booking.pass_code.len(), 7);

    let booker = fixture.user_repo.get_by_id(fixture.member.id).await.unwrap();
    assert_eq!(booker.points, 16);

    let approved = fixture.events.approved_events().await.unwrap();
    assert_eq!(approved[0].current_participants, 2);

    let mine = fixture.bookings.bookings_for(fixture.member.id).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, booking.id);
}

#[tokio::test]
async fn booking_pending_event_fails() {
    let fixture = setup().await;

    let draft = fixture
        .events
        .draft_event(gala(Uuid::new_v4(), None))
        .await
        .unwrap();

    let result = fixture
        .bookings
        .book_event(fixture.member.id, draft.id, 1, "card".into())
        .await;
    assert!(matches!(result, Err(PortalError::Validation { .. })));
}

#[tokio::test]
async fn booking_beyond_capacity_fails_without_side_effects() {
    let fixture = setup().await;

    let draft = fixture
        .events
        .draft_event(gala(Uuid::new_v4(), Some(3)))
        .await
        .unwrap();
    fixture.events.approve_event(draft.id).await.unwrap();

    fixture
        .bookings
        .book_event(fixture.member.id, draft.id, 2, "card".into())
        .await
        .unwrap();

    let overflow = fixture
        .bookings
        .book_event(fixture.member.id, draft.id, 2, "card".into())
        .await;
    assert!(matches!(overflow, Err(PortalError::Validation { .. })));

    // Participant count and points are untouched by the failed booking.
    let approved = fixture.events.approved_events().await.unwrap();
    assert_eq!(approved[0].current_participants, 2);

    let booker = fixture.user_repo.get_by_id(fixture.member.id).await.unwrap();
    assert_eq!(booker.points, 16);

    // The last seat can still be taken.
    let last = fixture
        .bookings
        .book_event(fixture.member.id, draft.id, 1, "card".into())
        .await;
    assert!(last.is_ok());
}

#[tokio::test]
async fn zero_attendee_booking_is_rejected() {
    let fixture = setup().await;

    let draft = fixture
        .events
        .draft_event(gala(Uuid::new_v4(), None))
        .await
        .unwrap();
    fixture.events.approve_event(draft.id).await.unwrap();

    let result = fixture
        .bookings
        .book_event(fixture.member.id, draft.id, 0, "card".into())
        .await;
    assert!(matches!(result, Err(PortalError::Validation { .. })));
}
