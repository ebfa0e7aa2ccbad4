//! Integration tests for the Notification repository using in-memory
//! SurrealDB.

use huiguan_core::models::notification::{CreateNotification, NotificationCategory};
use huiguan_core::repository::NotificationRepository;
use huiguan_db::repository::SurrealNotificationRepository;
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

fn welcome(user_id: Uuid) -> CreateNotification {
    CreateNotification {
        user_id,
        title: "Welcome to the portal!".into(),
        body: "Explore events and start earning points.".into(),
        category: NotificationCategory::System,
    }
}

#[tokio::test]
async fn append_and_list() {
    let db = setup().await;
    let repo = SurrealNotificationRepository::new(db);
    let user_id = Uuid::new_v4();

    let created = repo.append(welcome(user_id)).await.unwrap();
    assert_eq!(created.user_id, user_id);
    assert!(!created.read);
    assert_eq!(created.category, NotificationCategory::System);

    repo.append(CreateNotification {
        user_id,
        title: "New Event Available".into(),
        body: "Lunar New Year Celebration is open for booking!".into(),
        category: NotificationCategory::Event,
    })
    .await
    .unwrap();

    // Another user's notification must not leak into the listing.
    repo.append(welcome(Uuid::new_v4())).await.unwrap();

    let listed = repo.list_for_user(user_id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|n| n.user_id == user_id));
}

#[tokio::test]
async fn unread_count_and_mark_read() {
    let db = setup().await;
    let repo = SurrealNotificationRepository::new(db);
    let user_id = Uuid::new_v4();

    let first = repo.append(welcome(user_id)).await.unwrap();
    repo.append(welcome(user_id)).await.unwrap();

    assert_eq!(repo.unread_count(user_id).await.unwrap(), 2);

    repo.mark_read(first.id).await.unwrap();
    assert_eq!(repo.unread_count(user_id).await.unwrap(), 1);

    let listed = repo.list_for_user(user_id).await.unwrap();
    let flagged = listed.iter().find(|n| n.id == first.id).unwrap();
    assert!(flagged.read);
}

#[tokio::test]
async fn mark_all_read_reports_flipped_count() {
    let db = setup().await;
    let repo = SurrealNotificationRepository::new(db);
    let user_id = Uuid::new_v4();

    repo.append(welcome(user_id)).await.unwrap();
    repo.append(welcome(user_id)).await.unwrap();
    repo.append(welcome(user_id)).await.unwrap();

    let flipped = repo.mark_all_read(user_id).await.unwrap();
    assert_eq!(flipped, 3);
    assert_eq!(repo.unread_count(user_id).await.unwrap(), 0);

    // Second pass has nothing left to flip.
    let flipped_again = repo.mark_all_read(user_id).await.unwrap();
    assert_eq!(flipped_again, 0);
}

#[tokio::test]
async fn mark_read_on_missing_notification_fails() {
    let db = setup().await;
    let repo = SurrealNotificationRepository::new(db);

    let result = repo.mark_read(Uuid::new_v4()).await;
    assert!(result.is_err());
}
