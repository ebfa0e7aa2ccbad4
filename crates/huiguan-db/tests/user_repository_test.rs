//! Integration tests for the User repository using in-memory SurrealDB.

use chrono::{Duration, Utc};
use huiguan_core::models::user::{CreateUser, Role, UpdateUser};
use huiguan_core::repository::{Pagination, UserRepository};
use huiguan_db::repository::SurrealUserRepository;
use huiguan_db::verify_password;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    huiguan_db::run_migrations(&db).await.unwrap();
    db
}

#[tokio::test]
async fn create_and_get_user() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo
        .create(CreateUser {
            email: "mei@example.com".into(),
            name: "Mei Lin".into(),
            password: "SuperSecret123!".into(),
            primary_role: Role::SubEditor,
            association_id: Some("HNHG-PG".into()),
        })
        .await
        .unwrap();

    assert_eq!(user.email, "mei@example.com");
    assert_eq!(user.primary_role, Role::SubEditor);
    assert_eq!(user.roles, vec![Role::SubEditor, Role::Public]);
    assert_eq!(user.active_role, Role::SubEditor);
    assert_eq!(user.points, 0);
    assert_eq!(user.donor_badge, None);
    assert_eq!(user.verification_code, None);

    // Password should be hashed, not stored in plaintext.
    assert_ne!(user.password_hash, "SuperSecret123!");
    assert!(user.password_hash.starts_with("$argon2id$"));

    // Get by ID should return the same user.
    let fetched = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(fetched.id, user.id);
    assert_eq!(fetched.name, "Mei Lin");
}

#[tokio::test]
async fn password_verification() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo
        .create(CreateUser {
            email: "wei@example.com".into(),
            name: "Wei".into(),
            password: "MyPassword42!".into(),
            primary_role: Role::Public,
            association_id: None,
        })
        .await
        .unwrap();

    // Correct password should verify.
    assert!(verify_password("MyPassword42!", &user.password_hash, None).unwrap());

    // Wrong password should not verify.
    assert!(!verify_password("WrongPassword", &user.password_hash, None).unwrap());
}

#[tokio::test]
async fn get_by_email() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let created = repo
        .create(CreateUser {
            email: "lan@example.com".into(),
            name: "Lan".into(),
            password: "password123".into(),
            primary_role: Role::Public,
            association_id: None,
        })
        .await
        .unwrap();

    let fetched = repo.get_by_email("lan@example.com").await.unwrap();
    assert_eq!(fetched.id, created.id);

    let missing = repo.get_by_email("nobody@example.com").await;
    assert!(missing.is_err());
}

#[tokio::test]
async fn update_verification_and_active_role() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo
        .create(CreateUser {
            email: "hui@example.com".into(),
            name: "Hui".into(),
            password: "password123".into(),
            primary_role: Role::SubAdmin,
            association_id: None,
        })
        .await
        .unwrap();

    let expiry = Utc::now() + Duration::days(30);
    let updated = repo
        .update(
            user.id,
            UpdateUser {
                active_role: Some(Role::Public),
                verification_code: Some(Some("HNHG1011".into())),
                verification_expiry: Some(Some(expiry)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.active_role, Role::Public);
    assert_eq!(updated.verification_code.as_deref(), Some("HNHG1011"));
    assert!(updated.verification_expiry.is_some());

    // Clearing the credential works through the double-Option.
    let cleared = repo
        .update(
            user.id,
            UpdateUser {
                verification_code: Some(None),
                verification_expiry: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(cleared.verification_code, None);
    assert_eq!(cleared.verification_expiry, None);
}

#[tokio::test]
async fn list_admins_finds_admin_capable_role_sets() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    repo.create(CreateUser {
        email: "member@example.com".into(),
        name: "Member".into(),
        password: "password123".into(),
        primary_role: Role::Public,
        association_id: None,
    })
    .await
    .unwrap();

    let editor = repo
        .create(CreateUser {
            email: "editor@example.com".into(),
            name: "Editor".into(),
            password: "password123".into(),
            primary_role: Role::SubEditor,
            association_id: None,
        })
        .await
        .unwrap();

    let admin = repo
        .create(CreateUser {
            email: "admin@example.com".into(),
            name: "Admin".into(),
            password: "password123".into(),
            primary_role: Role::SuperAdmin,
            association_id: None,
        })
        .await
        .unwrap();

    let admins = repo.list_admins().await.unwrap();
    let ids: Vec<_> = admins.iter().map(|u| u.id).collect();

    assert!(ids.contains(&admin.id));
    assert!(!ids.contains(&editor.id));
    assert_eq!(admins.len(), 1);
}

#[tokio::test]
async fn legacy_record_without_role_set_is_normalized() {
    let db = setup().await;

    // Simulate a record written before the roles array existed.
    db.query(
        "CREATE type::record('user', $id) SET \
         email = 'old@example.com', name = 'Old Timer', \
         password_hash = 'x', primary_role = 'SubAdmin', \
         roles = NONE, active_role = NONE, \
         association_id = NONE, points = 5, donor_badge = NONE, \
         total_donated_cents = 0, \
         verification_code = NONE, verification_expiry = NONE",
    )
    .bind(("id", "00000000-0000-0000-0000-000000000001".to_string()))
    .await
    .unwrap()
    .check()
    .unwrap();

    let repo = SurrealUserRepository::new(db);
    let user = repo.get_by_email("old@example.com").await.unwrap();

    assert_eq!(user.roles, vec![Role::SubAdmin, Role::Public]);
    assert_eq!(user.active_role, Role::SubAdmin);

    // Legacy admins still show up in the admin listing.
    let admins = repo.list_admins().await.unwrap();
    assert_eq!(admins.len(), 1);
}

#[tokio::test]
async fn list_paginates() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    for i in 0..3 {
        repo.create(CreateUser {
            email: format!("user{i}@example.com"),
            name: format!("User {i}"),
            password: "password123".into(),
            primary_role: Role::Public,
            association_id: None,
        })
        .await
        .unwrap();
    }

    let page = repo
        .list(Pagination {
            offset: 0,
            limit: 2,
        })
        .await
        .unwrap();

    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);
}
