//! SurrealDB implementation of [`UserRepository`].
//!
//! Password hashing uses Argon2id with OWASP-recommended parameters
//! (memory: 19 MiB, iterations: 2, parallelism: 1). Salt is randomly
//! generated per hash. An optional pepper (server-side secret) can be
//! provided at construction time.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use chrono::{DateTime, Utc};
use huiguan_core::error::PortalResult;
use huiguan_core::models::user::{
    CreateUser, DonorBadge, Role, UpdateUser, User, default_roles,
};
use huiguan_core::repository::{PaginatedResult, Pagination, UserRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    email: String,
    name: String,
    password_hash: String,
    primary_role: String,
    roles: Option<Vec<String>>,
    active_role: Option<String>,
    association_id: Option<String>,
    points: i64,
    donor_badge: Option<String>,
    total_donated_cents: i64,
    verification_code: Option<String>,
    verification_expiry: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    email: String,
    name: String,
    password_hash: String,
    primary_role: String,
    roles: Option<Vec<String>>,
    active_role: Option<String>,
    association_id: Option<String>,
    points: i64,
    donor_badge: Option<String>,
    total_donated_cents: i64,
    verification_code: Option<String>,
    verification_expiry: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_role(s: &str) -> Result<Role, DbError> {
    match s {
        "Public" => Ok(Role::Public),
        "SubEditor" => Ok(Role::SubEditor),
        "SubAdmin" => Ok(Role::SubAdmin),
        "SuperAdmin" => Ok(Role::SuperAdmin),
        other => Err(DbError::Migration(format!("unknown role: {other}"))),
    }
}

fn role_to_string(role: &Role) -> &'static str {
    match role {
        Role::Public => "Public",
        Role::SubEditor => "SubEditor",
        Role::SubAdmin => "SubAdmin",
        Role::SuperAdmin => "SuperAdmin",
    }
}

fn parse_badge(s: &str) -> Result<DonorBadge, DbError> {
    match s {
        "Bronze" => Ok(DonorBadge::Bronze),
        "Gold" => Ok(DonorBadge::Gold),
        other => Err(DbError::Migration(format!("unknown donor badge: {other}"))),
    }
}

fn badge_to_string(badge: &DonorBadge) -> &'static str {
    match badge {
        DonorBadge::Bronze => "Bronze",
        DonorBadge::Gold => "Gold",
    }
}

/// Normalize a legacy role set: a missing set becomes
/// `[primary_role, Public]`, a missing active role falls back to the
/// primary role.
fn parse_role_set(
    primary_role: &str,
    roles: Option<Vec<String>>,
    active_role: Option<String>,
) -> Result<(Role, Vec<Role>, Role), DbError> {
    let primary_role = parse_role(primary_role)?;
    let roles = match roles {
        Some(raw) => raw
            .iter()
            .map(|r| parse_role(r))
            .collect::<Result<Vec<_>, _>>()?,
        None => default_roles(primary_role),
    };
    let active_role = match active_role {
        Some(raw) => parse_role(&raw)?,
        None => primary_role,
    };
    Ok((primary_role, roles, active_role))
}

impl UserRow {
    fn into_user(self, id: Uuid) -> Result<User, DbError> {
        let (primary_role, roles, active_role) =
            parse_role_set(&self.primary_role, self.roles, self.active_role)?;
        Ok(User {
            id,
            email: self.email,
            name: self.name,
            password_hash: self.password_hash,
            primary_role,
            roles,
            active_role,
            association_id: self.association_id,
            points: self.points,
            donor_badge: self.donor_badge.as_deref().map(parse_badge).transpose()?,
            total_donated_cents: self.total_donated_cents,
            verification_code: self.verification_code,
            verification_expiry: self.verification_expiry,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let (primary_role, roles, active_role) =
            parse_role_set(&self.primary_role, self.roles, self.active_role)?;
        Ok(User {
            id,
            email: self.email,
            name: self.name,
            password_hash: self.password_hash,
            primary_role,
            roles,
            active_role,
            association_id: self.association_id,
            points: self.points,
            donor_badge: self.donor_badge.as_deref().map(parse_badge).transpose()?,
            total_donated_cents: self.total_donated_cents,
            verification_code: self.verification_code,
            verification_expiry: self.verification_expiry,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Hash a password with Argon2id using OWASP-recommended parameters.
///
/// If a pepper is provided, it is prepended to the password before
/// hashing. The salt is randomly generated for each call.
fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, DbError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| DbError::Migration(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(input, &salt)
        .map_err(|e| DbError::Migration(format!("password hash error: {e}")))?;

    Ok(hash.to_string())
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            pepper: Some(pepper),
        }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> PortalResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;
        let roles: Vec<String> = default_roles(input.primary_role)
            .iter()
            .map(|r| role_to_string(r).to_string())
            .collect();

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 email = $email, name = $name, \
                 password_hash = $password_hash, \
                 primary_role = $primary_role, \
                 roles = $roles, \
                 active_role = $primary_role, \
                 association_id = $association_id, \
                 points = 0, \
                 donor_badge = NONE, \
                 total_donated_cents = 0, \
                 verification_code = NONE, \
                 verification_expiry = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("email", input.email))
            .bind(("name", input.name))
            .bind(("password_hash", password_hash))
            .bind(("primary_role", role_to_string(&input.primary_role).to_string()))
            .bind(("roles", roles))
            .bind(("association_id", input.association_id))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> PortalResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_email(&self, email: &str) -> PortalResult<User> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE email = $email",
            )
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("email={email}"),
        })?;

        Ok(row.try_into_user()?)
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> PortalResult<User> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.active_role.is_some() {
            sets.push("active_role = $active_role");
        }
        if input.points.is_some() {
            sets.push("points = $points");
        }
        if input.donor_badge.is_some() {
            sets.push("donor_badge = $donor_badge");
        }
        if input.total_donated_cents.is_some() {
            sets.push("total_donated_cents = $total_donated_cents");
        }
        if input.verification_code.is_some() {
            sets.push("verification_code = $verification_code");
        }
        if input.verification_expiry.is_some() {
            sets.push("verification_expiry = $verification_expiry");
        }
        sets.push("updated_at = time::now()");

        let query = format!("UPDATE type::record('user', $id) SET {}", sets.join(", "));

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(ref active_role) = input.active_role {
            builder = builder.bind(("active_role", role_to_string(active_role).to_string()));
        }
        if let Some(points) = input.points {
            builder = builder.bind(("points", points));
        }
        if let Some(donor_badge) = input.donor_badge {
            // donor_badge is Option<Option<DonorBadge>>:
            // Some(Some(v)) = set, Some(None) = clear
            builder = builder.bind((
                "donor_badge",
                donor_badge.map(|b| badge_to_string(&b).to_string()),
            ));
        }
        if let Some(total_donated_cents) = input.total_donated_cents {
            builder = builder.bind(("total_donated_cents", total_donated_cents));
        }
        if let Some(verification_code) = input.verification_code {
            builder = builder.bind(("verification_code", verification_code));
        }
        if let Some(verification_expiry) = input.verification_expiry {
            builder = builder.bind(("verification_expiry", verification_expiry));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn list(&self, pagination: Pagination) -> PortalResult<PaginatedResult<User>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM user GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn list_admins(&self) -> PortalResult<Vec<User>> {
        let admin_roles = vec!["SubAdmin".to_string(), "SuperAdmin".to_string()];

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE roles CONTAINSANY $admin_roles \
                 OR (roles == NONE AND primary_role INSIDE $admin_roles)",
            )
            .bind(("admin_roles", admin_roles))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;

        let users = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(users)
    }
}

/// Verify a password against an Argon2id hash.
///
/// Public for use by the auth layer.
pub fn verify_password(password: &str, hash: &str, pepper: Option<&str>) -> Result<bool, DbError> {
    use argon2::PasswordVerifier;

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| DbError::Migration(format!("invalid hash format: {e}")))?;

    let argon2 = Argon2::default();
    match argon2.verify_password(input, &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(DbError::Migration(format!("verify error: {e}"))),
    }
}
