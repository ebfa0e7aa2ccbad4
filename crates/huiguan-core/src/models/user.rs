//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Portal roles, ordered from least to most privileged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    Public,
    SubEditor,
    SubAdmin,
    SuperAdmin,
}

impl Role {
    /// Roles that receive overdue-loan alerts and may act on them.
    pub fn is_admin_capable(&self) -> bool {
        matches!(self, Role::SubAdmin | Role::SuperAdmin)
    }
}

/// Donor recognition tiers. Badges never downgrade once earned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum DonorBadge {
    Bronze,
    Gold,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub primary_role: Role,
    /// Roles this user may switch between. A stored record missing the
    /// set is normalized to `[primary_role, Public]` on read.
    pub roles: Vec<Role>,
    /// Must be a member of `roles`.
    pub active_role: Role,
    pub association_id: Option<String>,
    pub points: i64,
    pub donor_badge: Option<DonorBadge>,
    pub total_donated_cents: i64,
    /// Normalized association credential (`HNHG####`), if verified.
    pub verification_code: Option<String>,
    /// Verification is valid for 30 days from issuance.
    pub verification_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin_capable(&self) -> bool {
        self.roles.iter().any(Role::is_admin_capable)
    }
}

/// Loyalty points earned for spending `amount_cents`: one point per
/// whole RM 10.
pub fn loyalty_points(amount_cents: i64) -> i64 {
    amount_cents / 1000
}

/// Fallback role set for records stored without one.
pub fn default_roles(primary_role: Role) -> Vec<Role> {
    let mut roles = vec![primary_role];
    if primary_role != Role::Public {
        roles.push(Role::Public);
    }
    roles
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub name: String,
    /// Raw password (will be hashed with Argon2id before storage).
    pub password: String,
    pub primary_role: Role,
    pub association_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub active_role: Option<Role>,
    pub points: Option<i64>,
    pub donor_badge: Option<Option<DonorBadge>>,
    pub total_donated_cents: Option<i64>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub verification_code: Option<Option<String>>,
    pub verification_expiry: Option<Option<DateTime<Utc>>>,
}
