//! Authentication service — registration, sign-in, and role switching.

use chrono::{Duration, Utc};
use huiguan_core::error::{PortalError, PortalResult};
use huiguan_core::models::user::{CreateUser, Role, UpdateUser, User};
use huiguan_core::repository::UserRepository;
use tracing::info;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::verification::{self, VerificationStatus};

/// Input for account registration.
#[derive(Debug)]
pub struct RegisterInput {
    pub email: String,
    pub name: String,
    pub password: String,
    pub primary_role: Role,
    pub association_id: Option<String>,
}

/// Authentication service.
///
/// Generic over the user repository so that the auth layer has no
/// dependency on the database crate.
pub struct AuthService<U: UserRepository> {
    user_repo: U,
    config: AuthConfig,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(user_repo: U, config: AuthConfig) -> Self {
        Self { user_repo, config }
    }

    /// Register a new account. The raw password is hashed by the user
    /// repository before storage; nothing plaintext is persisted.
    pub async fn register(&self, input: RegisterInput) -> PortalResult<User> {
        if input.password.chars().count() < self.config.min_password_length {
            return Err(AuthError::PasswordTooShort {
                min: self.config.min_password_length,
            }
            .into());
        }

        let user = self
            .user_repo
            .create(CreateUser {
                email: input.email,
                name: input.name,
                password: input.password,
                primary_role: input.primary_role,
                association_id: input.association_id,
            })
            .await?;

        info!(user_id = %user.id, "Registered new member");
        Ok(user)
    }

    /// Authenticate a user by email + password.
    pub async fn sign_in(&self, email: &str, password: &str) -> PortalResult<User> {
        let user = self
            .user_repo
            .get_by_email(email)
            .await
            .map_err(|e| match e {
                PortalError::NotFound { .. } => AuthError::InvalidCredentials.into(),
                other => other,
            })?;

        let valid = password::verify_password(
            password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;

        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        Ok(user)
    }

    /// Switch the user's active role.
    ///
    /// The target must be in the user's role set. Switching to Public, or
    /// switching while a verification is still within its 30-day window,
    /// needs no credential. Otherwise a code in `HNHG####` form must be
    /// supplied; on success a fresh verification window is issued along
    /// with the switch. Re-verification is per-window, not per-role.
    ///
    /// Any failure leaves the stored user untouched.
    pub async fn switch_role(
        &self,
        user_id: Uuid,
        target: Role,
        code: Option<&str>,
    ) -> PortalResult<User> {
        let user = self.user_repo.get_by_id(user_id).await?;

        if !user.has_role(target) {
            return Err(AuthError::RoleNotHeld {
                role: format!("{target:?}"),
            }
            .into());
        }

        if target == user.active_role {
            return Ok(user);
        }

        let status = verification::verification_status(&user, Utc::now());
        if target == Role::Public || status == VerificationStatus::Verified {
            return self
                .user_repo
                .update(
                    user_id,
                    UpdateUser {
                        active_role: Some(target),
                        ..Default::default()
                    },
                )
                .await;
        }

        // Unverified or expired: a credential is required to elevate.
        let code = code.ok_or(AuthError::CodeRequired)?;
        let normalized = verification::normalize_code(code)?;
        let expiry = Utc::now() + Duration::days(self.config.verification_validity_days);

        let updated = self
            .user_repo
            .update(
                user_id,
                UpdateUser {
                    active_role: Some(target),
                    verification_code: Some(Some(normalized)),
                    verification_expiry: Some(Some(expiry)),
                    ..Default::default()
                },
            )
            .await?;

        info!(user_id = %user_id, role = ?target, "Role switch verified");
        Ok(updated)
    }
}
