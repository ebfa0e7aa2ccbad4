//! Authentication error types.

use huiguan_core::error::PortalError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("role not held: {role}")]
    RoleNotHeld { role: String },

    #[error("verification code required")]
    CodeRequired,

    #[error("invalid verification code format (expected HNHG followed by 4 digits)")]
    InvalidCodeFormat,

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for PortalError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => PortalError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::RoleNotHeld { .. } => PortalError::AuthorizationDenied {
                reason: err.to_string(),
            },
            AuthError::PasswordTooShort { .. }
            | AuthError::CodeRequired
            | AuthError::InvalidCodeFormat => PortalError::Validation {
                message: err.to_string(),
            },
            AuthError::Crypto(msg) => PortalError::Internal(msg),
        }
    }
}
