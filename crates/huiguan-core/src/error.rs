//! Error types for the Huiguan portal.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type PortalResult<T> = Result<T, PortalError>;
