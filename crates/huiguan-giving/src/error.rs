//! Donation-service error types.

use huiguan_core::error::PortalError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GivingError {
    #[error("donation amount must be positive")]
    NonPositiveAmount,
}

impl From<GivingError> for PortalError {
    fn from(err: GivingError) -> Self {
        PortalError::Validation {
            message: err.to_string(),
        }
    }
}
