//! Loan-service error types.

use huiguan_core::error::PortalError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanError {
    #[error("payment amount must be positive")]
    NonPositivePayment,

    #[error("application is not pending")]
    ApplicationNotPending,

    #[error("member already has an open loan")]
    OpenLoanExists,
}

impl From<LoanError> for PortalError {
    fn from(err: LoanError) -> Self {
        PortalError::Validation {
            message: err.to_string(),
        }
    }
}
