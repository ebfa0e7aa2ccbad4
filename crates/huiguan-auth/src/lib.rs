//! Huiguan Auth — account registration, password sign-in, and the role
//! switch/verification flow.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod verification;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{AuthService, RegisterInput};
pub use verification::{VerificationStatus, normalize_code, verification_status};
