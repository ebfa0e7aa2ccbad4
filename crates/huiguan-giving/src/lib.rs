//! Huiguan Giving — donation recording and donor-badge tiers.

pub mod error;
pub mod service;

pub use error::GivingError;
pub use service::{DonationService, badge_for_total};
