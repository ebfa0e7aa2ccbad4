//! Huiguan Core — domain models, repository trait definitions, and the
//! portal-wide error type.
//!
//! Every other crate in the workspace depends on this one; it depends on
//! nothing but serialization and time utilities.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{PortalError, PortalResult};
