//! Domain models for the Huiguan portal.
//!
//! These are the core types shared across all crates. All money values are
//! integer cents; RM 4 000.00 is stored as `400_000`.

pub mod association;
pub mod booking;
pub mod donation;
pub mod event;
pub mod loan;
pub mod notification;
pub mod user;
