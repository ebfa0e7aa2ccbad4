//! Huiguan Loans — the loan lifecycle (application, acceptance, payment
//! application) and the payment-deadline notification sweep.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod sweep;

pub use config::LoanConfig;
pub use error::LoanError;
pub use lifecycle::{LoanService, PaymentOutcome, apply_payment, first_of_next_month};
pub use sweep::{DeadlineSweep, SweepReport, is_payment_overdue, payment_deadline};
