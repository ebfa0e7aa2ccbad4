//! SurrealDB repository implementations.

mod association;
mod booking;
mod donation;
mod event;
mod loan;
mod loan_application;
mod marker;
mod notification;
mod user;

pub use association::SurrealAssociationRepository;
pub use booking::SurrealBookingRepository;
pub use donation::SurrealDonationRepository;
pub use event::SurrealEventRepository;
pub use loan::SurrealLoanRepository;
pub use loan_application::SurrealLoanApplicationRepository;
pub use marker::SurrealOverdueMarkerRepository;
pub use notification::SurrealNotificationRepository;
pub use user::{SurrealUserRepository, verify_password};
