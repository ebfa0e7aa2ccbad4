//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Business-logic crates are generic
//! over these traits so a different storage engine can be swapped in
//! without touching them. There are no transactions: each call is a
//! single read or write, and concurrent writers follow last-writer-wins.

use uuid::Uuid;

use crate::error::PortalResult;
use crate::models::{
    association::{Association, CommitteeMember, CreateAssociation},
    booking::{Booking, CreateBooking},
    donation::{CreateDonation, Donation},
    event::{CreateEvent, Event, EventStatus, UpdateEvent},
    loan::{
        ApplicationStatus, CreateLoan, CreateLoanApplication, Loan, LoanApplication, UpdateLoan,
    },
    notification::{CreateNotification, Notification},
    user::{CreateUser, UpdateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = PortalResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PortalResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = PortalResult<User>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = PortalResult<User>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = PortalResult<PaginatedResult<User>>> + Send;
    /// All users whose role set contains an admin-capable role.
    fn list_admins(&self) -> impl Future<Output = PortalResult<Vec<User>>> + Send;
}

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

pub trait LoanRepository: Send + Sync {
    fn create(&self, input: CreateLoan) -> impl Future<Output = PortalResult<Loan>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PortalResult<Loan>> + Send;
    fn list_by_user(&self, user_id: Uuid) -> impl Future<Output = PortalResult<Vec<Loan>>> + Send;
    /// Loans still owed: status Approved with a positive remaining balance.
    fn list_open(&self) -> impl Future<Output = PortalResult<Vec<Loan>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateLoan,
    ) -> impl Future<Output = PortalResult<Loan>> + Send;
}

pub trait LoanApplicationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateLoanApplication,
    ) -> impl Future<Output = PortalResult<LoanApplication>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PortalResult<LoanApplication>> + Send;
    fn set_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> impl Future<Output = PortalResult<LoanApplication>> + Send;
    fn list_pending(&self) -> impl Future<Output = PortalResult<Vec<LoanApplication>>> + Send;
}

// ---------------------------------------------------------------------------
// Events & bookings
// ---------------------------------------------------------------------------

pub trait EventRepository: Send + Sync {
    fn create(&self, input: CreateEvent) -> impl Future<Output = PortalResult<Event>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PortalResult<Event>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateEvent,
    ) -> impl Future<Output = PortalResult<Event>> + Send;
    fn list_by_status(
        &self,
        status: EventStatus,
    ) -> impl Future<Output = PortalResult<Vec<Event>>> + Send;
    fn list_by_creator(
        &self,
        created_by: Uuid,
    ) -> impl Future<Output = PortalResult<Vec<Event>>> + Send;
}

pub trait BookingRepository: Send + Sync {
    fn create(&self, input: CreateBooking) -> impl Future<Output = PortalResult<Booking>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PortalResult<Booking>> + Send;
    fn list_by_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = PortalResult<Vec<Booking>>> + Send;
}

// ---------------------------------------------------------------------------
// Donations
// ---------------------------------------------------------------------------

pub trait DonationRepository: Send + Sync {
    fn create(&self, input: CreateDonation) -> impl Future<Output = PortalResult<Donation>> + Send;
    fn list_by_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = PortalResult<Vec<Donation>>> + Send;
    fn list_by_association(
        &self,
        association_id: &str,
    ) -> impl Future<Output = PortalResult<Vec<Donation>>> + Send;
}

// ---------------------------------------------------------------------------
// Associations
// ---------------------------------------------------------------------------

pub trait AssociationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateAssociation,
    ) -> impl Future<Output = PortalResult<Association>> + Send;
    fn get_by_id(&self, id: &str) -> impl Future<Output = PortalResult<Association>> + Send;
    /// Replace the committee roster wholesale; the roster editor saves
    /// the full list each time.
    fn set_committee(
        &self,
        id: &str,
        members: Vec<CommitteeMember>,
    ) -> impl Future<Output = PortalResult<Association>> + Send;
    fn list(&self) -> impl Future<Output = PortalResult<Vec<Association>>> + Send;
}

// ---------------------------------------------------------------------------
// Notifications (append-only except for the read flag)
// ---------------------------------------------------------------------------

pub trait NotificationRepository: Send + Sync {
    fn append(
        &self,
        input: CreateNotification,
    ) -> impl Future<Output = PortalResult<Notification>> + Send;
    fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = PortalResult<Vec<Notification>>> + Send;
    fn unread_count(&self, user_id: Uuid) -> impl Future<Output = PortalResult<u64>> + Send;
    fn mark_read(&self, id: Uuid) -> impl Future<Output = PortalResult<()>> + Send;
    fn mark_all_read(&self, user_id: Uuid) -> impl Future<Output = PortalResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Overdue markers (append-only, never pruned)
// ---------------------------------------------------------------------------

/// Records that an overdue notice was already sent for a loan in a given
/// billing month, so repeated sweeps stay idempotent within the month.
pub trait OverdueMarkerRepository: Send + Sync {
    fn contains(
        &self,
        loan_id: Uuid,
        year: i32,
        month: u32,
    ) -> impl Future<Output = PortalResult<bool>> + Send;
    fn append(
        &self,
        loan_id: Uuid,
        year: i32,
        month: u32,
    ) -> impl Future<Output = PortalResult<()>> + Send;
}
