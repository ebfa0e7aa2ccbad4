//! Donation recording and badge assignment.

use huiguan_core::error::PortalResult;
use huiguan_core::models::donation::{CreateDonation, Donation};
use huiguan_core::models::user::{DonorBadge, UpdateUser};
use huiguan_core::repository::{DonationRepository, UserRepository};
use tracing::info;
use uuid::Uuid;

use crate::error::GivingError;

/// Gold at RM 5 000 lifetime giving, bronze at RM 100.
const GOLD_THRESHOLD_CENTS: i64 = 500_000;
const BRONZE_THRESHOLD_CENTS: i64 = 10_000;

/// Badge earned by a lifetime donation total.
pub fn badge_for_total(total_cents: i64) -> Option<DonorBadge> {
    if total_cents >= GOLD_THRESHOLD_CENTS {
        Some(DonorBadge::Gold)
    } else if total_cents >= BRONZE_THRESHOLD_CENTS {
        Some(DonorBadge::Bronze)
    } else {
        None
    }
}

/// Donation service.
///
/// Generic over repository implementations so the giving layer has no
/// dependency on the database crate.
pub struct DonationService<D, U>
where
    D: DonationRepository,
    U: UserRepository,
{
    donation_repo: D,
    user_repo: U,
}

impl<D, U> DonationService<D, U>
where
    D: DonationRepository,
    U: UserRepository,
{
    pub fn new(donation_repo: D, user_repo: U) -> Self {
        Self {
            donation_repo,
            user_repo,
        }
    }

    /// Record a completed donation, accumulate the donor's lifetime
    /// total, and recompute their badge. Badges never downgrade.
    pub async fn donate(&self, input: CreateDonation) -> PortalResult<Donation> {
        if input.amount_cents <= 0 {
            return Err(GivingError::NonPositiveAmount.into());
        }

        let user_id = input.user_id;
        let amount_cents = input.amount_cents;
        let donation = self.donation_repo.create(input).await?;

        let donor = self.user_repo.get_by_id(user_id).await?;
        let new_total = donor.total_donated_cents + amount_cents;
        let badge = badge_for_total(new_total).max(donor.donor_badge);

        self.user_repo
            .update(
                user_id,
                UpdateUser {
                    total_donated_cents: Some(new_total),
                    donor_badge: Some(badge),
                    ..Default::default()
                },
            )
            .await?;

        info!(
            donation_id = %donation.id,
            user_id = %user_id,
            amount_cents,
            "Donation recorded"
        );
        Ok(donation)
    }

    /// A member's donations, newest first.
    pub async fn donations_for(&self, user_id: Uuid) -> PortalResult<Vec<Donation>> {
        self.donation_repo.list_by_user(user_id).await
    }

    /// Donations made to one association, newest first.
    pub async fn donations_to(&self, association_id: &str) -> PortalResult<Vec<Donation>> {
        self.donation_repo.list_by_association(association_id).await
    }
}
