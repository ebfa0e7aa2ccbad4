//! Donation domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub donor_name: String,
    pub association_id: String,
    pub amount_cents: i64,
    pub payment_method: String,
    pub donated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDonation {
    pub user_id: Uuid,
    pub donor_name: String,
    pub association_id: String,
    pub amount_cents: i64,
    pub payment_method: String,
}
