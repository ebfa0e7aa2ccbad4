//! SurrealDB implementation of [`DonationRepository`].

use chrono::{DateTime, Utc};
use huiguan_core::error::PortalResult;
use huiguan_core::models::donation::{CreateDonation, Donation};
use huiguan_core::repository::DonationRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct DonationRow {
    user_id: String,
    donor_name: String,
    association_id: String,
    amount_cents: i64,
    payment_method: String,
    donated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct DonationRowWithId {
    record_id: String,
    user_id: String,
    donor_name: String,
    association_id: String,
    amount_cents: i64,
    payment_method: String,
    donated_at: DateTime<Utc>,
}

impl DonationRow {
    fn into_donation(self, id: Uuid) -> Result<Donation, DbError> {
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
        Ok(Donation {
            id,
            user_id,
            donor_name: self.donor_name,
            association_id: self.association_id,
            amount_cents: self.amount_cents,
            payment_method: self.payment_method,
            donated_at: self.donated_at,
        })
    }
}

impl DonationRowWithId {
    fn try_into_donation(self) -> Result<Donation, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
        Ok(Donation {
            id,
            user_id,
            donor_name: self.donor_name,
            association_id: self.association_id,
            amount_cents: self.amount_cents,
            payment_method: self.payment_method,
            donated_at: self.donated_at,
        })
    }
}

/// SurrealDB implementation of the Donation repository.
#[derive(Clone)]
pub struct SurrealDonationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDonationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> DonationRepository for SurrealDonationRepository<C> {
    async fn create(&self, input: CreateDonation) -> PortalResult<Donation> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('donation', $id) SET \
                 user_id = $user_id, \
                 donor_name = $donor_name, \
                 association_id = $association_id, \
                 amount_cents = $amount_cents, \
                 payment_method = $payment_method",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("donor_name", input.donor_name))
            .bind(("association_id", input.association_id))
            .bind(("amount_cents", input.amount_cents))
            .bind(("payment_method", input.payment_method))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<DonationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "donation".into(),
            id: id_str,
        })?;

        Ok(row.into_donation(id)?)
    }

    async fn list_by_user(&self, user_id: Uuid) -> PortalResult<Vec<Donation>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM donation \
                 WHERE user_id = $user_id \
                 ORDER BY donated_at DESC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DonationRowWithId> = result.take(0).map_err(DbError::from)?;

        let donations = rows
            .into_iter()
            .map(|row| row.try_into_donation())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(donations)
    }

    async fn list_by_association(&self, association_id: &str) -> PortalResult<Vec<Donation>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM donation \
                 WHERE association_id = $association_id \
                 ORDER BY donated_at DESC",
            )
            .bind(("association_id", association_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DonationRowWithId> = result.take(0).map_err(DbError::from)?;

        let donations = rows
            .into_iter()
            .map(|row| row.try_into_donation())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(donations)
    }
}
