//! SurrealDB implementation of [`AssociationRepository`].
//!
//! Associations are keyed by their federation-assigned chapter code
//! rather than a generated UUID.

use chrono::{DateTime, Utc};
use huiguan_core::error::PortalResult;
use huiguan_core::models::association::{Association, CommitteeMember, CreateAssociation};
use huiguan_core::repository::AssociationRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct MemberRow {
    name: String,
    title: String,
    category: Option<String>,
}

impl From<MemberRow> for CommitteeMember {
    fn from(row: MemberRow) -> Self {
        CommitteeMember {
            name: row.name,
            title: row.title,
            category: row.category,
        }
    }
}

impl From<CommitteeMember> for MemberRow {
    fn from(member: CommitteeMember) -> Self {
        MemberRow {
            name: member.name,
            title: member.title,
            category: member.category,
        }
    }
}

#[derive(Debug, SurrealValue)]
struct AssociationRow {
    name: String,
    location: String,
    committee_members: Vec<MemberRow>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct AssociationRowWithId {
    record_id: String,
    name: String,
    location: String,
    committee_members: Vec<MemberRow>,
    created_at: DateTime<Utc>,
}

impl AssociationRow {
    fn into_association(self, id: String) -> Association {
        Association {
            id,
            name: self.name,
            location: self.location,
            committee_members: self
                .committee_members
                .into_iter()
                .map(Into::into)
                .collect(),
            created_at: self.created_at,
        }
    }
}

impl AssociationRowWithId {
    fn into_association(self) -> Association {
        Association {
            id: self.record_id,
            name: self.name,
            location: self.location,
            committee_members: self
                .committee_members
                .into_iter()
                .map(Into::into)
                .collect(),
            created_at: self.created_at,
        }
    }
}

/// SurrealDB implementation of the Association repository.
#[derive(Clone)]
pub struct SurrealAssociationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAssociationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AssociationRepository for SurrealAssociationRepository<C> {
    async fn create(&self, input: CreateAssociation) -> PortalResult<Association> {
        let id = input.id.clone();

        let result = self
            .db
            .query(
                "CREATE type::record('association', $id) SET \
                 name = $name, \
                 location = $location, \
                 committee_members = []",
            )
            .bind(("id", input.id))
            .bind(("name", input.name))
            .bind(("location", input.location))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<AssociationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "association".into(),
            id: id.clone(),
        })?;

        Ok(row.into_association(id))
    }

    async fn get_by_id(&self, id: &str) -> PortalResult<Association> {
        let id_owned = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('association', $id)")
            .bind(("id", id_owned.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AssociationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "association".into(),
            id: id_owned.clone(),
        })?;

        Ok(row.into_association(id_owned))
    }

    async fn set_committee(
        &self,
        id: &str,
        members: Vec<CommitteeMember>,
    ) -> PortalResult<Association> {
        let id_owned = id.to_string();
        let member_rows: Vec<MemberRow> = members.into_iter().map(Into::into).collect();

        let result = self
            .db
            .query(
                "UPDATE type::record('association', $id) SET \
                 committee_members = $members",
            )
            .bind(("id", id_owned.clone()))
            .bind(("members", member_rows))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<AssociationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "association".into(),
            id: id_owned.clone(),
        })?;

        Ok(row.into_association(id_owned))
    }

    async fn list(&self) -> PortalResult<Vec<Association>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM association \
                 ORDER BY name ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AssociationRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows.into_iter().map(|row| row.into_association()).collect())
    }
}
