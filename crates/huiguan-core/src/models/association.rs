//! Association and committee-roster domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitteeMember {
    pub name: String,
    /// Position on the committee (e.g. "President", "Treasurer").
    pub title: String,
    pub category: Option<String>,
}

/// A member association chapter. Keyed by a short string code rather
/// than a UUID because chapter ids (e.g. "HNHG-PG") are assigned by the
/// federation, not generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Association {
    pub id: String,
    pub name: String,
    pub location: String,
    pub committee_members: Vec<CommitteeMember>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAssociation {
    pub id: String,
    pub name: String,
    pub location: String,
}
