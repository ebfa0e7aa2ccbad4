//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD name ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD primary_role ON TABLE user TYPE string \
    ASSERT $value IN ['Public', 'SubEditor', 'SubAdmin', 'SuperAdmin'];
DEFINE FIELD roles ON TABLE user TYPE option<array>;
DEFINE FIELD OVERWRITE roles.* ON TABLE user TYPE string \
    ASSERT $value IN ['Public', 'SubEditor', 'SubAdmin', 'SuperAdmin'];
DEFINE FIELD active_role ON TABLE user TYPE option<string> \
    ASSERT $value == NONE OR $value IN \
    ['Public', 'SubEditor', 'SubAdmin', 'SuperAdmin'];
DEFINE FIELD association_id ON TABLE user TYPE option<string>;
DEFINE FIELD points ON TABLE user TYPE int DEFAULT 0;
DEFINE FIELD donor_badge ON TABLE user TYPE option<string> \
    ASSERT $value == NONE OR $value IN ['Bronze', 'Gold'];
DEFINE FIELD total_donated_cents ON TABLE user TYPE int DEFAULT 0;
DEFINE FIELD verification_code ON TABLE user TYPE option<string>;
DEFINE FIELD verification_expiry ON TABLE user TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Loans (created by accepting an application, never deleted)
-- =======================================================================
DEFINE TABLE loan SCHEMAFULL;
DEFINE FIELD user_id ON TABLE loan TYPE string;
DEFINE FIELD amount_cents ON TABLE loan TYPE int;
DEFINE FIELD purpose ON TABLE loan TYPE string;
DEFINE FIELD monthly_payment_cents ON TABLE loan TYPE int;
DEFINE FIELD total_payments ON TABLE loan TYPE int;
DEFINE FIELD payments_made ON TABLE loan TYPE int DEFAULT 0;
DEFINE FIELD total_paid_cents ON TABLE loan TYPE int DEFAULT 0;
DEFINE FIELD remaining_balance_cents ON TABLE loan TYPE int;
DEFINE FIELD next_payment_date ON TABLE loan TYPE option<datetime>;
DEFINE FIELD status ON TABLE loan TYPE string \
    ASSERT $value IN ['Approved', 'Completed'];
DEFINE FIELD applied_at ON TABLE loan TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_loan_user ON TABLE loan COLUMNS user_id;

-- =======================================================================
-- Loan applications
-- =======================================================================
DEFINE TABLE loan_application SCHEMAFULL;
DEFINE FIELD user_id ON TABLE loan_application TYPE string;
DEFINE FIELD amount_cents ON TABLE loan_application TYPE int;
DEFINE FIELD purpose ON TABLE loan_application TYPE string;
DEFINE FIELD status ON TABLE loan_application TYPE string \
    ASSERT $value IN ['Pending', 'Accepted', 'Rejected'];
DEFINE FIELD submitted_at ON TABLE loan_application TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_application_user ON TABLE loan_application \
    COLUMNS user_id;

-- =======================================================================
-- Events
-- =======================================================================
DEFINE TABLE event SCHEMAFULL;
DEFINE FIELD title ON TABLE event TYPE string;
DEFINE FIELD date ON TABLE event TYPE datetime;
DEFINE FIELD time ON TABLE event TYPE string;
DEFINE FIELD venue ON TABLE event TYPE string;
DEFINE FIELD price_cents ON TABLE event TYPE int;
DEFINE FIELD description ON TABLE event TYPE string;
DEFINE FIELD status ON TABLE event TYPE string \
    ASSERT $value IN ['Pending', 'Approved', 'Rejected'];
DEFINE FIELD rejection_comment ON TABLE event TYPE option<string>;
DEFINE FIELD created_by ON TABLE event TYPE string;
DEFINE FIELD max_capacity ON TABLE event TYPE option<int>;
DEFINE FIELD current_participants ON TABLE event TYPE int DEFAULT 0;
DEFINE FIELD created_at ON TABLE event TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_event_status ON TABLE event COLUMNS status;
DEFINE INDEX idx_event_creator ON TABLE event COLUMNS created_by;

-- =======================================================================
-- Bookings
-- =======================================================================
DEFINE TABLE booking SCHEMAFULL;
DEFINE FIELD user_id ON TABLE booking TYPE string;
DEFINE FIELD event_id ON TABLE booking TYPE string;
DEFINE FIELD attendees ON TABLE booking TYPE int;
DEFINE FIELD total_price_cents ON TABLE booking TYPE int;
DEFINE FIELD payment_method ON TABLE booking TYPE string;
DEFINE FIELD pass_code ON TABLE booking TYPE string;
DEFINE FIELD status ON TABLE booking TYPE string \
    ASSERT $value IN ['Active', 'Cancelled'];
DEFINE FIELD booked_at ON TABLE booking TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_booking_user ON TABLE booking COLUMNS user_id;

-- =======================================================================
-- Donations
-- =======================================================================
DEFINE TABLE donation SCHEMAFULL;
DEFINE FIELD user_id ON TABLE donation TYPE string;
DEFINE FIELD donor_name ON TABLE donation TYPE string;
DEFINE FIELD association_id ON TABLE donation TYPE string;
DEFINE FIELD amount_cents ON TABLE donation TYPE int;
DEFINE FIELD payment_method ON TABLE donation TYPE string;
DEFINE FIELD donated_at ON TABLE donation TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_donation_user ON TABLE donation COLUMNS user_id;
DEFINE INDEX idx_donation_association ON TABLE donation \
    COLUMNS association_id;

-- =======================================================================
-- Associations (keyed by federation-assigned chapter code)
-- =======================================================================
DEFINE TABLE association SCHEMAFULL;
DEFINE FIELD name ON TABLE association TYPE string;
DEFINE FIELD location ON TABLE association TYPE string;
DEFINE FIELD committee_members ON TABLE association TYPE array \
    DEFAULT [];
DEFINE FIELD committee_members.* ON TABLE association \
    TYPE object FLEXIBLE;
DEFINE FIELD created_at ON TABLE association TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Notifications (append-only except for the read flag)
-- =======================================================================
DEFINE TABLE notification SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update FULL
        FOR delete NONE;
DEFINE FIELD user_id ON TABLE notification TYPE string;
DEFINE FIELD title ON TABLE notification TYPE string;
DEFINE FIELD body ON TABLE notification TYPE string;
DEFINE FIELD category ON TABLE notification TYPE string \
    ASSERT $value IN ['Event', 'Donation', 'Loan', 'System'];
DEFINE FIELD created_at ON TABLE notification TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD read ON TABLE notification TYPE bool DEFAULT false;
DEFINE INDEX idx_notification_user ON TABLE notification \
    COLUMNS user_id;

-- =======================================================================
-- Overdue markers (append-only, never pruned)
-- =======================================================================
DEFINE TABLE overdue_marker SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD loan_id ON TABLE overdue_marker TYPE string;
DEFINE FIELD year ON TABLE overdue_marker TYPE int;
DEFINE FIELD month ON TABLE overdue_marker TYPE int;
DEFINE FIELD created_at ON TABLE overdue_marker TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_marker_loan_month ON TABLE overdue_marker \
    COLUMNS loan_id, year, month UNIQUE;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
