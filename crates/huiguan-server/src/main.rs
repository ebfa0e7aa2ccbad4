//! Huiguan Server — application entry point.
//!
//! Connects to SurrealDB, applies migrations, and runs the
//! payment-deadline sweep on a fixed interval until interrupted.

use std::time::Duration;

use chrono::Utc;
use huiguan_db::repository::{
    SurrealLoanRepository, SurrealNotificationRepository, SurrealOverdueMarkerRepository,
    SurrealUserRepository,
};
use huiguan_db::{DbConfig, DbManager};
use huiguan_loans::DeadlineSweep;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// How often the deadline sweep re-examines open loans.
const SWEEP_INTERVAL_SECS: u64 = 900;

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn db_config_from_env() -> DbConfig {
    let defaults = DbConfig::default();
    DbConfig {
        url: env_or("HUIGUAN_DB_URL", defaults.url),
        namespace: env_or("HUIGUAN_DB_NAMESPACE", defaults.namespace),
        database: env_or("HUIGUAN_DB_DATABASE", defaults.database),
        username: env_or("HUIGUAN_DB_USERNAME", defaults.username),
        password: env_or("HUIGUAN_DB_PASSWORD", defaults.password),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("huiguan=info".parse().unwrap()),
        )
        .json()
        .init();

    info!("Starting Huiguan portal server...");

    let config = db_config_from_env();
    let manager = match DbManager::connect(&config).await {
        Ok(manager) => manager,
        Err(e) => {
            error!(error = %e, "Failed to connect to SurrealDB");
            return;
        }
    };

    if let Err(e) = huiguan_db::run_migrations(manager.client()).await {
        error!(error = %e, "Failed to apply migrations");
        return;
    }

    let db = manager.client().clone();
    let sweep = DeadlineSweep::new(
        SurrealLoanRepository::new(db.clone()),
        SurrealUserRepository::new(db.clone()),
        SurrealNotificationRepository::new(db.clone()),
        SurrealOverdueMarkerRepository::new(db),
    );

    let mut ticker = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match sweep.run(Utc::now()).await {
                    Ok(report) if report.loans_notified > 0 => {
                        info!(notified = report.loans_notified, "Overdue notices sent");
                    }
                    Ok(_) => {}
                    Err(e) => error!(error = %e, "Deadline sweep failed"),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    info!("Huiguan portal server stopped.");
}
