use crate::{
    api::{self, CountryGate},
    cards::{PgStorage, Storage, storage::postgres::migrate},
    cli::commands::database::StorageKind,
};
use anyhow::{Context, Result, anyhow};
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub storage: StorageKind,
    pub dsn: Option<SecretString>,
    pub allowed_countries: Vec<String>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable, migrations fail, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!("Server args: {:?}", args);

    let storage = match args.storage {
        StorageKind::Memory => Storage::memory(),
        StorageKind::Postgres => {
            let dsn = args
                .dsn
                .ok_or_else(|| anyhow!("Database connection string is required"))?;
            Storage::from(connect(&dsn).await?)
        }
    };

    api::new(args.port, storage, CountryGate::new(args.allowed_countries)).await
}

/// Connect the pool and bring the schema up to date before any traffic is accepted.
async fn connect(dsn: &SecretString) -> Result<PgStorage> {
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(dsn.expose_secret())
        .await
        .context("Failed to connect to database")?;

    migrate(&pool)
        .await
        .context("Failed to run database migrations")?;

    info!("Database migrations applied");

    Ok(PgStorage::new(pool))
}
