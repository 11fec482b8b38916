use crate::store::{MemoryUserStore, PgUserStore, SharedStore, TimeoutStore};
use crate::warden;
use anyhow::{anyhow, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::debug;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub dsn_password: Option<SecretString>,
    pub max_connections: u32,
    pub store_timeout: Duration,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the user store cannot be opened or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let store = connect(&args).await?;

    warden::new(args.port, store).await
}

/// Open the user store named by the DSN scheme, bounded by the store timeout.
/// # Errors
/// Returns an error if the DSN is invalid, its scheme is unknown or the database is unreachable.
pub async fn connect(args: &Args) -> Result<SharedStore> {
    let dsn = Url::parse(&args.dsn).context("Invalid DSN")?;

    match dsn.scheme() {
        "memory" => {
            debug!("Using in-memory user store");
            Ok(Arc::new(TimeoutStore::new(
                MemoryUserStore::new(),
                args.store_timeout,
            )))
        }
        "postgres" | "postgresql" => {
            let dsn = with_password(dsn, args.dsn_password.as_ref())?;

            let pool = PgPoolOptions::new()
                .min_connections(1)
                .max_connections(args.max_connections)
                .max_lifetime(Duration::from_secs(60 * 2))
                .acquire_timeout(args.store_timeout)
                .test_before_acquire(true)
                .connect(dsn.as_str())
                .await
                .context("Failed to connect to database")?;

            Ok(Arc::new(TimeoutStore::new(
                PgUserStore::new(pool),
                args.store_timeout,
            )))
        }
        scheme => Err(anyhow!("Unsupported DSN scheme: {scheme}")),
    }
}

fn with_password(mut dsn: Url, password: Option<&SecretString>) -> Result<Url> {
    if let Some(password) = password {
        dsn.set_password(Some(password.expose_secret()))
            .map_err(|()| anyhow!("Error setting password"))?;
    }

    Ok(dsn)
}
