//! Map validated CLI arguments to the action the binary executes.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{
    ARG_DSN, ARG_DSN_PASSWORD, ARG_MAX_CONNECTIONS, ARG_PORT, ARG_STORE_TIMEOUT,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::time::Duration;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(3000);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .context("missing required argument: --dsn")?;

    let dsn_password = matches
        .get_one::<String>(ARG_DSN_PASSWORD)
        .map(|password| SecretString::from(password.clone()));

    let max_connections = matches
        .get_one::<u32>(ARG_MAX_CONNECTIONS)
        .copied()
        .unwrap_or(5);

    let store_timeout = Duration::from_secs(
        matches
            .get_one::<u64>(ARG_STORE_TIMEOUT)
            .copied()
            .unwrap_or(5),
    );

    Ok(Action::Server(Args {
        port,
        dsn,
        dsn_password,
        max_connections,
        store_timeout,
    }))
}
