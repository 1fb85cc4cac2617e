use std::{fs::OpenOptions, path::Path, sync::Mutex};

use color_eyre::{Result, eyre::eyre};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `termtable=debug`
pub const LOG_ENV: &str = "TERMTABLE_LOG";

/// Send `tracing` output to `log_path`.
///
/// The terminal belongs to the UI, so nothing is ever logged to stdout or
/// stderr.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a global subscriber
/// is already installed.
pub fn init(log_path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| eyre!("failed to initialise logging: {e}"))?;

    tracing::info!(path = %log_path.display(), "logging initialised");
    Ok(())
}
