//! File logging via `tracing`. The terminal belongs to the UI, so output goes
//! to `typedash.log` in the data directory.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const LOG_ENV: &str = "TYPEDASH_LOG";
pub const LOG_FILE: &str = "typedash.log";

/// Install the global subscriber. `TYPEDASH_LOG` overrides `default_level`.
pub fn init(log_dir: &Path, default_level: &str) -> Result<PathBuf> {
    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(LOG_FILE);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let directive = filter_directive(std::env::var(LOG_ENV).ok(), default_level);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        )
        .with(filter)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))?;

    Ok(path)
}

/// Filter directive from the environment value, else the configured level.
fn filter_directive(env_value: Option<String>, default_level: &str) -> String {
    match env_value {
        Some(v) if !v.trim().is_empty() => v,
        _ => default_level.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_overrides_default() {
        assert_eq!(
            filter_directive(Some("typedash=debug".to_string()), "info"),
            "typedash=debug"
        );
    }

    #[test]
    fn test_init_reports_unusable_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = init(file.path(), "info").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_blank_env_falls_back() {
        assert_eq!(filter_directive(Some("  ".to_string()), "warn"), "warn");
        assert_eq!(filter_directive(None, "info"), "info");
    }
}
