//! Runtime settings
//!
//! Resolved from environment variables with defaults next to the project
//! data directory.

use std::path::PathBuf;

use tracing::warn;

/// Number of scans kept per user when not configured
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_path: PathBuf,
    pub report_dir: PathBuf,
    pub history_limit: usize,
}

impl Settings {
    /// Load settings from the environment.
    ///
    /// - `NUTRISCAN_DATABASE_PATH`: SQLite file (default `<project>/data/nutriscan.db`)
    /// - `NUTRISCAN_REPORT_DIR`: PDF output directory (default `<data dir>/reports`)
    /// - `NUTRISCAN_HISTORY_LIMIT`: scans kept per user (default 50)
    pub fn from_env() -> Self {
        let database_path = std::env::var("NUTRISCAN_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_dir().join("nutriscan.db"));

        let report_dir = std::env::var("NUTRISCAN_REPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                database_path
                    .parent()
                    .map(|p| p.join("reports"))
                    .unwrap_or_else(|| PathBuf::from("reports"))
            });

        let history_limit = match std::env::var("NUTRISCAN_HISTORY_LIMIT") {
            Ok(raw) => parse_history_limit(&raw).unwrap_or_else(|| {
                warn!(value = %raw, "Invalid NUTRISCAN_HISTORY_LIMIT, using default");
                DEFAULT_HISTORY_LIMIT
            }),
            Err(_) => DEFAULT_HISTORY_LIMIT,
        };

        Self {
            database_path,
            report_dir,
            history_limit,
        }
    }
}

fn parse_history_limit(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok().filter(|n| *n > 0)
}

/// `<project>/data`, walking up out of `target/release` or `target/debug`
fn default_data_dir() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(parent) = path.parent() {
            if let Some(grandparent) = parent.parent() {
                path = grandparent.to_path_buf();
            }
        }
    }

    path.push("data");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_history_limit() {
        assert_eq!(parse_history_limit("25"), Some(25));
        assert_eq!(parse_history_limit(" 50 "), Some(50));
        assert_eq!(parse_history_limit("0"), None);
        assert_eq!(parse_history_limit("many"), None);
    }

    #[test]
    fn test_default_data_dir_ends_with_data() {
        assert!(default_data_dir().ends_with("data"));
    }
}
