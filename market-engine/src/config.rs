//! Engine configuration
//!
//! All settings can be overridden through environment variables:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | WORK_DIR | /var/lib/market | Working directory (database, logs) |
//! | LOG_LEVEL | info | Log level for the tracing subscriber |
//! | DELIVERY_WINDOW_DAYS | 5 | Estimated delivery window for new orders |
//! | NOTIFY_CAPACITY | 1024 | Notification broadcast channel capacity |
//!
//! # Example
//!
//! ```ignore
//! WORK_DIR=/data/market LOG_LEVEL=debug cargo run
//! ```

use std::path::PathBuf;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the database and log files
    pub work_dir: String,
    /// Log level: trace | debug | info | warn | error
    pub log_level: String,
    /// Days added to the placement time as the estimated delivery
    pub delivery_window_days: i64,
    /// Notification broadcast channel capacity
    pub notify_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/market".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            delivery_window_days: std::env::var("DELIVERY_WINDOW_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            notify_capacity: std::env::var("NOTIFY_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1024),
        }
    }

    /// Path of the engine database inside the working directory
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("market.redb")
    }

    /// Path of the log directory inside the working directory
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_dir: "/var/lib/market".into(),
            log_level: "info".into(),
            delivery_window_days: 5,
            notify_capacity: 1024,
        }
    }
}
