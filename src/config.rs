//! Store configuration, constructed once by the caller and passed in
//! explicitly. No ambient globals.

use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the SQLite database file; created if missing.
    pub db_path: String,
    pub max_connections: u32,
    pub busy_timeout_secs: u64,
}

impl StoreConfig {
    pub fn at(db_path: impl AsRef<Path>) -> Self {
        Self {
            db_path: db_path.as_ref().to_string_lossy().to_string(),
            ..Self::default()
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: String::new(),
            max_connections: 5,
            busy_timeout_secs: 5,
        }
    }
}
