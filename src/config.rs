//! Store configuration.
//!
//! Sources, lowest priority first:
//! 1. Defaults
//! 2. Optional TOML file
//! 3. `WALKV_*` environment variables, e.g. `WALKV_WAL_PATH=/var/lib/kv.wal`
//!    or `WALKV_RECOVERY=truncate_tail`

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;
use crate::wal::{RecoveryMode, SyncPolicy};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Location of the write-ahead log.
    #[serde(default = "default_wal_path")]
    pub wal_path: PathBuf,

    /// When appends are fsync'd.
    #[serde(default)]
    pub sync_policy: SyncPolicy,

    /// What replay does with a malformed record.
    #[serde(default)]
    pub recovery: RecoveryMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            wal_path: default_wal_path(),
            sync_policy: SyncPolicy::default(),
            recovery: RecoveryMode::default(),
        }
    }
}

fn default_wal_path() -> PathBuf {
    PathBuf::from("server.wal")
}

impl StoreConfig {
    /// Config with defaults except for the log location.
    pub fn with_wal_path(path: impl Into<PathBuf>) -> Self {
        Self {
            wal_path: path.into(),
            ..Self::default()
        }
    }

    /// Load configuration from an optional TOML file overlaid with the
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("WALKV")
                .prefix_separator("_")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }
}
