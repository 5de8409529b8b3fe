use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::fetcher::{Endpoints, DEFAULT_API_BASE};
use crate::overlay::{FileRepository, Repository, StorageError};

pub const DEFAULT_OVERLAY_PATH: &str = "commentdesk-edits.json";
pub const DEFAULT_SLED_PATH: &str = "commentdesk-edits.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("unknown storage backend '{0}' (expected 'file' or 'sled')")]
    UnknownStorage(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Sled,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::File => "file",
            StorageBackend::Sled => "sled",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.eq_ignore_ascii_case("file") || value.eq_ignore_ascii_case("json") {
            Ok(StorageBackend::File)
        } else if value.eq_ignore_ascii_case("sled") {
            Ok(StorageBackend::Sled)
        } else {
            Err(ConfigError::UnknownStorage(value.to_string()))
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub api_base: String,
    pub storage: StorageBackend,
    /// Overlay file, or sled directory for the sled backend.
    pub overlay_path: PathBuf,
    pub request_timeout_secs: Option<u64>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: option_env!("COMMENTDESK_API_BASE").unwrap_or(DEFAULT_API_BASE).to_string(),
            storage: StorageBackend::File,
            overlay_path: PathBuf::from(DEFAULT_OVERLAY_PATH),
            request_timeout_secs: None,
            log_level: "info".to_string(),
        }
    }
}

/// Optional TOML layer; every key may be omitted.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub api_base: Option<String>,
    pub storage: Option<StorageBackend>,
    pub overlay_path: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
}

impl ConfigFile {
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::parse(path, &raw)
    }

    fn parse(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub fn merge_into_config(self, mut cfg: Config) -> Config {
        let storage_changed = self.storage.is_some_and(|s| s != cfg.storage);
        if let Some(v) = self.api_base {
            cfg.api_base = v;
        }
        if let Some(v) = self.storage {
            cfg.storage = v;
        }
        match self.overlay_path {
            Some(v) => cfg.overlay_path = v,
            None if storage_changed => cfg.overlay_path = default_overlay_path(cfg.storage),
            None => {}
        }
        if let Some(v) = self.request_timeout_secs {
            cfg.request_timeout_secs = Some(v);
        }
        if let Some(v) = self.log_level {
            cfg.log_level = v;
        }
        cfg
    }
}

pub fn default_overlay_path(storage: StorageBackend) -> PathBuf {
    match storage {
        StorageBackend::File => PathBuf::from(DEFAULT_OVERLAY_PATH),
        StorageBackend::Sled => PathBuf::from(DEFAULT_SLED_PATH),
    }
}

impl Config {
    pub fn endpoints(&self) -> Endpoints {
        Endpoints::from_base(&self.api_base)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Opens the overlay repository selected by `storage`.
    pub fn open_repository(&self) -> Result<Repository, StorageError> {
        match self.storage {
            StorageBackend::File => Ok(Arc::new(FileRepository::new(&self.overlay_path))),
            #[cfg(feature = "sled-store")]
            StorageBackend::Sled => Ok(Arc::new(crate::overlay::SledRepository::open(&self.overlay_path)?)),
            #[cfg(not(feature = "sled-store"))]
            StorageBackend::Sled => {
                log::warn!("sled storage requested but the `sled-store` feature is disabled");
                Err(StorageError::BackendUnavailable(StorageBackend::Sled.as_str()))
            }
        }
    }
}
