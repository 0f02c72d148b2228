// SPDX-License-Identifier: MPL-2.0

use crate::config::{
    APP_ID, DEFAULT_BIND_ADDRESS, DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_LOAD_TIMEOUT_MS,
    DEFAULT_RANKING_LIMIT, DEFAULT_WORKER_THREADS,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Server settings, read from
/// ~/.config/io.github.sethcottle.Pulse/settings.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_address: String,
    /// Falls back to the platform data directory when unset
    pub database_path: Option<PathBuf>,
    pub worker_threads: usize,
    pub busy_timeout_ms: u64,
    pub load_timeout_ms: u64,
    pub ranking_limit: usize,
    /// Bearer token to user id
    pub api_tokens: HashMap<String, i64>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            database_path: None,
            worker_threads: DEFAULT_WORKER_THREADS,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            load_timeout_ms: DEFAULT_LOAD_TIMEOUT_MS,
            ranking_limit: DEFAULT_RANKING_LIMIT,
            api_tokens: HashMap::new(),
        }
    }
}

impl ServerSettings {
    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push(APP_ID);
            p.push("settings.json");
            p
        })
    }

    /// Load settings from disk and the environment, or return defaults
    pub fn load() -> Self {
        let mut settings = match Self::settings_path() {
            Some(path) => Self::from_file(&path),
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok());
        settings
    }

    fn from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!("Invalid settings file {}: {}, using defaults", path.display(), e);
                Self::default()
            }),
            Err(_) => {
                info!("No settings file at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// `PULSE_BIND` and `PULSE_DB` win over the settings file
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(bind) = var("PULSE_BIND") {
            info!("PULSE_BIND set, binding to {}", bind);
            self.bind_address = bind;
        }
        if let Some(db) = var("PULSE_DB") {
            info!("PULSE_DB set, using database {}", db);
            self.database_path = Some(PathBuf::from(db));
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    /// At least one request thread, whatever the file says
    pub fn worker_threads(&self) -> usize {
        self.worker_threads.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{ "ranking_limit": 25, "api_tokens": { "secret": 3 } }"#,
        )
        .unwrap();

        let settings = ServerSettings::from_file(&path);
        assert_eq!(settings.ranking_limit, 25);
        assert_eq!(settings.api_tokens.get("secret"), Some(&3));
        assert_eq!(settings.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(settings.busy_timeout(), Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS));
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();

        let settings = ServerSettings::from_file(&path);
        assert_eq!(settings.ranking_limit, DEFAULT_RANKING_LIMIT);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut settings = ServerSettings::default();
        settings.apply_env(|key| match key {
            "PULSE_BIND" => Some("127.0.0.1:9000".to_string()),
            "PULSE_DB" => Some("/tmp/pulse-test.db".to_string()),
            _ => None,
        });

        assert_eq!(settings.bind_address, "127.0.0.1:9000");
        assert_eq!(settings.database_path, Some(PathBuf::from("/tmp/pulse-test.db")));
    }

    #[test]
    fn test_worker_threads_never_zero() {
        let settings = ServerSettings {
            worker_threads: 0,
            ..ServerSettings::default()
        };
        assert_eq!(settings.worker_threads(), 1);
    }
}
