use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_MAX_RETRIES: u32 = 5;
pub const DEFAULT_PROBE_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_PROTECTED_TABLES: &[&str] = &["plant_profiles", "care_events", "plant_photos"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub replay: ReplayConfig,
    pub remote: RemoteConfig,
    pub connectivity: ConnectivityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Failed passes a record survives before it is evicted.
    pub max_retries: u32,
    /// Safety-net timer between replay passes while reachable.
    pub interval_secs: u64,
    pub dispatch_timeout_secs: u64,
    pub protected_tables: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RemoteConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    pub probe_url: Option<String>,
    pub probe_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: default_database_url(),
                max_connections: 4,
            },
            replay: ReplayConfig::default(),
            remote: RemoteConfig::default(),
            connectivity: ConnectivityConfig {
                probe_url: None,
                probe_interval_secs: DEFAULT_PROBE_INTERVAL_SECS,
            },
        }
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            interval_secs: 60,
            dispatch_timeout_secs: 15,
            protected_tables: DEFAULT_PROTECTED_TABLES
                .iter()
                .map(|table| table.to_string())
                .collect(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("VERDANT_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v.trim().to_string();
            }
        }
        if let Some(value) =
            lookup("VERDANT_DATABASE_MAX_CONNECTIONS").and_then(|v| parse_u32(&v))
        {
            cfg.database.max_connections = value.max(1);
        }

        if let Some(value) = lookup("VERDANT_REPLAY_MAX_RETRIES").and_then(|v| parse_u32(&v)) {
            cfg.replay.max_retries = value;
        }
        if let Some(value) = lookup("VERDANT_REPLAY_INTERVAL_SECS").and_then(|v| parse_u64(&v)) {
            cfg.replay.interval_secs = value.max(1);
        }
        if let Some(value) = lookup("VERDANT_DISPATCH_TIMEOUT_SECS").and_then(|v| parse_u64(&v)) {
            cfg.replay.dispatch_timeout_secs = value.max(1);
        }
        if let Some(v) = lookup("VERDANT_PROTECTED_TABLES") {
            let tables: Vec<String> = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !tables.is_empty() {
                cfg.replay.protected_tables = tables;
            }
        }

        cfg.remote.base_url = lookup("VERDANT_REMOTE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty());
        cfg.remote.api_key = lookup("VERDANT_REMOTE_API_KEY").filter(|v| !v.trim().is_empty());

        cfg.connectivity.probe_url = lookup("VERDANT_PROBE_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        if let Some(value) = lookup("VERDANT_PROBE_INTERVAL_SECS").and_then(|v| parse_u64(&v)) {
            cfg.connectivity.probe_interval_secs = value.max(1);
        }

        cfg
    }

    /// Probe target, falling back to the remote REST root.
    pub fn probe_url(&self) -> Option<String> {
        self.connectivity.probe_url.clone().or_else(|| {
            self.remote
                .base_url
                .as_ref()
                .map(|base| format!("{base}/rest/v1/"))
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.url.trim().is_empty() {
            return Err("Database url must not be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.replay.max_retries == 0 {
            return Err("Replay max_retries must be greater than 0".to_string());
        }
        if self.replay.interval_secs == 0 {
            return Err("Replay interval_secs must be greater than 0".to_string());
        }
        if self.replay.dispatch_timeout_secs == 0 {
            return Err("Replay dispatch_timeout_secs must be greater than 0".to_string());
        }
        if self.connectivity.probe_interval_secs == 0 {
            return Err("Connectivity probe_interval_secs must be greater than 0".to_string());
        }
        if self.remote.base_url.is_some() && self.remote.api_key.is_none() {
            return Err("Remote api_key is required when base_url is set".to_string());
        }
        Ok(())
    }
}

fn default_database_url() -> String {
    let dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("./data"))
        .join("verdant");
    format!("sqlite://{}/offline_queue.db?mode=rwc", dir.display())
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}
