use crate::audit::DEFAULT_AUDIT_CAPACITY;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

/// Configuration for the trust engine host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustConfig {
    /// Local profile settings
    pub profile: ProfileConfig,
    /// Audit trail settings
    pub audit: AuditConfig,
    /// Definitions provider settings
    pub definitions: DefinitionsConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Identifier of the single local player profile
    pub player_id: String,
    /// Certification auto-granted to every fresh profile
    pub baseline_cert_id: String,
    /// Where the profile snapshot lives
    pub snapshot_path: PathBuf,
    /// When false, snapshots are kept in memory only
    pub persistence_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Entries kept before the oldest is evicted
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionsConfig {
    /// JSON file holding ladders and rank thresholds
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Emit JSON log lines instead of plain text
    pub json: bool,
}

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            profile: ProfileConfig {
                player_id: "local-player".to_string(),
                baseline_cert_id: "basic_access".to_string(),
                snapshot_path: PathBuf::from("trust_profile.json"),
                persistence_enabled: true,
            },
            audit: AuditConfig {
                capacity: DEFAULT_AUDIT_CAPACITY,
            },
            definitions: DefinitionsConfig {
                path: PathBuf::from("definitions.json"),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json: false,
            },
        }
    }
}

impl TrustConfig {
    /// Load configuration from `TRUST_*` environment variables and validate it
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(player_id) = lookup("TRUST_PLAYER_ID") {
            config.profile.player_id = player_id;
        }
        if let Some(baseline) = lookup("TRUST_BASELINE_CERT") {
            config.profile.baseline_cert_id = baseline;
        }
        if let Some(path) = lookup("TRUST_SNAPSHOT_PATH") {
            config.profile.snapshot_path = PathBuf::from(path);
        }
        if let Some(enabled) = parse_var(&lookup, "TRUST_PERSISTENCE_ENABLED") {
            config.profile.persistence_enabled = enabled;
        }

        if let Some(capacity) = parse_var(&lookup, "TRUST_AUDIT_CAPACITY") {
            config.audit.capacity = capacity;
        }

        if let Some(path) = lookup("TRUST_DEFINITIONS_PATH") {
            config.definitions.path = PathBuf::from(path);
        }

        if let Some(level) = lookup("TRUST_LOG_LEVEL") {
            config.logging.level = level.to_lowercase();
        }
        if let Some(json) = parse_var(&lookup, "TRUST_LOG_JSON") {
            config.logging.json = json;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.profile.player_id.trim().is_empty() {
            return Err(anyhow!("Player id must not be empty"));
        }
        if self.profile.baseline_cert_id.trim().is_empty() {
            return Err(anyhow!("Baseline certification id must not be empty"));
        }
        if self.profile.persistence_enabled && self.profile.snapshot_path.as_os_str().is_empty() {
            return Err(anyhow!("Snapshot path must be set while persistence is enabled"));
        }
        if self.audit.capacity == 0 {
            return Err(anyhow!("Audit capacity must be at least 1"));
        }
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(anyhow!(
                "Unknown log level '{}', expected one of {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            ));
        }
        Ok(())
    }
}

/// Parse an optional variable, keeping the default on malformed input
fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid value for {}: '{}'", key, raw);
            None
        }
    }
}
