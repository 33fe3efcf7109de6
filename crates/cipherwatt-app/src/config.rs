//! Coordinator Configuration
//!
//! Deployment table, authorization validity window, signature cache location
//! and log filter. Loaded from TOML, then overridden from `CIPHERWATT_*`
//! environment variables, then validated.
//!
//! ```toml
//! authorization_validity_days = 10
//! log_filter = "cipherwatt=debug"
//! signature_cache = "/var/lib/cipherwatt/signatures.json"
//!
//! [[deployments]]
//! network_id = 11155111
//! address = "0x5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e"
//! label = "sepolia"
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cipherwatt_core::{
    DeploymentRegistry, NetworkId, PhysicalTimeEffects, SignatureStore, SignerEffects,
    VaultAddress,
};
use cipherwatt_signature::{
    FileSignatureStore, InMemorySignatureStore, SignatureManager, DEFAULT_VALIDITY_DAYS,
};
use serde::{Deserialize, Serialize};

/// Prefix of every environment override.
pub const ENV_PREFIX: &str = "CIPHERWATT_";

/// Longest authorization validity accepted.
pub const MAX_VALIDITY_DAYS: u32 = 365;

fn default_validity_days() -> u32 {
    DEFAULT_VALIDITY_DAYS
}

fn default_log_filter() -> String {
    "info".to_string()
}

/// Configuration failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// File is not valid TOML for this schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// Values parsed but are inconsistent
    #[error("invalid config: {message}")]
    Invalid {
        /// What is wrong
        message: String,
    },
}

impl ConfigError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// One vault deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentEntry {
    /// Network the vault lives on
    pub network_id: NetworkId,
    /// Vault contract address
    pub address: VaultAddress,
    /// Human-readable network name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Coordinator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Known vault deployments
    pub deployments: Vec<DeploymentEntry>,

    /// Validity window of newly signed decryption authorizations
    #[serde(default = "default_validity_days")]
    pub authorization_validity_days: u32,

    /// JSON file caching authorizations across restarts; in-memory when unset
    pub signature_cache: Option<PathBuf>,

    /// `tracing` filter directive
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            deployments: Vec::new(),
            authorization_validity_days: default_validity_days(),
            signature_cache: None,
            log_filter: default_log_filter(),
        }
    }
}

impl CoordinatorConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(document)?)
    }

    /// Read `path`, apply environment overrides and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&document)?;
        config.merge_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn merge_env(&mut self) -> Result<(), ConfigError> {
        self.merge_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup` (keys include [`ENV_PREFIX`]).
    pub fn merge_env_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(days) = lookup(&format!("{ENV_PREFIX}AUTHORIZATION_VALIDITY_DAYS")) {
            self.authorization_validity_days = days.trim().parse().map_err(|_| {
                ConfigError::invalid(format!(
                    "{ENV_PREFIX}AUTHORIZATION_VALIDITY_DAYS must be a whole number of days, got {days:?}"
                ))
            })?;
        }
        if let Some(filter) = lookup(&format!("{ENV_PREFIX}LOG_FILTER")) {
            self.log_filter = filter;
        }
        if let Some(path) = lookup(&format!("{ENV_PREFIX}SIGNATURE_CACHE")) {
            self.signature_cache = (!path.is_empty()).then(|| PathBuf::from(path));
        }
        Ok(())
    }

    /// Reject duplicate networks and out-of-range validity windows.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_VALIDITY_DAYS).contains(&self.authorization_validity_days) {
            return Err(ConfigError::invalid(format!(
                "authorization_validity_days must be between 1 and {MAX_VALIDITY_DAYS}, got {}",
                self.authorization_validity_days
            )));
        }
        let mut seen = BTreeSet::new();
        for entry in &self.deployments {
            if !seen.insert(entry.network_id) {
                return Err(ConfigError::invalid(format!(
                    "duplicate deployment for {}",
                    entry.network_id
                )));
            }
        }
        Ok(())
    }

    /// Deployment registry described by this config.
    pub fn registry(&self) -> Result<DeploymentRegistry, ConfigError> {
        DeploymentRegistry::from_entries(
            self.deployments
                .iter()
                .map(|entry| (entry.network_id, entry.address)),
        )
        .map_err(|e| ConfigError::invalid(e.to_string()))
    }

    /// Signature store: file-backed when `signature_cache` is set.
    pub fn signature_store(&self) -> Arc<dyn SignatureStore> {
        match &self.signature_cache {
            Some(path) => Arc::new(FileSignatureStore::new(path)),
            None => Arc::new(InMemorySignatureStore::new()),
        }
    }

    /// Signature manager granting the configured validity window.
    pub fn signature_manager(
        &self,
        store: Arc<dyn SignatureStore>,
        signer: Arc<dyn SignerEffects>,
        clock: Arc<dyn PhysicalTimeEffects>,
    ) -> SignatureManager {
        SignatureManager::new(store, signer, clock)
            .with_validity_days(self.authorization_validity_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use cipherwatt_testkit::{SEPOLIA, SEPOLIA_VAULT};
    use std::collections::HashMap;

    const SAMPLE: &str = r#"
authorization_validity_days = 7
log_filter = "cipherwatt_app=debug"

[[deployments]]
network_id = 11155111
address = "0x5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e"
label = "sepolia"
"#;

    #[test]
    fn test_parse_sample() {
        let config = CoordinatorConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.authorization_validity_days, 7);
        assert_eq!(config.log_filter, "cipherwatt_app=debug");
        assert_eq!(config.signature_cache, None);
        assert_eq!(config.deployments.len(), 1);
        assert_eq!(config.deployments[0].network_id, SEPOLIA);
        assert_eq!(config.deployments[0].address, SEPOLIA_VAULT);

        let registry = config.registry().unwrap();
        assert_eq!(registry.descriptor(Some(SEPOLIA)).address, Some(SEPOLIA_VAULT));
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = CoordinatorConfig::from_toml_str("").unwrap();
        assert_eq!(config, CoordinatorConfig::default());
        assert_eq!(config.authorization_validity_days, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<String, String> = [
            ("CIPHERWATT_AUTHORIZATION_VALIDITY_DAYS", "30"),
            ("CIPHERWATT_LOG_FILTER", "warn"),
            ("CIPHERWATT_SIGNATURE_CACHE", "/tmp/sigs.json"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let mut config = CoordinatorConfig::from_toml_str(SAMPLE).unwrap();
        config.merge_env_from(|key| env.get(key).cloned()).unwrap();
        assert_eq!(config.authorization_validity_days, 30);
        assert_eq!(config.log_filter, "warn");
        assert_eq!(config.signature_cache, Some(PathBuf::from("/tmp/sigs.json")));
    }

    #[test]
    fn test_bad_env_value_rejected() {
        let mut config = CoordinatorConfig::default();
        let result = config.merge_env_from(|key| {
            (key == "CIPHERWATT_AUTHORIZATION_VALIDITY_DAYS").then(|| "ten".to_string())
        });
        assert_matches!(result, Err(ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_validity_window_bounds() {
        let mut config = CoordinatorConfig::default();
        config.authorization_validity_days = 0;
        assert_matches!(config.validate(), Err(ConfigError::Invalid { .. }));
        config.authorization_validity_days = 366;
        assert_matches!(config.validate(), Err(ConfigError::Invalid { .. }));
        config.authorization_validity_days = 365;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duplicate_networks_rejected() {
        let document = format!(
            "{SAMPLE}\n[[deployments]]\nnetwork_id = 11155111\naddress = \"0x{}\"\n",
            "11".repeat(20)
        );
        let config = CoordinatorConfig::from_toml_str(&document).unwrap();
        assert_matches!(config.validate(), Err(ConfigError::Invalid { .. }));
        assert_matches!(config.registry(), Err(ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_malformed_address_is_parse_error() {
        let document = "[[deployments]]\nnetwork_id = 1\naddress = \"0x1234\"\n";
        assert_matches!(
            CoordinatorConfig::from_toml_str(document),
            Err(ConfigError::Parse(_))
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cipherwatt.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = CoordinatorConfig::load(&path).unwrap();
        assert_eq!(config.deployments.len(), 1);

        assert_matches!(
            CoordinatorConfig::load(dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        );
    }
}
