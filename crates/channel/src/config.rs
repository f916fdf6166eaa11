//! Bootstrap configuration.

use std::path::PathBuf;
use std::time::Duration;

use fabric_config::{CryptoMaterial, Settings};
use serde::{Deserialize, Serialize};

/// Default directory holding `<channel>.tx` genesis artifacts.
pub const DEFAULT_CHANNEL_ARTIFACTS_PATH: &str = "fixture/sdkintegration/e2e-2Orgs/channel";

/// Default root of the crypto material tree.
pub const DEFAULT_CRYPTO_CONFIG_PATH: &str =
    "fixture/sdkintegration/e2e-2Orgs/channel/crypto-config";

/// Default bound on a single network operation.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Channel bootstrap configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Directory holding the genesis configuration artifacts
    pub channel_artifacts_path: PathBuf,

    /// Root of the crypto material tree
    pub crypto_config_path: PathBuf,

    /// Bound on each network-facing operation
    pub operation_timeout: Duration,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            channel_artifacts_path: PathBuf::from(DEFAULT_CHANNEL_ARTIFACTS_PATH),
            crypto_config_path: PathBuf::from(DEFAULT_CRYPTO_CONFIG_PATH),
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

impl BootstrapConfig {
    /// Creates a configuration with default paths and timeout
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration whose operation timeout is the proposal wait time
    pub fn from_settings(settings: &Settings) -> Self {
        Self::default().with_operation_timeout(settings.proposal_wait_time)
    }

    /// Sets the channel artifacts directory
    pub fn with_channel_artifacts_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.channel_artifacts_path = path.into();
        self
    }

    /// Sets the crypto material root
    pub fn with_crypto_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.crypto_config_path = path.into();
        self
    }

    /// Sets the operation timeout
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Path of the genesis artifact of `channel`.
    pub fn genesis_path(&self, channel: &str) -> PathBuf {
        self.channel_artifacts_path.join(format!("{channel}.tx"))
    }

    pub fn crypto_material(&self) -> CryptoMaterial {
        CryptoMaterial::new(self.crypto_config_path.clone())
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.channel_artifacts_path.as_os_str().is_empty() {
            return Err("channel_artifacts_path must not be empty".to_string());
        }

        if self.crypto_config_path.as_os_str().is_empty() {
            return Err("crypto_config_path must not be empty".to_string());
        }

        if self.operation_timeout.is_zero() {
            return Err("operation_timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}
