//! Typed view of the global settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::defaults::{DEPLOY_WAIT_TIME, INVOKE_WAIT_TIME, PROPOSAL_WAIT_TIME, TLS_FLAG};
use crate::{ConfigError, ConfigResult, Properties};

/// Wait times and the TLS flag, resolved once from [`Properties`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// How long to wait for an invoked transaction.
    pub invoke_wait_time: Duration,

    /// How long to wait for a chaincode deployment.
    pub deploy_wait_time: Duration,

    /// How long to wait for a proposal response.
    pub proposal_wait_time: Duration,

    /// Whether every node and CA endpoint uses TLS.
    pub tls_enabled: bool,
}

impl Settings {
    /// Reads settings from a property snapshot.
    pub fn from_properties(properties: &Properties) -> ConfigResult<Self> {
        Ok(Self {
            invoke_wait_time: wait_time(properties, INVOKE_WAIT_TIME)?,
            deploy_wait_time: wait_time(properties, DEPLOY_WAIT_TIME)?,
            proposal_wait_time: wait_time(properties, PROPOSAL_WAIT_TIME)?,
            tls_enabled: tls_enabled(properties),
        })
    }
}

fn wait_time(properties: &Properties, key: &str) -> ConfigResult<Duration> {
    let raw = properties
        .probe(key)
        .ok_or_else(|| ConfigError::missing_property(key))?;
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        })
}

/// Whether the global TLS flag is set.
///
/// Presence of the key enables TLS whatever its value, so `false` enables it
/// too.
pub fn tls_enabled(properties: &Properties) -> bool {
    properties.contains_key(TLS_FLAG)
}
