//! Endpoint list parsing, location validation and TLS scheme rewriting.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ConfigError, ConfigResult};

/// Kind of network node an endpoint points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Peer hosting ledger state.
    Peer,
    /// Ordering node.
    Orderer,
    /// Event hub; hosted by a peer node.
    EventHub,
}

impl NodeKind {
    /// Crypto-material directory holding organizations of this node kind.
    pub const fn organizations_dir(&self) -> &'static str {
        match self {
            Self::Orderer => "ordererOrganizations",
            Self::Peer | Self::EventHub => "peerOrganizations",
        }
    }

    /// Per-organization directory holding nodes of this kind.
    pub const fn nodes_dir(&self) -> &'static str {
        match self {
            Self::Orderer => "orderers",
            Self::Peer | Self::EventHub => "peers",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Peer => write!(f, "peer"),
            Self::Orderer => write!(f, "orderer"),
            Self::EventHub => write!(f, "event hub"),
        }
    }
}

/// A named endpoint parsed from a `name@location` entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointRecord {
    name: String,
    location: String,
}

impl EndpointRecord {
    /// Creates a record.
    pub fn new<N: Into<String>, L: Into<String>>(name: N, location: L) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }

    /// Endpoint name, e.g. `peer0.org1.example.com`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Endpoint location, e.g. `grpc://localhost:7051`.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Domain embedded in the name, if any.
    pub fn domain(&self) -> Option<&str> {
        domain_of(&self.name)
    }
}

fn domain_of(name: &str) -> Option<&str> {
    name.split_once('.')
        .map(|(_, domain)| domain)
        .filter(|domain| !domain.is_empty())
}

/// Domain of a node: everything after the first `.` of its name.
///
/// `peer0.org1.example.com` yields `org1.example.com`; `peer0` is an error.
pub fn derive_domain(node: &str) -> ConfigResult<&str> {
    domain_of(node).ok_or_else(|| ConfigError::MissingDomain {
        node: node.to_string(),
    })
}

/// Parses a comma separated list of `name@location` entries.
///
/// Whitespace around separators is ignored. An empty list yields no records;
/// any entry that does not split into exactly two non-empty parts is an error.
pub fn parse_endpoint_list(raw: &str) -> ConfigResult<Vec<EndpointRecord>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    raw.split(',')
        .map(str::trim)
        .map(|entry| {
            let parts: Vec<&str> = entry.split('@').map(str::trim).collect();
            match parts.as_slice() {
                [name, location] if !name.is_empty() && !location.is_empty() => {
                    Ok(EndpointRecord::new(*name, *location))
                }
                _ => Err(ConfigError::MalformedEndpoint {
                    entry: entry.to_string(),
                }),
            }
        })
        .collect()
}

const GRPC: &str = "grpc://";
const GRPCS: &str = "grpcs://";
const HTTP: &str = "http://";
const HTTPS: &str = "https://";

/// Rewrites a node location from `grpc://` to `grpcs://` when `secure` is
/// set. Any other location is returned unchanged.
pub fn secure_grpc_location(location: &str, secure: bool) -> String {
    upgrade_scheme(location, secure, GRPC, GRPCS)
}

/// Rewrites a CA location from `http://` to `https://` when `secure` is set.
/// Any other location is returned unchanged.
pub fn secure_http_location(location: &str, secure: bool) -> String {
    upgrade_scheme(location, secure, HTTP, HTTPS)
}

fn upgrade_scheme(location: &str, secure: bool, plain: &str, tls: &str) -> String {
    let location = location.trim();
    match location.strip_prefix(plain) {
        Some(rest) if secure => format!("{tls}{rest}"),
        _ => location.to_string(),
    }
}

/// Checks that `location` is a `grpc://` or `grpcs://` URL with host and port.
pub fn validate_grpc_location(location: &str) -> ConfigResult<()> {
    let url = Url::parse(location.trim())
        .map_err(|e| ConfigError::invalid_location(location, e.to_string()))?;

    if !matches!(url.scheme(), "grpc" | "grpcs") {
        return Err(ConfigError::invalid_location(
            location,
            format!("unsupported scheme '{}', expected grpc or grpcs", url.scheme()),
        ));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::invalid_location(location, "missing host"));
    }
    if url.port().is_none() {
        return Err(ConfigError::invalid_location(location, "missing port"));
    }
    Ok(())
}
