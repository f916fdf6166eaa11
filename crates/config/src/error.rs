//! Error types for configuration and topology resolution.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while resolving configuration into a topology.
///
/// Every variant is fatal to the step that raised it and names the exact
/// key, entry, node or path involved.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required key has no override, environment value or default.
    #[error("Missing required configuration: {key}")]
    MissingProperty {
        /// Fully qualified property key.
        key: String,
    },

    /// An endpoint list entry is not of the form `name@location`.
    #[error("Malformed endpoint entry '{entry}': expected name@location")]
    MalformedEndpoint {
        /// The offending list entry.
        entry: String,
    },

    /// The same endpoint name appears twice in one list.
    #[error("Duplicate endpoint name '{name}' in {key}")]
    DuplicateEndpoint {
        /// Property key holding the list.
        key: String,
        /// Repeated endpoint name.
        name: String,
    },

    /// An organization declared by its MSP id lacks a mandatory companion key.
    #[error("Organization {organization} is missing required configuration {key}")]
    MissingCompanion {
        /// Organization name.
        organization: String,
        /// Missing property key.
        key: String,
    },

    /// A node location is not a usable gRPC URL.
    #[error("Bad location {location}: {reason}")]
    InvalidLocation {
        /// The rejected location.
        location: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A value could not be interpreted for its key.
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue {
        /// Property key.
        key: String,
        /// Raw value.
        value: String,
    },

    /// A node name carries no domain suffix.
    #[error("Node name '{node}' does not embed a domain")]
    MissingDomain {
        /// Node name.
        node: String,
    },

    /// The TLS server certificate of a node does not exist.
    #[error("Missing cert file for: {node}. Could not find at location: {}", .path.display())]
    MissingCertificate {
        /// Node name.
        node: String,
        /// Absolute path probed.
        path: PathBuf,
    },

    /// Key or certificate material for an identity is missing.
    #[error("Missing key material at {}", .path.display())]
    MissingKeyMaterial {
        /// Path probed.
        path: PathBuf,
    },

    /// More than one private key candidate was found.
    #[error("Expected exactly one private key in {}, found {count}", .path.display())]
    AmbiguousKeyMaterial {
        /// Keystore directory.
        path: PathBuf,
        /// Number of candidates.
        count: usize,
    },

    /// No organization with this name is configured.
    #[error("Unknown organization: {0}")]
    UnknownOrganization(String),

    /// An identity slot of an organization was already filled.
    #[error("Organization {organization} already has a {slot} identity")]
    IdentityAlreadySet {
        /// Organization name.
        organization: String,
        /// Slot name (`admin` or `peer admin`).
        slot: &'static str,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Create a missing property error.
    pub fn missing_property<S: Into<String>>(key: S) -> Self {
        Self::MissingProperty { key: key.into() }
    }

    /// Create an invalid location error.
    pub fn invalid_location<L: Into<String>, R: Into<String>>(location: L, reason: R) -> Self {
        Self::InvalidLocation {
            location: location.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
