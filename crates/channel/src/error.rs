//! Error types for enrollment and channel bootstrap.

use std::path::PathBuf;
use std::time::Duration;

use fabric_config::ConfigError;
use thiserror::Error;

use crate::state::{BootstrapStep, ChannelState};

/// Failure reported by a ledger client or identity provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The endpoint could not be reached.
    #[error("Connection to {endpoint} failed: {message}")]
    ConnectionFailed {
        /// Endpoint name or location.
        endpoint: String,
        /// Error message.
        message: String,
    },

    /// The remote side rejected the request.
    #[error("Rejected by {endpoint}: {message}")]
    Rejected {
        /// Endpoint name or location.
        endpoint: String,
        /// Error message.
        message: String,
    },

    /// Invalid argument passed to the client.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ClientError {
    /// Create a connection failed error.
    pub fn connection_failed<E: Into<String>, M: Into<String>>(endpoint: E, message: M) -> Self {
        Self::ConnectionFailed {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a rejection error.
    pub fn rejected<E: Into<String>, M: Into<String>>(endpoint: E, message: M) -> Self {
        Self::Rejected {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }
}

/// Result type for client capabilities.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Errors raised while enrolling organizations or bootstrapping a channel.
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// Missing or malformed configuration, including missing certificates.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The organization has no ordering node to anchor the channel.
    #[error("Organization {organization} has no ordering nodes configured")]
    NoOrderers { organization: String },

    /// A remote operation failed.
    #[error("{step} failed for {organization} at {target}: {source}")]
    Remote {
        step: BootstrapStep,
        organization: String,
        /// Node, CA or channel the operation addressed.
        target: String,
        source: ClientError,
    },

    /// A remote operation did not finish in time.
    #[error("{step} timed out after {timeout:?} for {organization} at {target}")]
    Timeout {
        step: BootstrapStep,
        organization: String,
        target: String,
        timeout: Duration,
    },

    /// The genesis configuration artifact could not be read.
    #[error("Cannot read genesis configuration {}: {source}", .path.display())]
    Genesis {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An identity slot required by the step is empty.
    #[error("Organization {organization} has no {slot} identity")]
    MissingIdentity {
        organization: String,
        slot: &'static str,
    },

    /// The CA reported a different name than configured.
    #[error("CA of {organization} reports name {reported}, configured {configured:?}")]
    CaNameMismatch {
        organization: String,
        configured: Option<String>,
        reported: String,
    },

    /// Some peers failed to join; the others stay joined.
    #[error("{} of {attempted} peers failed to join channel {channel}: {}", .failed.len(), .failed.join(", "))]
    PeersFailed {
        channel: String,
        attempted: usize,
        failed: Vec<String>,
    },

    /// A background derivation task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A step was invoked from the wrong state.
    #[error("Cannot {step} channel {channel} while it is {state}")]
    InvalidTransition {
        channel: String,
        step: BootstrapStep,
        state: ChannelState,
    },
}

/// Result type for bootstrap operations.
pub type BootstrapResult<T> = std::result::Result<T, BootstrapError>;
