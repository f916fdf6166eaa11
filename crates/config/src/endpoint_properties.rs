//! Per-node connection properties.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::endpoint::NodeKind;
use crate::{ConfigResult, CryptoMaterial, Organization};

/// Keep-alive interval for long lived orderer and event hub connections.
pub const KEEP_ALIVE_TIME: Duration = Duration::from_secs(5 * 60);
/// Keep-alive acknowledgement timeout.
pub const KEEP_ALIVE_TIMEOUT: Duration = Duration::from_secs(8);
/// Largest inbound message accepted from a peer, in bytes.
pub const MAX_INBOUND_MESSAGE_SIZE: usize = 9_000_000;

/// TLS implementation backing a connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SslProvider {
    #[default]
    OpenSsl,
}

/// Transport negotiation mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NegotiationType {
    #[default]
    Tls,
}

/// Channel-builder options applied to the underlying gRPC transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportOptions {
    pub keep_alive_time: Option<Duration>,
    pub keep_alive_timeout: Option<Duration>,
    pub max_inbound_message_size: Option<usize>,
}

impl TransportOptions {
    /// Keep-alive settings used for orderers and event hubs.
    pub fn keep_alive() -> Self {
        Self {
            keep_alive_time: Some(KEEP_ALIVE_TIME),
            keep_alive_timeout: Some(KEEP_ALIVE_TIMEOUT),
            max_inbound_message_size: None,
        }
    }

    /// Settings used for peers.
    pub fn peer() -> Self {
        Self::default().with_max_inbound_message_size(MAX_INBOUND_MESSAGE_SIZE)
    }

    pub fn with_max_inbound_message_size(mut self, size: usize) -> Self {
        self.max_inbound_message_size = Some(size);
        self
    }
}

/// Connection properties of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointProperties {
    /// Absolute path of the node's TLS server certificate.
    pub pem_file: PathBuf,

    /// Trust the server certificate without chain validation.
    pub trust_server_certificate: bool,

    /// Host name expected in the server certificate.
    pub hostname_override: String,

    pub ssl_provider: SslProvider,

    pub negotiation_type: NegotiationType,

    pub transport: TransportOptions,
}

impl EndpointProperties {
    /// Derives the properties of `node`, owned by `organization`.
    ///
    /// The certificate is looked up under `crypto` by the domain embedded in
    /// the node name; a missing certificate is an error. Event hubs use the
    /// peer layout.
    pub fn build(
        kind: NodeKind,
        node: &str,
        organization: &Organization,
        crypto: &CryptoMaterial,
    ) -> ConfigResult<Self> {
        let pem_file = crypto.tls_certificate(kind, node)?;
        debug!(
            organization = organization.name(),
            node,
            %kind,
            pem = %pem_file.display(),
            "endpoint properties derived"
        );

        Ok(Self {
            pem_file,
            trust_server_certificate: true,
            hostname_override: node.to_string(),
            ssl_provider: SslProvider::OpenSsl,
            negotiation_type: NegotiationType::Tls,
            transport: TransportOptions::default(),
        })
    }

    /// Replaces the transport options.
    pub fn with_transport(mut self, transport: TransportOptions) -> Self {
        self.transport = transport;
        self
    }
}
