//! External capabilities used by the bootstrap.
//!
//! The ledger client talks to peers, orderers and event hubs; the identity
//! provider talks to certificate authorities and signs on behalf of users.
//! Neither the wire protocol nor key handling lives in this crate.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fabric_config::{
    ConfigError, ConfigResult, EndpointProperties, Enrollment, NodeKind, Organization, User,
};

use crate::error::ClientResult;

/// A node handle created by a [`LedgerClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeHandle {
    kind: NodeKind,
    name: String,
    location: String,
    properties: EndpointProperties,
}

impl NodeHandle {
    pub fn new<N: Into<String>, L: Into<String>>(
        kind: NodeKind,
        name: N,
        location: L,
        properties: EndpointProperties,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            location: location.into(),
            properties,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn properties(&self) -> &EndpointProperties {
        &self.properties
    }
}

/// Genesis configuration artifact of a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfiguration {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl ChannelConfiguration {
    /// Reads the artifact at `path`.
    pub async fn load<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self {
            path: path.to_path_buf(),
            bytes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// A signature over a channel configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSignature {
    signer: String,
    bytes: Vec<u8>,
}

impl ConfigSignature {
    pub fn new<S: Into<String>>(signer: S, bytes: Vec<u8>) -> Self {
        Self {
            signer: signer.into(),
            bytes,
        }
    }

    /// Name of the signing user.
    pub fn signer(&self) -> &str {
        &self.signer
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Certificate authority of an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaEndpoint {
    pub location: String,
    pub name: Option<String>,
}

impl CaEndpoint {
    /// The CA configured for `organization`.
    pub fn for_organization(organization: &Organization) -> ConfigResult<Self> {
        let location = organization.ca_location().ok_or_else(|| {
            ConfigError::MissingCompanion {
                organization: organization.name().to_string(),
                key: fabric_config::defaults::org_key(
                    organization.name(),
                    fabric_config::defaults::CA_LOCATION,
                ),
            }
        })?;
        Ok(Self {
            location: location.to_string(),
            name: organization.ca_name().map(str::to_string),
        })
    }
}

/// Information a CA reports about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaInfo {
    pub ca_name: Option<String>,
}

/// Enrollment and signing, backed by certificate authorities.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Queries the CA, confirming it is reachable.
    async fn ca_info(&self, ca: &CaEndpoint) -> ClientResult<CaInfo>;

    /// Enrolls `name` with `secret`.
    async fn enroll(&self, ca: &CaEndpoint, name: &str, secret: &str) -> ClientResult<Enrollment>;

    /// Signs a channel configuration as `signer`.
    async fn sign(
        &self,
        configuration: &ChannelConfiguration,
        signer: &User,
    ) -> ClientResult<ConfigSignature>;
}

/// Factory for node handles and channels.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn new_orderer(
        &self,
        name: &str,
        location: &str,
        properties: EndpointProperties,
    ) -> ClientResult<NodeHandle>;

    async fn new_peer(
        &self,
        name: &str,
        location: &str,
        properties: EndpointProperties,
    ) -> ClientResult<NodeHandle>;

    async fn new_event_hub(
        &self,
        name: &str,
        location: &str,
        properties: EndpointProperties,
    ) -> ClientResult<NodeHandle>;

    /// Creates `name` on the `anchor` ordering node.
    async fn new_channel(
        &self,
        name: &str,
        anchor: &NodeHandle,
        configuration: &ChannelConfiguration,
        signature: &ConfigSignature,
    ) -> ClientResult<Box<dyn ChannelBackend>>;
}

/// A created channel as seen by the ledger client.
#[async_trait]
pub trait ChannelBackend: Send + Sync {
    async fn join_peer(&mut self, peer: &NodeHandle) -> ClientResult<()>;

    async fn add_orderer(&mut self, orderer: &NodeHandle) -> ClientResult<()>;

    async fn add_event_hub(&mut self, event_hub: &NodeHandle) -> ClientResult<()>;

    /// Starts configuration discovery; the channel is usable afterwards.
    async fn initialize(&mut self) -> ClientResult<()>;

    /// Releases every node handle. With `force` in-flight work is abandoned.
    async fn shutdown(&mut self, force: bool) -> ClientResult<()>;
}
