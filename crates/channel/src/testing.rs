//! In-memory capabilities and filesystem fixtures for tests.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fabric_config::{
    EndpointProperties, Enrollment, NodeKind, Organization, Properties, Topology, User,
};
use parking_lot::Mutex;
use tempfile::TempDir;

use crate::client::{
    CaEndpoint, CaInfo, ChannelBackend, ChannelConfiguration, ConfigSignature, IdentityProvider,
    LedgerClient, NodeHandle,
};
use crate::config::BootstrapConfig;
use crate::error::{ClientError, ClientResult};

/// The compiled-in two organization topology, ignoring the process environment.
pub fn sample_topology() -> Topology {
    topology_with(&[])
}

/// The compiled-in topology with `overrides` applied.
pub fn topology_with(overrides: &[(String, &str)]) -> Topology {
    let properties = Properties::builder()
        .with_environment(HashMap::new())
        .with_overrides(overrides.iter().map(|(key, value)| (key.clone(), *value)))
        .with_compiled_defaults()
        .build();
    Topology::build(&properties).expect("sample topology")
}

/// Crypto material and channel artifacts in a temporary directory.
pub struct CryptoFixture {
    dir: TempDir,
}

impl Default for CryptoFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl CryptoFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("temporary directory"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn crypto_path(&self) -> PathBuf {
        self.root().join("crypto-config")
    }

    pub fn artifacts_path(&self) -> PathBuf {
        self.root().join("channel-artifacts")
    }

    pub fn crypto_material(&self) -> fabric_config::CryptoMaterial {
        fabric_config::CryptoMaterial::new(self.crypto_path())
    }

    /// Configuration pointing at this fixture.
    pub fn bootstrap_config(&self) -> BootstrapConfig {
        BootstrapConfig::new()
            .with_channel_artifacts_path(self.artifacts_path())
            .with_crypto_config_path(self.crypto_path())
            .with_operation_timeout(Duration::from_secs(5))
    }

    pub fn add_tls_certificate(&self, kind: NodeKind, node: &str) -> PathBuf {
        let path = self
            .crypto_material()
            .tls_certificate_path(kind, node)
            .expect("node name with domain");
        write(&path, format!("TLS certificate of {node}"));
        path
    }

    pub fn remove_tls_certificate(&self, kind: NodeKind, node: &str) {
        let path = self
            .crypto_material()
            .tls_certificate_path(kind, node)
            .expect("node name with domain");
        fs::remove_file(path).expect("remove certificate");
    }

    /// Writes the peer admin key and signing certificate of `domain`.
    pub fn add_peer_admin(&self, domain: &str) {
        let crypto = self.crypto_material();
        let msp = crypto.peer_admin_msp_dir(domain);
        write(&msp.join("keystore").join("0001_sk"), format!("key of {domain}"));
        write(
            &crypto.peer_admin_certificate_path(domain),
            format!("certificate of {domain}"),
        );
    }

    /// Certificates for every node of `organization` and its peer admin.
    pub fn add_organization(&self, organization: &Organization) {
        for peer in organization.peers() {
            self.add_tls_certificate(NodeKind::Peer, peer.name());
        }
        for orderer in organization.orderers() {
            self.add_tls_certificate(NodeKind::Orderer, orderer.name());
        }
        for event_hub in organization.event_hubs() {
            self.add_tls_certificate(NodeKind::EventHub, event_hub.name());
        }
        if let Some(domain) = organization.domain_name() {
            self.add_peer_admin(domain);
        }
    }

    /// Loads the peer admin written by [`CryptoFixture::add_organization`].
    pub fn peer_admin(&self, organization: &Organization) -> User {
        self.crypto_material()
            .load_peer_admin(organization)
            .expect("peer admin material")
    }

    pub fn add_genesis(&self, channel: &str) -> PathBuf {
        let path = self.bootstrap_config().genesis_path(channel);
        write(&path, format!("genesis of {channel}"));
        path
    }
}

fn write(path: &Path, contents: String) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture directory");
    }
    fs::write(path, contents).expect("write fixture file");
}

/// Identity provider returning canned enrollments and signatures.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    ca_name: Option<String>,
    enrollments: Arc<AtomicUsize>,
}

impl StaticIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name reported by every CA.
    pub fn with_ca_name<S: Into<String>>(mut self, name: S) -> Self {
        self.ca_name = Some(name.into());
        self
    }

    /// Number of enrollments performed.
    pub fn enrollments(&self) -> usize {
        self.enrollments.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn ca_info(&self, _ca: &CaEndpoint) -> ClientResult<CaInfo> {
        Ok(CaInfo {
            ca_name: self.ca_name.clone(),
        })
    }

    async fn enroll(&self, ca: &CaEndpoint, name: &str, secret: &str) -> ClientResult<Enrollment> {
        if secret.is_empty() {
            return Err(ClientError::rejected(&ca.location, "empty secret"));
        }
        self.enrollments.fetch_add(1, Ordering::SeqCst);
        Ok(Enrollment::new(
            format!("key of {name}"),
            format!("certificate of {name} from {}", ca.location),
        ))
    }

    async fn sign(
        &self,
        configuration: &ChannelConfiguration,
        signer: &User,
    ) -> ClientResult<ConfigSignature> {
        let mut bytes = signer.name().as_bytes().to_vec();
        bytes.extend_from_slice(configuration.as_bytes());
        Ok(ConfigSignature::new(signer.name(), bytes))
    }
}

/// Ledger client that records every call in a shared log.
#[derive(Debug, Clone, Default)]
pub struct RecordingLedgerClient {
    log: Arc<Mutex<Vec<String>>>,
    rejected: HashSet<String>,
    stalled: Arc<Mutex<HashMap<String, Duration>>>,
    initialize_delay: Option<Duration>,
}

impl RecordingLedgerClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects joins and attachments of the node `name`.
    pub fn with_rejected<S: Into<String>>(mut self, name: S) -> Self {
        self.rejected.insert(name.into());
        self
    }

    /// Delays the first attachment of the node `name` by `delay`. Later
    /// attachments of the same node go through immediately.
    pub fn with_stalled_attach<S: Into<String>>(self, name: S, delay: Duration) -> Self {
        self.stalled.lock().insert(name.into(), delay);
        self
    }

    /// Delays channel initialization.
    pub fn with_initialize_delay(mut self, delay: Duration) -> Self {
        self.initialize_delay = Some(delay);
        self
    }

    pub fn events(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    /// Number of logged events equal to `event`.
    pub fn count(&self, event: &str) -> usize {
        self.log.lock().iter().filter(|logged| *logged == event).count()
    }

    fn record(&self, event: String) {
        self.log.lock().push(event);
    }
}

#[async_trait]
impl LedgerClient for RecordingLedgerClient {
    async fn new_orderer(
        &self,
        name: &str,
        location: &str,
        properties: EndpointProperties,
    ) -> ClientResult<NodeHandle> {
        self.record(format!("orderer:{name}"));
        Ok(NodeHandle::new(NodeKind::Orderer, name, location, properties))
    }

    async fn new_peer(
        &self,
        name: &str,
        location: &str,
        properties: EndpointProperties,
    ) -> ClientResult<NodeHandle> {
        self.record(format!("peer:{name}"));
        Ok(NodeHandle::new(NodeKind::Peer, name, location, properties))
    }

    async fn new_event_hub(
        &self,
        name: &str,
        location: &str,
        properties: EndpointProperties,
    ) -> ClientResult<NodeHandle> {
        self.record(format!("event_hub:{name}"));
        Ok(NodeHandle::new(NodeKind::EventHub, name, location, properties))
    }

    async fn new_channel(
        &self,
        name: &str,
        anchor: &NodeHandle,
        _configuration: &ChannelConfiguration,
        _signature: &ConfigSignature,
    ) -> ClientResult<Box<dyn ChannelBackend>> {
        self.record(format!("channel:{name}@{}", anchor.name()));
        Ok(Box::new(RecordingChannel {
            client: self.clone(),
        }))
    }
}

struct RecordingChannel {
    client: RecordingLedgerClient,
}

impl RecordingChannel {
    async fn accept(&self, event: &str, node: &NodeHandle) -> ClientResult<()> {
        let stall = self.client.stalled.lock().remove(node.name());
        if let Some(delay) = stall {
            tokio::time::sleep(delay).await;
        }
        if self.client.rejected.contains(node.name()) {
            return Err(ClientError::rejected(node.name(), format!("{event} refused")));
        }
        self.client.record(format!("{event}:{}", node.name()));
        Ok(())
    }
}

#[async_trait]
impl ChannelBackend for RecordingChannel {
    async fn join_peer(&mut self, peer: &NodeHandle) -> ClientResult<()> {
        self.accept("join", peer).await
    }

    async fn add_orderer(&mut self, orderer: &NodeHandle) -> ClientResult<()> {
        self.accept("add_orderer", orderer).await
    }

    async fn add_event_hub(&mut self, event_hub: &NodeHandle) -> ClientResult<()> {
        self.accept("add_event_hub", event_hub).await
    }

    async fn initialize(&mut self) -> ClientResult<()> {
        if let Some(delay) = self.client.initialize_delay {
            tokio::time::sleep(delay).await;
        }
        self.client.record("initialize".to_string());
        Ok(())
    }

    async fn shutdown(&mut self, force: bool) -> ClientResult<()> {
        self.client.record(format!("shutdown:{force}"));
        Ok(())
    }
}
