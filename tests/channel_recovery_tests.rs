//! Channel creation failures seen through the public API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fabric_bootstrap::channel::testing::{
    sample_topology, CryptoFixture, RecordingLedgerClient, StaticIdentityProvider,
};
use fabric_bootstrap::channel::{
    BootstrapError, BootstrapStep, ChannelBackend, ChannelBootstrap, ChannelConfiguration,
    ChannelState, ClientError, ClientResult, ConfigSignature, LedgerClient, NodeHandle,
};
use fabric_bootstrap::config::{EndpointProperties, Organization};

const CHANNEL: &str = "bar";

/// Delegates to a recording client, failing or stalling the first channel
/// creations.
struct FlakyChannelClient {
    inner: RecordingLedgerClient,
    attempts: AtomicUsize,
    stalled: usize,
    rejected: usize,
}

impl FlakyChannelClient {
    fn new(stalled: usize, rejected: usize) -> Self {
        Self {
            inner: RecordingLedgerClient::new(),
            attempts: AtomicUsize::new(0),
            stalled,
            rejected,
        }
    }
}

#[async_trait]
impl LedgerClient for FlakyChannelClient {
    async fn new_orderer(
        &self,
        name: &str,
        location: &str,
        properties: EndpointProperties,
    ) -> ClientResult<NodeHandle> {
        self.inner.new_orderer(name, location, properties).await
    }

    async fn new_peer(
        &self,
        name: &str,
        location: &str,
        properties: EndpointProperties,
    ) -> ClientResult<NodeHandle> {
        self.inner.new_peer(name, location, properties).await
    }

    async fn new_event_hub(
        &self,
        name: &str,
        location: &str,
        properties: EndpointProperties,
    ) -> ClientResult<NodeHandle> {
        self.inner.new_event_hub(name, location, properties).await
    }

    async fn new_channel(
        &self,
        name: &str,
        anchor: &NodeHandle,
        configuration: &ChannelConfiguration,
        signature: &ConfigSignature,
    ) -> ClientResult<Box<dyn ChannelBackend>> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.stalled {
            tokio::time::sleep(Duration::from_secs(5)).await;
        } else if attempt < self.stalled + self.rejected {
            return Err(ClientError::rejected(anchor.name(), "channel already exists"));
        }
        self.inner
            .new_channel(name, anchor, configuration, signature)
            .await
    }
}

fn setup() -> (CryptoFixture, Arc<Organization>) {
    let topology = sample_topology();
    let organization = Arc::clone(topology.organization("peerOrg1").unwrap());
    let fixture = CryptoFixture::new();
    fixture.add_organization(&organization);
    fixture.add_genesis(CHANNEL);
    organization
        .set_peer_admin(fixture.peer_admin(&organization))
        .unwrap();
    (fixture, organization)
}

#[tokio::test]
async fn test_rejected_channel_creation_fails_join_step() {
    let (fixture, organization) = setup();
    let mut bootstrap = ChannelBootstrap::new(
        CHANNEL,
        fixture.bootstrap_config(),
        organization,
        Arc::new(FlakyChannelClient::new(0, 1)),
        Arc::new(StaticIdentityProvider::new()),
    );

    let err = bootstrap.run().await.unwrap_err();
    match err {
        BootstrapError::Remote {
            step,
            target,
            source,
            ..
        } => {
            assert_eq!(step, BootstrapStep::JoinPeers);
            assert_eq!(target, "orderer.example.com");
            assert!(matches!(source, ClientError::Rejected { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(matches!(
        bootstrap.state(),
        ChannelState::Failed {
            step: BootstrapStep::JoinPeers,
            ..
        }
    ));
    assert!(bootstrap.channel().joined_peers().is_empty());
    assert!(!bootstrap.channel().is_created());
}

#[tokio::test]
async fn test_stalled_channel_creation_can_be_retried() {
    let (fixture, organization) = setup();
    let mut bootstrap = ChannelBootstrap::new(
        CHANNEL,
        fixture
            .bootstrap_config()
            .with_operation_timeout(Duration::from_millis(100)),
        organization,
        Arc::new(FlakyChannelClient::new(1, 0)),
        Arc::new(StaticIdentityProvider::new()),
    );

    bootstrap.select_anchor().await.unwrap();
    bootstrap.sign_genesis().await.unwrap();

    let err = bootstrap.join_peers().await.unwrap_err();
    assert!(matches!(
        err,
        BootstrapError::Timeout {
            step: BootstrapStep::JoinPeers,
            ..
        }
    ));
    assert_eq!(bootstrap.state(), &ChannelState::GenesisSigned);

    bootstrap.join_peers().await.unwrap();
    bootstrap.attach_orderers().await.unwrap();
    bootstrap.attach_event_hubs().await.unwrap();
    bootstrap.initialize().await.unwrap();
    assert_eq!(bootstrap.state(), &ChannelState::Initialized);
    assert_eq!(bootstrap.channel().joined_peers().len(), 2);
}

#[tokio::test]
async fn test_missing_genesis_artifact() {
    let (fixture, organization) = setup();
    let config = fixture
        .bootstrap_config()
        .with_channel_artifacts_path(fixture.root().join("missing"));
    let mut bootstrap = ChannelBootstrap::new(
        CHANNEL,
        config,
        organization,
        Arc::new(RecordingLedgerClient::new()),
        Arc::new(StaticIdentityProvider::new()),
    );

    bootstrap.select_anchor().await.unwrap();
    assert!(matches!(
        bootstrap.sign_genesis().await,
        Err(BootstrapError::Genesis { .. })
    ));
    assert!(bootstrap.state().is_failed());
}
