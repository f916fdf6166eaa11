//! A channel under construction and its membership.

use std::fmt;
use std::time::Duration;

use tracing::{debug, info};

use crate::bootstrap::bounded;
use crate::client::{ChannelBackend, NodeHandle};
use crate::error::{BootstrapError, BootstrapResult};
use crate::state::{BootstrapStep, ChannelState};

/// A peer that could not be joined, with the reason.
#[derive(Debug)]
pub struct PeerFailure {
    pub name: String,
    pub error: BootstrapError,
}

/// Channel state and membership.
///
/// Joined peers are never rolled back when a later peer fails; the failures
/// are kept next to them so the caller can retry selectively.
pub struct Channel {
    pub(crate) name: String,
    pub(crate) organization: String,
    pub(crate) state: ChannelState,
    pub(crate) anchor: Option<NodeHandle>,
    pub(crate) orderers: Vec<NodeHandle>,
    pub(crate) joined_peers: Vec<NodeHandle>,
    pub(crate) failed_peers: Vec<PeerFailure>,
    pub(crate) event_hubs: Vec<NodeHandle>,
    pub(crate) backend: Option<Box<dyn ChannelBackend>>,
}

impl Channel {
    pub(crate) fn new<N: Into<String>, O: Into<String>>(name: N, organization: O) -> Self {
        Self {
            name: name.into(),
            organization: organization.into(),
            state: ChannelState::Created,
            anchor: None,
            orderers: Vec::new(),
            joined_peers: Vec::new(),
            failed_peers: Vec::new(),
            event_hubs: Vec::new(),
            backend: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the organization the channel was bootstrapped for.
    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn state(&self) -> &ChannelState {
        &self.state
    }

    /// The ordering node the channel was created on.
    pub fn anchor(&self) -> Option<&NodeHandle> {
        self.anchor.as_ref()
    }

    /// Ordering nodes attached after creation, excluding the anchor.
    pub fn orderers(&self) -> &[NodeHandle] {
        &self.orderers
    }

    pub fn joined_peers(&self) -> &[NodeHandle] {
        &self.joined_peers
    }

    pub fn failed_peers(&self) -> &[PeerFailure] {
        &self.failed_peers
    }

    pub fn event_hubs(&self) -> &[NodeHandle] {
        &self.event_hubs
    }

    /// Whether the channel exists on the ordering service.
    pub fn is_created(&self) -> bool {
        self.backend.is_some()
    }

    /// Tears the channel down and releases every node handle.
    ///
    /// Shutting down twice is a no-op. The channel ends up shut down even
    /// when the backend reports an error, which is then returned.
    pub async fn shutdown(&mut self, force: bool, timeout: Duration) -> BootstrapResult<()> {
        if self.state == ChannelState::ShutDown {
            debug!("Channel {} already shut down", self.name);
            return Ok(());
        }

        let outcome = match self.backend.take() {
            Some(mut backend) => {
                bounded(
                    timeout,
                    BootstrapStep::Shutdown,
                    &self.organization,
                    &self.name,
                    backend.shutdown(force),
                )
                .await
            }
            None => Ok(()),
        };

        self.anchor = None;
        self.orderers.clear();
        self.joined_peers.clear();
        self.event_hubs.clear();
        self.state = ChannelState::ShutDown;
        info!("Channel {} shut down (force: {})", self.name, force);
        outcome
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("organization", &self.organization)
            .field("state", &self.state)
            .field("anchor", &self.anchor.as_ref().map(NodeHandle::name))
            .field("orderers", &self.orderers.len())
            .field("joined_peers", &self.joined_peers.len())
            .field("failed_peers", &self.failed_peers.len())
            .field("event_hubs", &self.event_hubs.len())
            .field("created", &self.is_created())
            .finish()
    }
}
