//! # fabric-bootstrap: Fabric network topology and channel bootstrap
//!
//! Resolves a multi-organization Hyperledger Fabric test network from layered
//! configuration and brings channels up on it.
//!
//! This library provides:
//! - Layered properties (overrides, environment variables, compiled defaults)
//! - Organization discovery with validated peer, orderer and event hub endpoints
//! - TLS connection properties derived from the crypto material tree
//! - Admin and peer admin enrollment per organization
//! - A channel bootstrap state machine with partial-success reporting
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use fabric_bootstrap::prelude::*;
//!
//! # async fn example(
//! #     client: Arc<dyn LedgerClient>,
//! #     identity: Arc<dyn IdentityProvider>,
//! # ) -> Result<(), BootstrapError> {
//! fabric_bootstrap::init_tracing("info");
//!
//! let network = FabricNetwork::from_environment()?;
//! network.enroll(Arc::clone(&identity)).await?;
//!
//! let channel = network
//!     .construct_channel("foo", "peerOrg1", client, identity)
//!     .await?;
//! println!("{} peers joined", channel.joined_peers().len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`config`] - Properties, settings, topology and endpoint properties
//! - [`channel`] - Capabilities, enrollment and the bootstrap orchestrator

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

pub use fabric_channel as channel;
pub use fabric_config as config;

use crate::channel::{
    BootstrapConfig, BootstrapResult, Channel, ChannelBootstrap, IdentityProvider, LedgerClient,
    MemberStore, OrganizationEnroller,
};
use crate::config::{Properties, Settings, Topology};

/// Common imports for bootstrapping a network
pub mod prelude {
    pub use crate::channel::{
        BootstrapConfig, BootstrapError, BootstrapResult, BootstrapStep, Channel,
        ChannelBootstrap, ChannelState, IdentityProvider, LedgerClient, MemberStore,
        OrganizationEnroller,
    };
    pub use crate::config::{
        ConfigError, EndpointProperties, NodeKind, Organization, Properties, Settings, Topology,
    };
    pub use crate::FabricNetwork;
}

/// Installs a global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Installing twice is a no-op.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

/// A resolved network: settings, organizations and the member store shared
/// by every enrollment.
#[derive(Debug)]
pub struct FabricNetwork {
    properties: Arc<Properties>,
    settings: Settings,
    topology: Topology,
    config: BootstrapConfig,
    store: Arc<MemberStore>,
}

impl FabricNetwork {
    /// Resolves the network from a property snapshot.
    pub fn from_properties(properties: Properties) -> BootstrapResult<Self> {
        let settings = Settings::from_properties(&properties)?;
        let topology = Topology::build(&properties)?;
        let config = BootstrapConfig::from_settings(&settings);
        info!(
            "Resolved {} organizations (tls: {})",
            topology.len(),
            settings.tls_enabled
        );
        Ok(Self {
            properties: Arc::new(properties),
            settings,
            topology,
            config,
            store: Arc::new(MemberStore::new()),
        })
    }

    /// Resolves the network from the process environment and compiled defaults.
    pub fn from_environment() -> BootstrapResult<Self> {
        Self::from_properties(Properties::from_environment())
    }

    /// Replaces the bootstrap configuration.
    pub fn with_config(mut self, config: BootstrapConfig) -> Self {
        self.config = config;
        self
    }

    /// The property snapshot the network was resolved from.
    pub fn properties(&self) -> &Arc<Properties> {
        &self.properties
    }

    /// Typed settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// All organizations.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Bootstrap configuration used for enrollment and channels.
    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    /// Members enrolled so far.
    pub fn store(&self) -> &Arc<MemberStore> {
        &self.store
    }

    /// Enrolls the admin and peer admin of every organization.
    pub async fn enroll(&self, identity: Arc<dyn IdentityProvider>) -> BootstrapResult<()> {
        OrganizationEnroller::new(
            identity,
            Arc::clone(&self.store),
            self.config.crypto_material(),
            self.config.operation_timeout,
        )
        .enroll_all(&self.topology)
        .await
    }

    /// Prepares a bootstrap of channel `name` for `organization`.
    pub fn bootstrap(
        &self,
        name: &str,
        organization: &str,
        client: Arc<dyn LedgerClient>,
        identity: Arc<dyn IdentityProvider>,
    ) -> BootstrapResult<ChannelBootstrap> {
        let organization = Arc::clone(self.topology.organization(organization)?);
        Ok(ChannelBootstrap::new(
            name,
            self.config.clone(),
            organization,
            client,
            identity,
        ))
    }

    /// Bootstraps channel `name` for `organization` up to initialization.
    pub async fn construct_channel(
        &self,
        name: &str,
        organization: &str,
        client: Arc<dyn LedgerClient>,
        identity: Arc<dyn IdentityProvider>,
    ) -> BootstrapResult<Channel> {
        let mut bootstrap = self.bootstrap(name, organization, client, identity)?;
        bootstrap.run().await?;
        Ok(bootstrap.into_channel())
    }
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
