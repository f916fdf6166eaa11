//! Fabric Channel Module
//!
//! Enrolls organization identities and bootstraps channels: anchor
//! selection, genesis signing, peer joins, orderer and event hub attachment
//! and initialization. Network access goes through the [`LedgerClient`] and
//! [`IdentityProvider`] capabilities supplied by the caller.
//!
//! ```rust,no_run
//! # async fn example(
//! #     client: std::sync::Arc<dyn fabric_channel::LedgerClient>,
//! #     identity: std::sync::Arc<dyn fabric_channel::IdentityProvider>,
//! # ) -> Result<(), fabric_channel::BootstrapError> {
//! use std::sync::Arc;
//!
//! use fabric_channel::{BootstrapConfig, ChannelBootstrap, MemberStore, OrganizationEnroller};
//! use fabric_config::{Properties, Settings, Topology};
//!
//! let properties = Properties::from_environment();
//! let settings = Settings::from_properties(&properties)?;
//! let topology = Topology::build(&properties)?;
//! let config = BootstrapConfig::from_settings(&settings);
//!
//! let enroller = OrganizationEnroller::new(
//!     Arc::clone(&identity),
//!     Arc::new(MemberStore::new()),
//!     config.crypto_material(),
//!     config.operation_timeout,
//! );
//! enroller.enroll_all(&topology).await?;
//!
//! let organization = Arc::clone(topology.organization("peerOrg1")?);
//! let mut bootstrap = ChannelBootstrap::new("foo", config, organization, client, identity);
//! bootstrap.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod channel;
pub mod client;
pub mod config;
pub mod enrollment;
pub mod error;
pub mod state;
pub mod store;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use bootstrap::{construct_channel, ChannelBootstrap};
pub use channel::{Channel, PeerFailure};
pub use client::{
    CaEndpoint, CaInfo, ChannelBackend, ChannelConfiguration, ConfigSignature, IdentityProvider,
    LedgerClient, NodeHandle,
};
pub use config::BootstrapConfig;
pub use enrollment::{OrganizationEnroller, ADMIN_NAME, ADMIN_SECRET};
pub use error::{BootstrapError, BootstrapResult, ClientError, ClientResult};
pub use state::{BootstrapStep, ChannelState};
pub use store::MemberStore;
