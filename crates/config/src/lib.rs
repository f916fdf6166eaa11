//! Fabric Configuration Module
//!
//! Resolves layered configuration (explicit overrides, environment variables,
//! compiled defaults) into a multi-organization network topology, and derives
//! per-node connection properties from the crypto material layout.
//!
//! ```rust,no_run
//! use fabric_config::{Properties, Settings, Topology};
//!
//! let properties = Properties::from_environment();
//! let settings = Settings::from_properties(&properties)?;
//! let topology = Topology::build(&properties)?;
//! let org = topology.organization("peerOrg1")?;
//! println!("{} peers, tls = {}", org.peers().count(), settings.tls_enabled);
//! # Ok::<(), fabric_config::ConfigError>(())
//! ```

pub mod crypto;
pub mod defaults;
pub mod endpoint;
pub mod endpoint_properties;
pub mod error;
pub mod identity;
pub mod organization;
pub mod properties;
pub mod settings;

pub use crypto::CryptoMaterial;
pub use endpoint::{
    derive_domain, parse_endpoint_list, secure_grpc_location, secure_http_location,
    validate_grpc_location, EndpointRecord, NodeKind,
};
pub use endpoint_properties::{
    EndpointProperties, NegotiationType, SslProvider, TransportOptions, KEEP_ALIVE_TIME,
    KEEP_ALIVE_TIMEOUT, MAX_INBOUND_MESSAGE_SIZE,
};
pub use error::{ConfigError, ConfigResult};
pub use identity::{Enrollment, User};
pub use organization::{Organization, Topology};
pub use properties::{
    env_key, EnvironmentSource, ProcessEnvironment, Properties, PropertiesBuilder, PropertyOrigin,
};
pub use settings::{tls_enabled, Settings};
