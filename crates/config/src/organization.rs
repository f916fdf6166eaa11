//! Organizations and the topology builder.
//!
//! Topology is built in two passes. The first enumerates organization names
//! from keys of the form `<ORG_PREFIX><name>.mspid`; the second requires and
//! parses each organization's companion keys. An MSP id without its peer,
//! orderer and event hub lists is an error, never an empty organization.

use std::collections::BTreeMap;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::defaults::{
    org_key, CA_LOCATION, CA_NAME, DOMAIN_NAME, EVENT_HUB_LOCATIONS, MSPID, ORDERER_LOCATIONS,
    ORG_PREFIX, PEER_LOCATIONS,
};
use crate::endpoint::{
    parse_endpoint_list, secure_grpc_location, secure_http_location, validate_grpc_location,
    EndpointRecord,
};
use crate::settings::tls_enabled;
use crate::{ConfigError, ConfigResult, Properties, User};

/// A participant of the network with its own MSP id and infrastructure.
#[derive(Debug)]
pub struct Organization {
    name: String,
    msp_id: String,
    domain_name: Option<String>,
    ca_location: Option<String>,
    ca_name: Option<String>,
    peers: IndexMap<String, EndpointRecord>,
    orderers: IndexMap<String, EndpointRecord>,
    event_hubs: IndexMap<String, EndpointRecord>,
    admin: OnceCell<User>,
    peer_admin: OnceCell<User>,
    attached_peers: RwLock<Vec<EndpointRecord>>,
}

impl Organization {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    pub fn domain_name(&self) -> Option<&str> {
        self.domain_name.as_deref()
    }

    /// CA location, already rewritten to `https://` when TLS is on.
    pub fn ca_location(&self) -> Option<&str> {
        self.ca_location.as_deref()
    }

    pub fn ca_name(&self) -> Option<&str> {
        self.ca_name.as_deref()
    }

    /// Configured peers in resolution order.
    pub fn peers(&self) -> impl Iterator<Item = &EndpointRecord> {
        self.peers.values()
    }

    /// Configured ordering nodes in resolution order.
    pub fn orderers(&self) -> impl Iterator<Item = &EndpointRecord> {
        self.orderers.values()
    }

    /// Configured event hubs in resolution order.
    pub fn event_hubs(&self) -> impl Iterator<Item = &EndpointRecord> {
        self.event_hubs.values()
    }

    pub fn peer(&self, name: &str) -> Option<&EndpointRecord> {
        self.peers.get(name)
    }

    pub fn orderer(&self, name: &str) -> Option<&EndpointRecord> {
        self.orderers.get(name)
    }

    pub fn event_hub(&self, name: &str) -> Option<&EndpointRecord> {
        self.event_hubs.get(name)
    }

    pub fn admin(&self) -> Option<&User> {
        self.admin.get()
    }

    /// Fills the admin slot. The slot can only be set once.
    pub fn set_admin(&self, user: User) -> ConfigResult<()> {
        self.admin
            .set(user)
            .map_err(|_| ConfigError::IdentityAlreadySet {
                organization: self.name.clone(),
                slot: "admin",
            })
    }

    pub fn peer_admin(&self) -> Option<&User> {
        self.peer_admin.get()
    }

    /// Fills the peer admin slot. The slot can only be set once.
    pub fn set_peer_admin(&self, user: User) -> ConfigResult<()> {
        self.peer_admin
            .set(user)
            .map_err(|_| ConfigError::IdentityAlreadySet {
                organization: self.name.clone(),
                slot: "peer admin",
            })
    }

    /// Records a peer that joined a channel on behalf of this organization.
    pub fn add_attached_peer(&self, peer: EndpointRecord) {
        self.attached_peers.write().push(peer);
    }

    /// Peers attached so far.
    pub fn attached_peers(&self) -> Vec<EndpointRecord> {
        self.attached_peers.read().clone()
    }

    fn from_properties(
        properties: &Properties,
        name: &str,
        msp_id: &str,
        secure: bool,
    ) -> ConfigResult<Self> {
        let peers = node_endpoints(
            &org_key(name, PEER_LOCATIONS),
            companion(properties, name, PEER_LOCATIONS)?,
            secure,
        )?;
        let orderers = node_endpoints(
            &org_key(name, ORDERER_LOCATIONS),
            companion(properties, name, ORDERER_LOCATIONS)?,
            secure,
        )?;
        let event_hubs = node_endpoints(
            &org_key(name, EVENT_HUB_LOCATIONS),
            companion(properties, name, EVENT_HUB_LOCATIONS)?,
            secure,
        )?;

        let optional = |suffix: &str| {
            properties
                .probe(&org_key(name, suffix))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Ok(Self {
            name: name.to_string(),
            msp_id: msp_id.to_string(),
            domain_name: optional(DOMAIN_NAME),
            ca_location: optional(CA_LOCATION)
                .map(|location| secure_http_location(&location, secure)),
            ca_name: optional(CA_NAME),
            peers,
            orderers,
            event_hubs,
            admin: OnceCell::new(),
            peer_admin: OnceCell::new(),
            attached_peers: RwLock::new(Vec::new()),
        })
    }
}

fn companion<'p>(
    properties: &'p Properties,
    organization: &str,
    suffix: &str,
) -> ConfigResult<&'p str> {
    let key = org_key(organization, suffix);
    match properties.get(&key) {
        Some(value) => Ok(value),
        None => Err(ConfigError::MissingCompanion {
            organization: organization.to_string(),
            key,
        }),
    }
}

fn node_endpoints(
    key: &str,
    raw: &str,
    secure: bool,
) -> ConfigResult<IndexMap<String, EndpointRecord>> {
    let mut endpoints = IndexMap::new();
    for record in parse_endpoint_list(raw)? {
        validate_grpc_location(record.location())?;
        let location = secure_grpc_location(record.location(), secure);
        let record = EndpointRecord::new(record.name(), location);
        if endpoints.contains_key(record.name()) {
            return Err(ConfigError::DuplicateEndpoint {
                key: key.to_string(),
                name: record.name().to_string(),
            });
        }
        endpoints.insert(record.name().to_string(), record);
    }
    Ok(endpoints)
}

/// All configured organizations.
#[derive(Debug, Default)]
pub struct Topology {
    organizations: BTreeMap<String, Arc<Organization>>,
    tls_enabled: bool,
}

impl Topology {
    /// Builds one [`Organization`] per MSP id key found in `properties`.
    pub fn build(properties: &Properties) -> ConfigResult<Self> {
        let secure = tls_enabled(properties);

        let declared: Vec<(&str, &str)> = properties
            .iter()
            .filter_map(|(key, value)| {
                let name = key
                    .strip_prefix(ORG_PREFIX)?
                    .strip_suffix(MSPID)?
                    .strip_suffix('.')?
                    .trim();
                (!name.is_empty() && !name.contains('.')).then_some((name, value.trim()))
            })
            .collect();

        let mut organizations = BTreeMap::new();
        for (name, msp_id) in declared {
            let organization = Organization::from_properties(properties, name, msp_id, secure)?;
            debug!(
                organization = name,
                msp_id,
                peers = organization.peers.len(),
                orderers = organization.orderers.len(),
                event_hubs = organization.event_hubs.len(),
                "organization resolved"
            );
            organizations.insert(name.to_string(), Arc::new(organization));
        }

        info!(
            organizations = organizations.len(),
            tls = secure,
            "topology resolved"
        );

        Ok(Self {
            organizations,
            tls_enabled: secure,
        })
    }

    /// Organizations ordered by name.
    pub fn organizations(&self) -> impl Iterator<Item = &Arc<Organization>> {
        self.organizations.values()
    }

    /// Looks an organization up by name.
    pub fn organization(&self, name: &str) -> ConfigResult<&Arc<Organization>> {
        self.organizations
            .get(name)
            .ok_or_else(|| ConfigError::UnknownOrganization(name.to_string()))
    }

    pub fn tls_enabled(&self) -> bool {
        self.tls_enabled
    }

    pub fn len(&self) -> usize {
        self.organizations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.organizations.is_empty()
    }
}
