//! Organization enrollment.
//!
//! Before a channel can be bootstrapped its organization needs two
//! identities: an admin enrolled against the organization's CA, and a peer
//! admin loaded from the crypto material tree. The peer admin signs the
//! genesis configuration.

use std::sync::Arc;
use std::time::Duration;

use fabric_config::{CryptoMaterial, Organization, Topology};
use tracing::{debug, info};

use crate::bootstrap::bounded;
use crate::client::{CaEndpoint, IdentityProvider};
use crate::error::{BootstrapError, BootstrapResult};
use crate::state::BootstrapStep;
use crate::store::MemberStore;

/// Enrollment id of the CA bootstrap admin.
pub const ADMIN_NAME: &str = "admin";

/// Enrollment secret of the CA bootstrap admin.
pub const ADMIN_SECRET: &str = "adminpw";

/// Fills the admin and peer admin slots of organizations.
pub struct OrganizationEnroller {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<MemberStore>,
    crypto: CryptoMaterial,
    timeout: Duration,
}

impl OrganizationEnroller {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<MemberStore>,
        crypto: CryptoMaterial,
        timeout: Duration,
    ) -> Self {
        Self {
            identity,
            store,
            crypto,
            timeout,
        }
    }

    pub fn store(&self) -> &Arc<MemberStore> {
        &self.store
    }

    /// Enrolls the identities of one organization.
    ///
    /// The CA must answer an info request first. When it reports a
    /// non-empty name, that name must match the configured `caName`. An
    /// admin already enrolled in the member store is reused. Neither slot is
    /// filled unless both identities are available, so a failed enrollment
    /// can be retried.
    pub async fn enroll(&self, organization: &Organization) -> BootstrapResult<()> {
        let step = BootstrapStep::Enroll;
        let name = organization.name();
        let ca = CaEndpoint::for_organization(organization)?;

        let info = bounded(
            self.timeout,
            step,
            name,
            &ca.location,
            self.identity.ca_info(&ca),
        )
        .await?;
        if let Some(reported) = info.ca_name.filter(|reported| !reported.is_empty()) {
            if ca.name.as_deref() != Some(reported.as_str()) {
                return Err(BootstrapError::CaNameMismatch {
                    organization: name.to_string(),
                    configured: ca.name.clone(),
                    reported,
                });
            }
        }

        let member = self.store.member(ADMIN_NAME, name);
        let admin = if member.is_enrolled() {
            debug!("Reusing enrolled admin of {}", name);
            member
        } else {
            let enrollment = bounded(
                self.timeout,
                step,
                name,
                &ca.location,
                self.identity.enroll(&ca, ADMIN_NAME, ADMIN_SECRET),
            )
            .await?;
            let admin = member
                .with_msp_id(organization.msp_id())
                .with_enrollment(enrollment);
            self.store.save(admin.clone());
            admin
        };
        let peer_admin = self.crypto.load_peer_admin(organization)?;

        organization.set_admin(admin)?;
        organization.set_peer_admin(peer_admin)?;

        info!("Enrolled organization {} ({})", name, organization.msp_id());
        Ok(())
    }

    /// Enrolls every organization of `topology`, stopping at the first failure.
    pub async fn enroll_all(&self, topology: &Topology) -> BootstrapResult<()> {
        for organization in topology.organizations() {
            self.enroll(organization).await?;
        }
        Ok(())
    }
}
