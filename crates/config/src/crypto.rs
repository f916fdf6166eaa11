//! Crypto material layout.
//!
//! Paths follow the `cryptogen` directory convention:
//!
//! ```text
//! <root>/peerOrganizations/<domain>/peers/<node>/tls/server.crt
//! <root>/ordererOrganizations/<domain>/orderers/<node>/tls/server.crt
//! <root>/peerOrganizations/<domain>/users/Admin@<domain>/msp/keystore/*_sk
//! <root>/peerOrganizations/<domain>/users/Admin@<domain>/msp/signcerts/Admin@<domain>-cert.pem
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::endpoint::{derive_domain, NodeKind};
use crate::{ConfigError, ConfigResult, Enrollment, Organization, User};

const PRIVATE_KEY_SUFFIX: &str = "_sk";

/// Root of the crypto material tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoMaterial {
    root: PathBuf,
}

impl CryptoMaterial {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the TLS server certificate of `node` is expected.
    pub fn tls_certificate_path(&self, kind: NodeKind, node: &str) -> ConfigResult<PathBuf> {
        let domain = derive_domain(node)?;
        Ok(self
            .root
            .join(kind.organizations_dir())
            .join(domain)
            .join(kind.nodes_dir())
            .join(node)
            .join("tls")
            .join("server.crt"))
    }

    /// Absolute path of the TLS server certificate of `node`, which must exist.
    pub fn tls_certificate(&self, kind: NodeKind, node: &str) -> ConfigResult<PathBuf> {
        let path = absolute(self.tls_certificate_path(kind, node)?)?;
        if !path.is_file() {
            return Err(ConfigError::MissingCertificate {
                node: node.to_string(),
                path,
            });
        }
        Ok(path)
    }

    /// MSP directory of the peer admin of `domain`.
    pub fn peer_admin_msp_dir(&self, domain: &str) -> PathBuf {
        self.root
            .join(NodeKind::Peer.organizations_dir())
            .join(domain)
            .join("users")
            .join(format!("Admin@{domain}"))
            .join("msp")
    }

    /// Signing certificate of the peer admin of `domain`.
    pub fn peer_admin_certificate_path(&self, domain: &str) -> PathBuf {
        self.peer_admin_msp_dir(domain)
            .join("signcerts")
            .join(format!("Admin@{domain}-cert.pem"))
    }

    /// The single `*_sk` private key in the peer admin keystore of `domain`.
    pub fn peer_admin_key_path(&self, domain: &str) -> ConfigResult<PathBuf> {
        let keystore = self.peer_admin_msp_dir(domain).join("keystore");
        if !keystore.is_dir() {
            return Err(ConfigError::MissingKeyMaterial { path: keystore });
        }

        let mut keys = Vec::new();
        for entry in fs::read_dir(&keystore)? {
            let path = entry?.path();
            let is_key = path
                .file_name()
                .and_then(|name| name.to_str())
                .map_or(false, |name| name.ends_with(PRIVATE_KEY_SUFFIX));
            if is_key && path.is_file() {
                keys.push(path);
            }
        }

        match keys.len() {
            0 => Err(ConfigError::MissingKeyMaterial { path: keystore }),
            1 => Ok(keys.remove(0)),
            count => Err(ConfigError::AmbiguousKeyMaterial {
                path: keystore,
                count,
            }),
        }
    }

    /// Loads the peer admin of `organization` from its MSP directory.
    ///
    /// The user is named `<organization>Admin` and carries the organization's
    /// MSP id.
    pub fn load_peer_admin(&self, organization: &Organization) -> ConfigResult<User> {
        let domain = organization
            .domain_name()
            .ok_or_else(|| ConfigError::MissingCompanion {
                organization: organization.name().to_string(),
                key: crate::defaults::org_key(organization.name(), crate::defaults::DOMAIN_NAME),
            })?;

        let key_path = self.peer_admin_key_path(domain)?;
        let certificate_path = self.peer_admin_certificate_path(domain);
        if !certificate_path.is_file() {
            return Err(ConfigError::MissingKeyMaterial {
                path: certificate_path,
            });
        }

        debug!(
            organization = organization.name(),
            key = %key_path.display(),
            certificate = %certificate_path.display(),
            "loading peer admin"
        );

        let enrollment = Enrollment::new(
            fs::read_to_string(&key_path)?,
            fs::read_to_string(&certificate_path)?,
        );
        Ok(User::new(
            format!("{}Admin", organization.name()),
            organization.name(),
        )
        .with_msp_id(organization.msp_id())
        .with_enrollment(enrollment))
    }
}

fn absolute(path: PathBuf) -> ConfigResult<PathBuf> {
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
