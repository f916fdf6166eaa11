//! Enrolled identities held by organizations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Key and certificate issued to a user.
///
/// The private key is never serialized; a deserialized enrollment carries an
/// empty key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    #[serde(skip_serializing, default)]
    private_key: String,
    certificate: String,
}

impl Enrollment {
    /// Creates an enrollment from PEM encoded key and certificate.
    pub fn new<K: Into<String>, C: Into<String>>(private_key: K, certificate: C) -> Self {
        Self {
            private_key: private_key.into(),
            certificate: certificate.into(),
        }
    }

    /// PEM encoded private key.
    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    /// PEM encoded certificate.
    pub fn certificate(&self) -> &str {
        &self.certificate
    }
}

impl fmt::Debug for Enrollment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enrollment")
            .field("private_key", &"<redacted>")
            .field("certificate", &self.certificate)
            .finish()
    }
}

/// A member of an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    name: String,
    organization: String,
    msp_id: Option<String>,
    enrollment: Option<Enrollment>,
}

impl User {
    /// Creates a user that is not enrolled yet.
    pub fn new<N: Into<String>, O: Into<String>>(name: N, organization: O) -> Self {
        Self {
            name: name.into(),
            organization: organization.into(),
            msp_id: None,
            enrollment: None,
        }
    }

    /// Sets the MSP id.
    pub fn with_msp_id<S: Into<String>>(mut self, msp_id: S) -> Self {
        self.msp_id = Some(msp_id.into());
        self
    }

    /// Sets the enrollment.
    pub fn with_enrollment(mut self, enrollment: Enrollment) -> Self {
        self.enrollment = Some(enrollment);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn msp_id(&self) -> Option<&str> {
        self.msp_id.as_deref()
    }

    pub fn enrollment(&self) -> Option<&Enrollment> {
        self.enrollment.as_ref()
    }

    /// Whether the user holds an enrollment.
    pub fn is_enrolled(&self) -> bool {
        self.enrollment.is_some()
    }
}
