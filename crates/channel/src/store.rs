//! In-memory member store.

use std::collections::HashMap;

use fabric_config::User;
use parking_lot::RwLock;

/// Users keyed by organization and name, so an enrolled member is reused
/// instead of enrolled again.
#[derive(Debug, Default)]
pub struct MemberStore {
    members: RwLock<HashMap<(String, String), User>>,
}

impl MemberStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored member, or a fresh unenrolled user.
    pub fn member(&self, name: &str, organization: &str) -> User {
        self.members
            .read()
            .get(&(organization.to_string(), name.to_string()))
            .cloned()
            .unwrap_or_else(|| User::new(name, organization))
    }

    /// Stores `user`, replacing any previous entry.
    pub fn save(&self, user: User) {
        let key = (user.organization().to_string(), user.name().to_string());
        self.members.write().insert(key, user);
    }

    pub fn contains(&self, name: &str, organization: &str) -> bool {
        self.members
            .read()
            .contains_key(&(organization.to_string(), name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }
}
