//! Layered property resolution.
//!
//! Each declared key is resolved exactly once, highest precedence first:
//!
//! 1. an explicit override supplied when the snapshot is built,
//! 2. an environment variable named after the key, upper-cased with `.`
//!    replaced by `_`,
//! 3. the compiled-in default, if there is one.
//!
//! A key with none of these is absent. The resulting [`Properties`] snapshot is
//! immutable; later changes to the process environment are not observed.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::defaults::{self, PROPERTY_PREFIX};
use crate::{ConfigError, ConfigResult};

/// Source of environment variables consulted during resolution.
pub trait EnvironmentSource: Send + Sync {
    /// Returns the value of `name`, if set.
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl EnvironmentSource for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvironmentSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Environment variable name for a property key.
///
/// `org.example.InvokeWaitTime` becomes `ORG_EXAMPLE_INVOKEWAITTIME`.
pub fn env_key(key: &str) -> String {
    key.to_uppercase().replace('.', "_")
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyOrigin {
    /// Explicit override supplied at start-up.
    Override,
    /// Environment variable.
    Environment,
    /// Compiled-in default.
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ResolvedProperty {
    value: String,
    origin: PropertyOrigin,
}

/// Collects overrides and declared keys, then freezes them into [`Properties`].
pub struct PropertiesBuilder {
    overrides: HashMap<String, String>,
    environment: Box<dyn EnvironmentSource>,
    resolved: IndexMap<String, ResolvedProperty>,
}

impl Default for PropertiesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertiesBuilder {
    /// Creates a builder reading the process environment, with no overrides.
    pub fn new() -> Self {
        Self {
            overrides: HashMap::new(),
            environment: Box::new(ProcessEnvironment),
            resolved: IndexMap::new(),
        }
    }

    /// Replaces the environment consulted for declared keys.
    pub fn with_environment<E: EnvironmentSource + 'static>(mut self, environment: E) -> Self {
        self.environment = Box::new(environment);
        self
    }

    /// Adds an explicit override for `key`. It wins over the environment and
    /// the default whenever it is added.
    pub fn with_override<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    /// Adds several overrides at once.
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.overrides
            .extend(overrides.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Declares `key` and resolves it immediately.
    ///
    /// A default never replaces a value an earlier declaration already
    /// resolved for the same key.
    pub fn default_property(mut self, key: &str, default: Option<&str>) -> Self {
        let resolved = if let Some(value) = self.overrides.get(key) {
            Some(ResolvedProperty {
                value: value.clone(),
                origin: PropertyOrigin::Override,
            })
        } else if let Some(value) = self.environment.var(&env_key(key)) {
            Some(ResolvedProperty {
                value,
                origin: PropertyOrigin::Environment,
            })
        } else if self.resolved.contains_key(key) {
            None
        } else {
            default.map(|value| ResolvedProperty {
                value: value.to_string(),
                origin: PropertyOrigin::Default,
            })
        };

        if let Some(property) = resolved {
            debug!(key, origin = ?property.origin, "resolved property");
            self.resolved.insert(key.to_string(), property);
        }
        self
    }

    /// Declares every compiled-in default key.
    pub fn with_compiled_defaults(self) -> Self {
        defaults::compiled_defaults()
            .into_iter()
            .fold(self, |builder, (key, value)| {
                builder.default_property(&key, value)
            })
    }

    /// Freezes the resolved keys into an immutable snapshot.
    ///
    /// Every override replaces the value of its declared key. Overrides under
    /// the namespace prefix that were never declared are carried over as
    /// well, so organizations can be added purely by override.
    pub fn build(mut self) -> Properties {
        let mut undeclared = Vec::new();
        for (key, value) in &self.overrides {
            if let Some(property) = self.resolved.get_mut(key.as_str()) {
                property.value = value.clone();
                property.origin = PropertyOrigin::Override;
            } else if key.starts_with(PROPERTY_PREFIX) {
                undeclared.push((key.clone(), value.clone()));
            }
        }
        undeclared.sort();

        for (key, value) in undeclared {
            debug!(key = %key, "carrying undeclared override");
            self.resolved.insert(
                key,
                ResolvedProperty {
                    value,
                    origin: PropertyOrigin::Override,
                },
            );
        }

        Properties {
            entries: self.resolved,
        }
    }
}

/// Immutable snapshot of resolved configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    entries: IndexMap<String, ResolvedProperty>,
}

impl Properties {
    /// Starts a new [`PropertiesBuilder`].
    pub fn builder() -> PropertiesBuilder {
        PropertiesBuilder::new()
    }

    /// Resolves the compiled-in defaults against the process environment.
    pub fn from_environment() -> Self {
        Self::builder().with_compiled_defaults().build()
    }

    /// Value of `key`, if resolved.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|p| p.value.as_str())
    }

    /// Value of `key` for consumers that tolerate absence; logs a warning
    /// when the key is absent.
    pub fn probe(&self, key: &str) -> Option<&str> {
        let value = self.get(key);
        if value.is_none() {
            warn!("No configuration value found for '{}'", key);
        }
        value
    }

    /// Value of `key`, failing when absent.
    pub fn require(&self, key: &str) -> ConfigResult<&str> {
        self.get(key).ok_or_else(|| ConfigError::missing_property(key))
    }

    /// Origin of the value resolved for `key`.
    pub fn origin(&self, key: &str) -> Option<PropertyOrigin> {
        self.entries.get(key).map(|p| p.origin)
    }

    /// Whether `key` resolved to any value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterates resolved `(key, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, p)| (k.as_str(), p.value.as_str()))
    }

    /// Number of resolved keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing resolved.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn environment(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_env_key() {
        assert_eq!(
            env_key("org.hyperledger.fabric.sdktest.InvokeWaitTime"),
            "ORG_HYPERLEDGER_FABRIC_SDKTEST_INVOKEWAITTIME"
        );
    }

    #[test]
    fn test_override_beats_environment_beats_default() {
        let env = environment(&[("A_B", "env"), ("C_D", "env")]);
        let properties = Properties::builder()
            .with_environment(env)
            .with_override("a.b", "override")
            .default_property("a.b", Some("default"))
            .default_property("c.d", Some("default"))
            .default_property("e.f", Some("default"))
            .build();

        assert_eq!(properties.get("a.b"), Some("override"));
        assert_eq!(properties.origin("a.b"), Some(PropertyOrigin::Override));
        assert_eq!(properties.get("c.d"), Some("env"));
        assert_eq!(properties.origin("c.d"), Some(PropertyOrigin::Environment));
        assert_eq!(properties.get("e.f"), Some("default"));
        assert_eq!(properties.origin("e.f"), Some(PropertyOrigin::Default));
    }

    #[test]
    fn test_absent_key_without_default() {
        let properties = Properties::builder()
            .with_environment(HashMap::new())
            .default_property("x.y", None)
            .build();

        assert!(!properties.contains_key("x.y"));
        assert!(properties.probe("x.y").is_none());
        let err = properties.require("x.y").unwrap_err();
        assert!(err.to_string().contains("x.y"));
    }

    #[test]
    fn test_redeclared_default_does_not_replace_value() {
        let properties = Properties::builder()
            .with_environment(HashMap::new())
            .default_property("k", Some("first"))
            .default_property("k", Some("second"))
            .build();

        assert_eq!(properties.get("k"), Some("first"));
    }

    #[test]
    fn test_undeclared_prefixed_override_is_kept() {
        let key = format!("{PROPERTY_PREFIX}integrationTests.org.extra.mspid");
        let properties = Properties::builder()
            .with_environment(HashMap::new())
            .with_override(key.as_str(), "ExtraMSP")
            .with_override("unrelated.key", "ignored")
            .build();

        assert_eq!(properties.get(&key), Some("ExtraMSP"));
        assert!(!properties.contains_key("unrelated.key"));
    }

    #[test]
    fn test_override_added_after_declaration_wins() {
        let env = environment(&[("A_B", "env")]);
        let properties = Properties::builder()
            .with_environment(env)
            .default_property("a.b", Some("default"))
            .default_property("c.d", Some("default"))
            .with_override("a.b", "late")
            .with_override("c.d", "late")
            .build();

        assert_eq!(properties.get("a.b"), Some("late"));
        assert_eq!(properties.origin("a.b"), Some(PropertyOrigin::Override));
        assert_eq!(properties.get("c.d"), Some("late"));
        assert_eq!(properties.origin("c.d"), Some(PropertyOrigin::Override));
    }

    #[test]
    fn test_late_override_replaces_compiled_default() {
        let key = format!("{PROPERTY_PREFIX}integrationTests.org.peerOrg1.mspid");
        let properties = Properties::builder()
            .with_environment(HashMap::new())
            .with_compiled_defaults()
            .with_override(key.as_str(), "OverrideMSP")
            .build();

        assert_eq!(properties.get(&key), Some("OverrideMSP"));
        assert_eq!(properties.origin(&key), Some(PropertyOrigin::Override));
    }
}
