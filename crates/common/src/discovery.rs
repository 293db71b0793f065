//! Discovery result types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Discovered API surface, keyed by catalog service type
pub type DiscoveryResult = BTreeMap<String, ServiceRecord>;

/// What was discovered for a single catalog service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Resolved endpoint URL
    pub url: String,

    /// Version ids in the order the service listed them
    #[serde(default)]
    pub versions: Vec<String>,

    /// Extension names; `None` when discovery was skipped for a v3 endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
}

impl ServiceRecord {
    /// Whether any listed version id belongs to the major version `major` (e.g. "v2")
    pub fn supports_major(&self, major: &str) -> bool {
        self.versions.iter().any(|v| {
            v.strip_prefix(major)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
        })
    }

    /// Extensions as a slice, empty when none were discovered
    pub fn extension_list(&self) -> &[String] {
        self.extensions.as_deref().unwrap_or(&[])
    }
}
