//! Wire shapes of the version and extension documents

use serde::Deserialize;

/// `{"versions": [{"id": "v2.0"}, ...]}`
#[derive(Debug, Clone, Deserialize)]
pub struct VersionList {
    pub versions: Vec<VersionEntry>,
}

/// `{"versions": {"values": [{"id": "v3.8"}, ...]}}` (identity)
#[derive(Debug, Clone, Deserialize)]
pub struct NestedVersionList {
    pub versions: Values<VersionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionEntry {
    pub id: String,
}

/// `{"extensions": [{"alias": "NMN"}, ...]}`
#[derive(Debug, Clone, Deserialize)]
pub struct ExtensionList {
    pub extensions: Vec<ExtensionEntry>,
}

/// `{"extensions": {"values": [{"alias": "OS-DCF"}, ...]}}` (identity)
#[derive(Debug, Clone, Deserialize)]
pub struct NestedExtensionList {
    pub extensions: Values<ExtensionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtensionEntry {
    pub alias: String,
}

/// Keystone wraps its lists in a `values` object
#[derive(Debug, Clone, Deserialize)]
pub struct Values<T> {
    pub values: Vec<T>,
}

impl From<VersionList> for Vec<String> {
    fn from(list: VersionList) -> Self {
        list.versions.into_iter().map(|v| v.id).collect()
    }
}

impl From<NestedVersionList> for Vec<String> {
    fn from(list: NestedVersionList) -> Self {
        list.versions.values.into_iter().map(|v| v.id).collect()
    }
}

impl From<ExtensionList> for Vec<String> {
    fn from(list: ExtensionList) -> Self {
        list.extensions.into_iter().map(|e| e.alias).collect()
    }
}

impl From<NestedExtensionList> for Vec<String> {
    fn from(list: NestedExtensionList) -> Self {
        list.extensions.values.into_iter().map(|e| e.alias).collect()
    }
}
