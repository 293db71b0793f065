//! Common types for catalog-discovery
//!
//! This crate contains the service catalog model, the discovery result
//! types, and the catalog error type shared by the discovery core, the
//! configuration writer, and the CLI.

mod catalog;
mod discovery;

pub use catalog::{CatalogEntry, Endpoint, ServiceCatalog};
pub use discovery::{DiscoveryResult, ServiceRecord};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while reading a service catalog document
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog document has no '{0}' section")]
    MissingSection(&'static str),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Identity API version the catalog document was issued by
///
/// The version decides the document shape: v2 tokens carry a
/// `serviceCatalog` whose endpoints publish `publicURL`, v3 tokens carry a
/// `catalog` whose endpoints publish `url`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum IdentityApiVersion {
    #[default]
    V2,
    V3,
}

impl IdentityApiVersion {
    /// Build from the numeric major version (`2` or `3`)
    pub fn from_major(major: u8) -> Option<Self> {
        match major {
            2 => Some(Self::V2),
            3 => Some(Self::V3),
            _ => None,
        }
    }

    /// Top-level key of the catalog section in the token document
    pub fn catalog_key(self) -> &'static str {
        match self {
            Self::V2 => "serviceCatalog",
            Self::V3 => "catalog",
        }
    }
}

impl std::fmt::Display for IdentityApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityApiVersion::V2 => write!(f, "v2"),
            IdentityApiVersion::V3 => write!(f, "v3"),
        }
    }
}
