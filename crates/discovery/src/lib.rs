//! Service catalog discovery
//!
//! This crate probes every service published in a cloud service catalog and
//! reports which API versions and extensions it exposes.
//!
//! ## Discovery Strategy
//!
//! Each catalog entry is mapped to a [`ServiceKind`] by its service type.
//! The kind decides where the version and extension documents live and how
//! their JSON is unwrapped:
//! - Versions come from the top-level URL (the endpoint with its `/vN`
//!   segment cropped off)
//! - Extensions come from a family-specific path below the endpoint
//! - Object storage lists its middleware in the top-level `info` document
//! - Identity v3 advertises extensions through JSON-Home, see
//!   [`get_v3_extensions`]
//!
//! ## Usage
//! ```rust,ignore
//! use catalog_discovery_core::{discover, DiscoveryOptions, FileAuthProvider, HttpTransport};
//!
//! let auth = FileAuthProvider::from_file("auth.json")?;
//! let transport = HttpTransport::new()?;
//! let services = discover(&auth, &transport, &DiscoveryOptions::new("RegionOne"))?;
//! ```

mod auth;
mod endpoint_url;
mod identity_v3;
mod orchestrator;
mod services;
mod transport;

pub use auth::{AuthProvider, FileAuthProvider};
pub use endpoint_url::{collapse_slashes, normalize, VERSION_MARKERS};
pub use identity_v3::{extension_codenames, get_v3_extensions, EXTENSION_RESOURCE_PREFIX};
pub use orchestrator::{discover, DiscoveryOptions, IdentityRewrite};
pub use services::{identity_extensions_url, Service, ServiceKind, Session};
pub use transport::{GetRequest, HttpTransport, Transport, ACCEPT_JSON, ACCEPT_JSON_HOME};

pub use catalog_discovery_common::{
    CatalogEntry, CatalogError, DiscoveryResult, Endpoint, IdentityApiVersion, ServiceCatalog,
    ServiceRecord,
};

use thiserror::Error;

/// Boxed error carried by transport failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur during discovery
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Request on service '{service}' with url '{url}' failed: {source}")]
    Connection {
        service: String,
        url: String,
        source: BoxError,
    },

    #[error("Request on service '{service}' with url '{url}' failed with code {status}")]
    Status {
        service: String,
        url: String,
        status: u16,
    },

    #[error("Unexpected response from service '{service}' with url '{url}': {source}")]
    MalformedResponse {
        service: String,
        url: String,
        source: serde_json::Error,
    },

    #[error("Service '{0}' has no endpoints in the catalog")]
    NoEndpoints(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl DiscoveryError {
    /// Whether the error came from the network or an HTTP status
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Status { .. })
    }
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;
