//! Per-service version and extension probing
//!
//! Every service family publishes its version and extension lists at a
//! different path and wraps them in a different JSON shape:
//!
//! | Kind          | Extensions endpoint            | Shape                  |
//! |---------------|--------------------------------|------------------------|
//! | Compute       | `{url}/extensions`             | `extensions[].alias`   |
//! | Network       | `{url}/v2.0/extensions.json`   | `extensions[].alias`   |
//! | Volume        | `{url}/extensions`             | `extensions[].alias`   |
//! | Identity      | `{url}[/v2.0]/extensions`      | `extensions.values[].alias` |
//! | Image         | none                           |                        |
//! | ObjectStorage | top-level `/info`              | top-level keys except `swift` |
//!
//! Versions are read from the top-level URL as `versions[].id`, except for
//! identity which nests them under `versions.values[].id`.

mod types;

use crate::endpoint_url::normalize;
use crate::transport::{GetRequest, Transport};
use crate::{DiscoveryError, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;
use types::{ExtensionList, NestedExtensionList, NestedVersionList, VersionList};

/// Service family, selects how versions and extensions are fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    /// Unknown service: no versions, no extensions
    Generic,
    /// Standard version document, no extensions
    Versioned,
    Compute,
    Network,
    Volume,
    Identity,
    Image,
    ObjectStorage,
}

impl ServiceKind {
    /// Look up the kind for a catalog service type
    ///
    /// Unregistered types map to [`ServiceKind::Generic`].
    pub fn for_service_type(service_type: &str) -> Self {
        match service_type {
            "compute" => Self::Compute,
            "image" => Self::Image,
            "network" => Self::Network,
            "object-store" => Self::ObjectStorage,
            "volumev3" => Self::Volume,
            "identity" => Self::Identity,
            _ => Self::Generic,
        }
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceKind::Generic => write!(f, "Generic"),
            ServiceKind::Versioned => write!(f, "Versioned"),
            ServiceKind::Compute => write!(f, "Compute"),
            ServiceKind::Network => write!(f, "Network"),
            ServiceKind::Volume => write!(f, "Volume"),
            ServiceKind::Identity => write!(f, "Identity"),
            ServiceKind::Image => write!(f, "Image"),
            ServiceKind::ObjectStorage => write!(f, "ObjectStorage"),
        }
    }
}

/// Connection settings shared by every service probed in one run
#[derive(Clone, Copy)]
pub struct Session<'a> {
    /// Transport used for every request
    pub transport: &'a dyn Transport,

    /// Token sent as `X-Auth-Token`
    pub token: &'a str,

    /// Skip TLS certificate verification
    pub insecure: bool,
}

impl<'a> Session<'a> {
    pub fn new(transport: &'a dyn Transport, token: &'a str, insecure: bool) -> Self {
        Self {
            transport,
            token,
            insecure,
        }
    }

    /// Bind a service of `kind` to `url`
    pub fn service(&self, kind: ServiceKind, name: &str, url: &str) -> Service<'a> {
        Service {
            kind,
            name: name.to_string(),
            url: url.to_string(),
            session: *self,
        }
    }
}

impl std::fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("insecure", &self.insecure)
            .finish_non_exhaustive()
    }
}

/// A catalog service bound to its endpoint
#[derive(Debug, Clone)]
pub struct Service<'a> {
    kind: ServiceKind,
    name: String,
    url: String,
    session: Session<'a>,
}

impl<'a> Service<'a> {
    pub fn kind(&self) -> ServiceKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Endpoint URL the service was bound to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Version ids listed by the service, in document order
    pub fn versions(&self) -> Result<Vec<String>> {
        match self.kind {
            ServiceKind::Generic | ServiceKind::ObjectStorage => Ok(Vec::new()),
            ServiceKind::Identity => {
                let url = normalize(&self.url, true, "");
                Ok(self.get_json::<NestedVersionList>(url)?.into())
            }
            _ => {
                let url = normalize(&self.url, true, "");
                Ok(self.get_json::<VersionList>(url)?.into())
            }
        }
    }

    /// Extension names advertised by the service
    ///
    /// Order follows the document, except for object storage where the
    /// order carries no meaning.
    pub fn extensions(&self) -> Result<Vec<String>> {
        match self.kind {
            ServiceKind::Generic | ServiceKind::Versioned | ServiceKind::Image => Ok(Vec::new()),
            ServiceKind::Compute | ServiceKind::Volume => {
                let url = normalize(&format!("{}/extensions", self.url), false, "");
                Ok(self.get_json::<ExtensionList>(url)?.into())
            }
            ServiceKind::Network => {
                let url = normalize(&format!("{}/v2.0/extensions.json", self.url), false, "");
                Ok(self.get_json::<ExtensionList>(url)?.into())
            }
            ServiceKind::Identity => {
                let url = normalize(&identity_extensions_url(&self.url), false, "");
                Ok(self.get_json::<NestedExtensionList>(url)?.into())
            }
            ServiceKind::ObjectStorage => {
                let url = normalize(&self.url, true, "info");
                let mut info = self.get_json::<Map<String, Value>>(url)?;
                // General cluster information, not a middleware
                info.remove("swift");
                Ok(info.into_iter().map(|(key, _)| key).collect())
            }
        }
    }

    fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        let request = GetRequest::json(
            &self.name,
            &url,
            self.session.token,
            self.session.insecure,
        );
        let body = self.session.transport.get(&request)?;
        debug!(service = %self.name, url = %url, bytes = body.len(), "Parsing response");

        serde_json::from_slice(&body).map_err(|source| DiscoveryError::MalformedResponse {
            service: self.name.clone(),
            url,
            source,
        })
    }
}

/// Identity extension URL derived from its endpoint
///
/// Identity only lists extensions under its v2.0 API, even when the catalog
/// publishes a v3 endpoint, so `v3` is dropped from the URL and `/v2.0` is
/// appended when the endpoint does not carry it already.
pub fn identity_extensions_url(url: &str) -> String {
    let url = url.replace("v3", "");
    if url.contains("v2.0") {
        format!("{}/extensions", url)
    } else {
        format!("{}/v2.0/extensions", url)
    }
}
