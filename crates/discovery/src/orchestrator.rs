//! Discovery over a whole service catalog

use crate::auth::AuthProvider;
use crate::endpoint_url::raw_origin;
use crate::services::{ServiceKind, Session};
use crate::transport::Transport;
use crate::{DiscoveryError, Result};
use catalog_discovery_common::{
    DiscoveryResult, IdentityApiVersion, ServiceCatalog, ServiceRecord,
};
use tracing::{debug, info};
use url::Url;

/// Options for a discovery run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Region whose endpoints are preferred
    pub region: String,

    /// Probe object storage for its middleware list
    pub object_store_extensions: bool,

    /// Identity API version the catalog document was issued by
    pub api_version: IdentityApiVersion,

    /// Skip TLS certificate verification
    pub insecure: bool,
}

impl DiscoveryOptions {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            object_store_extensions: true,
            api_version: IdentityApiVersion::V2,
            insecure: false,
        }
    }
}

/// Rewrite for endpoints served behind a shared `/identity` path
///
/// Some deployments front identity under `http://host/identity`. Such
/// endpoints are rewritten to use the port and path of the auth URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityRewrite {
    /// `:{port}` of the auth URL, empty when it has no explicit port
    port: String,

    /// Path of the auth URL
    path: String,
}

impl IdentityRewrite {
    pub fn from_auth_url(auth_url: &str) -> Self {
        match Url::parse(auth_url) {
            Ok(url) => {
                // `url` reports `/` for an auth URL without a path
                let has_path = raw_origin(auth_url)
                    .is_some_and(|origin| auth_url[origin.len()..].starts_with('/'));
                Self {
                    port: url.port().map(|p| format!(":{}", p)).unwrap_or_default(),
                    path: if has_path {
                        url.path().to_string()
                    } else {
                        String::new()
                    },
                }
            }
            Err(_) => Self::default(),
        }
    }

    pub fn apply(&self, url: &str) -> String {
        if url.contains("identity") {
            url.replace("/identity", &format!("{}{}", self.port, self.path))
        } else {
            url.to_string()
        }
    }
}

/// Discover versions and extensions of every service in the catalog
///
/// Services are probed one after another in catalog order. The first
/// failure aborts the run; no partial result is returned.
pub fn discover(
    auth: &dyn AuthProvider,
    transport: &dyn Transport,
    options: &DiscoveryOptions,
) -> Result<DiscoveryResult> {
    let (token, token_data) = auth.get_auth()?;
    let catalog = ServiceCatalog::from_document(&token_data, options.api_version)?;
    let rewrite = IdentityRewrite::from_auth_url(&auth.auth_url());
    let session = Session::new(transport, &token, options.insecure);

    debug!(
        services = catalog.len(),
        region = %options.region,
        api_version = %options.api_version,
        "Discovering service catalog"
    );

    let mut services = DiscoveryResult::new();
    for entry in &catalog.entries {
        let name = entry.service_type.as_str();
        let endpoint = entry
            .endpoint_for_region(&options.region)
            .ok_or_else(|| DiscoveryError::NoEndpoints(name.to_string()))?;
        let url = rewrite.apply(&endpoint.url);

        let kind = ServiceKind::for_service_type(name);
        let service = session.service(kind, name, &url);

        let extensions = if name == "object-store" && !options.object_store_extensions {
            Some(Vec::new())
        } else if url.contains("v3") {
            None
        } else {
            Some(service.extensions()?)
        };
        let versions = service.versions()?;

        info!(
            service = name,
            kind = %kind,
            url = %url,
            versions = versions.len(),
            extensions = extensions.as_ref().map_or(0, Vec::len),
            "Discovered service"
        );

        services.insert(
            name.to_string(),
            ServiceRecord {
                url,
                versions,
                extensions,
            },
        );
    }

    Ok(services)
}
