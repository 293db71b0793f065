//! Service catalog model
//!
//! The identity service returns the catalog inside the token document in one
//! of two shapes, depending on the identity API version:
//!
//! ```json
//! {"serviceCatalog": [{"type": "compute", "endpoints": [{"region": "RegionOne", "publicURL": "http://..."}]}]}
//! {"catalog": [{"type": "compute", "endpoints": [{"region": "RegionOne", "url": "http://..."}]}]}
//! ```
//!
//! Both are read into the same [`CatalogEntry`] list, preserving catalog order.

use crate::{CatalogError, IdentityApiVersion, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered list of services published by the identity service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCatalog {
    /// Catalog entries in document order
    pub entries: Vec<CatalogEntry>,
}

/// One service in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Service type (e.g., "compute", "identity", "volumev3")
    #[serde(rename = "type")]
    pub service_type: String,

    /// Endpoints in document order
    pub endpoints: Vec<Endpoint>,
}

/// A single published endpoint of a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Region the endpoint belongs to, if published
    #[serde(default)]
    pub region: Option<String>,

    /// Public URL of the endpoint
    pub url: String,
}

#[derive(Deserialize)]
struct RawEntry<E> {
    #[serde(rename = "type")]
    service_type: String,
    #[serde(default = "Vec::new")]
    endpoints: Vec<E>,
}

#[derive(Deserialize)]
struct V2Endpoint {
    #[serde(default)]
    region: Option<String>,
    #[serde(rename = "publicURL")]
    public_url: String,
}

#[derive(Deserialize)]
struct V3Endpoint {
    #[serde(default)]
    region: Option<String>,
    url: String,
}

impl ServiceCatalog {
    /// Read the catalog section out of a token document
    pub fn from_document(document: &Value, version: IdentityApiVersion) -> Result<Self> {
        let key = version.catalog_key();
        let section = document
            .get(key)
            .cloned()
            .ok_or(CatalogError::MissingSection(key))?;

        let entries = match version {
            IdentityApiVersion::V2 => {
                let raw: Vec<RawEntry<V2Endpoint>> = serde_json::from_value(section)?;
                raw.into_iter()
                    .map(|entry| CatalogEntry {
                        service_type: entry.service_type,
                        endpoints: entry
                            .endpoints
                            .into_iter()
                            .map(|ep| Endpoint {
                                region: ep.region,
                                url: ep.public_url,
                            })
                            .collect(),
                    })
                    .collect()
            }
            IdentityApiVersion::V3 => {
                let raw: Vec<RawEntry<V3Endpoint>> = serde_json::from_value(section)?;
                raw.into_iter()
                    .map(|entry| CatalogEntry {
                        service_type: entry.service_type,
                        endpoints: entry
                            .endpoints
                            .into_iter()
                            .map(|ep| Endpoint {
                                region: ep.region,
                                url: ep.url,
                            })
                            .collect(),
                    })
                    .collect()
            }
        };

        Ok(Self { entries })
    }

    /// Number of services in the catalog
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CatalogEntry {
    /// Endpoint published for `region`
    ///
    /// Falls back to the first endpoint when no endpoint matches; returns
    /// `None` only when the entry has no endpoints at all.
    pub fn endpoint_for_region(&self, region: &str) -> Option<&Endpoint> {
        self.endpoints
            .iter()
            .find(|ep| ep.region.as_deref() == Some(region))
            .or_else(|| self.endpoints.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(endpoints: Vec<(&str, &str)>) -> CatalogEntry {
        CatalogEntry {
            service_type: "compute".to_string(),
            endpoints: endpoints
                .into_iter()
                .map(|(region, url)| Endpoint {
                    region: Some(region.to_string()),
                    url: url.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_parse_v2_catalog() {
        let doc = json!({
            "serviceCatalog": [
                {
                    "type": "compute",
                    "name": "nova",
                    "endpoints": [{
                        "region": "RegionOne",
                        "publicURL": "http://172.16.52.151:8774/v2.1/402486",
                        "adminURL": "http://10.0.0.1:8774/v2.1/402486"
                    }]
                },
                {"type": "image", "endpoints": [{"region": "RegionOne", "publicURL": "http://172.16.52.151:9292"}]}
            ]
        });

        let catalog = ServiceCatalog::from_document(&doc, IdentityApiVersion::V2).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.entries[0].service_type, "compute");
        assert_eq!(
            catalog.entries[0].endpoints[0].url,
            "http://172.16.52.151:8774/v2.1/402486"
        );
        assert_eq!(catalog.entries[1].service_type, "image");
    }

    #[test]
    fn test_parse_v3_catalog() {
        let doc = json!({
            "catalog": [{
                "type": "identity",
                "endpoints": [
                    {"region": "RegionOne", "interface": "public", "url": "http://172.16.52.151:5000/v3"}
                ]
            }]
        });

        let catalog = ServiceCatalog::from_document(&doc, IdentityApiVersion::V3).unwrap();
        assert_eq!(catalog.entries[0].endpoints[0].region.as_deref(), Some("RegionOne"));
        assert_eq!(catalog.entries[0].endpoints[0].url, "http://172.16.52.151:5000/v3");
    }

    #[test]
    fn test_missing_section_for_version() {
        let doc = json!({"catalog": []});
        let err = ServiceCatalog::from_document(&doc, IdentityApiVersion::V2).unwrap_err();
        assert!(matches!(err, CatalogError::MissingSection("serviceCatalog")));
    }

    #[test]
    fn test_endpoint_region_match() {
        let entry = entry(vec![("RegionOne", "http://one"), ("RegionTwo", "http://two")]);
        assert_eq!(entry.endpoint_for_region("RegionTwo").unwrap().url, "http://two");
    }

    #[test]
    fn test_endpoint_falls_back_to_first() {
        let entry = entry(vec![("RegionOne", "http://one"), ("RegionTwo", "http://two")]);
        assert_eq!(entry.endpoint_for_region("Elsewhere").unwrap().url, "http://one");
    }

    #[test]
    fn test_endpoint_none_when_empty() {
        let entry = entry(vec![]);
        assert!(entry.endpoint_for_region("RegionOne").is_none());
    }
}
