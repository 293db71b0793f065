//! Tempest configuration output for discovery results
//!
//! This crate turns a [`DiscoveryResult`] into the INI sections tempest
//! reads its feature flags from:
//! - `[service_available]` flags per service codename
//! - `[<service>-feature-enabled] api_<version>` flags
//! - `[<service>-feature-enabled] api_extensions` (or `discoverable_apis`
//!   for object storage) as a comma-joined list
//! - endpoint URLs for identity and the EC2/S3 compatibility layers

mod templates;

use catalog_discovery_common::{DiscoveryResult, ServiceRecord};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tera::{Context, Tera};
use thiserror::Error;

/// Errors that can occur while writing configuration
#[derive(Error, Debug)]
pub enum WriterError {
    #[error("Template error: {0}")]
    Template(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WriterError>;

/// Option name/value pairs of one INI section
pub type Options = BTreeMap<String, Value>;

/// Sections keyed by name
pub type Sections = BTreeMap<String, Options>;

/// Tempest service name and the codename used in `[service_available]`
pub const SERVICE_NAMES: [(&str, &str); 11] = [
    ("baremetal", "ironic"),
    ("compute", "nova"),
    ("database", "trove"),
    ("data-processing", "sahara"),
    ("image", "glance"),
    ("messaging", "zaqar"),
    ("network", "neutron"),
    ("object-store", "swift"),
    ("orchestration", "heat"),
    ("telemetry", "ceilometer"),
    ("volume", "cinder"),
];

/// Major versions tempest has feature flags for
pub const SERVICE_VERSIONS: [(&str, &[&str]); 3] = [
    ("identity", &["v2", "v3"]),
    ("image", &["v1", "v2"]),
    ("volume", &["v1", "v2", "v3"]),
];

/// Option holding the extension list of each service
pub const SERVICE_EXTENSION_KEY: [(&str, &str); 5] = [
    ("compute", "api_extensions"),
    ("identity", "api_extensions"),
    ("network", "api_extensions"),
    ("object-store", "discoverable_apis"),
    ("volume", "api_extensions"),
];

/// Tempest name for a catalog service type
///
/// Block storage is published as `volumev2`/`volumev3` but configured as
/// `volume`.
pub fn tempest_service_name(service_type: &str) -> &str {
    match service_type {
        "volumev2" | "volumev3" => "volume",
        other => other,
    }
}

fn lookup<'a, V: Copy>(table: &'a [(&'a str, V)], service: &str) -> Option<V> {
    table
        .iter()
        .find(|(name, _)| *name == service)
        .map(|(_, value)| *value)
}

/// Build the configuration sections for a discovery result
pub fn build_sections(services: &DiscoveryResult) -> Sections {
    let mut sections = Sections::new();

    // Catalog types in sorted order, so volumev3 overrides volumev2
    let discovered: BTreeMap<&str, &ServiceRecord> = services
        .iter()
        .map(|(service_type, record)| (tempest_service_name(service_type), record))
        .collect();

    let available = sections.entry("service_available".to_string()).or_default();
    for (service, codename) in SERVICE_NAMES {
        available.insert(
            codename.to_string(),
            Value::Bool(discovered.contains_key(service)),
        );
    }

    for (service, record) in &discovered {
        let feature_section = format!("{}-feature-enabled", service);

        if let Some(versions) = lookup(&SERVICE_VERSIONS, service) {
            let options = sections.entry(feature_section.clone()).or_default();
            for version in versions {
                options.insert(
                    format!("api_{}", version),
                    Value::Bool(record.supports_major(version)),
                );
            }
        }

        if let Some(key) = lookup(&SERVICE_EXTENSION_KEY, service) {
            let extensions = record
                .extension_list()
                .iter()
                .cloned()
                .map(Value::String)
                .collect();
            sections
                .entry(feature_section)
                .or_default()
                .insert(key.to_string(), Value::Array(extensions));
        }

        let endpoint_option = match *service {
            "identity" if record.url.contains("v3") => Some(("identity", "uri_v3")),
            "identity" => Some(("identity", "uri")),
            "ec2" => Some(("boto", "ec2_url")),
            "s3" => Some(("boto", "s3_url")),
            _ => None,
        };
        if let Some((section, key)) = endpoint_option {
            sections
                .entry(section.to_string())
                .or_default()
                .insert(key.to_string(), Value::String(record.url.clone()));
        }
    }

    sections
}

/// Renders discovery results as tempest configuration
pub struct ConfigWriter {
    tera: Tera,
}

impl ConfigWriter {
    pub fn new() -> Result<Self> {
        let tera = templates::load_templates()?;
        Ok(Self { tera })
    }

    /// Render the configuration as INI text
    pub fn render(&self, services: &DiscoveryResult) -> Result<String> {
        let mut context = Context::new();
        context.insert("sections", &build_sections(services));

        self.tera
            .render(templates::TEMPEST_CONF, &context)
            .map_err(|e| {
                WriterError::Template(format!(
                    "Failed to render {}: {:?}",
                    templates::TEMPEST_CONF,
                    e
                ))
            })
    }

    /// Render the configuration and write it to `path`
    pub fn write_to_file(&self, services: &DiscoveryResult, path: &Path) -> Result<()> {
        let rendered = self.render(services)?;
        fs::write(path, rendered)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, versions: &[&str], extensions: Option<&[&str]>) -> ServiceRecord {
        ServiceRecord {
            url: url.to_string(),
            versions: versions.iter().map(|v| v.to_string()).collect(),
            extensions: extensions.map(|e| e.iter().map(|x| x.to_string()).collect()),
        }
    }

    #[test]
    fn test_tempest_service_name() {
        assert_eq!(tempest_service_name("volumev3"), "volume");
        assert_eq!(tempest_service_name("compute"), "compute");
    }

    #[test]
    fn test_missing_extensions_written_empty() {
        let mut services = DiscoveryResult::new();
        services.insert(
            "identity".to_string(),
            record("http://172.16.52.151:5000/v3", &["v3.8", "v2.0"], None),
        );

        let sections = build_sections(&services);
        assert_eq!(
            sections["identity-feature-enabled"]["api_extensions"],
            Value::Array(vec![])
        );
        assert_eq!(
            sections["identity"]["uri_v3"],
            Value::String("http://172.16.52.151:5000/v3".to_string())
        );
    }

    #[test]
    fn test_volumev3_written_as_volume() {
        let mut services = DiscoveryResult::new();
        services.insert(
            "volumev3".to_string(),
            record(
                "http://172.16.52.151:8776/v3/402486",
                &["v3.0"],
                Some(&["OS-SCH-HNT"]),
            ),
        );

        let sections = build_sections(&services);
        assert_eq!(sections["service_available"]["cinder"], Value::Bool(true));
        let volume = &sections["volume-feature-enabled"];
        assert_eq!(volume["api_v1"], Value::Bool(false));
        assert_eq!(volume["api_v3"], Value::Bool(true));
        assert!(!sections.contains_key("volumev3-feature-enabled"));
    }
}
