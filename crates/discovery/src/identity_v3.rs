//! Identity v3 extension discovery
//!
//! Identity v3 has no extension list. Instead its root answers a JSON-Home
//! request with a map of resource relations, and extension resources are
//! namespaced below a fixed relation prefix:
//!
//! ```json
//! {"resources": {
//!     "http://docs.openstack.org/api/openstack-identity/3/ext/OS-INHERIT/1.0/rel/domain_user_role_inherited_to_projects": {...}
//! }}
//! ```

use crate::transport::{GetRequest, Transport, ACCEPT_JSON_HOME};
use crate::{DiscoveryError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Relation prefix of identity extension resources
pub const EXTENSION_RESOURCE_PREFIX: &str =
    "http://docs.openstack.org/api/openstack-identity/3/ext/";

#[derive(Debug, Deserialize)]
struct JsonHome {
    resources: Map<String, Value>,
}

/// Extensions enabled on an identity v3 endpoint
///
/// The request is unauthenticated and never verifies TLS certificates.
pub fn get_v3_extensions(
    transport: &dyn Transport,
    identity_v3_url: &str,
) -> Result<BTreeSet<String>> {
    let request = GetRequest {
        service: "identity".to_string(),
        url: identity_v3_url.to_string(),
        accept: ACCEPT_JSON_HOME,
        token: None,
        insecure: true,
    };
    let body = transport.get(&request)?;

    let home: JsonHome =
        serde_json::from_slice(&body).map_err(|source| DiscoveryError::MalformedResponse {
            service: request.service.clone(),
            url: request.url.clone(),
            source,
        })?;

    Ok(extension_codenames(home.resources.keys()))
}

/// Extension codenames found among JSON-Home resource relations
pub fn extension_codenames<'a, I>(relations: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a String>,
{
    relations
        .into_iter()
        .filter(|rel| rel.contains("ext"))
        .filter_map(|rel| {
            rel.replace(EXTENSION_RESOURCE_PREFIX, "")
                .split('/')
                .next()
                .map(str::to_string)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use serde_json::json;

    fn json_home() -> Value {
        json!({
            "resources": {
                "http://docs.openstack.org/api/openstack-identity/3/ext/OS-INHERIT/1.0/rel/domain_user_role_inherited_to_projects": {
                    "href-template": "/OS-INHERIT/domains/{domain_id}/users/{user_id}/roles/{role_id}/inherited_to_projects"
                },
                "http://docs.openstack.org/api/openstack-identity/3/ext/OS-INHERIT/1.0/rel/project_group_role_inherited": {
                    "href-template": "/OS-INHERIT/projects/{project_id}/groups/{group_id}/roles/{role_id}/inherited_to_projects"
                },
                "http://docs.openstack.org/api/openstack-identity/3/ext/OS-SIMPLE-CERT/1.0/rel/ca_certificate": {
                    "href": "/OS-SIMPLE-CERT/ca"
                },
                "http://docs.openstack.org/api/openstack-identity/3/ext/OS-EP-FILTER/1.0/rel/endpoint_group": {
                    "href-template": "/OS-EP-FILTER/endpoint_groups/{endpoint_group_id}"
                },
                "http://docs.openstack.org/api/openstack-identity/3/ext/OS-OAUTH1/1.0/rel/consumers": {
                    "href": "/OS-OAUTH1/consumers"
                },
                "http://docs.openstack.org/api/openstack-identity/3/rel/users": {
                    "href": "/users"
                }
            }
        })
    }

    #[test]
    fn test_v3_extensions() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .withf(|req| {
                req.url == "http://fake_url:5000/v3"
                    && req.accept == "application/json-home"
                    && req.token.is_none()
                    && req.insecure
            })
            .times(1)
            .returning(|_| Ok(serde_json::to_vec(&json_home()).unwrap()));

        let extensions = get_v3_extensions(&transport, "http://fake_url:5000/v3").unwrap();
        let expected: BTreeSet<String> = ["OS-INHERIT", "OS-SIMPLE-CERT", "OS-EP-FILTER", "OS-OAUTH1"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(extensions, expected);
    }

    #[test]
    fn test_missing_resources_is_malformed() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .returning(|_| Ok(br#"{"links": []}"#.to_vec()));

        let err = get_v3_extensions(&transport, "http://fake_url:5000/v3").unwrap_err();
        assert!(matches!(err, DiscoveryError::MalformedResponse { .. }));
    }

    #[test]
    fn test_connection_failure_propagates() {
        let mut transport = MockTransport::new();
        transport.expect_get().returning(|req| {
            Err(DiscoveryError::Connection {
                service: req.service.clone(),
                url: req.url.clone(),
                source: "connection refused".into(),
            })
        });

        let err = get_v3_extensions(&transport, "http://fake_url:5000/v3").unwrap_err();
        assert!(err.is_transport());
    }
}
