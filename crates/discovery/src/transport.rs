//! HTTP transport
//!
//! Discovery only ever issues `GET` requests. The [`Transport`] trait is the
//! seam between the service variants and the network so both can be tested
//! in isolation.

use crate::{DiscoveryError, Result};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use tracing::{debug, error};

/// `Accept` value for regular API documents
pub const ACCEPT_JSON: &str = "application/json";

/// `Accept` value for the identity v3 JSON-Home document
pub const ACCEPT_JSON_HOME: &str = "application/json-home";

const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// A single `GET` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetRequest {
    /// Service the request is made on behalf of, used in errors and logs
    pub service: String,

    /// Fully formed request URL
    pub url: String,

    /// `Accept` header value
    pub accept: &'static str,

    /// Token sent as `X-Auth-Token`; `None` for unauthenticated requests
    pub token: Option<String>,

    /// Skip TLS certificate verification for this request
    pub insecure: bool,
}

impl GetRequest {
    /// Authenticated JSON request
    pub fn json(service: &str, url: &str, token: &str, insecure: bool) -> Self {
        Self {
            service: service.to_string(),
            url: url.to_string(),
            accept: ACCEPT_JSON,
            token: Some(token.to_string()),
            insecure,
        }
    }
}

/// Something that can perform a `GET` and return the raw body
///
/// Implementations fail with [`DiscoveryError::Connection`] when the server
/// cannot be reached and [`DiscoveryError::Status`] when it answers with a
/// status of 400 or above.
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    fn get(&self, request: &GetRequest) -> Result<Vec<u8>>;
}

/// [`Transport`] backed by a blocking `reqwest` client
///
/// Holds one verifying and one non-verifying client so the TLS policy is
/// chosen per request rather than per process.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    verifying: Client,
    insecure: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let verifying = Client::builder().build()?;
        let insecure = Client::builder()
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Self {
            verifying,
            insecure,
        })
    }

    fn client(&self, insecure: bool) -> &Client {
        if insecure {
            &self.insecure
        } else {
            &self.verifying
        }
    }
}

impl Transport for HttpTransport {
    fn get(&self, request: &GetRequest) -> Result<Vec<u8>> {
        debug!(service = %request.service, url = %request.url, insecure = request.insecure, "GET");

        let mut builder = self
            .client(request.insecure)
            .get(&request.url)
            .header(ACCEPT, request.accept);
        if let Some(token) = &request.token {
            builder = builder.header(AUTH_TOKEN_HEADER, token);
        }

        let connection_error = |e: reqwest::Error| {
            error!(
                "Request on service '{}' with url '{}' failed",
                request.service, request.url
            );
            DiscoveryError::Connection {
                service: request.service.clone(),
                url: request.url.clone(),
                source: Box::new(e),
            }
        };

        let response = builder.send().map_err(connection_error)?;
        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(DiscoveryError::Status {
                service: request.service.clone(),
                url: request.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(connection_error)?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_request_headers() {
        let request = GetRequest::json(
            "identity",
            "http://fake_url:5000",
            "s6d5f45sdf4s564f4s6464sdfsd514",
            false,
        );
        assert_eq!(request.accept, "application/json");
        assert_eq!(request.token.as_deref(), Some("s6d5f45sdf4s564f4s6464sdfsd514"));
        assert!(!request.insecure);
    }

    #[test]
    fn test_unreachable_host_is_connection_error() {
        let transport = HttpTransport::new().unwrap();
        let request = GetRequest::json("compute", "http://127.0.0.1:1/v2.1", "token", true);
        let err = transport.get(&request).unwrap_err();
        assert!(matches!(err, DiscoveryError::Connection { ref service, .. } if service == "compute"));
        assert!(err.is_transport());
    }

    #[test]
    fn test_invalid_url_is_connection_error() {
        let transport = HttpTransport::new().unwrap();
        let request = GetRequest::json("compute", "not a url", "token", false);
        assert!(matches!(
            transport.get(&request),
            Err(DiscoveryError::Connection { .. })
        ));
    }
}
