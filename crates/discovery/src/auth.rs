//! Authentication providers
//!
//! Discovery never acquires tokens itself. An [`AuthProvider`] hands over a
//! token together with the token document that carries the service catalog.

use crate::{DiscoveryError, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Source of the token and service catalog for a discovery run
#[cfg_attr(test, mockall::automock)]
pub trait AuthProvider {
    /// Token and the token document holding the service catalog
    fn get_auth(&self) -> Result<(String, Value)>;

    /// URL of the identity endpoint the token was issued by
    fn auth_url(&self) -> String;
}

/// Auth provider backed by a stored token snapshot
///
/// The snapshot is a JSON file:
///
/// ```json
/// {
///     "auth_url": "http://172.16.52.151:5000/v3",
///     "token": "s6d5f45sdf4s564f4s6464sdfsd514",
///     "token_data": {"catalog": [...]}
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct FileAuthProvider {
    /// Identity endpoint the token was issued by
    auth_url: String,

    /// Bearer token
    token: String,

    /// Token document containing `serviceCatalog` (v2) or `catalog` (v3)
    token_data: Value,
}

impl FileAuthProvider {
    /// Load a snapshot from a file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            DiscoveryError::Auth(format!(
                "Failed to read auth file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_json(&content)
    }

    /// Parse a snapshot from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| DiscoveryError::Auth(format!("Failed to parse auth JSON: {}", e)))
    }

    /// Replace the stored token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }
}

impl AuthProvider for FileAuthProvider {
    fn get_auth(&self) -> Result<(String, Value)> {
        if self.token.is_empty() {
            return Err(DiscoveryError::Auth("Auth snapshot has an empty token".to_string()));
        }
        Ok((self.token.clone(), self.token_data.clone()))
    }

    fn auth_url(&self) -> String {
        self.auth_url.clone()
    }
}
