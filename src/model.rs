// src/model.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// The provider's endpoint set, as published by its discovery document.
///
/// Every field is optional; absence is tolerated at load time and only
/// reported when the flow actually needs the missing endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct EndpointSet {
    pub issuer: Option<String>,
    pub authorization_endpoint: Option<String>,
    pub token_endpoint: Option<String>,
    pub userinfo_endpoint: Option<String>,
    pub jwks_uri: Option<String>,
}

/// The result of an authorization code exchange.
///
/// Only JSON-decodability is checked at this stage; the `id_token` is
/// validated separately.
#[derive(Clone, Default, Deserialize)]
pub struct TokenPair {
    pub access_token: Option<String>,
    pub id_token: Option<String>,
    /// Any other members of the token response (`token_type`, `expires_in`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |t: &Option<String>| t.as_ref().map(|_| "<redacted>");
        f.debug_struct("TokenPair")
            .field("access_token", &redact(&self.access_token))
            .field("id_token", &redact(&self.id_token))
            .field("extra", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Claims fetched from the provider's user-info endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct UserInfoRecord(pub Map<String, Value>);

impl UserInfoRecord {
    /// The `sub` claim, if it is a non-empty string.
    pub fn subject(&self) -> Option<&str> {
        non_empty_str(self.0.get("sub"))
    }

    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.0.get(claim)
    }
}

pub(crate) fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
