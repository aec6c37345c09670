// src/validator/model.rs

use crate::error::NilaOidcError;
use crate::model::non_empty_str;
use base64::engine::{general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Represents a single JSON Web Key (JWK) as defined in RFC 7517.
///
/// Only the members needed to build an RSA verification key are read.
#[derive(Debug, Deserialize)]
pub struct JsonWebKey {
    pub kid: Option<String>,
    pub kty: Option<String>,
    #[serde(rename = "use")]
    pub use_purpose: Option<String>,
    pub alg: Option<String>,
    pub n: Option<String>,
    pub e: Option<String>,
}

/// Represents a JSON Web Key Set (JWKS), which is a collection of JWKs.
#[derive(Debug, Deserialize)]
pub struct JsonWebKeySet {
    pub keys: Vec<JsonWebKey>,
}

/// The `alg`/`kid` members of a token header, read without verification.
///
/// Only ever used to pick the verification algorithm and key. Nothing read
/// here is trusted as a claim.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UnverifiedHeader {
    pub alg: String,
    pub kid: Option<String>,
}

impl UnverifiedHeader {
    /// Decodes the first segment of a compact, three-segment token.
    pub fn peek(token: &str) -> Result<Self, String> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 {
            return Err("token is not a three-segment compact JWT".to_string());
        }
        let header_bytes = URL_SAFE_NO_PAD
            .decode(segments[0].trim_end_matches('='))
            .map_err(|e| format!("header is not base64url: {}", e))?;
        serde_json::from_slice(&header_bytes).map_err(|e| format!("header is not a JWT header: {}", e))
    }
}

/// The claims of an ID token that passed signature and audience verification.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct ValidatedClaims(pub Map<String, Value>);

impl ValidatedClaims {
    /// The `sub` claim, if it is a non-empty string.
    pub fn subject(&self) -> Option<&str> {
        non_empty_str(self.0.get("sub"))
    }

    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.0.get(claim)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    pub(crate) fn require_subject(self) -> Result<Self, NilaOidcError> {
        if self.subject().is_none() {
            return Err(NilaOidcError::TokenValidation("Missing required claim 'sub'".to_string()));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b64(value: &str) -> String {
        URL_SAFE_NO_PAD.encode(value)
    }

    #[test]
    fn peek_reads_alg_and_kid() {
        let token = format!("{}.{}.sig", b64(r#"{"alg":"RS256","kid":"k1","typ":"JWT"}"#), b64("{}"));
        let header = UnverifiedHeader::peek(&token).unwrap();
        assert_eq!(header.alg, "RS256");
        assert_eq!(header.kid.as_deref(), Some("k1"));
    }

    #[test]
    fn peek_rejects_garbage() {
        assert!(UnverifiedHeader::peek("not-a-token").is_err());
        assert!(UnverifiedHeader::peek("!!!.e30.sig").is_err());
        assert!(UnverifiedHeader::peek(&format!("{}.e30.sig", b64("[1,2]"))).is_err());
    }

    #[test]
    fn jwks_entries_without_kid_parse() {
        let set: JsonWebKeySet = serde_json::from_str(r#"{"keys":[{"kty":"RSA","n":"AQAB","e":"AQAB"}]}"#).unwrap();
        assert!(set.keys[0].kid.is_none());
    }
}
