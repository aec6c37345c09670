// src/validator.rs

pub mod client;
pub mod model;

use crate::error::NilaOidcError;
use client::JwksClient;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use model::{UnverifiedHeader, ValidatedClaims};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// The signing algorithms the validator knows how to verify.
///
/// Anything else lands in `Unsupported` and is always refused; there is no
/// fallback to accepting an unverified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningAlgorithm {
    /// HMAC-SHA256, verified with the client secret.
    Hs256,
    /// RSASSA-PKCS1-v1_5 SHA-256, verified with a key from the provider's JWKS.
    Rs256,
    Unsupported(String),
}

impl SigningAlgorithm {
    /// Maps the `alg` member of a token header.
    pub fn from_alg(alg: &str) -> Self {
        match alg {
            "HS256" => Self::Hs256,
            "RS256" => Self::Rs256,
            other => Self::Unsupported(other.to_string()),
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hs256 => f.write_str("HS256"),
            Self::Rs256 => f.write_str("RS256"),
            Self::Unsupported(alg) => f.write_str(alg),
        }
    }
}

/// The OIDC ID token validator.
///
/// Verifies the signature with the client secret (HS256) or a key resolved
/// from the provider's JWKS (RS256), then checks the audience against the
/// client ID and the time-based claims. It is created once per client and
/// holds only read-only state.
#[derive(Clone)]
pub struct Validator {
    client_id: String,
    client_secret: String,
    jwks_uri: Option<String>,
    expected_issuer: Option<String>,
    leeway: Duration,
    jwks_client: JwksClient,
}

impl Validator {
    /// Creates a new `Validator`.
    ///
    /// # Arguments
    ///
    /// * `client_id` - The required `aud` value.
    /// * `client_secret` - The HS256 verification key.
    /// * `jwks_uri` - The discovered JWKS location, needed for RS256 tokens.
    /// * `expected_issuer` - When set, the `iss` claim must equal it.
    pub fn new(
        http_client: reqwest::Client,
        client_id: String,
        client_secret: String,
        jwks_uri: Option<String>,
        expected_issuer: Option<String>,
        leeway: Duration,
    ) -> Self {
        Self {
            client_id,
            client_secret,
            jwks_uri,
            expected_issuer,
            leeway,
            jwks_client: JwksClient::new(http_client),
        }
    }

    /// Validates an ID token, taking the algorithm from its own header.
    pub async fn validate(&self, id_token: &str) -> Result<ValidatedClaims, NilaOidcError> {
        let header = UnverifiedHeader::peek(id_token).map_err(|e| {
            error!("Error getting unverified header in jwt.");
            NilaOidcError::TokenValidation(e)
        })?;
        self.validate_with(id_token, &SigningAlgorithm::from_alg(&header.alg)).await
    }

    /// Validates an ID token against the given algorithm.
    ///
    /// The returned claims have always passed a signature check.
    #[instrument(skip(self, id_token), fields(alg = %algorithm), err)]
    pub async fn validate_with(
        &self,
        id_token: &str,
        algorithm: &SigningAlgorithm,
    ) -> Result<ValidatedClaims, NilaOidcError> {
        let (decoding_key, jwt_algorithm) = match algorithm {
            SigningAlgorithm::Hs256 => (DecodingKey::from_secret(self.client_secret.as_bytes()), Algorithm::HS256),
            SigningAlgorithm::Rs256 => {
                let jwks_uri = self.jwks_uri.as_deref().ok_or(NilaOidcError::MissingEndpoint("jwks_uri"))?;
                // A missing key is a verification failure, decided before any decode attempt.
                let key = self.jwks_client.resolve_key(jwks_uri, id_token).await?.ok_or_else(|| {
                    error!("No signing key matches the token's kid");
                    NilaOidcError::TokenValidation("No signing key matches the token's kid".to_string())
                })?;
                (key, Algorithm::RS256)
            }
            SigningAlgorithm::Unsupported(alg) => {
                error!("Unsupported jwt algorithm found: {}", alg);
                return Err(NilaOidcError::UnsupportedAlgorithm(alg.clone()));
            }
        };

        let validation = self.validation_for(jwt_algorithm);
        let token_data = decode::<Map<String, Value>>(id_token, &decoding_key, &validation).map_err(|e| {
            error!("An error occurred while decoding the id_token: {:?}", e.kind());
            NilaOidcError::from(e)
        })?;

        let claims = ValidatedClaims(token_data.claims).require_subject()?;
        debug!("ID token verified");
        Ok(claims)
    }

    fn validation_for(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.leeway = self.leeway.as_secs();
        validation.validate_nbf = true;
        validation.set_audience(&[&self.client_id]);
        // `exp` and `nbf` are still checked whenever the token carries them.
        match &self.expected_issuer {
            Some(issuer) => {
                validation.set_issuer(&[issuer]);
                validation.set_required_spec_claims(&["aud", "sub", "iss"]);
            }
            None => validation.set_required_spec_claims(&["aud", "sub"]),
        }
        validation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_names_map_to_variants() {
        assert_eq!(SigningAlgorithm::from_alg("HS256"), SigningAlgorithm::Hs256);
        assert_eq!(SigningAlgorithm::from_alg("RS256"), SigningAlgorithm::Rs256);
        assert_eq!(
            SigningAlgorithm::from_alg("none"),
            SigningAlgorithm::Unsupported("none".to_string())
        );
        assert_eq!(SigningAlgorithm::from_alg("ES256").to_string(), "ES256");
        assert!(!SigningAlgorithm::from_alg("HS512").is_supported());
    }
}
