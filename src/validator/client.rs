// src/validator/client.rs

use super::model::{JsonWebKeySet, UnverifiedHeader};
use crate::error::NilaOidcError;
use crate::http::{json_or_fail, transport_failure};
use jsonwebtoken::DecodingKey;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Resolves the public key that signed an ID token from the provider's JWKS.
///
/// Keys are fetched fresh for every resolution, so a rotated or revoked
/// provider key is never served from a stale copy.
#[derive(Clone)]
pub struct JwksClient {
    http_client: reqwest::Client,
}

impl JwksClient {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    /// Fetches the key set at `jwks_uri` and returns the key whose `kid`
    /// matches the token header's `kid`, or `None` when no entry matches.
    #[instrument(skip(self, id_token), err)]
    pub async fn resolve_key(&self, jwks_uri: &str, id_token: &str) -> Result<Option<DecodingKey>, NilaOidcError> {
        let mut keys = self.fetch_keys(jwks_uri).await?;

        let header = UnverifiedHeader::peek(id_token).map_err(|e| {
            warn!("kid could not be extracted.");
            NilaOidcError::KeyResolution(format!("kid could not be extracted: {}", e))
        })?;

        let Some(kid) = header.kid else {
            debug!("Token header carries no kid");
            return Ok(None);
        };
        debug!(kid = %kid, "Selecting signing key");
        Ok(keys.remove(&kid))
    }

    /// Fetches the JWKS and builds the `kid` -> key mapping.
    async fn fetch_keys(&self, jwks_uri: &str) -> Result<HashMap<String, DecodingKey>, NilaOidcError> {
        debug!("Fetching JWKS from: {}", jwks_uri);
        let response = self
            .http_client
            .get(jwks_uri)
            .send()
            .await
            .map_err(|e| transport_failure(e, NilaOidcError::KeyFetch))?;
        let jwks: JsonWebKeySet = json_or_fail(response, NilaOidcError::KeyFetch).await?;

        let mut keys = HashMap::with_capacity(jwks.keys.len());
        for jwk in jwks.keys {
            let Some(kid) = jwk.kid else {
                continue;
            };
            // We only support RSA keys, matching the RS256 verification branch.
            if jwk.kty.as_deref() != Some("RSA") {
                debug!(kid = %kid, kty = ?jwk.kty, "Skipping non-RSA key");
                continue;
            }
            let (Some(n), Some(e)) = (jwk.n.as_deref(), jwk.e.as_deref()) else {
                warn!(kid = %kid, "Skipping RSA key missing 'n' or 'e' component");
                continue;
            };
            match DecodingKey::from_rsa_components(n, e) {
                Ok(key) => {
                    keys.insert(kid, key);
                }
                Err(err) => warn!(kid = %kid, "Skipping malformed RSA key: {}", err),
            }
        }

        debug!("Successfully fetched {} usable keys.", keys.len());
        Ok(keys)
    }
}
