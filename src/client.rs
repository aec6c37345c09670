// src/client.rs

use crate::config::Config;
use crate::discovery::load_endpoints;
use crate::error::NilaOidcError;
use crate::exchange::TokenExchangeClient;
use crate::identity::{match_subjects, IdentityResolver};
use crate::model::{EndpointSet, UserInfoRecord};
use crate::validator::model::{UnverifiedHeader, ValidatedClaims};
use crate::validator::{SigningAlgorithm, Validator};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// The identity attached to an admitted request.
#[derive(Debug, Clone, PartialEq)]
pub enum Identity {
    /// The validated ID token claims.
    Claims(ValidatedClaims),
    /// The user-info record, when identity resolution was requested.
    UserInfo(UserInfoRecord),
}

impl Identity {
    pub fn subject(&self) -> Option<&str> {
        match self {
            Identity::Claims(claims) => claims.subject(),
            Identity::UserInfo(record) => record.subject(),
        }
    }
}

/// An OpenID Connect relying-party client for the authorization code flow.
///
/// Construct it once at startup with [`OidcClient::connect`]; the discovered
/// endpoints and the configuration are read-only afterwards, so clones can
/// serve any number of concurrent authentication attempts.
#[derive(Clone)]
pub struct OidcClient {
    // The client is internally ref-counted to allow for cheap cloning.
    inner: Arc<Inner>,
}

struct Inner {
    config: Config,
    endpoints: EndpointSet,
    exchange: TokenExchangeClient,
    validator: Validator,
    identity: IdentityResolver,
}

impl OidcClient {
    /// Loads the provider's discovery document and builds the client.
    ///
    /// # Errors
    ///
    /// Fails with `Discovery` when the document cannot be fetched or decoded;
    /// the client cannot operate without it.
    pub async fn connect(config: Config) -> Result<Self, NilaOidcError> {
        let http_client = build_http_client(&config)?;
        let endpoints = load_endpoints(&http_client, &config).await?;
        info!(realm = %config.realm, client_id = %config.client_id, "OIDC client ready");
        Ok(Self::assemble(config, endpoints, http_client))
    }

    /// Builds the client from an already known endpoint set, skipping discovery.
    pub fn with_endpoints(config: Config, endpoints: EndpointSet) -> Result<Self, NilaOidcError> {
        let http_client = build_http_client(&config)?;
        Ok(Self::assemble(config, endpoints, http_client))
    }

    fn assemble(config: Config, endpoints: EndpointSet, http_client: reqwest::Client) -> Self {
        let expected_issuer = if config.validate_issuer { endpoints.issuer.clone() } else { None };
        let exchange = TokenExchangeClient::new(
            http_client.clone(),
            endpoints.token_endpoint.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
        );
        let validator = Validator::new(
            http_client.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
            endpoints.jwks_uri.clone(),
            expected_issuer,
            config.leeway,
        );
        let identity = IdentityResolver::new(http_client, endpoints.userinfo_endpoint.clone());

        Self { inner: Arc::new(Inner { config, endpoints, exchange, validator, identity }) }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn endpoints(&self) -> &EndpointSet {
        &self.inner.endpoints
    }

    pub fn token_exchange(&self) -> &TokenExchangeClient {
        &self.inner.exchange
    }

    pub fn validator(&self) -> &Validator {
        &self.inner.validator
    }

    pub fn identity_resolver(&self) -> &IdentityResolver {
        &self.inner.identity
    }

    /// The provider login URL for a callback:
    /// `{authorization_endpoint}?response_type=code&scope=..&client_id=..&redirect_uri=..`.
    pub fn authorization_url(&self, callback_uri: &str) -> Result<Url, NilaOidcError> {
        let endpoint = self
            .inner
            .endpoints
            .authorization_endpoint
            .as_deref()
            .ok_or(NilaOidcError::MissingEndpoint("authorization_endpoint"))?;
        let mut url = Url::parse(endpoint).map_err(|e| NilaOidcError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("scope", &self.inner.config.scope)
            .append_pair("client_id", &self.inner.config.client_id)
            .append_pair("redirect_uri", callback_uri);
        Ok(url)
    }

    /// Runs the code exchange, token validation, and optionally identity resolution.
    ///
    /// Returns the validated claims, or the user-info record when
    /// `resolve_identity` is set and its subject matches the token's.
    #[instrument(skip(self, code), err)]
    pub async fn authenticate(
        &self,
        code: &str,
        callback_uri: &str,
        resolve_identity: bool,
    ) -> Result<Identity, NilaOidcError> {
        let tokens = self.inner.exchange.exchange(code, callback_uri).await?;

        let id_token = tokens
            .id_token
            .as_deref()
            .ok_or_else(|| NilaOidcError::TokenValidation("Token response carries no id_token".to_string()))?;
        let header = UnverifiedHeader::peek(id_token).map_err(|e| {
            warn!("Error getting unverified header in jwt.");
            NilaOidcError::TokenValidation(e)
        })?;
        let algorithm = SigningAlgorithm::from_alg(&header.alg);
        let claims = self.inner.validator.validate_with(id_token, &algorithm).await?;

        if !resolve_identity {
            debug!("Authenticated without identity resolution");
            return Ok(Identity::Claims(claims));
        }

        let access_token = tokens
            .access_token
            .as_deref()
            .ok_or_else(|| NilaOidcError::UserInfoFetch("Token response carries no access_token".to_string()))?;
        let user_info = self.inner.identity.fetch_user_info(access_token).await?;
        match_subjects(&claims, &user_info)?;
        debug!("Authenticated with matching user info");
        Ok(Identity::UserInfo(user_info))
    }
}

fn build_http_client(config: &Config) -> Result<reqwest::Client, NilaOidcError> {
    Ok(reqwest::Client::builder().timeout(config.http_timeout).build()?)
}
