// src/exchange.rs

use crate::error::NilaOidcError;
use crate::http::{json_or_fail, transport_failure};
use crate::model::TokenPair;
use tracing::{debug, instrument};

/// Exchanges authorization codes for tokens at the provider's token endpoint.
#[derive(Clone)]
pub struct TokenExchangeClient {
    http_client: reqwest::Client,
    token_endpoint: Option<String>,
    client_id: String,
    client_secret: String,
}

impl TokenExchangeClient {
    pub fn new(
        http_client: reqwest::Client,
        token_endpoint: Option<String>,
        client_id: String,
        client_secret: String,
    ) -> Self {
        Self { http_client, token_endpoint, client_id, client_secret }
    }

    /// Posts `grant_type=authorization_code` with the `code` and `redirect_uri`,
    /// authenticating with HTTP Basic `client_id:client_secret`.
    #[instrument(skip(self, code), err)]
    pub async fn exchange(&self, code: &str, redirect_uri: &str) -> Result<TokenPair, NilaOidcError> {
        let token_endpoint = self
            .token_endpoint
            .as_deref()
            .ok_or(NilaOidcError::MissingEndpoint("token_endpoint"))?;

        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];
        let response = self
            .http_client
            .post(token_endpoint)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&form)
            .send()
            .await
            .map_err(|e| transport_failure(e, NilaOidcError::TokenExchange))?;

        let tokens: TokenPair = json_or_fail(response, NilaOidcError::TokenExchange).await?;
        debug!(
            has_id_token = tokens.id_token.is_some(),
            has_access_token = tokens.access_token.is_some(),
            "Token exchange completed"
        );
        Ok(tokens)
    }
}
