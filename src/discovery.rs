// src/discovery.rs

use crate::config::Config;
use crate::error::NilaOidcError;
use crate::http::{json_or_fail, transport_failure};
use crate::model::EndpointSet;
use tracing::{debug, instrument};

/// Loads the provider's endpoint set from its well-known discovery document.
///
/// This is a one-shot fetch: the result is held for the lifetime of the
/// owning client and never refreshed.
#[instrument(skip(http_client, config), fields(realm = %config.realm), err)]
pub async fn load_endpoints(http_client: &reqwest::Client, config: &Config) -> Result<EndpointSet, NilaOidcError> {
    let discovery_url = config.discovery_url()?;
    debug!("Performing OIDC discovery at: {}", discovery_url);

    let response = http_client
        .get(discovery_url)
        .send()
        .await
        .map_err(|e| transport_failure(e, NilaOidcError::Discovery))?;
    let endpoints: EndpointSet = json_or_fail(response, NilaOidcError::Discovery).await?;

    debug!(
        issuer = ?endpoints.issuer,
        has_jwks_uri = endpoints.jwks_uri.is_some(),
        "Discovered provider endpoints"
    );
    Ok(endpoints)
}
