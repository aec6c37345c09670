// src/config.rs

use crate::error::NilaOidcError;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use url::Url;

/// The scope requested when none is configured.
pub const DEFAULT_SCOPE: &str = "openid email profile";

/// Timeout applied to every outbound call (discovery, token, JWKS, user-info).
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Clock skew tolerance for `exp` and `nbf`.
pub const DEFAULT_LEEWAY: Duration = Duration::from_secs(60);

/// The main configuration for the login gate.
///
/// Holds the provider location, the client credentials registered with the
/// provider, and the validation settings. It should be constructed using the
/// `ConfigBuilder` and is read-only once the client is connected.
#[derive(Clone)]
pub struct Config {
    /// Base URL of the provider, e.g. `http://localhost:8080`.
    pub host: Url,
    /// The realm (tenant) whose discovery document is loaded.
    pub realm: String,
    /// The client ID registered with the provider. Tokens must carry it as `aud`.
    pub client_id: String,
    /// The client secret. Used for HTTP Basic authentication at the token
    /// endpoint and as the HS256 verification key.
    pub client_secret: String,
    /// Space-separated scopes requested in the authorization redirect.
    pub scope: String,
    /// Timeout for every outbound HTTP call.
    pub http_timeout: Duration,
    /// The tolerance for clock skew when validating time-based claims.
    pub leeway: Duration,
    /// Whether the `iss` claim must equal the discovered issuer.
    pub validate_issuer: bool,
}

impl Config {
    /// The well-known discovery URL for the configured host and realm.
    pub fn discovery_url(&self) -> Result<Url, NilaOidcError> {
        let raw = format!(
            "{}/auth/realms/{}/.well-known/openid-configuration",
            self.host.as_str().trim_end_matches('/'),
            self.realm
        );
        Url::parse(&raw).map_err(|e| NilaOidcError::InvalidUrl(e.to_string()))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host.as_str())
            .field("realm", &self.realm)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scope", &self.scope)
            .field("http_timeout", &self.http_timeout)
            .field("leeway", &self.leeway)
            .field("validate_issuer", &self.validate_issuer)
            .finish()
    }
}

/// A builder for creating a `Config` instance.
///
/// This builder provides a fluent API to ensure that the configuration is
/// constructed correctly and with all required fields.
#[derive(Default)]
pub struct ConfigBuilder {
    host: Option<Url>,
    realm: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    scope: Option<String>,
    http_timeout: Option<Duration>,
    leeway: Option<Duration>,
    validate_issuer: bool,
}

impl ConfigBuilder {
    /// Creates a new `ConfigBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the provider base URL. This is a required field.
    ///
    /// # Arguments
    ///
    /// * `url` - The provider host, e.g., "http://localhost:8080".
    pub fn host(mut self, url: &str) -> Result<Self, NilaOidcError> {
        let parsed_url = Url::parse(url).map_err(|e| NilaOidcError::InvalidUrl(e.to_string()))?;
        self.host = Some(parsed_url);
        Ok(self)
    }

    /// Sets the realm. This is a required field.
    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    /// Sets the client ID of the application. This is a required field.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Sets the client secret. This is a required field.
    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Sets the requested scope. Defaults to `"openid email profile"`.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Sets the timeout applied to every outbound call. Defaults to 10 seconds.
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    /// Sets the clock skew tolerance. Defaults to 60 seconds.
    pub fn leeway(mut self, leeway: Duration) -> Self {
        self.leeway = Some(leeway);
        self
    }

    /// Requires the `iss` claim to match the discovered issuer.
    pub fn validate_issuer(mut self, validate: bool) -> Self {
        self.validate_issuer = validate;
        self
    }

    /// Consumes the builder and returns a `Config` object.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field (`host`, `realm`, `client_id`,
    /// `client_secret`) is missing.
    pub fn build(self) -> Result<Config, NilaOidcError> {
        let host = self.host.ok_or(NilaOidcError::MissingConfiguration("host".to_string()))?;
        let realm = self.realm.ok_or(NilaOidcError::MissingConfiguration("realm".to_string()))?;
        let client_id = self.client_id.ok_or(NilaOidcError::MissingConfiguration("client_id".to_string()))?;
        let client_secret = self
            .client_secret
            .ok_or(NilaOidcError::MissingConfiguration("client_secret".to_string()))?;

        Ok(Config {
            host,
            realm,
            client_id,
            client_secret,
            scope: self.scope.unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            http_timeout: self.http_timeout.unwrap_or(DEFAULT_HTTP_TIMEOUT),
            leeway: self.leeway.unwrap_or(DEFAULT_LEEWAY),
            validate_issuer: self.validate_issuer,
        })
    }
}

/// Serializable settings for hosts that load the client configuration from a file.
#[derive(Debug, Deserialize)]
pub struct ClientSettings {
    pub host: String,
    pub realm: String,
    pub client_id: String,
    pub client_secret: String,
    pub scope: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub leeway_seconds: Option<u64>,
    #[serde(default)]
    pub validate_issuer: bool,
}

impl TryFrom<ClientSettings> for Config {
    type Error = NilaOidcError;

    fn try_from(settings: ClientSettings) -> Result<Self, Self::Error> {
        let mut builder = ConfigBuilder::new()
            .host(&settings.host)?
            .realm(settings.realm)
            .client_id(settings.client_id)
            .client_secret(settings.client_secret)
            .validate_issuer(settings.validate_issuer);

        if let Some(scope) = settings.scope {
            builder = builder.scope(scope);
        }
        if let Some(secs) = settings.timeout_seconds {
            builder = builder.http_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = settings.leeway_seconds {
            builder = builder.leeway(Duration::from_secs(secs));
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
            .host("http://localhost:8080/")
            .unwrap()
            .realm("myrealm")
            .client_id("myclient")
            .client_secret("s3cret")
    }

    #[test]
    fn defaults_are_applied() {
        let config = builder().build().unwrap();
        assert_eq!(config.scope, DEFAULT_SCOPE);
        assert_eq!(config.http_timeout, DEFAULT_HTTP_TIMEOUT);
        assert_eq!(config.leeway, DEFAULT_LEEWAY);
        assert!(!config.validate_issuer);
    }

    #[test]
    fn discovery_url_follows_realm_layout() {
        let config = builder().build().unwrap();
        assert_eq!(
            config.discovery_url().unwrap().as_str(),
            "http://localhost:8080/auth/realms/myrealm/.well-known/openid-configuration"
        );
    }

    #[test]
    fn missing_secret_is_rejected() {
        let result = ConfigBuilder::new()
            .host("http://localhost:8080")
            .unwrap()
            .realm("myrealm")
            .client_id("myclient")
            .build();
        assert!(matches!(result, Err(NilaOidcError::MissingConfiguration(f)) if f == "client_secret"));
    }

    #[test]
    fn invalid_host_is_rejected() {
        assert!(matches!(ConfigBuilder::new().host("not a url"), Err(NilaOidcError::InvalidUrl(_))));
    }

    #[test]
    fn debug_output_redacts_secret() {
        let rendered = format!("{:?}", builder().build().unwrap());
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }
}
