// src/error.rs

use thiserror::Error;

/// The primary error type for the `nila-oidc-gate` library.
///
/// Every failure of the login flow is one of these variants. Messages carry
/// the error kind and a short description, never token material.
#[derive(Debug, Error)]
pub enum NilaOidcError {
    /// The discovery document could not be fetched or decoded. Fatal at construction.
    #[error("OIDC discovery failed: {0}")]
    Discovery(String),

    /// The authorization code could not be exchanged for tokens.
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    /// The JSON Web Key Set could not be fetched or decoded.
    #[error("JWKS fetch failed: {0}")]
    KeyFetch(String),

    /// The signing key for a token could not be selected.
    #[error("Signing key could not be resolved: {0}")]
    KeyResolution(String),

    /// The token header declares an algorithm this client refuses to verify.
    #[error("Unsupported jwt algorithm found: {0}")]
    UnsupportedAlgorithm(String),

    /// Signature, audience, issuer, or time-based claim verification failed.
    #[error("ID token validation failed: {0}")]
    TokenValidation(String),

    /// The user-info record could not be fetched or decoded.
    #[error("User info fetch failed: {0}")]
    UserInfoFetch(String),

    /// The validated token and the user-info record name different subjects.
    #[error("Subject mismatch error")]
    SubjectMismatch,

    /// A required configuration field is missing.
    #[error("A required configuration field is missing: {0}")]
    MissingConfiguration(String),

    /// A provided URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The provider did not announce an endpoint the flow needs.
    #[error("The provider did not announce a '{0}'")]
    MissingEndpoint(&'static str),

    /// The HTTP client could not be constructed.
    #[error("HTTP client could not be constructed: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl NilaOidcError {
    /// A stable, machine-friendly name for the error kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Discovery(_) => "discovery_error",
            Self::TokenExchange(_) => "token_exchange_error",
            Self::KeyFetch(_) => "key_fetch_error",
            Self::KeyResolution(_) => "key_resolution_error",
            Self::UnsupportedAlgorithm(_) => "unsupported_algorithm_error",
            Self::TokenValidation(_) => "token_validation_error",
            Self::UserInfoFetch(_) => "user_info_fetch_error",
            Self::SubjectMismatch => "subject_mismatch_error",
            Self::MissingConfiguration(_) => "missing_configuration",
            Self::InvalidUrl(_) => "invalid_url",
            Self::MissingEndpoint(_) => "missing_endpoint",
            Self::HttpClient(_) => "http_client_error",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for NilaOidcError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        let message = match e.kind() {
            ErrorKind::InvalidSignature => "Invalid signature".to_string(),
            ErrorKind::InvalidAudience => "Invalid audience".to_string(),
            ErrorKind::InvalidIssuer => "Invalid issuer".to_string(),
            ErrorKind::ExpiredSignature => "Token expired".to_string(),
            ErrorKind::ImmatureSignature => "Token not yet valid".to_string(),
            ErrorKind::MissingRequiredClaim(claim) => format!("Missing required claim '{}'", claim),
            ErrorKind::InvalidToken => "Invalid token".to_string(),
            _ => e.to_string(),
        };
        NilaOidcError::TokenValidation(message)
    }
}
