// src/gate.rs

//! Request gating: redirect to the provider's login, or admit with an identity.
//!
//! A request without a `code` is sent to the authorization endpoint. A request
//! with one runs the full flow; any failure is logged and answered with the
//! same redirect, so a caller can never tell a failed login from no login.

use crate::client::{Identity, OidcClient};
use crate::error::NilaOidcError;
use std::future::Future;
use tracing::{debug, instrument, warn};
use url::{Position, Url};

/// A framework-neutral view of an inbound request to a protected resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
    url: Url,
}

impl InboundRequest {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    /// Parses the full request URL, e.g. `http://localhost:5000/login?code=abc`.
    pub fn parse(raw: &str) -> Result<Self, NilaOidcError> {
        Url::parse(raw)
            .map(Self::new)
            .map_err(|e| NilaOidcError::InvalidUrl(e.to_string()))
    }

    /// Builds the request from the pieces a server router hands over.
    pub fn from_parts(scheme: &str, authority: &str, path_and_query: &str) -> Result<Self, NilaOidcError> {
        Self::parse(&format!("{}://{}{}", scheme, authority, path_and_query))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// `scheme://authority/path`, without the query. This is the redirect URI
    /// the provider sends the user back to. Userinfo and a non-default port are
    /// kept; a port equal to the scheme's default is normalized away by `Url`.
    pub fn callback_uri(&self) -> String {
        self.url[..Position::AfterPath].to_string()
    }

    /// The authorization `code` query parameter. When it is repeated the last
    /// value wins. Empty values count as absent.
    pub fn code(&self) -> Option<String> {
        self.url
            .query_pairs()
            .filter(|(name, _)| name == "code")
            .last()
            .map(|(_, value)| value.into_owned())
            .filter(|code| !code.is_empty())
    }
}

/// The gate's answer for one inbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// Send the user to the provider's login page.
    Redirect(Url),
    /// Let the request through with the resolved identity.
    Admit(Identity),
}

/// A request that passed the gate, carrying the identity attached to it.
#[derive(Debug, Clone)]
pub struct AuthenticatedRequest {
    pub request: InboundRequest,
    pub identity: Identity,
}

/// The outcome of calling a [`LoginRequired`] handler.
#[derive(Debug)]
pub enum Gated<R> {
    Redirect(Url),
    Handled(R),
}

impl OidcClient {
    /// Decides whether `request` is redirected to login or admitted.
    ///
    /// # Errors
    ///
    /// Only fails when no redirect can be built at all (the provider announced
    /// no usable authorization endpoint). Authentication failures are never
    /// returned; they turn into a redirect.
    #[instrument(skip(self, request), fields(path = %request.url().path()))]
    pub async fn admit(
        &self,
        request: &InboundRequest,
        resolve_identity: bool,
    ) -> Result<GateDecision, NilaOidcError> {
        let callback_uri = request.callback_uri();

        let Some(code) = request.code() else {
            debug!("No authorization code, redirecting to login");
            return Ok(GateDecision::Redirect(self.authorization_url(&callback_uri)?));
        };

        match self.authenticate(&code, &callback_uri, resolve_identity).await {
            Ok(identity) => {
                debug!(sub = ?identity.subject(), "Request admitted");
                Ok(GateDecision::Admit(identity))
            }
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "Authentication failed, redirecting to login");
                Ok(GateDecision::Redirect(self.authorization_url(&callback_uri)?))
            }
        }
    }

    /// Wraps a protected handler so it only runs for authenticated requests.
    pub fn require_login<H>(&self, handler: H) -> LoginRequired<H> {
        LoginRequired { client: self.clone(), handler, resolve_identity: false }
    }
}

/// A protected handler behind the login gate. Built by [`OidcClient::require_login`].
#[derive(Clone)]
pub struct LoginRequired<H> {
    client: OidcClient,
    handler: H,
    resolve_identity: bool,
}

impl<H> LoginRequired<H> {
    /// Resolves and cross-checks the user-info record before admitting, and
    /// attaches it instead of the token claims.
    pub fn with_user_info(mut self) -> Self {
        self.resolve_identity = true;
        self
    }
}

impl<H, Fut, R> LoginRequired<H>
where
    H: Fn(AuthenticatedRequest) -> Fut,
    Fut: Future<Output = R>,
{
    /// Runs the gate for `request` and, when admitted, the wrapped handler.
    pub async fn call(&self, request: InboundRequest) -> Result<Gated<R>, NilaOidcError> {
        match self.client.admit(&request, self.resolve_identity).await? {
            GateDecision::Redirect(url) => Ok(Gated::Redirect(url)),
            GateDecision::Admit(identity) => {
                let output = (self.handler)(AuthenticatedRequest { request, identity }).await;
                Ok(Gated::Handled(output))
            }
        }
    }
}
