// src/lib.rs

pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod exchange;
pub mod gate;
mod http;
pub mod identity;
pub mod model;
pub mod validator;

/// The public prelude for the `nila-oidc-gate` crate.
///
/// This module re-exports the most commonly used types for convenience.
pub mod prelude {
    pub use crate::client::{Identity, OidcClient};
    pub use crate::config::{ClientSettings, Config, ConfigBuilder};
    pub use crate::error::NilaOidcError;
    pub use crate::gate::{AuthenticatedRequest, GateDecision, Gated, InboundRequest, LoginRequired};
    pub use crate::identity::match_subjects;
    pub use crate::model::{EndpointSet, TokenPair, UserInfoRecord};
    pub use crate::validator::model::{UnverifiedHeader, ValidatedClaims};
    pub use crate::validator::{SigningAlgorithm, Validator};
}
