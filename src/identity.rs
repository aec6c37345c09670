// src/identity.rs

use crate::error::NilaOidcError;
use crate::http::{json_or_fail, transport_failure};
use crate::model::UserInfoRecord;
use crate::validator::model::ValidatedClaims;
use tracing::{debug, instrument, warn};

/// Fetches user-info records and cross-checks them against validated tokens.
#[derive(Clone)]
pub struct IdentityResolver {
    http_client: reqwest::Client,
    userinfo_endpoint: Option<String>,
}

impl IdentityResolver {
    pub fn new(http_client: reqwest::Client, userinfo_endpoint: Option<String>) -> Self {
        Self { http_client, userinfo_endpoint }
    }

    /// Fetches the user-info record with the access token as a bearer credential.
    #[instrument(skip(self, access_token), err)]
    pub async fn fetch_user_info(&self, access_token: &str) -> Result<UserInfoRecord, NilaOidcError> {
        let userinfo_endpoint = self
            .userinfo_endpoint
            .as_deref()
            .ok_or(NilaOidcError::MissingEndpoint("userinfo_endpoint"))?;

        let response = self
            .http_client
            .get(userinfo_endpoint)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| transport_failure(e, NilaOidcError::UserInfoFetch))?;
        let record: UserInfoRecord = json_or_fail(response, NilaOidcError::UserInfoFetch).await?;
        debug!("Fetched user info with {} claims", record.0.len());
        Ok(record)
    }
}

/// Fails with `SubjectMismatch` unless both records carry the same non-empty `sub`.
///
/// Guards against a validly signed token for one subject being paired with
/// the user-info of another.
pub fn match_subjects(claims: &ValidatedClaims, user_info: &UserInfoRecord) -> Result<(), NilaOidcError> {
    match (claims.subject(), user_info.subject()) {
        (Some(token_sub), Some(info_sub)) if token_sub == info_sub => Ok(()),
        _ => {
            warn!("Subject mismatch error.");
            Err(NilaOidcError::SubjectMismatch)
        }
    }
}
