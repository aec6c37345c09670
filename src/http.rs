// src/http.rs

//! Shared response handling for the four outbound provider calls.

use crate::error::NilaOidcError;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::error;

/// Decodes a provider response, enforcing the `200 OK` + JSON body contract.
///
/// `fail` builds the call-specific error so each caller keeps its own kind.
pub(crate) async fn json_or_fail<T, F>(response: reqwest::Response, fail: F) -> Result<T, NilaOidcError>
where
    T: DeserializeOwned,
    F: Fn(String) -> NilaOidcError,
{
    let status = response.status();
    if status != StatusCode::OK {
        error!("Returned with status {}.", status.as_u16());
        return Err(fail(format!("Status code {} for {}.", status.as_u16(), response.url())));
    }

    response.json::<T>().await.map_err(|e| {
        error!("Unable to decode json: {}", e);
        fail("Was not able to retrieve data from the response.".to_string())
    })
}

/// Maps a transport failure (connect, TLS, timeout) to the call-specific error.
pub(crate) fn transport_failure<F>(e: reqwest::Error, fail: F) -> NilaOidcError
where
    F: Fn(String) -> NilaOidcError,
{
    let what = if e.is_timeout() { "timed out" } else { "failed" };
    error!("Outbound request {}: {}", what, e);
    fail(format!("Request {}: {}", what, e))
}
