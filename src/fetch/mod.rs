//! HTTP plumbing for remote sources.
//!
//! [`HttpClient`] is the seam; [`auth`] wraps a client to attach credentials.

mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use tracing::debug;

use crate::error::IngestError;

/// GETs `url` and returns the body. Any transport failure or non-success
/// status is reported as [`IngestError::SourceUnavailable`].
///
/// The request URL is stripped from transport errors since auth wrappers may
/// have put a credential in its query string.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>, IngestError> {
    let req = reqwest::Request::new(
        reqwest::Method::GET,
        url.parse().map_err(IngestError::unavailable)?,
    );

    let resp = client
        .execute(req)
        .await
        .map_err(|e| IngestError::unavailable(e.without_url()))?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(IngestError::SourceUnavailable(format!(
            "HTTP {status}: {body}"
        )));
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| IngestError::unavailable(e.without_url()))?;
    debug!(bytes = bytes.len(), "Source bytes received");
    Ok(bytes.to_vec())
}
