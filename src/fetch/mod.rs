//! Report page retrieval.

mod client;
mod basic;
pub mod auth;

pub use client::HttpClient;
pub use basic::BasicClient;

use anyhow::{Result, bail};
use tracing::debug;

pub async fn fetch_bytes<C: HttpClient>(
    client: &C,
    url: &str,
) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(
        reqwest::Method::GET,
        url.parse()?,
    );

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        bail!("GET {} returned status {}", url, status);
    }
    Ok(resp.bytes().await?.to_vec())
}

/// Fetches `url` and decodes the body as UTF-8 (invalid sequences replaced).
pub async fn fetch_text<C: HttpClient>(client: &C, url: &str) -> Result<String> {
    let bytes = fetch_bytes(client, url).await?;
    debug!(url, bytes = bytes.len(), "Fetched page");
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
