//! HTTP endpoint discovery.
//!
//! Chrome exposes a small HTTP surface next to the WebSocket endpoint;
//! these helpers fetch the browser version (which carries the WebSocket
//! URL) and the list of debuggable pages.

use tracing::debug;

use crate::error::CdpError;
use crate::protocol::{BrowserVersion, PageInfo};

/// Fetch browser version info from `<endpoint>/json/version`.
pub async fn fetch_version(endpoint: &str) -> Result<BrowserVersion, CdpError> {
    let url = format!("{}/json/version", endpoint.trim_end_matches('/'));
    debug!("fetching browser version from {}", url);

    let version: BrowserVersion = reqwest::get(&url)
        .await
        .map_err(|e| CdpError::BrowserNotAvailable(format!("{}: {}", endpoint, e)))?
        .json()
        .await
        .map_err(|e| CdpError::BrowserNotAvailable(format!("{}: {}", endpoint, e)))?;

    Ok(version)
}

/// Fetch the debuggable page list from `<endpoint>/json/list`.
pub async fn fetch_pages(endpoint: &str) -> Result<Vec<PageInfo>, CdpError> {
    let url = format!("{}/json/list", endpoint.trim_end_matches('/'));
    let pages: Vec<PageInfo> = reqwest::get(&url).await?.json().await?;
    debug!("discovered {} debuggable targets", pages.len());
    Ok(pages)
}
