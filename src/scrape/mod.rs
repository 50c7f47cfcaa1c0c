pub mod onefootball;
pub mod provider;
pub mod skysports;

pub use onefootball::OneFootball;
pub use provider::{FixtureSource, TableSource};
pub use skysports::SkySports;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use scraper::Selector;
use std::time::Duration;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// HTTP client shared by the page scrapers.
pub fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(15))
        .build()
        .context("Failed to build HTTP client")
}

/// Fetch a page body, failing on non-success statuses.
pub async fn fetch_page(http: &Client, url: &str) -> Result<String> {
    let resp = http
        .get(url)
        .send()
        .await
        .with_context(|| format!("Request to {} failed", url))?;
    if !resp.status().is_success() {
        anyhow::bail!("{} returned {}", url, resp.status());
    }
    resp.text().await.context("Failed to read page body")
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {:?}: {}", css, e))
}
