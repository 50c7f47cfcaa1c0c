use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use tracing::debug;

use super::provider::FixtureSource;
use super::{fetch_page, http_client, selector};

const MATCH_CARD: &str = "li.simple-match-cards-list__match-card";

/// Fixture cards scraped from a OneFootball competition fixtures page.
pub struct OneFootball {
    http: Client,
    url: String,
}

impl OneFootball {
    pub fn new(url: &str) -> Result<Self> {
        Ok(OneFootball {
            http: http_client()?,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl FixtureSource for OneFootball {
    fn name(&self) -> &str {
        "OneFootball"
    }

    async fn fetch_fixture_cards(&self) -> Result<Vec<String>> {
        debug!("Fetching fixtures from {}", self.url);
        let html = fetch_page(&self.http, &self.url).await?;
        let cards = extract_match_cards(&html)?;
        debug!("Extracted {} fixture cards", cards.len());
        Ok(cards)
    }
}

/// Concatenated text of every match card, trimmed. The layout whitespace
/// between text nodes is kept; the fixture parser splits on it.
pub fn extract_match_cards(html: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let card = selector(MATCH_CARD)?;
    Ok(document
        .select(&card)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect())
}
