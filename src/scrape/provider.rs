use anyhow::Result;
use async_trait::async_trait;

/// Source of raw fixture card texts, one string per card.
#[async_trait]
pub trait FixtureSource: Send + Sync {
    async fn fetch_fixture_cards(&self) -> Result<Vec<String>>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Source of the real league table as team names, top of the table first.
#[async_trait]
pub trait TableSource: Send + Sync {
    async fn fetch_table(&self) -> Result<Vec<String>>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
