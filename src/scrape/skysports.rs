use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use tracing::debug;

use super::provider::TableSource;
use super::{fetch_page, http_client, selector};

/// Trailing statistic columns after the team name (played .. form).
const STAT_COLUMNS: usize = 9;

/// League table scraped from a Sky Sports table page.
pub struct SkySports {
    http: Client,
    url: String,
}

impl SkySports {
    pub fn new(url: &str) -> Result<Self> {
        Ok(SkySports {
            http: http_client()?,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl TableSource for SkySports {
    fn name(&self) -> &str {
        "SkySports"
    }

    async fn fetch_table(&self) -> Result<Vec<String>> {
        debug!("Fetching league table from {}", self.url);
        let html = fetch_page(&self.http, &self.url).await?;
        let table = extract_team_column(&html)?;
        if table.is_empty() {
            anyhow::bail!("{} table has no team rows", self.name());
        }
        Ok(table)
    }
}

/// Team names from the first table on the page, in table order. The header
/// row is skipped; each data row drops the position cell and the statistic
/// columns.
pub fn extract_team_column(html: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("td")?;

    let Some(table) = document.select(&table_sel).next() else {
        return Ok(vec![]);
    };

    let mut teams = Vec::new();
    for row in table.select(&row_sel).skip(1) {
        let cells: Vec<String> = row
            .select(&cell_sel)
            .map(|c| c.text().collect::<Vec<_>>().join(" "))
            .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
            .collect();
        let end = cells.len().saturating_sub(STAT_COLUMNS);
        if end > 1 {
            teams.extend(cells[1..end].iter().filter(|t| !t.is_empty()).cloned());
        }
    }
    Ok(teams)
}
