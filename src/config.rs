use clap::Parser;
use std::path::PathBuf;

/// Premier League prediction bot
#[derive(Parser, Debug, Clone)]
#[command(name = "premier-predictor-bot", version, about)]
pub struct Config {
    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub telegram_bot_token: String,

    /// Telegram Bot API base URL
    #[arg(long, env = "TELEGRAM_API_URL", default_value = "https://api.telegram.org")]
    pub telegram_api_url: String,

    /// getUpdates long-poll timeout in seconds
    #[arg(long, env = "POLL_TIMEOUT_SECS", default_value = "30")]
    pub poll_timeout_secs: u64,

    /// SQLite database path
    #[arg(long, env = "DATABASE_PATH", default_value = "predictor.db")]
    pub database_path: String,

    /// Fixtures page to scrape
    #[arg(
        long,
        env = "FIXTURES_URL",
        default_value = "https://onefootball.com/en/competition/premier-league-9/fixtures"
    )]
    pub fixtures_url: String,

    /// League table page to scrape
    #[arg(
        long,
        env = "TABLE_URL",
        default_value = "https://www.skysports.com/premier-league-table"
    )]
    pub table_url: String,

    /// Dashboard listen address
    #[arg(long, env = "DASHBOARD_ADDR", default_value = "0.0.0.0:8080")]
    pub dashboard_addr: String,

    /// Points added per ranking change made after submission
    #[arg(long, env = "CHANGE_PENALTY", default_value = "1")]
    pub change_penalty: i64,

    /// JSON file of participant name -> predicted table, imported at startup
    #[arg(long, env = "RANKINGS_FILE")]
    pub rankings_file: Option<PathBuf>,

    /// JSON file of participant name -> {score, changes, user_id}, imported at startup
    #[arg(long, env = "PARTICIPANTS_FILE")]
    pub participants_file: Option<PathBuf>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.telegram_bot_token.trim().is_empty() {
            anyhow::bail!("TELEGRAM_BOT_TOKEN must not be empty");
        }
        for (name, value) in [
            ("telegram_api_url", &self.telegram_api_url),
            ("fixtures_url", &self.fixtures_url),
            ("table_url", &self.table_url),
        ] {
            url::Url::parse(value).map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", name, e))?;
        }
        if !(1..=50).contains(&self.poll_timeout_secs) {
            anyhow::bail!("poll_timeout_secs must be between 1 and 50");
        }
        if self.change_penalty < 0 {
            anyhow::bail!("change_penalty must not be negative");
        }
        Ok(())
    }
}
