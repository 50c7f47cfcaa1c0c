use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod bot;
mod config;
mod dashboard;
mod db;
mod error;
mod fixtures;
mod scoring;
mod scrape;
mod telegram;

use bot::BotEngine;
use config::Config;
use dashboard::AppState;
use db::models::{ParticipantRecords, Roster};
use db::{Database, PARTICIPANTS_KEY, ROSTER_KEY};
use scrape::{OneFootball, SkySports};
use telegram::TelegramClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    // Open database
    let db = Database::open(&config.database_path)?;
    info!("Database opened: {}", config.database_path);

    if let Some(path) = &config.rankings_file {
        let roster: Roster = db.import_file(ROSTER_KEY, path)?;
        info!("Roster has {} participant(s)", roster.len());
    }
    if let Some(path) = &config.participants_file {
        let records: ParticipantRecords = db.import_file(PARTICIPANTS_KEY, path)?;
        info!("Loaded {} participant record(s)", records.len());
    }

    let engine = Arc::new(BotEngine::new(
        db.clone(),
        Arc::new(OneFootball::new(&config.fixtures_url)?),
        Arc::new(SkySports::new(&config.table_url)?),
        config.change_penalty,
    ));

    // Start the dashboard HTTP server
    let app = dashboard::router(AppState { db: db.clone() });
    let addr: SocketAddr = config.dashboard_addr.parse()?;
    info!("Dashboard listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Telegram polling in its own task
    let telegram = TelegramClient::new(
        &config.telegram_api_url,
        &config.telegram_bot_token,
        Duration::from_secs(config.poll_timeout_secs),
    )?;
    tokio::spawn(telegram::run_polling(telegram, engine, config.poll_timeout_secs));

    // Run dashboard server (blocks until shutdown)
    axum::serve(listener, app).await?;

    Ok(())
}
