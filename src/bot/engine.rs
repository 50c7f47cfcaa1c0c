use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::db::models::participant_by_user_id;
use crate::db::Database;
use crate::error::BotError;
use crate::fixtures::select::{format_messages, on_day};
use crate::fixtures::{parse_cards, reconcile, Fixture, Prediction};
use crate::scoring::{build_participants, score_participant};
use crate::scrape::{FixtureSource, TableSource};

use super::command::{parse_command, Command, HELP_TEXT};

/// Reply sent whenever a command fails on a store or scrape error.
pub const UNAVAILABLE_NOTICE: &str = "Service temporarily unavailable, please try again later.";
/// Prepended to fixture listings built without a fresh scrape.
pub const STALE_FIXTURES_NOTICE: &str = "Live fixtures are temporarily unavailable; showing saved fixtures.";
const NOT_REGISTERED_NOTICE: &str = "You are not registered as a participant. Use: register <name>";

/// Turns inbound chat texts into reply texts.
///
/// Every read → modify → write of a stored document happens under
/// `store_lock`, so concurrent handlers cannot lose each other's updates.
pub struct BotEngine {
    db: Database,
    fixture_source: Arc<dyn FixtureSource>,
    table_source: Arc<dyn TableSource>,
    change_penalty: i64,
    store_lock: Mutex<()>,
}

impl BotEngine {
    pub fn new(
        db: Database,
        fixture_source: Arc<dyn FixtureSource>,
        table_source: Arc<dyn TableSource>,
        change_penalty: i64,
    ) -> Self {
        BotEngine {
            db,
            fixture_source,
            table_source,
            change_penalty,
            store_lock: Mutex::new(()),
        }
    }

    /// Handle one chat message from `user_id`. Returns the replies to send,
    /// empty for messages the bot ignores.
    pub async fn handle_message(&self, user_id: i64, text: &str, today: NaiveDate) -> Vec<String> {
        let Some(command) = parse_command(text, today) else {
            return vec![];
        };
        info!(user_id, ?command, "Handling command");

        let outcome = match command {
            Command::Score => self.score_update(today).await,
            Command::Fixtures { day } => self.list_fixtures(day, today).await,
            Command::Bet { fixture_id, pick } => self.place_bet(user_id, &fixture_id, pick).await,
            Command::Register { name } => self.register(user_id, &name).await,
            Command::Help => Ok(vec![HELP_TEXT.to_string()]),
        };

        match outcome {
            Ok(replies) => replies,
            Err(e) => match e.downcast_ref::<BotError>() {
                Some(BotError::UnknownParticipant(id)) => {
                    info!(user_id = *id, "Ignoring command from unknown participant");
                    vec![NOT_REGISTERED_NOTICE.to_string()]
                }
                _ => {
                    error!("Command failed: {:#}", e);
                    vec![UNAVAILABLE_NOTICE.to_string()]
                }
            },
        }
    }

    /// Scrape the real table, rescore every participant and persist the scores.
    async fn score_update(&self, today: NaiveDate) -> Result<Vec<String>> {
        let table = self.table_source.fetch_table().await?;
        info!("{} returned {} teams", self.table_source.name(), table.len());

        let _guard = self.store_lock.lock().await;
        let roster = self.db.load_roster();
        if roster.is_empty() {
            return Ok(vec!["No participants registered yet.".to_string()]);
        }
        let mut records = self.db.load_participant_records(&roster);

        let reports: Vec<_> = build_participants(&roster, &records)
            .iter()
            .map(|p| score_participant(p, &table, self.change_penalty))
            .collect();
        for report in &reports {
            if let Some(record) = records.get_mut(&report.name) {
                record.score = report.score;
            }
        }
        self.db.save_participant_records(&records)?;

        let mut text = format!("Update {}\n\n", today.format("%d.%m.%Y"));
        for report in &reports {
            text.push_str(&report.to_message());
        }
        Ok(vec![text])
    }

    /// Scrape, merge into the stored fixture list and persist it. The flag is
    /// false when the scrape failed and only stored fixtures are returned.
    pub async fn refresh_fixtures(&self, today: NaiveDate) -> Result<(Vec<Fixture>, bool)> {
        let (cards, fresh) = match self.fixture_source.fetch_fixture_cards().await {
            Ok(cards) => (cards, true),
            Err(e) => {
                warn!("{} scrape failed: {:#}", self.fixture_source.name(), e);
                (vec![], false)
            }
        };

        let roster = self.db.load_roster();
        let names: Vec<String> = roster.keys().cloned().collect();
        let scraped = parse_cards(&cards, today, &names);
        if cards.len() != scraped.len() {
            warn!("Parsed {} of {} fixture cards", scraped.len(), cards.len());
        }

        let _guard = self.store_lock.lock().await;
        let merged = reconcile(self.db.load_fixtures(), scraped);
        self.db.save_fixtures(&merged)?;
        info!("Stored {} fixtures", merged.len());
        Ok((merged, fresh))
    }

    async fn list_fixtures(&self, day: NaiveDate, today: NaiveDate) -> Result<Vec<String>> {
        let (fixtures, fresh) = self.refresh_fixtures(today).await?;

        let mut replies = Vec::new();
        if !fresh {
            replies.push(STALE_FIXTURES_NOTICE.to_string());
        }
        let selected = on_day(&fixtures, day);
        if selected.is_empty() {
            replies.push(format!("No fixtures on {}.", day.format("%d.%m.%Y")));
        } else {
            replies.extend(format_messages(&selected));
        }
        Ok(replies)
    }

    /// Record `pick` for the sender on a stored fixture that has no result yet.
    async fn place_bet(&self, user_id: i64, fixture_id: &str, pick: Prediction) -> Result<Vec<String>> {
        let _guard = self.store_lock.lock().await;
        let roster = self.db.load_roster();
        let records = self.db.load_participant_records(&roster);
        let name = participant_by_user_id(&records, user_id)
            .ok_or(BotError::UnknownParticipant(user_id))?
            .to_string();

        let mut fixtures = self.db.load_fixtures();
        let Some(fixture) = fixtures.iter_mut().find(|f| f.id == fixture_id) else {
            return Ok(vec![format!("No fixture with id {}.", fixture_id)]);
        };
        if fixture.result.is_some() {
            return Ok(vec![format!(
                "Betting is closed for {} vs {}.",
                fixture.home_team, fixture.away_team
            )]);
        }
        fixture.predictions.insert(name.clone(), pick);
        let reply = fixture.bet_string(&name);
        self.db.save_fixtures(&fixtures)?;
        info!(participant = %name, fixture_id, pick = pick.as_str(), "Bet recorded");
        Ok(vec![reply])
    }

    /// Bind the sender's user id to an unclaimed roster name.
    async fn register(&self, user_id: i64, name: &str) -> Result<Vec<String>> {
        let _guard = self.store_lock.lock().await;
        let roster = self.db.load_roster();
        let mut records = self.db.load_participant_records(&roster);

        if let Some(existing) = participant_by_user_id(&records, user_id) {
            return Ok(vec![format!("You are already registered as {}.", existing)]);
        }
        let Some(record) = records.get_mut(name) else {
            return Ok(vec![format!("{} is not a participant.", name)]);
        };
        if record.user_id != 0 {
            return Ok(vec![format!("{} is already taken.", name)]);
        }
        record.user_id = user_id;
        self.db.save_participant_records(&records)?;
        info!(participant = %name, user_id, "Participant registered");
        Ok(vec![format!("Registered as {}.", name)])
    }
}
