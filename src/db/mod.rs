use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

pub mod models;
use models::*;

use crate::error::BotError;
use crate::fixtures::Fixture;

/// Document holding the ordered fixture list
pub const FIXTURES_KEY: &str = "fixtures";
/// Document holding participant name -> predicted table
pub const ROSTER_KEY: &str = "player_tables";
/// Document holding participant name -> {score, changes, user_id}
pub const PARTICIPANTS_KEY: &str = "player_data";

/// Key-value store of JSON documents on top of SQLite.
///
/// Documents are read and written whole. The handle is cheap to clone and
/// shares one connection behind a mutex.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the SQLite database at the given path
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("Failed to open {}", path))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection mutex poisoned"))
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> Result<()> {
        self.conn()?.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    // ── Raw documents ────────────────────────────────────────────────────────

    /// Fetch and decode a document. Missing, unreadable and undecodable
    /// documents all come back as `StoreUnavailable`.
    pub fn read_document<T: DeserializeOwned>(&self, key: &str) -> Result<T, BotError> {
        let body: Option<String> = self
            .conn()
            .map_err(|e| BotError::StoreUnavailable(e.to_string()))?
            .query_row("SELECT body FROM documents WHERE key = ?1", params![key], |row| row.get(0))
            .optional()
            .map_err(|e| BotError::StoreUnavailable(format!("{}: {}", key, e)))?;
        let body = body.ok_or_else(|| BotError::StoreUnavailable(format!("{}: no such document", key)))?;
        serde_json::from_str(&body).map_err(|e| BotError::StoreUnavailable(format!("{}: {}", key, e)))
    }

    /// Replace a document wholesale.
    pub fn write_document<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let body = serde_json::to_string_pretty(value)
            .with_context(|| format!("Failed to encode document {}", key))?;
        self.conn()?.execute(
            "INSERT INTO documents (key, body, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET body=excluded.body, updated_at=excluded.updated_at",
            params![key, body, Utc::now()],
        )?;
        Ok(())
    }

    /// Load a JSON file from disk into document `key`, checking it decodes as `T` first.
    pub fn import_file<T: DeserializeOwned + Serialize>(&self, key: &str, path: &Path) -> Result<T> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let value: T = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        self.write_document(key, &value)?;
        info!("Imported {} into '{}'", path.display(), key);
        Ok(value)
    }

    // ── Fixtures ─────────────────────────────────────────────────────────────

    /// Persisted fixture list; empty when the document is missing or corrupt.
    pub fn load_fixtures(&self) -> Vec<Fixture> {
        self.read_document(FIXTURES_KEY).unwrap_or_else(|e| {
            warn!("Using empty fixture list: {}", e);
            Vec::new()
        })
    }

    pub fn save_fixtures(&self, fixtures: &[Fixture]) -> Result<()> {
        self.write_document(FIXTURES_KEY, fixtures)
    }

    // ── Participants ─────────────────────────────────────────────────────────

    /// Participant rankings; empty when the document is missing or corrupt.
    pub fn load_roster(&self) -> Roster {
        self.read_document(ROSTER_KEY).unwrap_or_else(|e| {
            warn!("Using empty roster: {}", e);
            Roster::new()
        })
    }

    /// Participant records, extended with zeroed entries for roster names
    /// that have none yet.
    pub fn load_participant_records(&self, roster: &Roster) -> ParticipantRecords {
        let mut records: ParticipantRecords = self.read_document(PARTICIPANTS_KEY).unwrap_or_else(|e| {
            warn!("Using empty participant records: {}", e);
            ParticipantRecords::new()
        });
        let added = extend_records(&mut records, roster);
        if added > 0 {
            info!("Added {} zeroed participant record(s)", added);
        }
        records
    }

    pub fn save_participant_records(&self, records: &ParticipantRecords) -> Result<()> {
        self.write_document(PARTICIPANTS_KEY, records)
    }
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    key         TEXT    PRIMARY KEY,
    body        TEXT    NOT NULL,
    updated_at  TEXT    NOT NULL
);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{Kickoff, Prediction};

    fn db() -> Database {
        Database::open(":memory:").unwrap()
    }

    #[test]
    fn test_missing_documents_degrade_to_empty() {
        let db = db();
        assert!(db.load_fixtures().is_empty());
        assert!(db.load_roster().is_empty());
        assert!(matches!(
            db.read_document::<Vec<Fixture>>(FIXTURES_KEY),
            Err(BotError::StoreUnavailable(_))
        ));
    }

    #[test]
    fn test_corrupt_document_degrades_to_empty() {
        let db = db();
        db.write_document(FIXTURES_KEY, &serde_json::json!({"not": "a list"})).unwrap();
        assert!(db.load_fixtures().is_empty());
    }

    #[test]
    fn test_fixtures_persist_with_predictions() {
        let db = db();
        let mut f = Fixture::new("Arsenal".into(), "Chelsea".into(), Kickoff::Postponed, None, ["Alice"]);
        f.predictions.insert("Alice".into(), Prediction::Away);
        db.save_fixtures(&[f]).unwrap();

        let loaded = db.load_fixtures();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].kickoff, Kickoff::Postponed);
        assert_eq!(loaded[0].predictions.get("Alice"), Some(&Prediction::Away));
    }

    #[test]
    fn test_write_replaces_document() {
        let db = db();
        db.write_document(ROSTER_KEY, &serde_json::json!({"Alice": ["A"]})).unwrap();
        db.write_document(ROSTER_KEY, &serde_json::json!({"Bob": ["B"]})).unwrap();
        let roster = db.load_roster();
        assert_eq!(roster.keys().collect::<Vec<_>>(), vec!["Bob"]);
    }

    #[test]
    fn test_records_extended_from_roster() {
        let db = db();
        db.write_document(ROSTER_KEY, &serde_json::json!({"Alice": ["A"], "Bob": ["B"]})).unwrap();
        db.write_document(
            PARTICIPANTS_KEY,
            &serde_json::json!({"Alice": {"score": 3, "changes": 1, "user_id": 42}}),
        )
        .unwrap();

        let roster = db.load_roster();
        let records = db.load_participant_records(&roster);

        assert_eq!(records.len(), 2);
        assert_eq!(records["Alice"].user_id, 42);
        assert_eq!(records["Bob"], ParticipantRecord::default());
    }

    #[test]
    fn test_import_file() {
        let db = db();
        let path = std::env::temp_dir().join(format!("roster-import-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"Alice": ["Arsenal", "Chelsea"]}"#).unwrap();

        let imported = db.import_file::<Roster>(ROSTER_KEY, &path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(imported.len(), 1);
        assert_eq!(db.load_roster()["Alice"].len(), 2);
    }
}
