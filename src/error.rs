use thiserror::Error;

/// Failures the bot degrades on instead of crashing.
#[derive(Debug, Error)]
pub enum BotError {
    /// A scraped fixture card did not match any known layout.
    #[error("malformed fixture text {line:?}: {reason}")]
    MalformedFixtureText { line: String, reason: &'static str },

    /// A persisted document is missing, unreadable or not valid JSON.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// The chat user id is not bound to any roster participant.
    #[error("unknown participant (user id {0})")]
    UnknownParticipant(i64),
}

impl BotError {
    pub fn malformed(line: &str, reason: &'static str) -> Self {
        BotError::MalformedFixtureText {
            line: line.to_string(),
            reason,
        }
    }
}
