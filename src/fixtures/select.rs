use chrono::{Duration, NaiveDate};

use super::model::Fixture;

/// Fixtures per outbound chat message.
pub const FIXTURES_PER_MESSAGE: usize = 4;

/// Pick the calendar day a `fixtures` request asks about.
///
/// "today" anywhere, or no "when", means today. After "when" the bot accepts
/// "tomorrow" or a `dd.mm.yyyy` date; anything else falls back to today.
pub fn requested_day(message: &str, today: NaiveDate) -> NaiveDate {
    let lower = message.to_lowercase();
    if lower.contains("today") {
        return today;
    }
    let Some(idx) = lower.find("when") else {
        return today;
    };
    let rest = lower[idx + "when".len()..].trim();
    if rest.contains("tomorrow") {
        return today + Duration::days(1);
    }
    NaiveDate::parse_from_str(rest, "%d.%m.%Y").unwrap_or(today)
}

/// Fixtures kicking off on `day`. Postponed fixtures have no day and never match.
pub fn on_day(fixtures: &[Fixture], day: NaiveDate) -> Vec<&Fixture> {
    fixtures
        .iter()
        .filter(|f| f.kickoff.date() == Some(day))
        .collect()
}

/// Render fixtures as chat messages, `FIXTURES_PER_MESSAGE` per message.
pub fn format_messages(fixtures: &[&Fixture]) -> Vec<String> {
    fixtures
        .chunks(FIXTURES_PER_MESSAGE)
        .map(|chunk| {
            chunk
                .iter()
                .map(|f| format!("{}\n\n", f))
                .collect::<String>()
        })
        .collect()
}
