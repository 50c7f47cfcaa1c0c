pub mod model;
pub mod parser;
pub mod reconcile;
pub mod select;

pub use model::{Fixture, Kickoff, Prediction};
pub use parser::parse_fixture;
pub use reconcile::reconcile;

use chrono::NaiveDate;
use tracing::warn;

/// Parse every scraped card, skipping (and logging) the malformed ones.
pub fn parse_cards(cards: &[String], today: NaiveDate, participants: &[String]) -> Vec<Fixture> {
    cards
        .iter()
        .filter_map(|card| {
            match parse_fixture(card, today, participants.iter().map(String::as_str)) {
                Ok(f) => Some(f),
                Err(e) => {
                    warn!("Skipping fixture card: {}", e);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cards_skips_malformed() {
        let today = NaiveDate::from_ymd_opt(2024, 10, 19).unwrap();
        let cards = vec![
            "Arsenal  Chelsea  17:30".to_string(),
            "garbage".to_string(),
            "Everton  1  Fulham  0  Yesterday".to_string(),
        ];
        let parsed = parse_cards(&cards, today, &["Alice".to_string()]);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].result.as_deref(), Some("1:0"));
        assert!(parsed[0].predictions.contains_key("Alice"));
    }
}
