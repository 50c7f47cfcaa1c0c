//! Parser for the text of one scraped fixture card.
//!
//! A card flattens to a handful of fields separated by runs of two or more
//! whitespace characters:
//!
//! ```text
//!  Arsenal  Chelsea  17:30                     upcoming, today
//!  Arsenal  Chelsea  Postponed                 upcoming, no date
//!  Arsenal  Chelsea  Tomorrow  17:30           upcoming, tomorrow
//!  Arsenal  Chelsea  21/10/2024  17:30         upcoming, dated
//!  Arsenal  2  Chelsea  1  63'                 live
//!  Arsenal  2  Chelsea  1  12/05/2024          finished
//! ```
//!
//! The card is first classified into a [`CardLayout`] and each layout is then
//! resolved on its own. Classification guards, in priority order:
//!
//! 1. second field numeric → a scored card (`Live` or `Finished`, decided by
//!    the status field: a minute marker, "Today" or a missing status is live;
//!    "Half time", "Yesterday" or a date is finished)
//! 2. exactly three fields → `Upcoming3Token`
//! 3. exactly four fields → `Upcoming4Token`
//! 4. anything else is malformed

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::error::BotError;

use super::model::{Fixture, Kickoff};

const DATE_FORMAT: &str = "%d/%m/%Y";
const TIME_FORMAT: &str = "%H:%M";

/// Classified card, borrowing its fields from the tokenized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardLayout<'a> {
    /// `home  away  HH:MM|Postponed`
    Upcoming3Token {
        home: &'a str,
        away: &'a str,
        slot: &'a str,
    },
    /// `home  away  Tomorrow|dd/mm/yyyy  HH:MM`
    Upcoming4Token {
        home: &'a str,
        away: &'a str,
        day: &'a str,
        time: &'a str,
    },
    /// Scored card whose match is in play today.
    Live {
        home: &'a str,
        away: &'a str,
        home_goals: &'a str,
        away_goals: &'a str,
    },
    /// Scored card whose match is over; `status` holds the date or the day word.
    Finished {
        home: &'a str,
        away: &'a str,
        home_goals: &'a str,
        away_goals: &'a str,
        status: &'a str,
    },
}

/// Split on runs of two or more whitespace characters and trim each field.
pub fn tokenize(line: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    let mut run_start = 0;
    let mut run_len = 0;

    for (i, c) in line.char_indices() {
        if c.is_whitespace() {
            if run_len == 0 {
                run_start = i;
            }
            run_len += 1;
            continue;
        }
        if run_len >= 2 {
            if let Some(s) = start.take() {
                tokens.push(line[s..run_start].trim());
            }
        }
        run_len = 0;
        if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push(line[s..].trim());
    }
    tokens
}

fn is_numeric(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

fn is_live_status(status: &str) -> bool {
    status.contains('\'') || status.contains("Today")
}

/// Classify a tokenized card. The returned layout has passed its structural
/// guards; date and time fields are validated later by [`resolve_kickoff`].
pub fn classify<'a>(line: &str, tokens: &[&'a str]) -> Result<CardLayout<'a>, BotError> {
    if tokens.len() < 2 {
        return Err(BotError::malformed(line, "fewer than two fields"));
    }
    let home = tokens[0];

    if is_numeric(tokens[1]) {
        if tokens.len() < 4 {
            return Err(BotError::malformed(line, "scored card without away team and goals"));
        }
        let (home_goals, away, away_goals) = (tokens[1], tokens[2], tokens[3]);
        if !is_numeric(away_goals) {
            return Err(BotError::malformed(line, "away goals are not numeric"));
        }
        return Ok(match tokens.get(4).copied() {
            None => CardLayout::Live { home, away, home_goals, away_goals },
            Some(status) if is_live_status(status) => {
                CardLayout::Live { home, away, home_goals, away_goals }
            }
            Some(status) => CardLayout::Finished {
                home,
                away,
                home_goals,
                away_goals,
                status,
            },
        });
    }

    match tokens.len() {
        3 => Ok(CardLayout::Upcoming3Token {
            home,
            away: tokens[1],
            slot: tokens[2],
        }),
        4 => Ok(CardLayout::Upcoming4Token {
            home,
            away: tokens[1],
            day: tokens[2],
            time: tokens[3],
        }),
        _ => Err(BotError::malformed(line, "unexpected number of fields")),
    }
}

fn parse_time(line: &str, token: &str) -> Result<NaiveTime, BotError> {
    NaiveTime::parse_from_str(token, TIME_FORMAT)
        .map_err(|_| BotError::malformed(line, "time is not HH:MM"))
}

fn parse_date(line: &str, token: &str) -> Result<NaiveDate, BotError> {
    NaiveDate::parse_from_str(token, DATE_FORMAT)
        .map_err(|_| BotError::malformed(line, "date is not dd/mm/yyyy"))
}

/// Resolve a classified card's kickoff relative to `today`.
pub fn resolve_kickoff(line: &str, layout: &CardLayout<'_>, today: NaiveDate) -> Result<Kickoff, BotError> {
    let yesterday = today - Duration::days(1);
    match layout {
        CardLayout::Upcoming3Token { slot, .. } => {
            if slot.contains("Postponed") {
                Ok(Kickoff::Postponed)
            } else if slot.contains(':') {
                Ok(Kickoff::At(today.and_time(parse_time(line, slot)?)))
            } else {
                Err(BotError::malformed(line, "third field is neither a time nor Postponed"))
            }
        }
        CardLayout::Upcoming4Token { day, time, .. } => {
            let time = parse_time(line, time)?;
            if day.contains("Tomorrow") {
                Ok(Kickoff::At((today + Duration::days(1)).and_time(time)))
            } else if day.contains('/') {
                Ok(Kickoff::At(parse_date(line, day)?.and_time(time)))
            } else {
                Err(BotError::malformed(line, "third field is neither a date nor Tomorrow"))
            }
        }
        CardLayout::Live { .. } => Ok(Kickoff::day(today)),
        CardLayout::Finished { status, .. } => {
            // "Half time" resolves to yesterday, same as "Yesterday".
            if status.contains("Half time") || status.contains("Yesterday") {
                Ok(Kickoff::day(yesterday))
            } else {
                Ok(Kickoff::day(parse_date(line, status)?))
            }
        }
    }
}

/// Parse one fixture card. `participants` seeds the prediction map with an
/// unset entry per known participant.
pub fn parse_fixture<'p, I>(line: &str, today: NaiveDate, participants: I) -> Result<Fixture, BotError>
where
    I: IntoIterator<Item = &'p str>,
{
    let tokens = tokenize(line);
    let layout = classify(line, &tokens)?;
    let kickoff = resolve_kickoff(line, &layout, today)?;

    let (home, away, result) = match layout {
        CardLayout::Upcoming3Token { home, away, .. } | CardLayout::Upcoming4Token { home, away, .. } => {
            (home, away, None)
        }
        CardLayout::Live { home, away, home_goals, away_goals }
        | CardLayout::Finished { home, away, home_goals, away_goals, .. } => {
            (home, away, Some(format!("{}:{}", home_goals, away_goals)))
        }
    };

    Ok(Fixture::new(
        home.to_string(),
        away.to_string(),
        kickoff,
        result,
        participants,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::model::Prediction;

    const NOBODY: [&str; 0] = [];

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, 19).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> Kickoff {
        Kickoff::At(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, 0)
                .unwrap(),
        )
    }

    fn malformed(line: &str) -> bool {
        matches!(
            parse_fixture(line, today(), NOBODY),
            Err(BotError::MalformedFixtureText { .. })
        )
    }

    #[test]
    fn test_tokenize_splits_on_double_space_runs() {
        assert_eq!(
            tokenize("  Man Utd   Aston Villa  17:30 "),
            vec!["Man Utd", "Aston Villa", "17:30"]
        );
        assert_eq!(tokenize("Nott'm Forest\n  West Ham"), vec!["Nott'm Forest", "West Ham"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_upcoming_today() {
        let f = parse_fixture("Arsenal  Chelsea  17:30", today(), NOBODY).unwrap();
        assert_eq!(f.home_team, "Arsenal");
        assert_eq!(f.away_team, "Chelsea");
        assert_eq!(f.kickoff, at(2024, 10, 19, 17, 30));
        assert_eq!(f.result, None);
        assert_eq!(f.id, "ArCh1910");
    }

    #[test]
    fn test_upcoming_today_id_matches_today_for_any_day() {
        for day in [
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        ] {
            let f = parse_fixture("Brentford  Fulham  12:00", day, NOBODY).unwrap();
            assert_eq!(f.kickoff.date(), Some(day));
            assert_eq!(f.id, format!("BrFu{}{}", chrono::Datelike::day(&day), chrono::Datelike::month(&day)));
        }
    }

    #[test]
    fn test_postponed() {
        let f = parse_fixture("Arsenal  Chelsea  Postponed", today(), NOBODY).unwrap();
        assert_eq!(f.kickoff, Kickoff::Postponed);
        assert!(f.kickoff < at(1970, 1, 1, 0, 0));
        assert_eq!(f.id, "ArCh11");
    }

    #[test]
    fn test_tomorrow() {
        let f = parse_fixture("Everton  Fulham  Tomorrow  15:00", today(), NOBODY).unwrap();
        assert_eq!(f.kickoff, at(2024, 10, 20, 15, 0));
        assert_eq!(f.id, "EvFu2010");
    }

    #[test]
    fn test_dated_upcoming() {
        let f = parse_fixture("Everton  Fulham  02/11/2024  20:00", today(), NOBODY).unwrap();
        assert_eq!(f.kickoff, at(2024, 11, 2, 20, 0));
        assert_eq!(f.id, "EvFu211");
    }

    #[test]
    fn test_finished_with_date() {
        let f = parse_fixture("Arsenal  3  Chelsea  1  12/05/2024", today(), NOBODY).unwrap();
        assert_eq!(f.result.as_deref(), Some("3:1"));
        assert_eq!(f.away_team, "Chelsea");
        assert_eq!(f.kickoff, at(2024, 5, 12, 0, 0));
        assert_eq!(f.id, "ArCh125");
    }

    #[test]
    fn test_live_minute_marker_is_today() {
        let f = parse_fixture("Arsenal  2  Chelsea  0  63'", today(), NOBODY).unwrap();
        assert_eq!(f.result.as_deref(), Some("2:0"));
        assert_eq!(f.kickoff, at(2024, 10, 19, 0, 0));
    }

    #[test]
    fn test_today_and_yesterday_words() {
        let f = parse_fixture("Arsenal  2  Chelsea  0  Today", today(), NOBODY).unwrap();
        assert_eq!(f.kickoff, at(2024, 10, 19, 0, 0));
        let f = parse_fixture("Arsenal  2  Chelsea  0  Yesterday", today(), NOBODY).unwrap();
        assert_eq!(f.kickoff, at(2024, 10, 18, 0, 0));
    }

    #[test]
    fn test_half_time_is_yesterday() {
        let f = parse_fixture("Arsenal  1  Chelsea  1  Half time", today(), NOBODY).unwrap();
        assert_eq!(f.kickoff, at(2024, 10, 18, 0, 0));
    }

    #[test]
    fn test_scored_card_without_status_is_live() {
        let f = parse_fixture("Arsenal  1  Chelsea  1", today(), NOBODY).unwrap();
        assert_eq!(f.result.as_deref(), Some("1:1"));
        assert_eq!(f.kickoff, at(2024, 10, 19, 0, 0));
    }

    #[test]
    fn test_classify_priority() {
        let line = "Arsenal  1  Chelsea  1  12/05/2024";
        let tokens = tokenize(line);
        assert!(matches!(classify(line, &tokens), Ok(CardLayout::Finished { .. })));

        // A numeric second field wins over the three-field rule.
        let line = "Arsenal  1  Chelsea";
        let tokens = tokenize(line);
        assert!(classify(line, &tokens).is_err());

        let line = "Arsenal  Chelsea  Tomorrow  15:00";
        let tokens = tokenize(line);
        assert_eq!(
            classify(line, &tokens).unwrap(),
            CardLayout::Upcoming4Token {
                home: "Arsenal",
                away: "Chelsea",
                day: "Tomorrow",
                time: "15:00"
            }
        );
    }

    #[test]
    fn test_participants_seed_unset_predictions() {
        let f = parse_fixture("Arsenal  Chelsea  17:30", today(), ["Alice", "Bob"]).unwrap();
        assert_eq!(f.predictions.get("Alice"), Some(&Prediction::Unset));
        assert_eq!(f.predictions.get("Bob"), Some(&Prediction::Unset));
    }

    #[test]
    fn test_malformed_cards() {
        assert!(malformed(""));
        assert!(malformed("Arsenal"));
        assert!(malformed("Arsenal  Chelsea"));
        assert!(malformed("Arsenal  Chelsea  soon"));
        assert!(malformed("Arsenal  Chelsea  25:99"));
        assert!(malformed("Arsenal  Chelsea  Tomorrow  late"));
        assert!(malformed("Arsenal  Chelsea  31/02/2024  15:00"));
        assert!(malformed("Arsenal  Chelsea  Monday  15:00"));
        assert!(malformed("Arsenal  2  Chelsea  x  12/05/2024"));
        assert!(malformed("Arsenal  2  Chelsea  1  Full time"));
        assert!(malformed("Arsenal  Chelsea  17:30  extra  fields"));
    }
}
