use chrono::NaiveDate;

use crate::fixtures::select::requested_day;
use crate::fixtures::Prediction;

/// Usage text sent for `help`.
pub const HELP_TEXT: &str = "Commands:\n\
    Give score - recompute and show the table predictions\n\
    fixtures [when tomorrow|dd.mm.yyyy] - list fixtures for a day\n\
    bet <fixture id> <1|X|2> - predict a match outcome\n\
    register <name> - link your account to a participant";

/// A recognised chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Score,
    Fixtures { day: NaiveDate },
    Bet { fixture_id: String, pick: Prediction },
    Register { name: String },
    Help,
}

/// Parse an inbound chat text. `None` for chatter the bot ignores.
///
/// `Give score` must match exactly; `fixtures` may appear anywhere in the
/// text. `bet`, `register` and `help` are leading keywords. A leading `/`
/// is accepted so the commands also work from the Telegram command menu.
pub fn parse_command(text: &str, today: NaiveDate) -> Option<Command> {
    let text = text.trim();
    let text = text.strip_prefix('/').unwrap_or(text);

    if text == "Give score" || text.eq_ignore_ascii_case("score") {
        return Some(Command::Score);
    }

    let mut words = text.split_whitespace();
    let keyword = words.next()?.to_lowercase();
    match keyword.as_str() {
        "bet" => {
            let fixture_id = words.next()?.to_string();
            let pick = Prediction::from_pick(words.next()?)?;
            if words.next().is_some() {
                return None;
            }
            return Some(Command::Bet { fixture_id, pick });
        }
        "register" => {
            let name = words.collect::<Vec<_>>().join(" ");
            if name.is_empty() {
                return None;
            }
            return Some(Command::Register { name });
        }
        "help" | "start" => return Some(Command::Help),
        _ => {}
    }

    if text.to_lowercase().contains("fixtures") {
        return Some(Command::Fixtures {
            day: requested_day(text, today),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, 19).unwrap()
    }

    #[test]
    fn test_score() {
        assert_eq!(parse_command("Give score", today()), Some(Command::Score));
        assert_eq!(parse_command("/score", today()), Some(Command::Score));
        assert_eq!(parse_command("give me a score", today()), None);
    }

    #[test]
    fn test_fixtures() {
        assert_eq!(
            parse_command("Show fixtures when tomorrow", today()),
            Some(Command::Fixtures {
                day: NaiveDate::from_ymd_opt(2024, 10, 20).unwrap()
            })
        );
        assert_eq!(
            parse_command("/fixtures", today()),
            Some(Command::Fixtures { day: today() })
        );
    }

    #[test]
    fn test_bet() {
        assert_eq!(
            parse_command("bet ArCh1910 x", today()),
            Some(Command::Bet {
                fixture_id: "ArCh1910".into(),
                pick: Prediction::Draw
            })
        );
        assert_eq!(parse_command("bet ArCh1910", today()), None);
        assert_eq!(parse_command("bet ArCh1910 3", today()), None);
        assert_eq!(parse_command("bet ArCh1910 1 2", today()), None);
    }

    #[test]
    fn test_register_and_help() {
        assert_eq!(
            parse_command("register Mary Ann", today()),
            Some(Command::Register { name: "Mary Ann".into() })
        );
        assert_eq!(parse_command("register", today()), None);
        assert_eq!(parse_command("/start", today()), Some(Command::Help));
        assert_eq!(parse_command("hello there", today()), None);
        assert_eq!(parse_command("   ", today()), None);
    }
}
