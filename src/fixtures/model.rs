use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// When a fixture kicks off.
///
/// `Postponed` is declared first so the derived ordering places it before
/// every real date; postponed fixtures float to the top of a sorted list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kickoff {
    Postponed,
    At(NaiveDateTime),
}

impl Kickoff {
    /// Kickoff at midnight of `day` (live and finished matches carry no time).
    pub fn day(day: NaiveDate) -> Self {
        Kickoff::At(day.and_time(chrono::NaiveTime::MIN))
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Kickoff::Postponed => None,
            Kickoff::At(dt) => Some(dt.date()),
        }
    }

    /// Day and month used in the fixture id. The postponed sentinel is
    /// 1 January, which is what the site-facing ids have always used.
    fn day_month(&self) -> (u32, u32) {
        match self {
            Kickoff::Postponed => (1, 1),
            Kickoff::At(dt) => (dt.day(), dt.month()),
        }
    }
}

impl fmt::Display for Kickoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kickoff::Postponed => write!(f, "Postponed"),
            Kickoff::At(dt) => write!(f, "{}", dt.format("%d.%m.%Y %H:%M")),
        }
    }
}

/// A participant's pick for one fixture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prediction {
    #[default]
    #[serde(rename = "")]
    Unset,
    #[serde(rename = "1")]
    Home,
    #[serde(rename = "X")]
    Draw,
    #[serde(rename = "2")]
    Away,
}

impl Prediction {
    /// Parse the chat notation `1`, `X` or `2` (case-insensitive for `X`).
    pub fn from_pick(s: &str) -> Option<Self> {
        match s.trim() {
            "1" => Some(Prediction::Home),
            "x" | "X" => Some(Prediction::Draw),
            "2" => Some(Prediction::Away),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Prediction::Unset => "",
            Prediction::Home => "1",
            Prediction::Draw => "X",
            Prediction::Away => "2",
        }
    }
}

/// One scheduled, live or finished match.
///
/// Identity is the derived `id` alone: `PartialEq` and `Hash` look at nothing
/// else, so two records for the same match compare equal even when their
/// results or predictions differ. Ids can collide across seasons (same two
/// letter prefixes on the same day and month); callers that merge fixtures
/// resolve that in `reconcile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub home_team: String,
    pub away_team: String,
    pub kickoff: Kickoff,
    /// "home:away" goals, absent before kickoff
    #[serde(default)]
    pub result: Option<String>,
    pub id: String,
    /// Participant name -> pick
    #[serde(default)]
    pub predictions: BTreeMap<String, Prediction>,
}

impl Fixture {
    /// Build a fixture with every known participant's prediction unset.
    pub fn new<'a, I>(
        home_team: String,
        away_team: String,
        kickoff: Kickoff,
        result: Option<String>,
        participants: I,
    ) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let id = fixture_id(&home_team, &away_team, &kickoff);
        let predictions = participants
            .into_iter()
            .map(|name| (name.to_string(), Prediction::Unset))
            .collect();
        Fixture {
            home_team,
            away_team,
            kickoff,
            result,
            id,
            predictions,
        }
    }

    /// True when at least one participant has made a pick.
    pub fn has_predictions(&self) -> bool {
        self.predictions.values().any(|p| *p != Prediction::Unset)
    }

    /// "<home> vs <away> <pick> for <name>"
    pub fn bet_string(&self, participant: &str) -> String {
        let pick = self
            .predictions
            .get(participant)
            .copied()
            .unwrap_or_default();
        format!(
            "{} vs {} {} for {}",
            self.home_team,
            self.away_team,
            pick.as_str(),
            participant
        )
    }
}

impl PartialEq for Fixture {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Fixture {}

impl Hash for Fixture {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Home: {}\nAway: {}\nDate: {}\nResult: {}\nId: {}",
            self.home_team,
            self.away_team,
            self.kickoff,
            self.result.as_deref().unwrap_or(""),
            self.id
        )
    }
}

/// First two characters of each team name, then day and month of kickoff
/// (no zero padding).
pub fn fixture_id(home_team: &str, away_team: &str, kickoff: &Kickoff) -> String {
    let (day, month) = kickoff.day_month();
    let home: String = home_team.chars().take(2).collect();
    let away: String = away_team.chars().take(2).collect();
    format!("{}{}{}{}", home, away, day, month)
}

/// Sort ascending by kickoff. Stable, so fixtures sharing a kickoff keep
/// their relative order.
pub fn sort_chronologically(fixtures: &mut [Fixture]) {
    fixtures.sort_by_key(|f| f.kickoff);
}
