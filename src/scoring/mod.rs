//! Table-prediction scoring.
//!
//! A participant's score is the sum, over every team present in both their
//! ranking and the real table, of the absolute difference between the two
//! positions, plus `penalty` points per post-submission ranking change.
//! Lower is better.

use crate::db::models::{ParticipantRecords, Roster};

/// A participant ready to be scored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub name: String,
    pub ranking: Vec<String>,
    pub changes: u32,
    pub previous_score: i64,
}

/// Outcome of scoring one participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreReport {
    pub name: String,
    pub score: i64,
    /// `score - previous_score`
    pub delta: i64,
    pub max_diff: i64,
    /// First team reaching `max_diff`; `None` when every team is exact
    pub max_diff_team: Option<String>,
    /// Teams ranked at exactly their real position
    pub perfect_guesses: Vec<String>,
    pub penalty_points: i64,
}

/// Join roster rankings with their records. Roster names without a record
/// score from zero.
pub fn build_participants(roster: &Roster, records: &ParticipantRecords) -> Vec<Participant> {
    roster
        .iter()
        .map(|(name, ranking)| {
            let record = records.get(name).cloned().unwrap_or_default();
            Participant {
                name: name.clone(),
                ranking: ranking.clone(),
                changes: record.changes,
                previous_score: record.score,
            }
        })
        .collect()
}

/// Score one participant against the real `table` (best first).
pub fn score_participant(participant: &Participant, table: &[String], penalty: i64) -> ScoreReport {
    let mut score = 0i64;
    let mut max_diff = 0i64;
    let mut max_diff_team = None;
    let mut perfect_guesses = Vec::new();

    for (real_pos, team) in table.iter().enumerate() {
        let Some(guess_pos) = participant.ranking.iter().position(|t| t == team) else {
            continue;
        };
        let diff = (real_pos as i64 - guess_pos as i64).abs();
        if diff == 0 {
            perfect_guesses.push(team.clone());
        }
        if diff > max_diff {
            max_diff = diff;
            max_diff_team = Some(team.clone());
        }
        score += diff;
    }

    let penalty_points = i64::from(participant.changes) * penalty;
    score += penalty_points;

    ScoreReport {
        name: participant.name.clone(),
        score,
        delta: score - participant.previous_score,
        max_diff,
        max_diff_team,
        perfect_guesses,
        penalty_points,
    }
}

impl ScoreReport {
    /// Chat block for this participant, ending in a blank line.
    pub fn to_message(&self) -> String {
        let mut text = format!(
            "{}\nScore: {}({:+})\n",
            self.name.to_uppercase(),
            self.score,
            self.delta
        );
        match &self.max_diff_team {
            Some(team) => text.push_str(&format!(
                "Maximum difference in positions is {} in {}.\n",
                self.max_diff, team
            )),
            None => text.push_str("No positional differences.\n"),
        }
        if !self.perfect_guesses.is_empty() {
            text.push_str(&format!(
                "Perfect guess: {}.\n",
                self.perfect_guesses.join(", ")
            ));
        }
        text.push_str(&format!(
            "+{} point penalty is included.\n\n",
            self.penalty_points
        ));
        text
    }
}
