use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Participant name -> submitted ranking of teams, best first.
pub type Roster = BTreeMap<String, Vec<String>>;

/// Participant name -> running record.
pub type ParticipantRecords = BTreeMap<String, ParticipantRecord>;

/// Running per-participant state kept between score updates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    /// Score as of the last "Give score"
    pub score: i64,
    /// Ranking edits made after the initial submission
    pub changes: u32,
    /// Chat user id bound to this participant; 0 when unbound
    pub user_id: i64,
}

/// Add a zeroed record for every roster name the records document lacks.
/// Returns how many records were added.
pub fn extend_records(records: &mut ParticipantRecords, roster: &Roster) -> usize {
    let mut added = 0;
    for name in roster.keys() {
        if !records.contains_key(name) {
            records.insert(name.clone(), ParticipantRecord::default());
            added += 1;
        }
    }
    added
}

/// Name of the participant bound to `user_id`, if any.
pub fn participant_by_user_id(records: &ParticipantRecords, user_id: i64) -> Option<&str> {
    if user_id == 0 {
        return None;
    }
    records
        .iter()
        .find(|(_, r)| r.user_id == user_id)
        .map(|(name, _)| name.as_str())
}
