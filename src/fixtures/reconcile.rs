//! Merging a fresh fixture scrape into the persisted list.
//!
//! Persisted records own the predictions, so they are never replaced by a
//! scraped copy; only their `result` is refreshed. Fixtures that vanish from
//! the page stay in the store.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::model::{sort_chronologically, Fixture};

/// Merge a fresh scrape into the persisted fixture list.
///
/// - A persisted fixture whose id reappears in `scraped` takes the scraped
///   result; its predictions are left alone. Every persisted copy of a
///   repeated id is refreshed. Refreshed fixtures move behind the untouched
///   persisted ones and scraped records with a matched id are dropped.
/// - Persisted fixtures absent from the scrape are kept as they are.
/// - Remaining id collisions keep the record carrying predictions, and
///   otherwise the persisted record.
///
/// The merged list is sorted by kickoff, postponed first.
pub fn reconcile(persisted: Vec<Fixture>, mut scraped: Vec<Fixture>) -> Vec<Fixture> {
    let mut untouched = Vec::with_capacity(persisted.len());
    let mut refreshed = Vec::new();
    let mut matched: HashSet<String> = HashSet::new();

    for mut fixture in persisted {
        match scraped.iter().find(|s| s.id == fixture.id) {
            Some(fresh) => {
                if fresh.result != fixture.result {
                    debug!(id = %fixture.id, result = ?fresh.result, "Refreshing fixture result");
                }
                fixture.result = fresh.result.clone();
                matched.insert(fixture.id.clone());
                refreshed.push(fixture);
            }
            None => untouched.push(fixture),
        }
    }
    scraped.retain(|s| !matched.contains(&s.id));

    let persisted_count = untouched.len() + refreshed.len();
    let candidates = untouched
        .into_iter()
        .chain(refreshed)
        .map(|f| (true, f))
        .chain(scraped.into_iter().map(|f| (false, f)));

    let mut merged: Vec<Fixture> = Vec::with_capacity(persisted_count);
    let mut index_by_id: HashMap<String, usize> = HashMap::new();
    let mut merged_from_persisted: Vec<bool> = Vec::with_capacity(persisted_count);

    for (from_persisted, fixture) in candidates {
        match index_by_id.get(&fixture.id) {
            Some(&idx) => {
                if prefer_candidate(&merged[idx], merged_from_persisted[idx], &fixture, from_persisted) {
                    merged[idx] = fixture;
                    merged_from_persisted[idx] = from_persisted;
                }
            }
            None => {
                index_by_id.insert(fixture.id.clone(), merged.len());
                merged.push(fixture);
                merged_from_persisted.push(from_persisted);
            }
        }
    }

    sort_chronologically(&mut merged);
    merged
}

/// Collision tie-break: predictions win, then the persisted copy, then the
/// record already kept.
fn prefer_candidate(kept: &Fixture, kept_persisted: bool, candidate: &Fixture, candidate_persisted: bool) -> bool {
    match (kept.has_predictions(), candidate.has_predictions()) {
        (false, true) => true,
        (true, false) => false,
        _ => candidate_persisted && !kept_persisted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::model::{Kickoff, Prediction};
    use chrono::NaiveDate;

    fn at(m: u32, d: u32) -> Kickoff {
        Kickoff::day(NaiveDate::from_ymd_opt(2024, m, d).unwrap())
    }

    fn fixture(home: &str, away: &str, kickoff: Kickoff, result: Option<&str>) -> Fixture {
        Fixture::new(
            home.into(),
            away.into(),
            kickoff,
            result.map(str::to_string),
            ["Alice", "Bob"],
        )
    }

    #[test]
    fn test_result_refreshed_and_predictions_kept() {
        let mut persisted = fixture("Arsenal", "Chelsea", at(5, 12), None);
        persisted.predictions.insert("Alice".into(), Prediction::Home);
        let scraped = fixture("Arsenal", "Chelsea", at(5, 12), Some("2:1"));

        let merged = reconcile(vec![persisted], vec![scraped]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, "ArCh125");
        assert_eq!(merged[0].result.as_deref(), Some("2:1"));
        assert_eq!(merged[0].predictions.get("Alice"), Some(&Prediction::Home));
    }

    #[test]
    fn test_persisted_fixture_missing_from_scrape_survives() {
        let old = fixture("Everton", "Fulham", at(1, 3), Some("0:0"));
        let new = fixture("Arsenal", "Chelsea", at(5, 12), None);

        let merged = reconcile(vec![old], vec![new]);

        let ids: Vec<&str> = merged.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["EvFu31", "ArCh125"]);
    }

    #[test]
    fn test_empty_sides() {
        let f = fixture("Arsenal", "Chelsea", at(5, 12), None);
        assert_eq!(reconcile(vec![], vec![f.clone()]).len(), 1);
        assert_eq!(reconcile(vec![f], vec![]).len(), 1);
        assert!(reconcile(vec![], vec![]).is_empty());
    }

    #[test]
    fn test_output_sorted_with_postponed_first() {
        let merged = reconcile(
            vec![fixture("Everton", "Fulham", at(1, 20), None)],
            vec![
                fixture("Arsenal", "Chelsea", at(1, 10), None),
                fixture("Brentford", "Burnley", Kickoff::Postponed, None),
            ],
        );
        let kickoffs: Vec<Kickoff> = merged.iter().map(|f| f.kickoff).collect();
        assert_eq!(kickoffs, vec![Kickoff::Postponed, at(1, 10), at(1, 20)]);
    }

    #[test]
    fn test_duplicate_ids_in_scrape_collapse() {
        let merged = reconcile(
            vec![],
            vec![
                fixture("Arsenal", "Chelsea", at(5, 12), None),
                fixture("Arsenal", "Chelsea", at(5, 12), Some("1:0")),
            ],
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].result, None);
    }

    #[test]
    fn test_collision_prefers_record_with_predictions() {
        // Two persisted records share an id; only the second has a bet.
        let plain = fixture("Arsenal", "Chelsea", at(5, 12), None);
        let mut bet = fixture("Arsenal", "Chelsea", at(5, 12), None);
        bet.predictions.insert("Bob".into(), Prediction::Away);

        let merged = reconcile(vec![plain, bet], vec![]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].predictions.get("Bob"), Some(&Prediction::Away));
    }

    #[test]
    fn test_collision_prefers_persisted_over_scraped() {
        // The first scraped match supplies the result; later scraped copies
        // of the same id are dropped.
        let mut persisted = fixture("Arsenal", "Chelsea", at(5, 12), None);
        persisted.predictions.insert("Alice".into(), Prediction::Draw);
        let merged = reconcile(
            vec![persisted],
            vec![
                fixture("Arsenal", "Chelsea", at(5, 12), Some("1:1")),
                fixture("Arsenal", "Chelsea", at(5, 12), Some("9:9")),
            ],
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].result.as_deref(), Some("1:1"));
        assert_eq!(merged[0].predictions.get("Alice"), Some(&Prediction::Draw));
    }

    #[test]
    fn test_repeated_persisted_id_keeps_refreshed_result() {
        let stored = fixture("Arsenal", "Chelsea", at(5, 12), None);
        let scraped = fixture("Arsenal", "Chelsea", at(5, 12), Some("2:1"));

        let merged = reconcile(vec![stored.clone(), stored], vec![scraped]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].result.as_deref(), Some("2:1"));
    }
}
