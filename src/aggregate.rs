use tracing::debug;

use crate::keys;
use crate::model::{AthleteStats, MatchRecord, Outcome, Settings, StatsMap};
use crate::store::Store;

/// Credit every athlete on both sides of `record`. Must run once per match;
/// nothing here detects a second fold of the same record.
pub fn fold_match(stats: &mut StatsMap, record: &MatchRecord, settings: &Settings) {
    let sides = [
        (record.side_a(), record.score_a, record.score_b),
        (record.side_b(), record.score_b, record.score_a),
    ];
    for (names, goals_for, goals_against) in sides {
        let outcome = Outcome::for_side(goals_for, goals_against);
        for name in names {
            stats
                .entry(name.to_string())
                .or_default()
                .record(goals_for, goals_against, outcome, settings);
        }
    }
    debug!(record = %record, athletes = stats.len(), "Folded match into stats");
}

/// Rebuild statistics from scratch, folding each record exactly once in order.
pub fn derive<'a, I>(records: I, settings: &Settings) -> StatsMap
where
    I: IntoIterator<Item = &'a MatchRecord>,
{
    let mut stats = StatsMap::new();
    for record in records {
        fold_match(&mut stats, record, settings);
    }
    stats
}

pub fn load(store: &Store) -> StatsMap {
    store.read_or_default(keys::STATS)
}

pub fn save(store: &mut Store, stats: &StatsMap) {
    store.put(keys::STATS, stats);
}

/// Statistics for one athlete, zeroed when they never played.
pub fn for_athlete(stats: &StatsMap, name: &str) -> AthleteStats {
    stats.get(name).copied().unwrap_or_default()
}
