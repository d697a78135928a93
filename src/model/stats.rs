use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::lenient;
use crate::model::match_record::Outcome;
use crate::model::settings::Settings;

/// Athlete name -> cumulative statistics. Ordered so iteration is deterministic.
pub type StatsMap = BTreeMap<String, AthleteStats>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AthleteStats {
    #[serde(rename = "J", default, deserialize_with = "lenient::count")]
    pub games: u32,
    #[serde(rename = "V", default, deserialize_with = "lenient::count")]
    pub wins: u32,
    #[serde(rename = "E", default, deserialize_with = "lenient::count")]
    pub draws: u32,
    #[serde(rename = "D", default, deserialize_with = "lenient::count")]
    pub losses: u32,
    #[serde(rename = "GP", default, deserialize_with = "lenient::count")]
    pub goals_for: u32,
    #[serde(rename = "GC", default, deserialize_with = "lenient::count")]
    pub goals_against: u32,
    #[serde(rename = "SG", default, deserialize_with = "lenient::wide")]
    pub goal_diff: i64,
    #[serde(rename = "Pts", default, deserialize_with = "lenient::signed")]
    pub points: i32,
}

impl AthleteStats {
    /// Fold one match played by this athlete. Totals saturate at their bounds.
    pub fn record(&mut self, goals_for: u32, goals_against: u32, outcome: Outcome, settings: &Settings) {
        self.games = self.games.saturating_add(1);
        self.goals_for = self.goals_for.saturating_add(goals_for);
        self.goals_against = self.goals_against.saturating_add(goals_against);
        self.goal_diff = i64::from(self.goals_for) - i64::from(self.goals_against);
        let (tally, points) = match outcome {
            Outcome::Win => (&mut self.wins, settings.points_for_win),
            Outcome::Draw => (&mut self.draws, settings.points_for_draw),
            Outcome::Loss => (&mut self.losses, settings.points_for_loss),
        };
        *tally = tally.saturating_add(1);
        self.points = self.points.saturating_add(points);
    }

    /// Points per game, two decimals; 0.00 without games.
    pub fn ppg(&self) -> f64 {
        ratio(self.points as f64, self.games)
    }

    /// Share of games won in 0..=1, two decimals.
    pub fn win_rate(&self) -> f64 {
        ratio(self.wins as f64, self.games).clamp(0.0, 1.0)
    }

    pub fn goals_per_game(&self) -> f64 {
        ratio(self.goals_for as f64, self.games)
    }
}

fn ratio(value: f64, games: u32) -> f64 {
    if games == 0 {
        return 0.0;
    }
    round2(value / games as f64)
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
