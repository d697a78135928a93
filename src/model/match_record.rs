use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::lenient;

/// Separator between athlete names in a team label.
pub const LABEL_SEPARATOR: &str = ", ";

/// One played match as stored in a day record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "teamA", default = "default_label_a", deserialize_with = "lenient::text")]
    pub team_a: String,
    #[serde(rename = "teamB", default = "default_label_b", deserialize_with = "lenient::text")]
    pub team_b: String,
    #[serde(rename = "scoreA", default, deserialize_with = "lenient::count")]
    pub score_a: u32,
    #[serde(rename = "scoreB", default, deserialize_with = "lenient::count")]
    pub score_b: u32,
    #[serde(rename = "obs", default, deserialize_with = "lenient::text")]
    pub note: String,
    #[serde(default, deserialize_with = "lenient::opt_date", skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

fn default_label_a() -> String {
    "A".to_string()
}

fn default_label_b() -> String {
    "B".to_string()
}

/// Result of a match from one side's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    pub fn for_side(goals_for: u32, goals_against: u32) -> Self {
        match goals_for.cmp(&goals_against) {
            std::cmp::Ordering::Greater => Outcome::Win,
            std::cmp::Ordering::Equal => Outcome::Draw,
            std::cmp::Ordering::Less => Outcome::Loss,
        }
    }
}

impl MatchRecord {
    pub fn new(team_a: &[String], team_b: &[String], score_a: u32, score_b: u32, note: &str, date: NaiveDate) -> Self {
        Self {
            team_a: team_a.join(LABEL_SEPARATOR),
            team_b: team_b.join(LABEL_SEPARATOR),
            score_a,
            score_b,
            note: note.trim().to_string(),
            date: Some(date),
        }
    }

    pub fn side_a(&self) -> Vec<&str> {
        split_label(&self.team_a)
    }

    pub fn side_b(&self) -> Vec<&str> {
        split_label(&self.team_b)
    }

    pub fn is_draw(&self) -> bool {
        self.score_a == self.score_b
    }

    pub fn total_goals(&self) -> u64 {
        u64::from(self.score_a) + u64::from(self.score_b)
    }
}

fn split_label(label: &str) -> Vec<&str> {
    label.split(LABEL_SEPARATOR).map(str::trim).filter(|s| !s.is_empty()).collect()
}

impl fmt::Display for MatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} × {} {}", self.team_a, self.score_a, self.score_b, self.team_b)
    }
}
