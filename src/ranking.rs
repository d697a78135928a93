//! Leaderboard derived from aggregated statistics.
//!
//! Canonical order: points, goal difference and goals for (all descending),
//! then name ascending ignoring case and accents, then the exact name so that
//! two distinct athletes never compare equal.

use std::cmp::Ordering;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::model::{AthleteStats, StatsMap};

pub const NO_DATA: &str = "No data yet. Record a match to see the ranking.";

pub const POINTS_CHART_LIMIT: usize = 10;
pub const WIN_RATE_CHART_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct RankingRow {
    pub rank: usize,
    pub name: String,
    pub stats: AthleteStats,
    pub ppg: f64,
}

impl RankingRow {
    pub fn medal(&self) -> Option<&'static str> {
        match self.rank {
            1 => Some("🥇"),
            2 => Some("🥈"),
            3 => Some("🥉"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Ranking {
    /// Nothing aggregated yet; shown as a single placeholder row.
    Empty,
    Rows(Vec<RankingRow>),
}

impl Ranking {
    pub fn rows(&self) -> &[RankingRow] {
        match self {
            Ranking::Empty => &[],
            Ranking::Rows(rows) => rows,
        }
    }
}

/// Case- and accent-insensitive sort key for names.
pub fn collation_key(name: &str) -> String {
    name.chars().flat_map(char::to_lowercase).map(fold_accent).collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a).cmp(&collation_key(b)).then_with(|| a.cmp(b))
}

/// Canonical ranking comparison.
pub fn compare(a: (&str, &AthleteStats), b: (&str, &AthleteStats)) -> Ordering {
    let (name_a, sa) = a;
    let (name_b, sb) = b;
    sb.points
        .cmp(&sa.points)
        .then_with(|| sb.goal_diff.cmp(&sa.goal_diff))
        .then_with(|| sb.goals_for.cmp(&sa.goals_for))
        .then_with(|| compare_names(name_a, name_b))
}

pub fn rank(stats: &StatsMap) -> Ranking {
    if stats.is_empty() {
        return Ranking::Empty;
    }
    let mut entries: Vec<(&String, &AthleteStats)> = stats.iter().collect();
    entries.sort_by(|a, b| compare((a.0, a.1), (b.0, b.1)));
    let rows = entries
        .into_iter()
        .enumerate()
        .map(|(i, (name, s))| RankingRow { rank: i + 1, name: name.clone(), stats: *s, ppg: s.ppg() })
        .collect();
    Ranking::Rows(rows)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    #[serde(rename = "nome")]
    Name,
    #[serde(rename = "jogos")]
    Games,
    #[serde(rename = "v")]
    Wins,
    #[serde(rename = "e")]
    Draws,
    #[serde(rename = "d")]
    Losses,
    #[serde(rename = "gp")]
    GoalsFor,
    #[serde(rename = "gc")]
    GoalsAgainst,
    #[serde(rename = "sg")]
    GoalDiff,
    #[serde(rename = "pts")]
    Points,
    Ppg,
}

impl Column {
    pub fn parse(raw: &str) -> Option<Self> {
        let col = match raw.trim().to_lowercase().as_str() {
            "name" | "nome" => Column::Name,
            "games" | "j" | "jogos" => Column::Games,
            "wins" | "v" => Column::Wins,
            "draws" | "e" => Column::Draws,
            "losses" | "d" => Column::Losses,
            "gf" | "gp" => Column::GoalsFor,
            "ga" | "gc" => Column::GoalsAgainst,
            "gd" | "sg" => Column::GoalDiff,
            "points" | "pts" => Column::Points,
            "ppg" => Column::Ppg,
            _ => return None,
        };
        Some(col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

/// User-chosen table order. Ties keep the canonical ranking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    #[serde(rename = "key")]
    pub column: Column,
    #[serde(rename = "dir")]
    pub direction: Direction,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self { column: Column::Points, direction: Direction::Desc }
    }
}

impl SortSpec {
    /// Same column flips direction; a new column starts descending.
    pub fn toggled(self, column: Column) -> Self {
        if self.column == column {
            let direction = match self.direction {
                Direction::Asc => Direction::Desc,
                Direction::Desc => Direction::Asc,
            };
            return Self { column, direction };
        }
        Self { column, direction: Direction::Desc }
    }
}

fn compare_column(a: &RankingRow, b: &RankingRow, column: Column) -> Ordering {
    match column {
        Column::Name => compare_names(&a.name, &b.name),
        Column::Games => a.stats.games.cmp(&b.stats.games),
        Column::Wins => a.stats.wins.cmp(&b.stats.wins),
        Column::Draws => a.stats.draws.cmp(&b.stats.draws),
        Column::Losses => a.stats.losses.cmp(&b.stats.losses),
        Column::GoalsFor => a.stats.goals_for.cmp(&b.stats.goals_for),
        Column::GoalsAgainst => a.stats.goals_against.cmp(&b.stats.goals_against),
        Column::GoalDiff => a.stats.goal_diff.cmp(&b.stats.goal_diff),
        Column::Points => a.stats.points.cmp(&b.stats.points),
        Column::Ppg => a.ppg.total_cmp(&b.ppg),
    }
}

/// Reorder rows for display. Ranks stay as computed by [`rank`].
pub fn sort_rows(rows: &mut [RankingRow], spec: SortSpec) {
    rows.sort_by(|a, b| {
        let primary = compare_column(a, b, spec.column);
        let primary = match spec.direction {
            Direction::Asc => primary,
            Direction::Desc => primary.reverse(),
        };
        primary.then_with(|| a.rank.cmp(&b.rank))
    });
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartBar {
    pub name: String,
    pub value: f64,
}

/// Top athletes by points, in ranking order.
pub fn points_leaders(stats: &StatsMap, limit: usize) -> Vec<ChartBar> {
    rank(stats)
        .rows()
        .iter()
        .take(limit)
        .map(|r| ChartBar { name: r.name.clone(), value: r.stats.points as f64 })
        .collect()
}

/// Top athletes by win percentage (0..=100); ties keep ranking order.
pub fn win_rate_leaders(stats: &StatsMap, limit: usize) -> Vec<ChartBar> {
    let mut bars: Vec<ChartBar> = rank(stats)
        .rows()
        .iter()
        .map(|r| {
            ChartBar { name: r.name.clone(), value: r.stats.win_rate() * 100.0 }
        })
        .collect();
    bars.sort_by(|a, b| b.value.total_cmp(&a.value));
    bars.truncate(limit);
    bars
}

/// Plain-text table for terminals.
pub fn render_table(rows: &[RankingRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3}  {:<22} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>4} {:>6}",
        "#", "Athlete", "J", "V", "E", "D", "GP", "GC", "SG", "Pts", "PPG"
    );
    if rows.is_empty() {
        let _ = writeln!(out, "     {NO_DATA}");
        return out;
    }
    for r in rows {
        let name = match r.medal() {
            Some(m) => format!("{m} {}", r.name),
            None => r.name.clone(),
        };
        let s = &r.stats;
        let _ = writeln!(
            out,
            "{:>3}  {:<22} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>4} {:>6.2}",
            r.rank, name, s.games, s.wins, s.draws, s.losses, s.goals_for, s.goals_against, s.goal_diff, s.points, r.ppg
        );
    }
    out
}

/// Horizontal bar chart for terminals; bars scale to the largest value.
pub fn render_bars(bars: &[ChartBar], unit: &str) -> String {
    const WIDTH: f64 = 30.0;
    if bars.is_empty() {
        return "No data to show.\n".to_string();
    }
    let max = bars.iter().map(|b| b.value).fold(1.0_f64, f64::max);
    let mut out = String::new();
    for bar in bars {
        let len = ((bar.value.max(0.0) / max) * WIDTH).round() as usize;
        let name: String = if bar.name.chars().count() > 24 {
            bar.name.chars().take(23).chain(std::iter::once('…')).collect()
        } else {
            bar.name.clone()
        };
        let _ = writeln!(out, "{:<24} {} {}{}", name, "█".repeat(len), bar.value.round(), unit);
    }
    out
}
