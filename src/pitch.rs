//! Tactical pitch: formation templates, automatic layout by headcount and
//! per-day manual positions.
//!
//! Coordinates are percentages of the pitch (x across, y along) in side A's
//! frame. Side B mirrors x, except for manually placed athletes.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LeagueError;
use crate::keys;
use crate::model::lenient;
use crate::store::Store;

pub const AUTO: &str = "auto";

const MIN_PCT: f64 = 4.0;
const MAX_PCT: f64 = 96.0;
const CENTER_PCT: f64 = 50.0;

/// Vertical position of each slot, goalkeeper line first.
pub const FORMATIONS: &[(&str, &[f64])] = &[
    ("2-2", &[10.0, 10.0, 70.0, 70.0]),
    ("3-1", &[10.0, 10.0, 10.0, 70.0]),
    ("1-2-1", &[10.0, 40.0, 40.0, 70.0]),
    ("2-3", &[10.0, 10.0, 40.0, 70.0, 70.0]),
    ("3-2", &[10.0, 10.0, 10.0, 60.0, 60.0]),
    ("2-2-2", &[10.0, 10.0, 40.0, 40.0, 70.0, 70.0]),
    ("3-2-1", &[10.0, 10.0, 10.0, 40.0, 60.0, 70.0]),
    ("2-3-1", &[10.0, 10.0, 30.0, 50.0, 70.0, 70.0]),
    ("3-3-2", &[10.0, 10.0, 10.0, 40.0, 40.0, 40.0, 70.0, 70.0]),
    ("3-2-3", &[10.0, 10.0, 10.0, 40.0, 60.0, 70.0, 70.0, 70.0]),
    ("3-3-3", &[10.0, 10.0, 10.0, 40.0, 40.0, 40.0, 70.0, 70.0, 70.0]),
];

pub fn formation(name: &str) -> Option<&'static [f64]> {
    FORMATIONS.iter().find(|(n, _)| *n == name).map(|(_, slots)| *slots)
}

/// Template name picked for a team of `headcount`.
pub fn auto_formation_name(headcount: usize) -> &'static str {
    match headcount {
        0..=4 => "2-2",
        5 => "2-3",
        6 => "3-2-1",
        7 => "2-3-1",
        8 => "3-3-2",
        _ => "3-3-3",
    }
}

pub fn auto_formation(headcount: usize) -> &'static [f64] {
    formation(auto_formation_name(headcount)).unwrap_or(&[])
}

/// Keep a coordinate inside the pitch margins. Non-finite input lands in the center.
pub fn clamp_pct(v: f64) -> f64 {
    if !v.is_finite() {
        return CENTER_PCT;
    }
    v.clamp(MIN_PCT, MAX_PCT)
}

/// Evenly spread slot `index` of `total` across the pitch.
pub fn spread_x(index: usize, total: usize) -> f64 {
    if total == 0 {
        return CENTER_PCT;
    }
    let gap = 100.0 / (total as f64 + 1.0);
    clamp_pct(gap * (index as f64 + 1.0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "A" | "a" => Some(Side::A),
            "B" | "b" => Some(Side::B),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::A => "A",
            Side::B => "B",
        })
    }
}

/// Formation picked for each side on one day; `"auto"` follows the headcount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormationChoice {
    #[serde(rename = "A", default = "auto", deserialize_with = "lenient::text")]
    pub a: String,
    #[serde(rename = "B", default = "auto", deserialize_with = "lenient::text")]
    pub b: String,
}

fn auto() -> String {
    AUTO.to_string()
}

impl Default for FormationChoice {
    fn default() -> Self {
        Self { a: auto(), b: auto() }
    }
}

impl FormationChoice {
    pub fn load(store: &Store, day: NaiveDate) -> Self {
        store.read_or_default(&keys::formations(day))
    }

    pub fn save(&self, store: &mut Store, day: NaiveDate) {
        store.put(&keys::formations(day), self);
    }

    pub fn get(&self, side: Side) -> &str {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }

    /// Accepts `"auto"` or a template name.
    pub fn set(&mut self, side: Side, name: &str) -> Result<(), LeagueError> {
        let name = name.trim();
        if name != AUTO && formation(name).is_none() {
            return Err(LeagueError::UnknownFormation(name.to_string()));
        }
        let slot = match side {
            Side::A => &mut self.a,
            Side::B => &mut self.b,
        };
        *slot = name.to_string();
        Ok(())
    }

    /// Slots for `side`; unknown stored names behave like `"auto"`.
    pub fn slots(&self, side: Side, headcount: usize) -> &'static [f64] {
        formation(self.get(side)).unwrap_or_else(|| auto_formation(headcount))
    }
}

/// A stored manual coordinate. Either axis may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default, deserialize_with = "lenient::opt_float", skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_float", skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

/// Manual placement state for one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualLayout {
    #[serde(default)]
    pub enabled: bool,
    #[serde(rename = "A", default)]
    pub a: BTreeMap<String, Position>,
    #[serde(rename = "B", default)]
    pub b: BTreeMap<String, Position>,
}

impl ManualLayout {
    pub fn load(store: &Store, day: NaiveDate) -> Self {
        store.read_or_default(&keys::manual_positions(day))
    }

    pub fn save(&self, store: &mut Store, day: NaiveDate) {
        store.put(&keys::manual_positions(day), self);
    }

    pub fn side(&self, side: Side) -> &BTreeMap<String, Position> {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut BTreeMap<String, Position> {
        match side {
            Side::A => &mut self.a,
            Side::B => &mut self.b,
        }
    }

    /// Store a clamped coordinate for `name`.
    pub fn place(&mut self, side: Side, name: &str, x: f64, y: f64) -> Position {
        let pos = Position { x: Some(clamp_pct(x)), y: Some(clamp_pct(y)) };
        self.side_mut(side).insert(name.to_string(), pos);
        pos
    }

    /// Forget positions of one side, or both when `side` is `None`.
    pub fn clear(&mut self, side: Option<Side>) {
        match side {
            Some(s) => self.side_mut(s).clear(),
            None => {
                self.a.clear();
                self.b.clear();
            }
        }
    }

    /// Drop positions of athletes no longer on the given teams. Returns how many went.
    pub fn prune(&mut self, team_a: &[String], team_b: &[String]) -> usize {
        let before = self.a.len() + self.b.len();
        self.a.retain(|name, _| team_a.contains(name));
        self.b.retain(|name, _| team_b.contains(name));
        let pruned = before - (self.a.len() + self.b.len());
        if pruned > 0 {
            debug!(pruned, "Pruned manual positions");
        }
        pruned
    }
}

/// Where one athlete is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub side: Side,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub manual: bool,
}

/// Lay out one side. Manual coordinates win when manual mode is on; otherwise
/// y comes from the formation slot (center when the team outnumbers it) and x
/// is spread evenly.
pub fn layout_side(side: Side, names: &[String], slots: &[f64], manual: &ManualLayout) -> Vec<Placement> {
    let total = names.len();
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let pos = if manual.enabled { manual.side(side).get(name).copied() } else { None };
            let manual_x = pos.and_then(|p| p.x);
            let manual_y = pos.and_then(|p| p.y);
            let y = clamp_pct(manual_y.unwrap_or_else(|| slots.get(i).copied().unwrap_or(CENTER_PCT)));
            let x = match (manual_x, side) {
                (Some(x), _) => clamp_pct(x),
                (None, Side::A) => spread_x(i, total),
                (None, Side::B) => 100.0 - spread_x(i, total),
            };
            Placement { side, name: name.clone(), x, y, manual: manual_x.is_some() || manual_y.is_some() }
        })
        .collect()
}

/// Both sides for a day, A first.
pub fn layout(team_a: &[String], team_b: &[String], forms: &FormationChoice, manual: &ManualLayout) -> Vec<Placement> {
    let mut out = layout_side(Side::A, team_a, forms.slots(Side::A, team_a.len()), manual);
    out.extend(layout_side(Side::B, team_b, forms.slots(Side::B, team_b.len()), manual));
    out
}
