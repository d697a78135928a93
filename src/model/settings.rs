use serde::{Deserialize, Serialize};

use crate::model::lenient;

pub const DEFAULT_POINTS_FOR_WIN: i32 = 3;
pub const DEFAULT_POINTS_FOR_DRAW: i32 = 1;
pub const DEFAULT_POINTS_FOR_LOSS: i32 = 0;
pub const DEFAULT_MAX_PLAYERS_PER_TEAM: usize = 8;

/// League-wide scoring rules and team capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSettings")]
pub struct Settings {
    #[serde(rename = "ptsV")]
    pub points_for_win: i32,
    #[serde(rename = "ptsE")]
    pub points_for_draw: i32,
    #[serde(rename = "ptsD")]
    pub points_for_loss: i32,
    #[serde(rename = "maxPlayersPerTeam")]
    pub max_players_per_team: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            points_for_win: DEFAULT_POINTS_FOR_WIN,
            points_for_draw: DEFAULT_POINTS_FOR_DRAW,
            points_for_loss: DEFAULT_POINTS_FOR_LOSS,
            max_players_per_team: DEFAULT_MAX_PLAYERS_PER_TEAM,
        }
    }
}

impl Settings {
    pub fn with_points(win: i32, draw: i32, loss: i32) -> Self {
        Self { points_for_win: win, points_for_draw: draw, points_for_loss: loss, ..Self::default() }
    }
}

/// Stored shape before sanitizing: each field falls back to its own default.
#[derive(Deserialize)]
struct RawSettings {
    #[serde(rename = "ptsV", default, deserialize_with = "lenient::opt_signed")]
    win: Option<i32>,
    #[serde(rename = "ptsE", default, deserialize_with = "lenient::opt_signed")]
    draw: Option<i32>,
    #[serde(rename = "ptsD", default, deserialize_with = "lenient::opt_signed")]
    loss: Option<i32>,
    #[serde(rename = "maxPlayersPerTeam", default, deserialize_with = "lenient::opt_count")]
    max_players: Option<u32>,
}

impl From<RawSettings> for Settings {
    fn from(raw: RawSettings) -> Self {
        Self {
            points_for_win: raw.win.unwrap_or(DEFAULT_POINTS_FOR_WIN),
            points_for_draw: raw.draw.unwrap_or(DEFAULT_POINTS_FOR_DRAW),
            points_for_loss: raw.loss.unwrap_or(DEFAULT_POINTS_FOR_LOSS),
            max_players_per_team: raw
                .max_players
                .filter(|n| *n > 0)
                .map(|n| n as usize)
                .unwrap_or(DEFAULT_MAX_PLAYERS_PER_TEAM),
        }
    }
}
