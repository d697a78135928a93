use chrono::NaiveDate;

use crate::error::LeagueError;
use crate::model::MatchRecord;
use crate::roster::Teams;

/// Parse a raw score field: ASCII digits only (surrounding whitespace allowed).
pub fn parse_score(raw: &str) -> Result<u32, LeagueError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LeagueError::InvalidScore(raw.to_string()));
    }
    trimmed.parse::<u32>().map_err(|_| LeagueError::InvalidScore(raw.to_string()))
}

/// Build the record for a match played today by the current teams.
pub fn build_match(teams: &Teams, score_a: u32, score_b: u32, note: &str, day: NaiveDate) -> Result<MatchRecord, LeagueError> {
    if !teams.is_ready() {
        return Err(LeagueError::EmptyTeam);
    }
    Ok(MatchRecord::new(teams.team_a(), teams.team_b(), score_a, score_b, note, day))
}

/// Today's list is wiped on load only when the feature is on and the last
/// played day is known and differs from today.
pub fn auto_reset_due(enabled: bool, last_day: Option<NaiveDate>, today: NaiveDate) -> bool {
    enabled && last_day.is_some_and(|d| d != today)
}
