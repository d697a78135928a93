use thiserror::Error;

/// Validation failures of league operations. None of these mutate state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LeagueError {
    #[error("athlete name is empty")]
    EmptyName,

    #[error("athlete \"{0}\" is already on the roster")]
    DuplicateName(String),

    #[error("athlete \"{0}\" is not on the roster")]
    UnknownAthlete(String),

    #[error("roster is empty, nothing to undo")]
    EmptyRoster,

    #[error("team {side} is full (max {capacity})")]
    TeamFull { side: char, capacity: usize },

    #[error("each team needs at least one athlete")]
    EmptyTeam,

    #[error("invalid score \"{0}\": expected a non-negative integer")]
    InvalidScore(String),

    #[error("no matches recorded on {0}")]
    NoMatches(String),

    #[error("no match #{index} on {date}")]
    MatchIndexOutOfRange { date: String, index: usize },

    #[error("invalid date \"{0}\": expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("team capacity must be at least 1")]
    InvalidCapacity,

    #[error("unknown formation \"{0}\"")]
    UnknownFormation(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl LeagueError {
    /// Cancellations are the user's choice, everything else is a warning to show.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, LeagueError::Cancelled)
    }
}
