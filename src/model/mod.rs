pub mod lenient;
pub mod match_record;
pub mod settings;
pub mod stats;

pub use match_record::{MatchRecord, Outcome};
pub use settings::Settings;
pub use stats::{AthleteStats, StatsMap};
