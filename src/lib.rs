pub mod aggregate;
pub mod calendar;
pub mod config;
pub mod console;
pub mod dates;
pub mod error;
pub mod events;
pub mod keys;
pub mod league;
pub mod model;
pub mod notify;
pub mod pitch;
pub mod ranking;
pub mod recorder;
pub mod roster;
pub mod router;
pub mod server;
pub mod store;

pub use error::LeagueError;
pub use league::League;
pub use store::{Store, StoreError};
