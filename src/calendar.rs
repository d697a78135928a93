use std::fmt;

use chrono::NaiveDate;
use icalendar::{Calendar, Component, Event, EventLike};
use tracing::{info, instrument};

use crate::dates;
use crate::error::LeagueError;
use crate::keys;
use crate::model::MatchRecord;
use crate::store::Store;

/// Matches of one day, in the order they were recorded.
pub fn day_matches(store: &Store, day: NaiveDate) -> Vec<MatchRecord> {
    store.read_or_default(&keys::matches(day))
}

fn save_day(store: &mut Store, day: NaiveDate, matches: &[MatchRecord]) {
    store.put(&keys::matches(day), matches);
}

/// Append `record` to `day`; returns the day's new match count.
pub fn add_match(store: &mut Store, day: NaiveDate, record: MatchRecord) -> usize {
    store.push(&keys::matches(day), record).len()
}

/// Remove the match at `index`, keeping the others in order.
pub fn delete_match(store: &mut Store, day: NaiveDate, index: usize) -> Result<MatchRecord, LeagueError> {
    let mut matches = day_matches(store, day);
    if index >= matches.len() {
        return Err(LeagueError::MatchIndexOutOfRange { date: dates::format_iso(day), index });
    }
    let removed = matches.remove(index);
    save_day(store, day, &matches);
    Ok(removed)
}

pub fn pop_last(store: &mut Store, day: NaiveDate) -> Option<MatchRecord> {
    store.pop_last(&keys::matches(day))
}

/// Empty the day's list; returns how many matches were removed.
pub fn clear_day(store: &mut Store, day: NaiveDate) -> usize {
    let removed = day_matches(store, day).len();
    save_day(store, day, &[]);
    removed
}

/// Every day that has a stored (possibly empty) match list, oldest first.
pub fn recorded_days(store: &Store) -> Vec<NaiveDate> {
    let mut days: Vec<NaiveDate> = store
        .list_keys(keys::MATCHES_PREFIX)
        .iter()
        .filter_map(|k| keys::day_of_matches_key(k))
        .collect();
    days.sort();
    days
}

/// All stored matches in chronological order.
pub fn history(store: &Store) -> Vec<MatchRecord> {
    recorded_days(store)
        .into_iter()
        .flat_map(|day| day_matches(store, day))
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DaySummary {
    pub matches: usize,
    pub goals: u64,
}

pub fn summary(matches: &[MatchRecord]) -> DaySummary {
    DaySummary { matches: matches.len(), goals: matches.iter().map(MatchRecord::total_goals).sum() }
}

impl fmt::Display for DaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.matches == 0 {
            return f.write_str("0 matches");
        }
        let m = if self.matches > 1 { "matches" } else { "match" };
        let g = if self.goals != 1 { "goals" } else { "goal" };
        write!(f, "{} {}, {} {}", self.matches, m, self.goals, g)
    }
}

/// The day currently shown by the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarCursor {
    day: NaiveDate,
}

impl CalendarCursor {
    pub fn new(day: NaiveDate) -> Self {
        Self { day }
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn navigate(&mut self, day: NaiveDate) -> NaiveDate {
        self.day = day;
        self.day
    }

    pub fn prev(&mut self) -> NaiveDate {
        self.navigate(dates::prev_day(self.day))
    }

    pub fn next(&mut self) -> NaiveDate {
        self.navigate(dates::next_day(self.day))
    }
}

/// Export the matches of every stored day in `from..=to` as an iCalendar
/// document, one all-day event per match.
#[instrument(level = "info", skip(store))]
pub fn to_ical(store: &Store, from: NaiveDate, to: NaiveDate) -> String {
    let mut calendar = Calendar::new();
    calendar.name("Liga da Firma");
    let mut exported = 0usize;
    for day in recorded_days(store).into_iter().filter(|d| *d >= from && *d <= to) {
        for (i, record) in day_matches(store, day).iter().enumerate() {
            let uid = format!("{}-{}@liga-da-firma", dates::format_iso(day), i + 1);
            let mut event = Event::new();
            event.uid(&uid).summary(&record.to_string()).all_day(day);
            if !record.note.is_empty() {
                event.description(&record.note);
            }
            calendar.push(event.done());
            exported += 1;
        }
    }
    info!(exported, "Exported matches to iCalendar");
    calendar.done().to_string()
}
