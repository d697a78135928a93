//! ISO day helpers. Day arithmetic is anchored at 12:00 UTC so shifting by whole
//! days never crosses a midnight that a daylight-saving jump could move.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::LeagueError;

pub const DEFAULT_TZ: Tz = chrono_tz::America::Sao_Paulo;

const ISO_FORMAT: &str = "%Y-%m-%d";

/// Calendar day at `now_utc` as seen in `tz`.
pub fn today_in(tz: Tz, now_utc: DateTime<Utc>) -> NaiveDate {
    now_utc.with_timezone(&tz).date_naive()
}

pub fn today(tz: Tz) -> NaiveDate {
    today_in(tz, Utc::now())
}

pub fn parse_iso(raw: &str) -> Result<NaiveDate, LeagueError> {
    NaiveDate::parse_from_str(raw.trim(), ISO_FORMAT).map_err(|_| LeagueError::InvalidDate(raw.to_string()))
}

pub fn format_iso(day: NaiveDate) -> String {
    day.format(ISO_FORMAT).to_string()
}

/// Shift `day` by `days` (negative goes back). Out-of-range results leave the day unchanged.
pub fn add_days(day: NaiveDate, days: i64) -> NaiveDate {
    let Some(noon) = day.and_hms_opt(12, 0, 0) else {
        return day;
    };
    let anchored = Utc.from_utc_datetime(&noon);
    Duration::try_days(days)
        .and_then(|delta| anchored.checked_add_signed(delta))
        .map(|shifted| shifted.date_naive())
        .unwrap_or(day)
}

pub fn prev_day(day: NaiveDate) -> NaiveDate {
    add_days(day, -1)
}

pub fn next_day(day: NaiveDate) -> NaiveDate {
    add_days(day, 1)
}

/// String flavour of [`add_days`] for callers holding raw ISO text.
pub fn add_days_iso(iso: &str, days: i64) -> Result<String, LeagueError> {
    parse_iso(iso).map(|day| format_iso(add_days(day, days)))
}
