use chrono::NaiveDate;

// The store prepends this itself, so the builders below return bare sub-keys
pub const NAMESPACE: &str = "liga25:";

pub const SETTINGS: &str = "settings";
pub const ATHLETES: &str = "athletes";
pub const LAST_DAY: &str = "lastDay";
pub const STATS: &str = "stats";
pub const AUTO_RESET: &str = "autoReset";
pub const LAST_ROUTE: &str = "lastRoute";
pub const RANK_SORT: &str = "rank:sort";
pub const UI_HELP: &str = "ui:help";

pub const MATCHES_PREFIX: &str = "matches:";
pub const MANUAL_POS_PREFIX: &str = "manualPos:";
pub const FORMS_PREFIX: &str = "forms:";
pub const UI_COLLAPSED_PREFIX: &str = "ui:collapsed:";

pub fn matches(day: NaiveDate) -> String {
    format!("{MATCHES_PREFIX}{}", day.format("%Y-%m-%d"))
}

pub fn manual_positions(day: NaiveDate) -> String {
    format!("{MANUAL_POS_PREFIX}{}", day.format("%Y-%m-%d"))
}

pub fn formations(day: NaiveDate) -> String {
    format!("{FORMS_PREFIX}{}", day.format("%Y-%m-%d"))
}

pub fn ui_collapsed(section: &str) -> String {
    let section = if section.is_empty() { "unknown" } else { section };
    format!("{UI_COLLAPSED_PREFIX}{section}")
}

/// Day encoded in a `matches:` key, if the key is one.
pub fn day_of_matches_key(key: &str) -> Option<NaiveDate> {
    let bare = key.strip_prefix(NAMESPACE).unwrap_or(key);
    let iso = bare.strip_prefix(MATCHES_PREFIX)?;
    NaiveDate::parse_from_str(iso, "%Y-%m-%d").ok()
}

