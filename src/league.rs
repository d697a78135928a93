//! The league session: owns the store and every piece of per-session state,
//! runs each user operation to completion and then publishes what changed.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{info, instrument, warn};

use crate::aggregate;
use crate::calendar::{self, CalendarCursor, DaySummary};
use crate::dates;
use crate::error::LeagueError;
use crate::events::{EventBus, LeagueEvent};
use crate::keys;
use crate::model::{MatchRecord, Settings, StatsMap};
use crate::notify::{Confirm, Notices};
use crate::pitch::{self, FormationChoice, ManualLayout, Placement, Position, Side};
use crate::ranking::{self, ChartBar, Column, Ranking, RankingRow, SortSpec};
use crate::recorder;
use crate::roster::{Assignment, Roster, SwapOutcome, Teams};
use crate::router::{Resolved, Router};
use crate::store::Store;

/// Headline shown under the title, derived from the last played day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStatus {
    NoMatches,
    InProgress,
    AwaitingNextRound { last_day: NaiveDate },
}

impl fmt::Display for RoundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundStatus::NoMatches => f.write_str("No matches recorded yet"),
            RoundStatus::InProgress => f.write_str("Round in progress"),
            RoundStatus::AwaitingNextRound { last_day } => {
                write!(f, "Awaiting next round (last played {})", dates::format_iso(*last_day))
            }
        }
    }
}

pub struct League {
    store: Store,
    tz: Tz,
    today: NaiveDate,
    cursor: CalendarCursor,
    roster: Roster,
    teams: Teams,
    bus: EventBus,
    notices: Notices,
    router: Router,
}

impl fmt::Debug for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("League")
            .field("tz", &self.tz)
            .field("today", &self.today)
            .field("cursor", &self.cursor)
            .field("athletes", &self.roster.len())
            .field("bus", &self.bus)
            .finish()
    }
}

impl League {
    /// Start a session at `now_utc`. Applies the daily auto-reset when enabled.
    #[instrument(level = "info", skip(store))]
    pub fn open(store: Store, tz: Tz, now_utc: DateTime<Utc>) -> Self {
        let today = dates::today_in(tz, now_utc);
        let roster = Roster::load(&store);
        let mut league = Self {
            store,
            tz,
            today,
            cursor: CalendarCursor::new(today),
            roster,
            teams: Teams::default(),
            bus: EventBus::new(),
            notices: Notices::default(),
            router: Router::default(),
        };
        league.apply_auto_reset();
        info!(today = %today, athletes = league.roster.len(), "League session opened");
        league
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn into_store(self) -> Store {
        self.store
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn events(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn notices(&mut self) -> &mut Notices {
        &mut self.notices
    }

    fn emit(&mut self, event: LeagueEvent) {
        self.bus.dispatch(&event);
    }

    /// Validation failures become warnings; a declined confirmation is only noted.
    fn report<T>(&mut self, result: Result<T, LeagueError>) -> Result<T, LeagueError> {
        if let Err(e) = &result {
            if e.is_cancellation() {
                self.notices.info("Cancelled.");
            } else {
                self.notices.warn(e.to_string());
            }
        }
        result
    }

    // ---- settings ----

    pub fn settings(&self) -> Settings {
        self.store.read_or_default(keys::SETTINGS)
    }

    /// Persist new scoring rules and recompute every statistic with them.
    #[instrument(level = "info", skip(self))]
    pub fn set_settings(&mut self, settings: Settings) -> Result<StatsMap, LeagueError> {
        if settings.max_players_per_team == 0 {
            return self.report(Err(LeagueError::InvalidCapacity));
        }
        self.store.put(keys::SETTINGS, &settings);
        self.notices.info("Scoring updated.");
        Ok(self.rederive_stats())
    }

    pub fn auto_reset(&self) -> bool {
        self.store.read_or(keys::AUTO_RESET, false)
    }

    pub fn set_auto_reset(&mut self, enabled: bool) {
        self.store.put(keys::AUTO_RESET, &enabled);
        let state = if enabled { "on" } else { "off" };
        self.notices.info(format!("Daily auto-reset {state}."));
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.store.read(keys::LAST_DAY)
    }

    fn apply_auto_reset(&mut self) {
        if !self.auto_reset() {
            return;
        }
        let today = self.today;
        if recorder::auto_reset_due(true, self.last_day(), today) {
            let removed = calendar::clear_day(&mut self.store, today);
            info!(day = %today, removed, "Auto-reset cleared today's matches");
            if removed > 0 {
                self.rederive_stats();
            }
            self.notices.info("New day: today's board was cleared.");
            self.emit(LeagueEvent::CalendarChanged { day: today });
        }
        self.store.put(keys::LAST_DAY, &today);
    }

    pub fn status(&self) -> RoundStatus {
        match self.last_day() {
            None => RoundStatus::NoMatches,
            Some(day) if day == self.today => RoundStatus::InProgress,
            Some(last_day) => RoundStatus::AwaitingNextRound { last_day },
        }
    }

    // ---- roster and teams ----

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn teams(&self) -> &Teams {
        &self.teams
    }

    pub fn add_athlete(&mut self, raw: &str) -> Result<String, LeagueError> {
        let added = self.roster.add(raw);
        let name = self.report(added)?;
        self.roster.save(&mut self.store);
        self.notices.success(format!("{name} added."));
        self.emit(LeagueEvent::AthletesChanged { athletes: self.roster.names().to_vec() });
        self.teams_changed();
        Ok(name)
    }

    /// Remove the most recently added athlete, and from their team too.
    pub fn undo_last_athlete(&mut self) -> Result<String, LeagueError> {
        let popped = self.roster.pop();
        let name = self.report(popped)?;
        self.roster.save(&mut self.store);
        self.teams.remove(&name);
        self.notices.info(format!("{name} removed."));
        self.emit(LeagueEvent::AthletesChanged { athletes: self.roster.names().to_vec() });
        self.teams_changed();
        Ok(name)
    }

    /// Advance an athlete along Unassigned -> A -> B -> Unassigned.
    pub fn cycle_assignment(&mut self, name: &str) -> Result<Assignment, LeagueError> {
        let capacity = self.settings().max_players_per_team;
        let result = match self.roster.find(name).map(str::to_string) {
            Some(stored) => self.teams.cycle(&stored, capacity),
            None => Err(LeagueError::UnknownAthlete(name.trim().to_string())),
        };
        let next = self.report(result)?;
        self.teams_changed();
        Ok(next)
    }

    pub fn swap_teams(&mut self) -> SwapOutcome {
        let capacity = self.settings().max_players_per_team;
        let outcome = self.teams.swap(capacity);
        if let SwapOutcome::Truncated { dropped_a, dropped_b } = &outcome {
            let dropped: Vec<&str> = dropped_a.iter().chain(dropped_b).map(String::as_str).collect();
            warn!(dropped = ?dropped, capacity, "Swap exceeded team capacity");
            self.notices.warn(format!("Teams swapped; over capacity, dropped: {}", dropped.join(", ")));
        }
        self.teams_changed();
        outcome
    }

    pub fn clear_selection(&mut self) {
        self.teams.clear();
        self.teams_changed();
    }

    fn teams_changed(&mut self) {
        let day = self.cursor.day();
        let mut manual = ManualLayout::load(&self.store, day);
        if manual.prune(self.teams.team_a(), self.teams.team_b()) > 0 {
            manual.save(&mut self.store, day);
        }
        self.emit(LeagueEvent::TeamsChanged {
            team_a: self.teams.team_a().to_vec(),
            team_b: self.teams.team_b().to_vec(),
        });
    }

    // ---- matches ----

    /// Save a match from raw score fields, parsed strictly.
    pub fn save_match(&mut self, raw_a: &str, raw_b: &str, note: &str) -> Result<MatchRecord, LeagueError> {
        let scores = recorder::parse_score(raw_a).and_then(|a| recorder::parse_score(raw_b).map(|b| (a, b)));
        let (score_a, score_b) = self.report(scores)?;
        self.record_match(score_a, score_b, note)
    }

    /// Record a match between the current teams on today's date.
    #[instrument(level = "info", skip(self, note))]
    pub fn record_match(&mut self, score_a: u32, score_b: u32, note: &str) -> Result<MatchRecord, LeagueError> {
        let built = recorder::build_match(&self.teams, score_a, score_b, note, self.today);
        let record = self.report(built)?;
        let today = self.today;
        let settings = self.settings();

        let count = calendar::add_match(&mut self.store, today, record.clone());
        let mut stats = aggregate::load(&self.store);
        aggregate::fold_match(&mut stats, &record, &settings);
        aggregate::save(&mut self.store, &stats);
        self.store.put(keys::LAST_DAY, &today);
        info!(record = %record, day = %today, count, "Match saved");

        self.emit(LeagueEvent::MatchSaved { record: record.clone() });
        self.emit(LeagueEvent::CalendarChanged { day: today });
        self.emit(LeagueEvent::StatsChanged { stats });
        self.notices.success(format!("Match saved: {record}"));
        Ok(record)
    }

    /// Remove today's last match after confirmation.
    pub fn undo_last_match(&mut self, confirm: &mut impl Confirm) -> Result<MatchRecord, LeagueError> {
        let today = self.today;
        let Some(last) = calendar::day_matches(&self.store, today).pop() else {
            return self.report(Err(LeagueError::NoMatches(dates::format_iso(today))));
        };
        if !confirm.confirm(&format!("Remove the last match {last}?")) {
            return self.report(Err(LeagueError::Cancelled));
        }
        let record = calendar::pop_last(&mut self.store, today).unwrap_or(last);
        info!(record = %record, day = %today, "Undid last match");
        self.rederive_stats();
        self.emit(LeagueEvent::MatchUndone { day: today, record: record.clone() });
        self.emit(LeagueEvent::CalendarChanged { day: today });
        self.notices.info("Last match removed.");
        Ok(record)
    }

    /// Clear every match of today after confirmation. Past days are untouched.
    pub fn reset_today(&mut self, confirm: &mut impl Confirm) -> Result<usize, LeagueError> {
        let today = self.today;
        let prompt = format!("Clear all matches of {}? Earlier days are not affected.", dates::format_iso(today));
        if !confirm.confirm(&prompt) {
            return self.report(Err(LeagueError::Cancelled));
        }
        let removed = calendar::clear_day(&mut self.store, today);
        info!(day = %today, removed, "Reset today's matches");
        if removed > 0 {
            self.rederive_stats();
        }
        self.emit(LeagueEvent::CalendarChanged { day: today });
        self.notices.info("Today's matches cleared.");
        Ok(removed)
    }

    /// Delete one match of any day after confirmation; returns it with the day's new summary.
    pub fn delete_match(
        &mut self,
        day: NaiveDate,
        index: usize,
        confirm: &mut impl Confirm,
    ) -> Result<(MatchRecord, DaySummary), LeagueError> {
        let matches = calendar::day_matches(&self.store, day);
        let Some(target) = matches.get(index) else {
            return self.report(Err(LeagueError::MatchIndexOutOfRange { date: dates::format_iso(day), index }));
        };
        if !confirm.confirm(&format!("Delete the match {target}?")) {
            return self.report(Err(LeagueError::Cancelled));
        }
        let deleted = calendar::delete_match(&mut self.store, day, index);
        let removed = self.report(deleted)?;
        info!(record = %removed, day = %day, index, "Deleted match");
        self.rederive_stats();
        self.emit(LeagueEvent::CalendarChanged { day });
        self.notices.success("Match deleted.");
        Ok((removed, self.day_summary(day)))
    }

    /// Recompute statistics from the whole stored history with the current settings.
    pub fn rederive_stats(&mut self) -> StatsMap {
        let history = calendar::history(&self.store);
        let stats = aggregate::derive(&history, &self.settings());
        aggregate::save(&mut self.store, &stats);
        info!(matches = history.len(), athletes = stats.len(), "Re-derived statistics");
        self.emit(LeagueEvent::StatsChanged { stats: stats.clone() });
        stats
    }

    // ---- calendar ----

    pub fn cursor_day(&self) -> NaiveDate {
        self.cursor.day()
    }

    pub fn navigate_day(&mut self, day: NaiveDate) -> NaiveDate {
        self.cursor.navigate(day)
    }

    pub fn goto_day(&mut self, raw: &str) -> Result<NaiveDate, LeagueError> {
        let parsed = dates::parse_iso(raw);
        let day = self.report(parsed)?;
        Ok(self.navigate_day(day))
    }

    pub fn prev_day(&mut self) -> NaiveDate {
        self.cursor.prev()
    }

    pub fn next_day(&mut self) -> NaiveDate {
        self.cursor.next()
    }

    pub fn day_matches(&self, day: NaiveDate) -> Vec<MatchRecord> {
        calendar::day_matches(&self.store, day)
    }

    pub fn day_summary(&self, day: NaiveDate) -> DaySummary {
        calendar::summary(&self.day_matches(day))
    }

    pub fn export_ical(&self, from: NaiveDate, to: NaiveDate) -> String {
        calendar::to_ical(&self.store, from, to)
    }

    // ---- ranking ----

    pub fn stats(&self) -> StatsMap {
        aggregate::load(&self.store)
    }

    pub fn ranking(&self) -> Ranking {
        ranking::rank(&self.stats())
    }

    /// Ranking rows in the user's chosen order.
    pub fn ranking_rows(&self) -> Vec<RankingRow> {
        let mut rows = self.ranking().rows().to_vec();
        ranking::sort_rows(&mut rows, self.sort_spec());
        rows
    }

    pub fn sort_spec(&self) -> SortSpec {
        self.store.read_or_default(keys::RANK_SORT)
    }

    /// Sort by `column`, flipping direction when it is already the sort column.
    pub fn sort_by(&mut self, column: Column) -> SortSpec {
        let spec = self.sort_spec().toggled(column);
        self.store.put(keys::RANK_SORT, &spec);
        spec
    }

    pub fn reset_sort(&mut self) {
        self.store.remove(keys::RANK_SORT);
    }

    /// Chart series: top athletes by points, then by win rate.
    pub fn charts(&self) -> (Vec<ChartBar>, Vec<ChartBar>) {
        let stats = self.stats();
        (
            ranking::points_leaders(&stats, ranking::POINTS_CHART_LIMIT),
            ranking::win_rate_leaders(&stats, ranking::WIN_RATE_CHART_LIMIT),
        )
    }

    // ---- pitch ----

    pub fn formations(&self) -> FormationChoice {
        FormationChoice::load(&self.store, self.cursor.day())
    }

    pub fn set_formation(&mut self, side: Side, name: &str) -> Result<(), LeagueError> {
        let day = self.cursor.day();
        let mut forms = FormationChoice::load(&self.store, day);
        let set = forms.set(side, name);
        self.report(set)?;
        forms.save(&mut self.store, day);
        Ok(())
    }

    pub fn manual_layout(&self) -> ManualLayout {
        ManualLayout::load(&self.store, self.cursor.day())
    }

    pub fn set_manual(&mut self, enabled: bool) {
        let day = self.cursor.day();
        let mut manual = ManualLayout::load(&self.store, day);
        manual.enabled = enabled;
        manual.save(&mut self.store, day);
    }

    /// Pin an athlete of `side` at (x, y). The athlete must be on that side.
    pub fn place(&mut self, side: Side, name: &str, x: f64, y: f64) -> Result<Position, LeagueError> {
        let members = match side {
            Side::A => self.teams.team_a(),
            Side::B => self.teams.team_b(),
        };
        let wanted = name.trim().to_lowercase();
        let found = members.iter().find(|n| n.to_lowercase() == wanted).cloned();
        let stored = self.report(found.ok_or_else(|| LeagueError::UnknownAthlete(name.trim().to_string())))?;
        let day = self.cursor.day();
        let mut manual = ManualLayout::load(&self.store, day);
        let pos = manual.place(side, &stored, x, y);
        manual.save(&mut self.store, day);
        Ok(pos)
    }

    pub fn clear_manual(&mut self, side: Option<Side>) {
        let day = self.cursor.day();
        let mut manual = ManualLayout::load(&self.store, day);
        manual.clear(side);
        manual.save(&mut self.store, day);
    }

    pub fn pitch_layout(&self) -> Vec<Placement> {
        pitch::layout(self.teams.team_a(), self.teams.team_b(), &self.formations(), &self.manual_layout())
    }

    // ---- navigation and UI preferences ----

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Go to a section. Unknown paths land on the default route.
    pub fn navigate(&mut self, fragment: &str) -> Resolved {
        let resolved = self.router.resolve(fragment);
        if !resolved.valid {
            warn!(requested = fragment, path = %resolved.path, "Unknown route, using default");
        }
        self.store.put(keys::LAST_ROUTE, &resolved.path);
        self.emit(LeagueEvent::RouteChanged { path: resolved.path.clone(), section: resolved.section.clone() });
        resolved
    }

    /// Last visited route, if it still exists.
    pub fn restore_route(&self) -> Option<String> {
        self.store.read::<String>(keys::LAST_ROUTE).filter(|p| self.router.is_known(p))
    }

    pub fn help_visible(&self) -> bool {
        self.store.read_or(keys::UI_HELP, true)
    }

    pub fn toggle_help(&mut self) -> bool {
        let visible = !self.help_visible();
        self.store.put(keys::UI_HELP, &visible);
        visible
    }

    pub fn is_collapsed(&self, section: &str) -> bool {
        self.store.read_or(&keys::ui_collapsed(section), false)
    }

    pub fn set_collapsed(&mut self, section: &str, collapsed: bool) {
        self.store.put(&keys::ui_collapsed(section), &collapsed);
    }
}
