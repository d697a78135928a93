use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::UTC;

use liga_da_firma::aggregate;
use liga_da_firma::calendar;
use liga_da_firma::events::{EventKind, LeagueEvent};
use liga_da_firma::keys;
use liga_da_firma::league::RoundStatus;
use liga_da_firma::model::{MatchRecord, Settings};
use liga_da_firma::notify::{AutoConfirm, Level};
use liga_da_firma::pitch::Side;
use liga_da_firma::ranking::{Column, Direction, SortSpec};
use liga_da_firma::roster::{Assignment, SwapOutcome};
use liga_da_firma::{League, LeagueError, Store};

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 15, 0, 0).unwrap()
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn league_with(athletes: &[&str]) -> League {
    let mut league = League::open(Store::in_memory(), UTC, at(2025, 3, 1));
    for a in athletes {
        league.add_athlete(a).unwrap();
    }
    league
}

/// Ana on A, Bia on B.
fn ana_vs_bia() -> League {
    let mut league = league_with(&["Ana", "Bia"]);
    league.cycle_assignment("Ana").unwrap();
    league.cycle_assignment("Bia").unwrap();
    league.cycle_assignment("Bia").unwrap();
    league
}

fn assert_stats_match_history(league: &League) {
    let derived = aggregate::derive(&calendar::history(league.store()), &league.settings());
    assert_eq!(league.stats(), derived);
}

#[test]
fn ana_beats_bia() {
    let mut league = ana_vs_bia();
    let record = league.save_match("3", "1", "").unwrap();
    assert_eq!(record.to_string(), "Ana 3 × 1 Bia");
    assert_eq!(record.date, Some(day(2025, 3, 1)));

    let rows = league.ranking_rows();
    assert_eq!(rows[0].name, "Ana");
    assert_eq!(rows[0].rank, 1);
    assert_eq!(rows[0].stats.points, 3);
    assert_eq!(rows[0].stats.goal_diff, 2);
    assert_eq!(rows[0].ppg, 3.0);
    assert_eq!(rows[1].name, "Bia");
    assert_eq!(rows[1].stats.goal_diff, -2);
    assert_eq!(rows[1].ppg, 0.0);

    assert_eq!(league.last_day(), Some(day(2025, 3, 1)));
    assert_eq!(league.status(), RoundStatus::InProgress);
    let notice = league.notices().latest().cloned().unwrap();
    assert_eq!(notice.level, Level::Success);
}

#[test]
fn settings_changed_before_save_apply_to_the_new_match() {
    let mut league = ana_vs_bia();
    league.set_settings(Settings::with_points(5, 2, 1)).unwrap();
    league.save_match("2", "0", "").unwrap();
    let stats = league.stats();
    assert_eq!(stats["Ana"].points, 5);
    assert_eq!(stats["Bia"].points, 1);
}

#[test]
fn settings_change_rederives_existing_stats() {
    let mut league = ana_vs_bia();
    league.save_match("2", "2", "").unwrap();
    assert_eq!(league.stats()["Ana"].points, 1);
    league.set_settings(Settings::with_points(3, 2, 0)).unwrap();
    assert_eq!(league.stats()["Ana"].points, 2);
    assert_stats_match_history(&league);
}

#[test]
fn invalid_input_changes_nothing() {
    let mut league = league_with(&["Ana", "Bia"]);
    assert_eq!(league.save_match("1", "0", "").unwrap_err(), LeagueError::EmptyTeam);

    let mut league = ana_vs_bia();
    for (a, b) in [("-1", "0"), ("1.5", "0"), ("", "2"), ("2", "x"), ("+1", "0")] {
        let err = league.save_match(a, b, "").unwrap_err();
        assert!(matches!(err, LeagueError::InvalidScore(_)), "input was {a:?} {b:?}, error {err}");
    }
    assert!(league.day_matches(league.today()).is_empty());
    assert!(league.stats().is_empty());
    assert_eq!(league.notices().latest().map(|n| n.level), Some(Level::Warn));
    assert_eq!(league.save_match(" 4 ", "0", "").unwrap().score_a, 4);
}

#[test]
fn undo_requires_confirmation_and_rederives() {
    let mut league = ana_vs_bia();
    assert!(matches!(league.undo_last_match(&mut AutoConfirm(true)), Err(LeagueError::NoMatches(_))));

    league.save_match("3", "1", "").unwrap();
    league.save_match("0", "2", "").unwrap();

    assert_eq!(league.undo_last_match(&mut AutoConfirm(false)).unwrap_err(), LeagueError::Cancelled);
    assert_eq!(league.day_matches(league.today()).len(), 2);

    let mut prompts = Vec::new();
    let undone = league
        .undo_last_match(&mut |p: &str| {
            prompts.push(p.to_string());
            true
        })
        .unwrap();
    assert_eq!(undone.score_b, 2);
    assert!(prompts[0].contains("Ana 0 × 2 Bia"), "prompt was: {}", prompts[0]);
    assert_eq!(league.stats()["Ana"].points, 3);
    assert_eq!(league.stats()["Bia"].games, 1);
    assert_stats_match_history(&league);
}

#[test]
fn reset_today_leaves_past_days_and_their_stats() {
    let store = Store::in_memory();
    let mut league = League::open(store, UTC, at(2025, 2, 28));
    league.add_athlete("Ana").unwrap();
    league.add_athlete("Bia").unwrap();
    league.cycle_assignment("Ana").unwrap();
    league.cycle_assignment("Bia").unwrap();
    league.cycle_assignment("Bia").unwrap();
    league.save_match("1", "0", "").unwrap();

    let mut league = League::open(league.into_store(), UTC, at(2025, 3, 1));
    league.cycle_assignment("Ana").unwrap();
    league.cycle_assignment("Bia").unwrap();
    league.cycle_assignment("Bia").unwrap();
    league.save_match("0", "5", "").unwrap();
    assert_eq!(league.stats()["Ana"].games, 2);

    assert_eq!(league.reset_today(&mut AutoConfirm(false)).unwrap_err(), LeagueError::Cancelled);
    assert_eq!(league.reset_today(&mut AutoConfirm(true)).unwrap(), 1);
    assert_eq!(league.day_matches(day(2025, 2, 28)).len(), 1);
    let ana = league.stats()["Ana"];
    assert_eq!((ana.games, ana.wins, ana.goals_against), (1, 1, 0));
    assert_stats_match_history(&league);
}

#[test]
fn delete_any_day_returns_summary() {
    let mut league = ana_vs_bia();
    league.save_match("3", "1", "a").unwrap();
    league.save_match("2", "2", "b").unwrap();
    let today = league.today();
    let err = league.delete_match(today, 7, &mut AutoConfirm(true)).unwrap_err();
    assert_eq!(err, LeagueError::MatchIndexOutOfRange { date: "2025-03-01".to_string(), index: 7 });

    let (removed, summary) = league.delete_match(today, 0, &mut AutoConfirm(true)).unwrap();
    assert_eq!(removed.note, "a");
    assert_eq!(summary.to_string(), "1 match, 4 goals");
    assert_eq!(league.stats()["Ana"].draws, 1);
    assert_eq!(league.stats()["Ana"].wins, 0);
    assert_stats_match_history(&league);
}

#[test]
fn auto_reset_clears_only_today_and_stamps_last_day() {
    let mut store = Store::in_memory();
    let past = day(2025, 2, 27);
    let today = day(2025, 3, 1);
    let old = MatchRecord::new(&["Ana".into()], &["Bia".into()], 2, 0, "", past);
    let stray = MatchRecord::new(&["Ana".into()], &["Bia".into()], 0, 9, "", today);
    calendar::add_match(&mut store, past, old.clone());
    calendar::add_match(&mut store, today, stray.clone());
    aggregate::save(&mut store, &aggregate::derive([&old, &stray], &Settings::default()));
    store.put(keys::AUTO_RESET, &true);
    store.put(keys::LAST_DAY, &past);

    let mut league = League::open(store, UTC, at(2025, 3, 1));
    assert!(league.day_matches(today).is_empty());
    assert_eq!(league.day_matches(past), vec![old]);
    assert_eq!(league.last_day(), Some(today));
    assert_eq!(league.stats()["Bia"].goals_for, 0);
    assert_stats_match_history(&league);
    assert_eq!(league.notices().drain().len(), 1);

    // Same day again: nothing to do
    let league = League::open(league.into_store(), UTC, at(2025, 3, 1));
    assert_eq!(league.day_matches(past).len(), 1);
}

#[test]
fn auto_reset_off_or_first_run_keeps_today() {
    let mut store = Store::in_memory();
    let today = day(2025, 3, 1);
    calendar::add_match(&mut store, today, MatchRecord::new(&["A".into()], &["B".into()], 1, 0, "", today));
    store.put(keys::AUTO_RESET, &true);
    // No last day recorded yet
    let league = League::open(store, UTC, at(2025, 3, 1));
    assert_eq!(league.day_matches(today).len(), 1);
    assert_eq!(league.last_day(), Some(today));

    let mut store = league.into_store();
    store.put(keys::AUTO_RESET, &false);
    store.put(keys::LAST_DAY, &day(2025, 2, 1));
    let league = League::open(store, UTC, at(2025, 3, 1));
    assert_eq!(league.day_matches(today).len(), 1);
    assert_eq!(league.last_day(), Some(day(2025, 2, 1)));
    assert_eq!(league.status(), RoundStatus::AwaitingNextRound { last_day: day(2025, 2, 1) });
}

#[test]
fn events_follow_mutations_in_order() {
    let mut league = ana_vs_bia();
    let seen: Rc<RefCell<Vec<EventKind>>> = Rc::default();
    let log = Rc::clone(&seen);
    let id = league.events().subscribe_all(move |e| log.borrow_mut().push(e.kind()));

    league.save_match("1", "0", "").unwrap();
    assert_eq!(*seen.borrow(), vec![EventKind::MatchSaved, EventKind::CalendarChanged, EventKind::StatsChanged]);

    seen.borrow_mut().clear();
    league.undo_last_match(&mut AutoConfirm(true)).unwrap();
    assert_eq!(*seen.borrow(), vec![EventKind::StatsChanged, EventKind::MatchUndone, EventKind::CalendarChanged]);

    assert!(league.events().unsubscribe(id));
    seen.borrow_mut().clear();
    league.clear_selection();
    assert!(seen.borrow().is_empty());
}

#[test]
fn filtered_subscribers_see_payloads() {
    let mut league = league_with(&["Ana"]);
    let teams: Rc<RefCell<Vec<(Vec<String>, Vec<String>)>>> = Rc::default();
    let sink = Rc::clone(&teams);
    league.events().subscribe(EventKind::TeamsChanged, move |e| {
        if let LeagueEvent::TeamsChanged { team_a, team_b } = e {
            sink.borrow_mut().push((team_a.clone(), team_b.clone()));
        }
    });
    league.cycle_assignment("ana").unwrap();
    league.save_match("1", "0", "").unwrap_err();
    assert_eq!(*teams.borrow(), vec![(vec!["Ana".to_string()], Vec::<String>::new())]);
}

#[test]
fn roster_operations_through_the_session() {
    let mut league = league_with(&["Ana", "Bia"]);
    assert_eq!(league.add_athlete("ANA").unwrap_err(), LeagueError::DuplicateName("ANA".to_string()));
    assert_eq!(league.cycle_assignment("Zé").unwrap_err(), LeagueError::UnknownAthlete("Zé".to_string()));
    assert_eq!(league.cycle_assignment("bia").unwrap(), Assignment::TeamA);
    assert_eq!(league.undo_last_athlete().unwrap(), "Bia");
    assert!(league.teams().team_a().is_empty(), "removed athlete leaves their team");
    let reloaded = League::open(league.into_store(), UTC, at(2025, 3, 1));
    assert_eq!(reloaded.roster().names(), &["Ana".to_string()][..]);
}

#[test]
fn swap_reports_truncation_as_warning() {
    let mut league = league_with(&["A1", "A2", "A3", "B1"]);
    league.cycle_assignment("B1").unwrap();
    league.cycle_assignment("B1").unwrap();
    for n in ["A1", "A2", "A3"] {
        league.cycle_assignment(n).unwrap();
    }
    league.set_settings(Settings { max_players_per_team: 2, ..Settings::default() }).unwrap();
    league.notices().drain();
    let outcome = league.swap_teams();
    assert!(matches!(outcome, SwapOutcome::Truncated { .. }));
    let notice = league.notices().latest().cloned().unwrap();
    assert_eq!(notice.level, Level::Warn);
    assert!(notice.message.contains("A3"), "notice was: {}", notice.message);
}

#[test]
fn manual_positions_are_pruned_when_teams_change() {
    let mut league = ana_vs_bia();
    league.set_manual(true);
    league.place(Side::A, "ana", 20.0, 30.0).unwrap();
    assert_eq!(league.place(Side::A, "Bia", 1.0, 1.0).unwrap_err(), LeagueError::UnknownAthlete("Bia".to_string()));
    assert!(league.pitch_layout().iter().any(|p| p.name == "Ana" && p.manual));

    // Ana moves A -> B
    league.cycle_assignment("Ana").unwrap();
    assert!(league.manual_layout().side(Side::A).is_empty());
}

#[test]
fn formation_choice_is_per_day() {
    let mut league = ana_vs_bia();
    league.set_formation(Side::A, "3-1").unwrap();
    assert_eq!(league.formations().get(Side::A), "3-1");
    league.next_day();
    assert_eq!(league.formations().get(Side::A), "auto");
    assert!(league.set_formation(Side::B, "9-9").is_err());
}

#[test]
fn calendar_navigation_through_the_session() {
    let mut league = league_with(&[]);
    assert_eq!(league.prev_day(), day(2025, 2, 28));
    assert_eq!(league.goto_day("2024-12-31").unwrap(), day(2024, 12, 31));
    assert_eq!(league.next_day(), day(2025, 1, 1));
    assert!(league.goto_day("31/12/2024").is_err());
    assert_eq!(league.cursor_day(), day(2025, 1, 1));
}

#[test]
fn routes_persist_and_restore() {
    let mut league = league_with(&[]);
    assert_eq!(league.restore_route(), None);
    let resolved = league.navigate("#/ranking");
    assert_eq!((resolved.path.as_str(), resolved.section.as_str(), resolved.valid), ("/ranking", "tabela", true));
    let bogus = league.navigate("/nope");
    assert_eq!((bogus.path.as_str(), bogus.valid), ("/regras", false));
    assert_eq!(league.restore_route().as_deref(), Some("/regras"));
    let empty = league.navigate("");
    assert_eq!(empty.section, "regras");
}

#[test]
fn sort_choice_persists() {
    let mut league = ana_vs_bia();
    league.save_match("3", "1", "").unwrap();
    league.sort_by(Column::Name);
    let league = League::open(league.into_store(), UTC, at(2025, 3, 1));
    let rows = league.ranking_rows();
    assert_eq!(rows[0].name, "Bia");
    assert_eq!(
        league.sort_spec(),
        SortSpec { column: Column::Name, direction: Direction::Desc },
        "sort was: {:?}",
        league.sort_spec()
    );
}

#[test]
fn ui_preferences() {
    let mut league = league_with(&[]);
    assert!(league.help_visible());
    assert!(!league.toggle_help());
    assert!(!league.help_visible());
    assert!(!league.is_collapsed("times"));
    league.set_collapsed("times", true);
    assert!(league.is_collapsed("times"));
    assert!(league.store().contains("ui:collapsed:times"));
}

#[test]
fn huge_scores_keep_goal_difference_exact() {
    let mut league = ana_vs_bia();
    league.save_match("4294967295", "0", "").unwrap();
    let ana = league.stats()["Ana"];
    assert_eq!(ana.goals_for, u32::MAX);
    assert_eq!(ana.goal_diff, i64::from(u32::MAX), "goal diff was: {}", ana.goal_diff);
    assert_eq!(league.stats()["Bia"].goal_diff, -i64::from(u32::MAX));

    league.save_match("1", "0", "").unwrap();
    let ana = league.stats()["Ana"];
    assert_eq!((ana.games, ana.wins), (2, 2));
    assert_eq!(ana.goals_for, u32::MAX);
    assert_eq!(ana.goal_diff, i64::from(ana.goals_for) - i64::from(ana.goals_against));
    assert_eq!(league.day_summary(day(2025, 3, 1)).goals, u64::from(u32::MAX) + 1);
    assert_stats_match_history(&league);
}

#[test]
fn extreme_points_saturate() {
    let mut league = ana_vs_bia();
    league.set_settings(Settings::with_points(i32::MAX, 1, i32::MIN)).unwrap();
    league.save_match("1", "0", "").unwrap();
    league.save_match("2", "0", "").unwrap();
    let stats = league.stats();
    assert_eq!(stats["Ana"].points, i32::MAX, "points were: {}", stats["Ana"].points);
    assert_eq!(stats["Bia"].points, i32::MIN, "points were: {}", stats["Bia"].points);
}

#[test]
fn zero_capacity_is_rejected() {
    let mut league = ana_vs_bia();
    let before = league.settings();
    let err = league.set_settings(Settings { max_players_per_team: 0, ..Settings::with_points(2, 1, 0) }).unwrap_err();
    assert_eq!(err, LeagueError::InvalidCapacity);
    assert_eq!(league.settings(), before);
    let notice = league.notices().latest().cloned().unwrap();
    assert_eq!(notice.level, Level::Warn);
}
