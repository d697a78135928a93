use std::fmt::Write as _;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use crate::dates;
use crate::error::LeagueError;
use crate::league::League;
use crate::model::Settings;
use crate::notify::Confirm;
use crate::pitch::{self, Side};
use crate::ranking::{self, Column};
use crate::roster::{Assignment, SwapOutcome};

pub const HELP: &str = "\
Roster
  add <name>                 add an athlete
  undo-athlete               remove the last added athlete
  roster                     list athletes and their team
  pick <name>                cycle an athlete: none -> A -> B -> none
  swap | clear | teams       swap sides, clear the selection, show teams
Matches
  save <a> <b> [note]        record today's match between the current teams
  undo                       remove today's last match
  reset                      clear all of today's matches
Calendar
  day                        show matches of the selected day
  goto <YYYY-MM-DD|today>    select a day
  prev | next                move the selection one day
  delete <n>                 delete match n of the selected day
  ical [from [to]]           export matches as iCalendar
Ranking
  ranking                    show the leaderboard
  sort <column|reset>        sort by name, j, v, e, d, gp, gc, sg, pts, ppg
  charts                     top 10 by points, top 5 by win rate
Rules
  settings [win draw loss [max]]  show or change scoring
  auto [on|off]              daily auto-reset of today's board
Pitch
  pitch                      show the tactical layout
  formation <A|B> <name|auto>
  manual [on|off|clear [A|B]]
  place <A|B> <x> <y> <name> pin an athlete (percent coordinates)
Other
  route [path]               navigate between sections
  status | help | quit";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command \"{0}\", try help")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add(String),
    UndoAthlete,
    Roster,
    Pick(String),
    Swap,
    Clear,
    Teams,
    Save { score_a: String, score_b: String, note: String },
    Undo,
    Reset,
    Day,
    Goto(String),
    Prev,
    Next,
    Delete(usize),
    Ranking,
    Sort(Option<Column>),
    Charts,
    Settings { points: Option<(i32, i32, i32)>, max: Option<usize> },
    Auto(Option<bool>),
    Pitch,
    Formation(Side, String),
    Manual(ManualAction),
    Place { side: Side, x: f64, y: f64, name: String },
    Route(Option<String>),
    Ical { from: Option<String>, to: Option<String> },
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualAction {
    Show,
    Enable(bool),
    Clear(Option<Side>),
}

fn on_off(raw: &str) -> Option<bool> {
    match raw {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();
        let rest = args.join(" ");
        let cmd = match head.to_lowercase().as_str() {
            "add" if !rest.is_empty() => Command::Add(rest),
            "add" => return Err(CommandError::Usage("add <name>")),
            "undo-athlete" => Command::UndoAthlete,
            "roster" => Command::Roster,
            "pick" if !rest.is_empty() => Command::Pick(rest),
            "pick" => return Err(CommandError::Usage("pick <name>")),
            "swap" => Command::Swap,
            "clear" => Command::Clear,
            "teams" => Command::Teams,
            "save" => match args.as_slice() {
                [a, b, note @ ..] => Command::Save {
                    score_a: a.to_string(),
                    score_b: b.to_string(),
                    note: note.join(" "),
                },
                _ => return Err(CommandError::Usage("save <a> <b> [note]")),
            },
            "undo" => Command::Undo,
            "reset" => Command::Reset,
            "day" => Command::Day,
            "goto" => match args.as_slice() {
                [day] => Command::Goto(day.to_string()),
                _ => return Err(CommandError::Usage("goto <YYYY-MM-DD|today>")),
            },
            "prev" => Command::Prev,
            "next" => Command::Next,
            "delete" => match args.as_slice() {
                [n] => match n.parse::<usize>() {
                    Ok(n) if n > 0 => Command::Delete(n),
                    _ => return Err(CommandError::Usage("delete <n>, n starting at 1")),
                },
                _ => return Err(CommandError::Usage("delete <n>")),
            },
            "ranking" => Command::Ranking,
            "sort" => match args.as_slice() {
                ["reset"] => Command::Sort(None),
                [col] => match Column::parse(col) {
                    Some(c) => Command::Sort(Some(c)),
                    None => return Err(CommandError::Usage("sort <name|j|v|e|d|gp|gc|sg|pts|ppg|reset>")),
                },
                _ => return Err(CommandError::Usage("sort <column|reset>")),
            },
            "charts" => Command::Charts,
            "settings" => match args.as_slice() {
                [] => Command::Settings { points: None, max: None },
                [w, d, l, extra @ ..] if extra.len() <= 1 => {
                    let usage = CommandError::Usage("settings [win draw loss [max]]");
                    let (Ok(w), Ok(d), Ok(l)) = (w.parse::<i32>(), d.parse::<i32>(), l.parse::<i32>()) else {
                        return Err(usage);
                    };
                    let max = match extra.first().map(|m| m.parse::<usize>()) {
                        None => None,
                        Some(Ok(m)) if m > 0 => Some(m),
                        Some(_) => return Err(usage),
                    };
                    Command::Settings { points: Some((w, d, l)), max }
                }
                _ => return Err(CommandError::Usage("settings [win draw loss [max]]")),
            },
            "auto" => match args.as_slice() {
                [] => Command::Auto(None),
                [v] => match on_off(v) {
                    Some(b) => Command::Auto(Some(b)),
                    None => return Err(CommandError::Usage("auto [on|off]")),
                },
                _ => return Err(CommandError::Usage("auto [on|off]")),
            },
            "pitch" => Command::Pitch,
            "formation" => match args.as_slice() {
                [side, name] => match Side::parse(side) {
                    Some(s) => Command::Formation(s, name.to_string()),
                    None => return Err(CommandError::Usage("formation <A|B> <name|auto>")),
                },
                _ => return Err(CommandError::Usage("formation <A|B> <name|auto>")),
            },
            "manual" => {
                let usage = CommandError::Usage("manual [on|off|clear [A|B]]");
                let action = match args.as_slice() {
                    [] => ManualAction::Show,
                    ["clear"] => ManualAction::Clear(None),
                    ["clear", side] => ManualAction::Clear(Some(Side::parse(side).ok_or(usage)?)),
                    [v] => ManualAction::Enable(on_off(v).ok_or(usage)?),
                    _ => return Err(usage),
                };
                Command::Manual(action)
            }
            "place" => match args.as_slice() {
                [side, x, y, name @ ..] if !name.is_empty() => {
                    let usage = CommandError::Usage("place <A|B> <x> <y> <name>");
                    let (Some(side), Ok(x), Ok(y)) = (Side::parse(side), x.parse::<f64>(), y.parse::<f64>()) else {
                        return Err(usage);
                    };
                    Command::Place { side, x, y, name: name.join(" ") }
                }
                _ => return Err(CommandError::Usage("place <A|B> <x> <y> <name>")),
            },
            "route" => Command::Route((!rest.is_empty()).then_some(rest)),
            "ical" => match args.as_slice() {
                [] => Command::Ical { from: None, to: None },
                [from] => Command::Ical { from: Some(from.to_string()), to: None },
                [from, to] => Command::Ical { from: Some(from.to_string()), to: Some(to.to_string()) },
                _ => return Err(CommandError::Usage("ical [from [to]]")),
            },
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(cmd))
    }
}

/// What to print after a command, and whether the session is over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Reply {
    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn block(&mut self, text: &str) {
        self.lines.extend(text.lines().map(str::to_string));
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

pub struct Console {
    league: League,
}

impl Console {
    pub fn new(league: League) -> Self {
        Self { league }
    }

    pub fn league(&self) -> &League {
        &self.league
    }

    pub fn league_mut(&mut self) -> &mut League {
        &mut self.league
    }

    pub fn into_league(self) -> League {
        self.league
    }

    /// Notices queued while opening the session (auto-reset and the like).
    pub fn greeting(&mut self) -> Reply {
        let mut reply = Reply::default();
        reply.push(format!("Liga da Firma - {}", self.league.status()));
        if let Some(route) = self.league.restore_route() {
            let resolved = self.league.navigate(&route);
            reply.push(format!("Section: {}", resolved.section));
        }
        self.drain_notices(&mut reply);
        reply
    }

    /// Parse and run one line. Parse errors come back as a single line.
    pub fn handle_line(&mut self, line: &str, confirm: &mut impl Confirm) -> Reply {
        match Command::parse(line) {
            Ok(Some(cmd)) => self.execute(cmd, confirm),
            Ok(None) => Reply::default(),
            Err(e) => Reply { lines: vec![e.to_string()], quit: false },
        }
    }

    pub fn execute(&mut self, cmd: Command, confirm: &mut impl Confirm) -> Reply {
        debug!(command = ?cmd, "Executing command");
        let mut reply = Reply::default();
        // Failures are already queued as notices by the league.
        let _ = self.run(cmd, confirm, &mut reply);
        self.drain_notices(&mut reply);
        reply
    }

    fn drain_notices(&mut self, reply: &mut Reply) {
        for notice in self.league.notices().drain() {
            reply.push(format!("[{}] {}", notice.level, notice.message));
        }
    }

    fn run(&mut self, cmd: Command, confirm: &mut impl Confirm, reply: &mut Reply) -> Result<(), LeagueError> {
        let league = &mut self.league;
        match cmd {
            Command::Add(name) => {
                league.add_athlete(&name)?;
            }
            Command::UndoAthlete => {
                league.undo_last_athlete()?;
            }
            Command::Roster => {
                if league.roster().is_empty() {
                    reply.push("No athletes yet.");
                }
                for name in league.roster().names() {
                    let tag = match league.teams().assignment_of(name) {
                        Assignment::TeamA => " [A]",
                        Assignment::TeamB => " [B]",
                        Assignment::Unassigned => "",
                    };
                    reply.push(format!("  {name}{tag}"));
                }
            }
            Command::Pick(name) => {
                let next = league.cycle_assignment(&name)?;
                let label = match next {
                    Assignment::TeamA => "team A",
                    Assignment::TeamB => "team B",
                    Assignment::Unassigned => "no team",
                };
                reply.push(format!("{} -> {label}", name.trim()));
            }
            Command::Swap => {
                if league.swap_teams() == SwapOutcome::Swapped {
                    reply.push("Teams swapped.");
                }
            }
            Command::Clear => {
                league.clear_selection();
                reply.push("Selection cleared.");
            }
            Command::Teams => {
                let capacity = league.settings().max_players_per_team;
                let teams = league.teams();
                reply.push(format!("A ({}/{capacity}): {}", teams.team_a().len(), teams.team_a().join(", ")));
                reply.push(format!("B ({}/{capacity}): {}", teams.team_b().len(), teams.team_b().join(", ")));
            }
            Command::Save { score_a, score_b, note } => {
                league.save_match(&score_a, &score_b, &note)?;
            }
            Command::Undo => {
                league.undo_last_match(confirm)?;
            }
            Command::Reset => {
                league.reset_today(confirm)?;
            }
            Command::Day => render_day(league, reply),
            Command::Goto(raw) => {
                if raw.eq_ignore_ascii_case("today") {
                    let today = league.today();
                    league.navigate_day(today);
                } else {
                    league.goto_day(&raw)?;
                }
                render_day(league, reply);
            }
            Command::Prev => {
                league.prev_day();
                render_day(league, reply);
            }
            Command::Next => {
                league.next_day();
                render_day(league, reply);
            }
            Command::Delete(n) => {
                let day = league.cursor_day();
                let (_, summary) = league.delete_match(day, n - 1, confirm)?;
                reply.push(format!("{}: {summary}", dates::format_iso(day)));
            }
            Command::Ranking => {
                reply.block(&ranking::render_table(&league.ranking_rows()));
            }
            Command::Sort(column) => {
                match column {
                    Some(c) => {
                        let spec = league.sort_by(c);
                        reply.push(format!("Sorted by {:?} {:?}.", spec.column, spec.direction));
                    }
                    None => {
                        league.reset_sort();
                        reply.push("Default ranking order.");
                    }
                }
                reply.block(&ranking::render_table(&league.ranking_rows()));
            }
            Command::Charts => {
                let (points, win_rate) = league.charts();
                reply.push("Points (top 10)");
                reply.block(&ranking::render_bars(&points, " pts"));
                reply.push("Win rate (top 5)");
                reply.block(&ranking::render_bars(&win_rate, "%"));
            }
            Command::Settings { points, max } => {
                if let Some((win, draw, loss)) = points {
                    let current = league.settings();
                    let max_players_per_team = max.unwrap_or(current.max_players_per_team);
                    league.set_settings(Settings { max_players_per_team, ..Settings::with_points(win, draw, loss) })?;
                }
                let s = league.settings();
                reply.push(format!(
                    "Win {} / draw {} / loss {} points, up to {} per team.",
                    s.points_for_win, s.points_for_draw, s.points_for_loss, s.max_players_per_team
                ));
            }
            Command::Auto(value) => match value {
                Some(enabled) => league.set_auto_reset(enabled),
                None => reply.push(format!("Daily auto-reset is {}.", if league.auto_reset() { "on" } else { "off" })),
            },
            Command::Pitch => render_pitch(league, reply),
            Command::Formation(side, name) => {
                league.set_formation(side, &name)?;
                render_pitch(league, reply);
            }
            Command::Manual(action) => {
                match action {
                    ManualAction::Show => {}
                    ManualAction::Enable(on) => league.set_manual(on),
                    ManualAction::Clear(side) => league.clear_manual(side),
                }
                render_pitch(league, reply);
            }
            Command::Place { side, x, y, name } => {
                let pos = league.place(side, &name, x, y)?;
                if !league.manual_layout().enabled {
                    reply.push("Saved; turn manual mode on to use it.");
                }
                reply.push(format!("{} at ({:.0}, {:.0})", name, pos.x.unwrap_or(x), pos.y.unwrap_or(y)));
            }
            Command::Route(path) => match path {
                Some(p) => {
                    let resolved = league.navigate(&p);
                    reply.push(format!("Section: {} ({})", resolved.section, resolved.path));
                }
                None => {
                    let paths: Vec<&str> = league.router().paths().collect();
                    reply.push(format!("Routes: {}", paths.join(" ")));
                }
            },
            Command::Ical { from, to } => {
                let open_ended = from.is_none();
                let from_day = match from {
                    Some(raw) => dates::parse_iso(&raw).inspect_err(|e| reply.push(e.to_string()))?,
                    None => NaiveDate::MIN,
                };
                let to_day = match to {
                    Some(raw) => dates::parse_iso(&raw).inspect_err(|e| reply.push(e.to_string()))?,
                    None if open_ended => NaiveDate::MAX,
                    None => from_day,
                };
                reply.block(&league.export_ical(from_day, to_day));
            }
            Command::Status => reply.push(league.status().to_string()),
            Command::Help => reply.block(HELP),
            Command::Quit => reply.quit = true,
        }
        Ok(())
    }
}

fn render_day(league: &League, reply: &mut Reply) {
    let day = league.cursor_day();
    let matches = league.day_matches(day);
    reply.push(format!("{} - {}", dates::format_iso(day), crate::calendar::summary(&matches)));
    if matches.is_empty() {
        reply.push("  No matches recorded.");
    }
    for (i, m) in matches.iter().enumerate() {
        let mut line = format!("  {}. {m}", i + 1);
        if !m.note.is_empty() {
            let _ = write!(line, " ({})", m.note);
        }
        reply.push(line);
    }
}

fn render_pitch(league: &League, reply: &mut Reply) {
    let forms = league.formations();
    let manual = league.manual_layout();
    let teams = league.teams();
    for (side, names) in [(Side::A, teams.team_a()), (Side::B, teams.team_b())] {
        let chosen = forms.get(side);
        let shown = if pitch::formation(chosen).is_some() { chosen } else { pitch::auto_formation_name(names.len()) };
        reply.push(format!("Team {side}: {shown}{}", if chosen == pitch::AUTO { " (auto)" } else { "" }));
    }
    reply.push(format!("Manual mode {}.", if manual.enabled { "on" } else { "off" }));
    for p in league.pitch_layout() {
        let pin = if p.manual { " *" } else { "" };
        reply.push(format!("  {} {:<20} x {:>3.0}  y {:>3.0}{pin}", p.side, p.name, p.x, p.y));
    }
}
