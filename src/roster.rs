use crate::error::LeagueError;
use crate::keys;
use crate::store::Store;

/// Trim and collapse inner whitespace runs to single spaces.
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Full list of athletes, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    athletes: Vec<String>,
}

impl Roster {
    pub fn load(store: &Store) -> Self {
        Self { athletes: store.read_or_default(keys::ATHLETES) }
    }

    pub fn save(&self, store: &mut Store) {
        store.put(keys::ATHLETES, &self.athletes);
    }

    pub fn names(&self) -> &[String] {
        &self.athletes
    }

    pub fn len(&self) -> usize {
        self.athletes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.athletes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.athletes.iter().any(|n| n == name)
    }

    /// Stored spelling of `name`, matched case-insensitively after normalizing.
    pub fn find(&self, name: &str) -> Option<&str> {
        let wanted = normalize_name(name).to_lowercase();
        self.athletes.iter().find(|n| n.to_lowercase() == wanted).map(String::as_str)
    }

    /// Append a new athlete and return the normalized name.
    pub fn add(&mut self, raw: &str) -> Result<String, LeagueError> {
        let name = normalize_name(raw);
        if name.is_empty() {
            return Err(LeagueError::EmptyName);
        }
        if self.find(&name).is_some() {
            return Err(LeagueError::DuplicateName(name));
        }
        self.athletes.push(name.clone());
        Ok(name)
    }

    /// Remove the most recently added athlete.
    pub fn pop(&mut self) -> Result<String, LeagueError> {
        self.athletes.pop().ok_or(LeagueError::EmptyRoster)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    Unassigned,
    TeamA,
    TeamB,
}

impl Assignment {
    /// Selection cycle: Unassigned -> A -> B -> Unassigned.
    pub fn next(self) -> Self {
        match self {
            Assignment::Unassigned => Assignment::TeamA,
            Assignment::TeamA => Assignment::TeamB,
            Assignment::TeamB => Assignment::Unassigned,
        }
    }
}

/// What [`Teams::swap`] actually did. Truncation is a degraded but defined result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapOutcome {
    Swapped,
    Truncated { dropped_a: Vec<String>, dropped_b: Vec<String> },
}

/// Current team selection. Lives only for the session, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Teams {
    a: Vec<String>,
    b: Vec<String>,
}

impl Teams {
    pub fn team_a(&self) -> &[String] {
        &self.a
    }

    pub fn team_b(&self) -> &[String] {
        &self.b
    }

    pub fn assignment_of(&self, name: &str) -> Assignment {
        if self.a.iter().any(|n| n == name) {
            Assignment::TeamA
        } else if self.b.iter().any(|n| n == name) {
            Assignment::TeamB
        } else {
            Assignment::Unassigned
        }
    }

    /// Move `name` one step along the selection cycle. Moving into a full team
    /// fails and leaves the selection untouched.
    pub fn cycle(&mut self, name: &str, capacity: usize) -> Result<Assignment, LeagueError> {
        let current = self.assignment_of(name);
        let next = current.next();
        match next {
            Assignment::TeamA if self.a.len() >= capacity => {
                return Err(LeagueError::TeamFull { side: 'A', capacity });
            }
            Assignment::TeamB if self.b.len() >= capacity => {
                return Err(LeagueError::TeamFull { side: 'B', capacity });
            }
            _ => {}
        }
        match next {
            Assignment::TeamA => self.a.push(name.to_string()),
            Assignment::TeamB => {
                self.a.retain(|n| n != name);
                self.b.push(name.to_string());
            }
            Assignment::Unassigned => self.b.retain(|n| n != name),
        }
        Ok(next)
    }

    /// Exchange A and B. Overflow beyond `capacity` is cut from the tail of each side.
    pub fn swap(&mut self, capacity: usize) -> SwapOutcome {
        std::mem::swap(&mut self.a, &mut self.b);
        if self.a.len() <= capacity && self.b.len() <= capacity {
            return SwapOutcome::Swapped;
        }
        let dropped_a = self.a.split_off(capacity.min(self.a.len()));
        let dropped_b = self.b.split_off(capacity.min(self.b.len()));
        SwapOutcome::Truncated { dropped_a, dropped_b }
    }

    pub fn clear(&mut self) {
        self.a.clear();
        self.b.clear();
    }

    /// Drop `name` from whichever team holds it.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.a.len() + self.b.len();
        self.a.retain(|n| n != name);
        self.b.retain(|n| n != name);
        before != self.a.len() + self.b.len()
    }

    /// Both sides have at least one athlete.
    pub fn is_ready(&self) -> bool {
        !self.a.is_empty() && !self.b.is_empty()
    }
}
