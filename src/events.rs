//! Typed, synchronous publish/subscribe between league components.
//!
//! Handlers run in subscription order, once per dispatch, on the caller's
//! thread. Nothing is buffered: a subscriber added after a dispatch never
//! sees that event.

use std::fmt;

use chrono::NaiveDate;

use crate::model::{MatchRecord, StatsMap};

#[derive(Debug, Clone, PartialEq)]
pub enum LeagueEvent {
    TeamsChanged { team_a: Vec<String>, team_b: Vec<String> },
    AthletesChanged { athletes: Vec<String> },
    MatchSaved { record: MatchRecord },
    MatchUndone { day: NaiveDate, record: MatchRecord },
    CalendarChanged { day: NaiveDate },
    StatsChanged { stats: StatsMap },
    RouteChanged { path: String, section: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    TeamsChanged,
    AthletesChanged,
    MatchSaved,
    MatchUndone,
    CalendarChanged,
    StatsChanged,
    RouteChanged,
}

impl LeagueEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            LeagueEvent::TeamsChanged { .. } => EventKind::TeamsChanged,
            LeagueEvent::AthletesChanged { .. } => EventKind::AthletesChanged,
            LeagueEvent::MatchSaved { .. } => EventKind::MatchSaved,
            LeagueEvent::MatchUndone { .. } => EventKind::MatchUndone,
            LeagueEvent::CalendarChanged { .. } => EventKind::CalendarChanged,
            LeagueEvent::StatsChanged { .. } => EventKind::StatsChanged,
            LeagueEvent::RouteChanged { .. } => EventKind::RouteChanged,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&LeagueEvent)>;

struct Subscriber {
    id: SubscriptionId,
    filter: Option<EventKind>,
    handler: Handler,
}

#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen to one kind of event.
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&LeagueEvent) + 'static,
    {
        self.add(Some(kind), Box::new(handler))
    }

    /// Listen to every event.
    pub fn subscribe_all<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&LeagueEvent) + 'static,
    {
        self.add(None, Box::new(handler))
    }

    fn add(&mut self, filter: Option<EventKind>, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber { id, filter, handler });
        id
    }

    /// Returns false when the id was not (or no longer) subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Deliver to every matching subscriber; returns how many ran.
    pub fn dispatch(&mut self, event: &LeagueEvent) -> usize {
        let kind = event.kind();
        let mut delivered = 0;
        for sub in self.subscribers.iter_mut() {
            if sub.filter.is_none_or(|k| k == kind) {
                (sub.handler)(event);
                delivered += 1;
            }
        }
        delivered
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus").field("subscribers", &self.subscribers.len()).finish()
    }
}
