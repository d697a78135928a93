use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;

use liga_da_firma::events::{EventBus, EventKind, LeagueEvent};
use liga_da_firma::notify::{AutoConfirm, Confirm, Level, Notices};

fn calendar_changed() -> LeagueEvent {
    LeagueEvent::CalendarChanged { day: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap() }
}

#[test]
fn handlers_run_in_subscription_order_once_per_dispatch() {
    let mut bus = EventBus::new();
    let log: Rc<RefCell<Vec<&'static str>>> = Rc::default();
    for tag in ["first", "second", "third"] {
        let log = Rc::clone(&log);
        bus.subscribe_all(move |_| log.borrow_mut().push(tag));
    }
    assert_eq!(bus.dispatch(&calendar_changed()), 3);
    assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
}

#[test]
fn kind_filter_and_unsubscribe() {
    let mut bus = EventBus::new();
    let hits = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&hits);
    let id = bus.subscribe(EventKind::StatsChanged, move |_| *counter.borrow_mut() += 1);

    assert_eq!(bus.dispatch(&calendar_changed()), 0);
    bus.dispatch(&LeagueEvent::StatsChanged { stats: Default::default() });
    assert_eq!(*hits.borrow(), 1);

    assert!(bus.unsubscribe(id));
    assert!(!bus.unsubscribe(id));
    assert!(bus.is_empty());
    bus.dispatch(&LeagueEvent::StatsChanged { stats: Default::default() });
    assert_eq!(*hits.borrow(), 1);
}

#[test]
fn late_subscribers_miss_earlier_events() {
    let mut bus = EventBus::new();
    bus.dispatch(&calendar_changed());
    let hits = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&hits);
    bus.subscribe_all(move |_| *counter.borrow_mut() += 1);
    assert_eq!(*hits.borrow(), 0);
    assert_eq!(bus.len(), 1);
}

#[test]
fn notices_queue_in_order() {
    let mut notices = Notices::default();
    notices.info("one");
    notices.warn("two");
    notices.error("three");
    assert_eq!(notices.len(), 3);
    assert_eq!(notices.latest().map(|n| n.level), Some(Level::Error));
    let drained: Vec<String> = notices.drain().into_iter().map(|n| format!("{} {}", n.level, n.message)).collect();
    assert_eq!(drained, vec!["info one", "warn two", "error three"]);
    assert!(notices.is_empty());
}

#[test]
fn confirm_from_closures_and_fixed_answers() {
    let mut asked = 0;
    let mut ask = |_: &str| {
        asked += 1;
        false
    };
    assert!(!ask.confirm("sure?"));
    assert!(AutoConfirm(true).confirm("sure?"));
    assert_eq!(asked, 1);
}
