mod common;
use common::{OnDrop, watcher};
use slotwire_signals::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[test]
fn test_join_connects_and_watches() {
    let signal: Signal<(i32,)> = Signal::new();
    let tracker = Tracker::new();
    let (record, check) = watcher();

    let id = tracker.join(&signal, move |n: i32| record(n));
    assert_eq!(id.signal(), signal.id());
    assert_eq!(tracker.track_id(&signal), Some(id));
    assert!(tracker.is_joined(&signal));
    assert_eq!(signal.connection_count(), 1);
    assert_eq!(signal.watcher_count(), 1);

    signal.emit(7);
    assert_eq!(check(), [7]);
}

#[test]
fn test_joining_the_same_signal_twice_keeps_the_first_connection() {
    let signal: Signal = Signal::new();
    let tracker = Tracker::new();
    let (record, check) = watcher();

    let first = {
        let record = record.clone();
        tracker.join(&signal, move || record("first"))
    };
    let len_after_first = signal.len();
    let second = tracker.join(&signal, move || record("second"));

    assert_eq!(first, second);
    assert_eq!(signal.len(), len_after_first);
    assert_eq!(tracker.len(), 1);
    assert_eq!(signal.watcher_count(), 1);

    signal.emit();
    assert_eq!(check(), ["first"]);
}

#[test]
fn test_duplicate_join_during_emission_leaves_only_a_tombstone() {
    let signal = Rc::new(Signal::<()>::new());
    let tracker = Rc::new(Tracker::new());
    let (record, check) = watcher();

    {
        let weak = Rc::downgrade(&signal);
        let tracker = tracker.clone();
        let record = record.clone();
        signal.connect(move || {
            let Some(signal) = weak.upgrade() else { return };
            let record = record.clone();
            tracker.join(&signal, move || record("joined"));
        });
    }

    // the first emission joins; the walk reaches the new slot in the same pass
    signal.emit();
    assert_eq!(check(), ["joined"]);
    assert_eq!(signal.len(), 2);

    // the second emission's join is a duplicate and is rolled back as a tombstone
    signal.emit();
    assert_eq!(check(), ["joined"]);
    assert_eq!(signal.len(), 2);
    assert_eq!(tracker.len(), 1);
}

#[test]
fn test_leave_signal_removes_exactly_one_connection() {
    let signal: Signal<(u8,)> = Signal::new();
    let tracker = Tracker::new();

    signal.connect(|_: u8| {});
    tracker.join(&signal, |_: u8| {});
    signal.connect(|_: u8| {});
    assert_eq!(signal.connection_count(), 3);

    tracker.leave_signal(&signal);
    assert_eq!(signal.connection_count(), 2);
    assert!(!tracker.is_joined(&signal));
    assert!(tracker.is_empty());
    // leave_signal keeps watching
    assert_eq!(signal.watcher_count(), 1);

    tracker.leave_signal(&signal);
    tracker.leave_all();
    assert_eq!(signal.connection_count(), 2);
    assert_eq!(signal.watcher_count(), 1);

    drop(tracker);
    assert_eq!(signal.watcher_count(), 0);
}

#[test]
fn test_leave_with_unwatch() {
    let signal: Signal = Signal::new();
    let tracker = Tracker::new();

    let id = tracker.join(&signal, || {});
    tracker.leave(id, true);
    assert!(signal.is_empty());
    assert_eq!(signal.watcher_count(), 0);

    // unknown ids are ignored
    tracker.leave(id, true);
    assert!(tracker.is_empty());
}

#[test]
fn test_track_ids_only_work_on_the_issuing_tracker() {
    let signal: Signal = Signal::new();
    let a = Tracker::new();
    let b = Tracker::new();

    let from_a = a.join(&signal, || {});
    let from_b = b.join(&signal, || {});
    assert_eq!(from_a.tracker(), a.id());
    assert_eq!(from_a.signal(), from_b.signal());
    assert_ne!(from_a, from_b);

    // same signal, wrong tracker: nothing is severed
    b.leave(from_a, true);
    assert_eq!(b.len(), 1);
    assert_eq!(a.len(), 1);
    assert_eq!(signal.connection_count(), 2);
    assert_eq!(signal.watcher_count(), 2);

    b.leave(from_b, true);
    assert!(b.is_empty());
    assert_eq!(signal.connection_count(), 1);
    assert_eq!(a.track_id(&signal), Some(from_a));
}

#[test]
fn test_dropping_a_tracker_removes_only_its_connections() {
    let a: Signal<(i32,)> = Signal::new();
    let b: Signal<(String,)> = Signal::new();
    let c: Signal = Signal::new();
    let untouched: Signal = Signal::new();

    a.connect(|_: i32| {});
    b.connect(|_: String| {});
    untouched.connect(|| {});

    let tracker = Tracker::new();
    tracker.join(&a, |_: i32| {});
    tracker.join(&b, |_: String| {});
    tracker.join(&c, || {});
    // rolled back, so no effect on the counts
    tracker.join(&a, |_: i32| {});
    assert_eq!(tracker.len(), 3);
    assert_eq!((a.connection_count(), b.connection_count(), c.connection_count()), (2, 2, 1));

    let other = Tracker::new();
    other.join(&a, |_: i32| {});

    drop(tracker);
    assert_eq!((a.connection_count(), b.connection_count(), c.connection_count()), (2, 1, 0));
    assert_eq!(untouched.connection_count(), 1);
    assert_eq!(a.watcher_count(), 1);
    assert_eq!(b.watcher_count(), 0);
    assert_eq!(other.len(), 1);
}

#[test]
fn test_dropping_a_signal_first_purges_the_tracker() {
    let tracker = Tracker::new();
    let kept: Signal = Signal::new();
    tracker.join(&kept, || {});

    let signal: Signal<(u32,)> = Signal::new();
    tracker.join(&signal, |_: u32| {});
    let track = tracker.track_id(&signal).unwrap();
    assert_eq!(tracker.len(), 2);

    drop(signal);
    assert_eq!(tracker.len(), 1);

    // leaving the dead signal, and then everything, is safe
    tracker.leave(track, true);
    tracker.leave_all();
    assert!(tracker.is_empty());
    assert!(kept.is_empty());
}

#[test]
fn test_unwatched_tracker_copes_with_a_dropped_signal() {
    // a tracker the signal stopped watching is not notified, and finds the dead handle on leave
    let tracker = Tracker::new();
    let signal: Signal = Signal::new();
    let track = tracker.join(&signal, || {});

    signal.disconnect_tracker(&tracker);
    assert_eq!(signal.watcher_count(), 0);
    drop(signal);

    assert_eq!(tracker.len(), 1);
    tracker.leave(track, false);
    assert!(tracker.is_empty());
}

#[test]
fn test_explicit_connect_tracker_is_idempotent() {
    let tracker = Tracker::new();
    let signal: Signal = Signal::new();

    signal.connect_tracker(&tracker);
    signal.connect_tracker(&tracker);
    tracker.join(&signal, || {});
    assert_eq!(signal.watcher_count(), 1);

    drop(tracker);
    assert_eq!(signal.watcher_count(), 0);
    assert!(signal.is_empty());
}

#[test]
fn test_reentrant_leave_from_slot_drop() {
    // dropping the slot's captures calls leave on the same track again
    let signal: Signal = Signal::new();
    let tracker = Rc::new(Tracker::new());
    let track = Rc::new(Cell::new(None));
    let dropped = Rc::new(Cell::new(false));

    let guard = {
        let tracker = Rc::downgrade(&tracker);
        let track = track.clone();
        let dropped = dropped.clone();
        OnDrop::new(move || {
            dropped.set(true);
            if let (Some(tracker), Some(id)) = (tracker.upgrade(), track.get()) {
                tracker.leave(id, true);
            }
        })
    };
    track.set(Some(tracker.join(&signal, move || {
        let _ = &guard;
    })));
    signal.connect(|| {});

    tracker.leave(track.get().unwrap(), true);
    assert!(dropped.get());
    assert!(tracker.is_empty());
    assert_eq!(signal.connection_count(), 1);
    assert_eq!(signal.watcher_count(), 0);
}

#[test]
fn test_leave_all_when_leaving_drops_another_track() {
    // leaving the first signal drops a slot whose captures leave the second one
    let first: Signal = Signal::new();
    let second: Signal = Signal::new();
    let tracker = Rc::new(Tracker::new());

    let second_track = Rc::new(RefCell::new(None::<TrackId>));
    let guard = {
        let tracker = Rc::downgrade(&tracker);
        let handle = second_track.clone();
        OnDrop::new(move || {
            if let (Some(tracker), Some(id)) = (tracker.upgrade(), handle.borrow_mut().take()) {
                tracker.leave(id, true);
            }
        })
    };

    // `first` has the lower id, so it is the entry leave_all takes first
    tracker.join(&first, move || {
        let _ = &guard;
    });
    *second_track.borrow_mut() = Some(tracker.join(&second, || {}));
    assert_eq!(tracker.len(), 2);

    tracker.leave_all();
    assert!(tracker.is_empty());
    assert!(first.is_empty());
    assert!(second.is_empty());
    assert_eq!(first.watcher_count() + second.watcher_count(), 0);
}

#[test]
fn test_tracker_dropped_inside_its_own_slot() {
    let signal = Signal::<()>::new();
    let owner: Rc<RefCell<Option<Tracker>>> = Rc::new(RefCell::new(Some(Tracker::new())));
    let (record, check) = watcher();

    {
        let owner_handle = owner.clone();
        let record = record.clone();
        let slot = move || {
            record("tracked");
            // the owner goes away mid-emission and takes the tracker with it
            let tracker = owner_handle.borrow_mut().take();
            drop(tracker);
        };
        let guard = owner.borrow();
        guard.as_ref().unwrap().join(&signal, slot);
    }
    signal.connect(move || record("plain"));

    signal.emit();
    assert_eq!(check(), ["tracked", "plain"]);
    assert_eq!(signal.len(), 1);
    assert_eq!(signal.watcher_count(), 0);

    signal.emit();
    assert_eq!(check(), ["plain"]);
}

#[test]
fn test_signal_released_by_its_own_tracked_slot() {
    let holder: Rc<RefCell<Option<Rc<Signal>>>> = Rc::new(RefCell::new(None));
    let tracker = Tracker::new();
    let (record, check) = watcher();

    let signal = Rc::new(Signal::<()>::new());
    {
        let holder = holder.clone();
        tracker.join(&signal, move || {
            record("tearing down");
            holder.borrow_mut().take();
        });
    }
    *holder.borrow_mut() = Some(signal.clone());

    // the emitting handle keeps the signal alive until it is released too
    signal.emit();
    assert_eq!(check(), ["tearing down"]);
    assert!(holder.borrow().is_none());
    assert_eq!(tracker.len(), 1);

    drop(signal);
    assert!(tracker.is_empty());
    tracker.leave_all();
}

#[test]
fn test_debug_output() {
    let tracker = Tracker::default();
    let signal: Signal = Signal::new();
    tracker.join(&signal, || {});

    let rendered = format!("{tracker:?}");
    assert!(rendered.contains("joined: 1"));
    assert!(tracker.id().to_string().starts_with("tracker#"));
}
