use std::cell::RefCell;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::holder::{HolderRef, SignalHolder, Watcher};
use crate::id::{ConnectionId, SignalId, TrackerId};
use crate::signal::Signal;
use crate::slot::{IntoSlot, Slot};

/// Identifies what a [`Tracker`] joined. A tracker holds at most one connection per
/// signal, so this is the issuing tracker's id plus the joined signal's id.
/// Only the tracker that returned it acts on it.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TrackId {
    tracker: TrackerId,
    signal: SignalId,
}

impl TrackId {
    /// The tracker that issued this track
    pub fn tracker(&self) -> TrackerId { self.tracker }

    /// The signal this track refers to
    pub fn signal(&self) -> SignalId { self.signal }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}/{}", self.tracker, self.signal) }
}

#[derive(Clone)]
struct TrackedConnection {
    signal: Weak<dyn HolderRef>,
    connection: ConnectionId,
}

struct Inner {
    id: TrackerId,
    // one entry per joined signal
    connections: RefCell<BTreeMap<SignalId, TrackedConnection>>,
}

/// Remembers every connection made through [`Tracker::join`], across any number of
/// signals, and severs all of them when dropped.
///
/// Neither side owns the other: a tracker holds weak handles to the signals it joined, and
/// each of those signals holds a weak handle back so it can tell the tracker when it is
/// dropped first.
///
/// # Example
/// ```rust
/// use slotwire_signals::*;
///
/// let resized: Signal<(u32, u32)> = Signal::new();
/// let closed: Signal = Signal::new();
///
/// let tracker = Tracker::new();
/// tracker.join(&resized, |_w: u32, _h: u32| {});
/// tracker.join(&closed, || {});
/// assert_eq!(resized.connection_count(), 1);
///
/// drop(tracker);
/// assert_eq!(resized.connection_count(), 0);
/// assert_eq!(closed.connection_count(), 0);
/// ```
pub struct Tracker(Rc<Inner>);

impl Default for Tracker {
    fn default() -> Self { Self::new() }
}

impl Tracker {
    pub fn new() -> Self { Self(Rc::new(Inner { id: TrackerId::next(), connections: RefCell::new(BTreeMap::new()) })) }

    /// Get the unique identifier for this tracker
    pub fn id(&self) -> TrackerId { self.0.id }

    pub(crate) fn watcher(&self) -> Weak<dyn Watcher> {
        let watcher: Weak<Inner> = Rc::downgrade(&self.0);
        watcher
    }

    /// Connects `callback` to `signal` and remembers the connection.
    ///
    /// If this tracker already joined `signal`, the new connection is disconnected right
    /// away and the existing track is returned, so a tracker never holds more than one live
    /// connection per signal. Either way the tracker ends up watching `signal`.
    pub fn join<A, F>(&self, signal: &Signal<A>, callback: F) -> TrackId
    where
        A: 'static,
        F: IntoSlot<A>,
    {
        let connection = signal.connect(callback);
        let signal_id = signal.id();

        let duplicate = match self.0.connections.borrow_mut().entry(signal_id) {
            Entry::Occupied(_) => true,
            Entry::Vacant(entry) => {
                let holder: Weak<SignalHolder<Slot<A>>> = Rc::downgrade(signal.holder());
                entry.insert(TrackedConnection { signal: holder, connection });
                false
            }
        };

        if duplicate {
            debug!("{} already joined {}, rolling back {}", self.0.id, signal_id, connection);
            if let Err(err) = signal.disconnect(connection) {
                warn!("{} failed to roll back {}: {}", self.0.id, connection, err);
            }
        } else {
            debug!("{} joined {} via {}", self.0.id, signal_id, connection);
        }

        signal.connect_tracker(self);
        self.track(signal_id)
    }

    fn track(&self, signal: SignalId) -> TrackId { TrackId { tracker: self.0.id, signal } }

    /// Disconnects the connection behind `id` and forgets it. With `also_unwatch` the tracker
    /// also stops watching the signal. Unknown ids, and ids issued by another tracker,
    /// are ignored.
    pub fn leave(&self, id: TrackId, also_unwatch: bool) {
        if id.tracker != self.0.id {
            debug!("{} ignored {}, issued by another tracker", self.0.id, id);
            return;
        }
        // The entry is moved out and the map borrow released before disconnecting: dropping the
        // slot may run arbitrary code, including another `leave` on this very tracker.
        let removed = self.0.connections.borrow_mut().remove(&id.signal);
        let Some(tracked) = removed else { return };

        let Some(signal) = tracked.signal.upgrade() else {
            debug!("{} left {}, which is already gone", self.0.id, id.signal);
            return;
        };
        match signal.disconnect(tracked.connection) {
            Ok(()) => debug!("{} left {}", self.0.id, signal.signal_id()),
            Err(err) => warn!("{} left {}: {}", self.0.id, signal.signal_id(), err),
        }
        if also_unwatch {
            signal.disconnect_tracker(self.0.id);
        }
    }

    /// Leaves `signal` if this tracker joined it; otherwise does nothing
    pub fn leave_signal<A>(&self, signal: &Signal<A>) {
        if let Some(id) = self.track_id(signal) {
            self.leave(id, false);
        }
    }

    /// Leaves every joined signal, unwatching each of them.
    pub fn leave_all(&self) {
        // Take whichever entry is first each time round, since leaving one may remove others.
        loop {
            let first = self.0.connections.borrow().keys().next().copied();
            let Some(signal) = first else { break };
            self.leave(self.track(signal), true);
        }
    }

    /// The track for `signal`, if this tracker joined it
    pub fn track_id<A>(&self, signal: &Signal<A>) -> Option<TrackId> {
        let signal_id = signal.id();
        self.0.connections.borrow().contains_key(&signal_id).then(|| self.track(signal_id))
    }

    pub fn is_joined<A>(&self, signal: &Signal<A>) -> bool { self.track_id(signal).is_some() }

    /// Number of signals currently joined
    pub fn len(&self) -> usize { self.0.connections.borrow().len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl Watcher for Inner {
    fn signal_dropped(&self, signal: SignalId) {
        if self.connections.borrow_mut().remove(&signal).is_some() {
            debug!("{} forgot {}", self.id, signal);
        }
    }
}

impl Drop for Tracker {
    fn drop(&mut self) { self.leave_all() }
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker").field("id", &self.0.id).field("joined", &self.len()).finish()
    }
}
