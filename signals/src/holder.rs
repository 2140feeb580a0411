use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Weak;

use tracing::{debug, trace};

use crate::connection_list::ConnectionList;
use crate::error::SignalError;
use crate::id::{ConnectionId, SignalId, TrackerId};

/// Something that must be told when a signal it watches goes away.
pub(crate) trait Watcher {
    /// Called by a dying signal. The signal's connections are already unreachable,
    /// so implementations must only forget about the signal, never call back into it.
    fn signal_dropped(&self, signal: SignalId);
}

/// Payload-erased view of a signal holder. This is what trackers keep a weak handle to.
pub(crate) trait HolderRef {
    fn signal_id(&self) -> SignalId;
    fn disconnect(&self, id: ConnectionId) -> Result<(), SignalError>;
    fn connect_tracker(&self, tracker: TrackerId, watcher: Weak<dyn Watcher>);
    fn disconnect_tracker(&self, tracker: TrackerId);
}

/// Owns the connection list of one signal, the set of trackers watching it and the
/// emission depth.
///
/// While the depth is non-zero nothing is physically erased from the list, only
/// tombstoned; the outermost emission compacts the list when it finishes. The holder
/// never invokes a slot itself, which is left to the typed [`Signal`](crate::Signal).
pub(crate) struct SignalHolder<S> {
    id: SignalId,
    slots: RefCell<ConnectionList<S>>,
    watchers: RefCell<BTreeMap<TrackerId, Weak<dyn Watcher>>>,
    depth: Cell<usize>,
}

/// Keeps the emission depth raised while alive
#[must_use = "the emission ends when this guard is dropped"]
pub(crate) struct Emitting<'a, S> {
    holder: &'a SignalHolder<S>,
}

impl<S> Drop for Emitting<'_, S> {
    fn drop(&mut self) { self.holder.end_emit() }
}

impl<S> SignalHolder<S> {
    pub fn new() -> Self {
        Self { id: SignalId::next(), slots: RefCell::new(ConnectionList::new()), watchers: RefCell::new(BTreeMap::new()), depth: Cell::new(0) }
    }

    pub fn id(&self) -> SignalId { self.id }

    pub fn connect(&self, slot: S) -> ConnectionId {
        let key = self.slots.borrow_mut().push(slot);
        let id = ConnectionId::new(self.id, key);
        trace!("{} connected", id);
        id
    }

    pub fn disconnect(&self, id: ConnectionId) -> Result<(), SignalError> {
        if id.signal() != self.id {
            return Err(SignalError::ForeignConnection { connection: id, signal: self.id });
        }
        let emitting = self.is_emitting();
        let removed = {
            let mut slots = self.slots.borrow_mut();
            if emitting { slots.tombstone(id.key()) } else { slots.erase(id.key()) }
        };
        // the slot is dropped here, after the borrow is released, because its captures may
        // call back into this signal
        match removed {
            Some(_slot) => {
                trace!("{} disconnected{}", id, if emitting { " (tombstoned)" } else { "" });
                Ok(())
            }
            None => Err(SignalError::StaleConnection(id)),
        }
    }

    pub fn clear(&self) {
        let removed = {
            let mut slots = self.slots.borrow_mut();
            if self.is_emitting() { slots.tombstone_all() } else { slots.take_all() }
        };
        trace!("{} cleared {} connections", self.id, removed.len());
        drop(removed);
    }

    pub fn begin_emit(&self) -> Emitting<'_, S> {
        self.depth.set(self.depth.get() + 1);
        Emitting { holder: self }
    }

    fn end_emit(&self) {
        let depth = self.depth.get() - 1;
        self.depth.set(depth);
        if depth == 0 {
            let compacted = self.slots.borrow_mut().compact();
            if compacted > 0 {
                trace!("{} compacted {} tombstones", self.id, compacted);
            }
        }
    }

    pub fn depth(&self) -> usize { self.depth.get() }

    pub fn is_emitting(&self) -> bool { self.depth.get() > 0 }

    pub fn len(&self) -> usize { self.slots.borrow().len() }

    pub fn live(&self) -> usize { self.slots.borrow().live() }

    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.slots.borrow().live_keys().map(|key| ConnectionId::new(self.id, key)).collect()
    }

    pub fn watcher_count(&self) -> usize { self.watchers.borrow().values().filter(|watcher| watcher.strong_count() > 0).count() }

    /// Tells every live watcher that this signal is going away, then releases all slots.
    pub fn teardown(&self) {
        let watchers = std::mem::take(&mut *self.watchers.borrow_mut());
        if !watchers.is_empty() {
            debug!("{} dropped, notifying {} trackers", self.id, watchers.len());
        }
        for watcher in watchers.values().filter_map(Weak::upgrade) {
            watcher.signal_dropped(self.id);
        }
        let slots = self.slots.borrow_mut().take_all();
        drop(slots);
    }
}

impl<S: Clone> SignalHolder<S> {
    /// The entry at `index`, cloned out so no borrow is held while it runs
    pub fn slot_at(&self, index: usize) -> Option<Option<S>> { self.slots.borrow().slot_at(index) }
}

impl<S> HolderRef for SignalHolder<S> {
    fn signal_id(&self) -> SignalId { self.id }

    fn disconnect(&self, id: ConnectionId) -> Result<(), SignalError> { SignalHolder::disconnect(self, id) }

    fn connect_tracker(&self, tracker: TrackerId, watcher: Weak<dyn Watcher>) {
        let mut watchers = self.watchers.borrow_mut();
        watchers.retain(|_, watcher| watcher.strong_count() > 0);
        watchers.insert(tracker, watcher);
    }

    fn disconnect_tracker(&self, tracker: TrackerId) { self.watchers.borrow_mut().remove(&tracker); }
}
