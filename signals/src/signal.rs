use std::rc::Rc;

use crate::error::SignalError;
use crate::holder::{HolderRef, SignalHolder};
use crate::id::{ConnectionId, SignalId};
use crate::slot::{IntoSlot, Slot};
use crate::tracker::Tracker;

/// A typed, synchronous signal. `A` is the tuple of arguments every connected slot
/// receives: `Signal` (or `Signal<()>`) takes none, `Signal<(i32,)>` one, `Signal<(i32, String)>` two.
///
/// Emitting runs every connected slot to completion, in connection order, on the
/// caller's stack. Slots may connect, disconnect, clear or emit this same signal while
/// they run; removals made during an emission only become physical once the outermost
/// emission returns.
///
/// Dropping the signal notifies every [`Tracker`] watching it and releases all slots.
pub struct Signal<A = ()> {
    holder: Rc<SignalHolder<Slot<A>>>,
}

impl<A> Default for Signal<A> {
    fn default() -> Self { Self::new() }
}

impl<A> Signal<A> {
    pub fn new() -> Self { Self { holder: Rc::new(SignalHolder::new()) } }

    /// Get the unique identifier for this signal
    pub fn id(&self) -> SignalId { self.holder.id() }

    /// Connects a callback at the end of the slot list
    pub fn connect<F>(&self, callback: F) -> ConnectionId
    where F: IntoSlot<A> {
        self.holder.connect(callback.into_slot())
    }

    /// Removes one connection. During an emission the entry is only tombstoned, so the
    /// slot is skipped for the rest of the walk and erased when the emission finishes.
    ///
    /// Passing an id that was already disconnected, or that belongs to another signal, is a
    /// caller bug and is reported as an error rather than acted upon.
    pub fn disconnect(&self, id: ConnectionId) -> Result<(), SignalError> { self.holder.disconnect(id) }

    /// Removes every connection, with the same tombstoning rules as [`Signal::disconnect`]
    pub fn clear(&self) { self.holder.clear() }

    /// Adds `tracker` to the trackers notified when this signal is dropped.
    /// [`Tracker::join`] does this already.
    pub fn connect_tracker(&self, tracker: &Tracker) { self.holder.connect_tracker(tracker.id(), tracker.watcher()) }

    /// Stops notifying `tracker` on drop. Does nothing if it was not watching.
    pub fn disconnect_tracker(&self, tracker: &Tracker) { self.holder.disconnect_tracker(tracker.id()) }

    /// Physical length of the slot list. Tombstones left by disconnections during an
    /// ongoing emission are counted until that emission finishes.
    pub fn len(&self) -> usize { self.holder.len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Number of connections that will still be invoked
    pub fn connection_count(&self) -> usize { self.holder.live() }

    /// Ids of the live connections, in invocation order
    pub fn connection_ids(&self) -> Vec<ConnectionId> { self.holder.connection_ids() }

    /// How many emissions of this signal are currently on the stack
    pub fn emission_depth(&self) -> usize { self.holder.depth() }

    pub fn is_emitting(&self) -> bool { self.holder.is_emitting() }

    /// Number of live trackers watching this signal
    pub fn watcher_count(&self) -> usize { self.holder.watcher_count() }

    pub(crate) fn holder(&self) -> &Rc<SignalHolder<Slot<A>>> { &self.holder }
}

impl<A: Clone> Signal<A> {
    /// Invokes every connected slot with a clone of `args`.
    ///
    /// The walk goes by position and re-reads the live end of the list before each step.
    /// Slots connected by a running slot are appended at the tail and are therefore
    /// reached, and invoked, within this same emission. Tombstoned entries are skipped.
    #[cfg_attr(feature = "instrument", tracing::instrument(level = "trace", skip_all, fields(signal = %self.id())))]
    pub fn emit_with(&self, args: A) {
        // keep the holder alive even if a slot tears down whatever owns this signal
        let holder = Rc::clone(&self.holder);
        let _emitting = holder.begin_emit();
        let mut index = 0;
        while let Some(entry) = holder.slot_at(index) {
            if let Some(slot) = entry {
                slot.call(args.clone());
            }
            index += 1;
        }
    }
}

macro_rules! impl_emit {
    ($($arg:ident: $ty:ident),*) => {
        impl<$($ty: Clone),*> Signal<($($ty,)*)> {
            /// Invokes every connected slot with these arguments. See [`Signal::emit_with`].
            pub fn emit(&self, $($arg: $ty),*) { self.emit_with(($($arg,)*)) }
        }
    };
}

impl_emit!();
impl_emit!(a1: A1);
impl_emit!(a1: A1, a2: A2);
impl_emit!(a1: A1, a2: A2, a3: A3);
impl_emit!(a1: A1, a2: A2, a3: A3, a4: A4);

impl<A> Drop for Signal<A> {
    fn drop(&mut self) { self.holder.teardown() }
}

impl<A> std::fmt::Debug for Signal<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.id())
            .field("connections", &self.connection_count())
            .field("emission_depth", &self.emission_depth())
            .finish()
    }
}
