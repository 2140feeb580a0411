/// Ordered list of slot entries belonging to one signal.
///
/// Entries are addressed by a key handed out in increasing order, so list order,
/// key order and invocation order coincide and lookups are a binary search.
/// An entry whose slot is `None` is a tombstone: it keeps its position (and every
/// position behind it) stable until the next [`ConnectionList::compact`].
pub(crate) struct ConnectionList<S> {
    entries: Vec<Entry<S>>,
    next_key: u64,
}

struct Entry<S> {
    key: u64,
    slot: Option<S>,
}

impl<S> Default for ConnectionList<S> {
    fn default() -> Self { Self::new() }
}

impl<S> ConnectionList<S> {
    pub fn new() -> Self { Self { entries: Vec::new(), next_key: 0 } }

    /// Appends a slot at the tail and returns its key
    pub fn push(&mut self, slot: S) -> u64 {
        let key = self.next_key;
        self.next_key += 1;
        self.entries.push(Entry { key, slot: Some(slot) });
        key
    }

    fn position(&self, key: u64) -> Option<usize> { self.entries.binary_search_by_key(&key, |entry| entry.key).ok() }

    /// Replaces the slot at `key` with a tombstone, keeping every position intact.
    /// Returns the removed slot, or `None` if `key` is unknown or already tombstoned.
    pub fn tombstone(&mut self, key: u64) -> Option<S> {
        let position = self.position(key)?;
        self.entries[position].slot.take()
    }

    /// Physically removes the entry at `key`.
    /// Returns the removed slot, or `None` if `key` is unknown or tombstoned.
    pub fn erase(&mut self, key: u64) -> Option<S> {
        let position = self.position(key)?;
        if self.entries[position].slot.is_none() {
            return None;
        }
        self.entries.remove(position).slot
    }

    /// Tombstones every entry, returning the slots that were still live
    pub fn tombstone_all(&mut self) -> Vec<S> { self.entries.iter_mut().filter_map(|entry| entry.slot.take()).collect() }

    /// Empties the list, returning the slots that were still live
    pub fn take_all(&mut self) -> Vec<S> { std::mem::take(&mut self.entries).into_iter().filter_map(|entry| entry.slot).collect() }

    /// Erases all tombstones. Returns how many were removed.
    pub fn compact(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.slot.is_some());
        before - self.entries.len()
    }

    /// Physical length, tombstones included
    pub fn len(&self) -> usize { self.entries.len() }

    /// Number of entries that are not tombstones
    pub fn live(&self) -> usize { self.entries.iter().filter(|entry| entry.slot.is_some()).count() }

    /// Keys of the live entries, in list order
    pub fn live_keys(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.iter().filter(|entry| entry.slot.is_some()).map(|entry| entry.key)
    }
}

impl<S: Clone> ConnectionList<S> {
    /// The entry at `index`: `None` past the end, `Some(None)` for a tombstone.
    pub fn slot_at(&self, index: usize) -> Option<Option<S>> { self.entries.get(index).map(|entry| entry.slot.clone()) }
}
