use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_SIGNAL_ID: AtomicUsize = AtomicUsize::new(1);
static NEXT_TRACKER_ID: AtomicUsize = AtomicUsize::new(1);

/// A unique identifier for a signal. Can only be created by a Signal and is used
/// by trackers to key their connections.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SignalId(usize);

impl SignalId {
    pub(crate) fn next() -> Self { Self(NEXT_SIGNAL_ID.fetch_add(1, Ordering::Relaxed)) }
}

impl From<SignalId> for usize {
    fn from(id: SignalId) -> Self { id.0 }
}

impl std::fmt::Display for SignalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "signal#{}", self.0) }
}

/// A unique identifier for a tracker, used by signals to key their watchers.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TrackerId(usize);

impl TrackerId {
    pub(crate) fn next() -> Self { Self(NEXT_TRACKER_ID.fetch_add(1, Ordering::Relaxed)) }
}

impl From<TrackerId> for usize {
    fn from(id: TrackerId) -> Self { id.0 }
}

impl std::fmt::Display for TrackerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "tracker#{}", self.0) }
}

/// Identifies one connection on one signal.
///
/// The id stays valid while other connections come and go. Once the connection itself
/// is disconnected the id is stale and must not be reused; doing so yields
/// [`SignalError::StaleConnection`](crate::SignalError::StaleConnection).
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ConnectionId {
    signal: SignalId,
    key: u64,
}

impl ConnectionId {
    pub(crate) fn new(signal: SignalId, key: u64) -> Self { Self { signal, key } }

    /// The signal this connection belongs to
    pub fn signal(&self) -> SignalId { self.signal }

    pub(crate) fn key(&self) -> u64 { self.key }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}/slot#{}", self.signal, self.key) }
}
