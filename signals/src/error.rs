use thiserror::Error;

use crate::id::{ConnectionId, SignalId};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalError {
    #[error("connection {0} is no longer connected")]
    StaleConnection(ConnectionId),
    #[error("connection {connection} does not belong to {signal}")]
    ForeignConnection { connection: ConnectionId, signal: SignalId },
}
