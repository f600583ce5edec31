//! Election event bus.
//!
//! Scan resolutions, root updates and vote confirmations are fanned out to
//! any number of push listeners over a `tokio::sync::broadcast` channel.
//! Publication never blocks the service; slow subscribers simply lag and
//! miss events, which is acceptable for notification traffic (the root and
//! records stay queryable).

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;
use veilvote_types::{Commitment, Digest256, Nullifier};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElectionEvent {
    /// A scan resolved to a fresh credential.
    VoterProcessed {
        commitment: Commitment,
        nullifier: Nullifier,
        eligible: bool,
    },
    /// A scan was rejected; the reason is the operator-facing message.
    ScanRejected { reason: String },
    /// The membership root changed; external verifiers should republish.
    RootUpdated { root: Digest256, size: usize },
    /// A vote was confirmed on the external ledger.
    VoteRecorded {
        commitment: Commitment,
        tx_reference: String,
    },
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ElectionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ElectionEvent> {
        self.sender.subscribe()
    }

    /// Fire-and-forget publish; a send error only means nobody is listening.
    pub fn publish(&self, event: ElectionEvent) {
        trace!(?event, "Publishing election event");
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
