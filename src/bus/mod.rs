use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::warn;

use crate::domain::rule::RuleSet;

/// A keyed, full-replacement rule set update carried by the bus.
#[derive(Debug, Clone)]
pub struct RuleUpdate {
    /// Broadcast key the value is stored under
    pub key: String,

    /// The complete replacement rule set
    pub rule_set: Arc<RuleSet>,
}

impl RuleUpdate {
    pub fn new(key: impl Into<String>, rule_set: Arc<RuleSet>) -> Self {
        RuleUpdate {
            key: key.into(),
            rule_set,
        }
    }
}

/// Hand-off rejection.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffError {
    #[error("rule bus is closed")]
    Closed,
}

/// In-process distribution layer for rule updates.
///
/// Every accepted hand-off fans out to all subscribed replicas in hand-off
/// order; the single producer side gives updates a total order that every
/// replica observes. The latest update is also retained so a replica that
/// subscribes later still converges without waiting for the next publish.
#[derive(Debug)]
pub struct RuleBus {
    tx: broadcast::Sender<RuleUpdate>,
    latest: RwLock<Option<RuleUpdate>>,
    open: AtomicBool,
}

impl RuleBus {
    /// Create a bus buffering up to `capacity` in-flight updates per replica.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        RuleBus {
            tx,
            latest: RwLock::new(None),
            open: AtomicBool::new(true),
        }
    }

    /// Subscribe a new replica to the update stream.
    ///
    /// Runs under the same lock `handoff` writes under, so a racing
    /// hand-off lands either wholly before this call (seen via the retained
    /// value) or wholly after (seen live). The feed never delivers an older
    /// update after a newer one.
    pub fn subscribe(&self) -> RuleFeed {
        let latest = self.latest.read();
        let rx = self.tx.subscribe();
        RuleFeed {
            pending: latest.clone(),
            rx,
        }
    }

    /// Hand an update to the bus for distribution.
    ///
    /// Returns the number of replicas the update reached immediately. Zero
    /// is not an error: the update is retained and delivered to whoever
    /// subscribes next.
    pub fn handoff(&self, update: RuleUpdate) -> Result<usize, HandoffError> {
        if !self.open.load(Ordering::Acquire) {
            return Err(HandoffError::Closed);
        }

        // Retain and send under one lock: concurrent hand-offs must leave
        // the retained value agreeing with the broadcast order, or live
        // replicas and late subscribers would converge on different sets.
        let mut latest = self.latest.write();
        *latest = Some(update.clone());
        Ok(self.tx.send(update).unwrap_or(0))
    }

    /// Refuse further hand-offs. Already-accepted updates still drain.
    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        !self.open.load(Ordering::Acquire)
    }

    /// Replicas currently subscribed.
    pub fn replica_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A replica's view of the update stream: the retained latest value first,
/// then live updates in hand-off order.
#[derive(Debug)]
pub struct RuleFeed {
    pending: Option<RuleUpdate>,
    rx: broadcast::Receiver<RuleUpdate>,
}

impl RuleFeed {
    /// Next update in order, or None once the bus is gone.
    ///
    /// A replica that falls behind the buffer capacity loses intermediate
    /// updates, which is safe here: updates are full replacements, so
    /// skipping straight to a newer one reaches the same end state.
    pub async fn recv(&mut self) -> Option<RuleUpdate> {
        if let Some(update) = self.pending.take() {
            return Some(update);
        }

        loop {
            match self.rx.recv().await {
                Ok(update) => return Some(update),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "rule feed lagged, resuming at newer updates");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
