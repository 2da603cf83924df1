pub mod evaluate;
pub mod worker;

pub use evaluate::{evaluate, rule_passes};
pub use worker::EvaluationWorker;

use ahash::AHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::bus::RuleBus;
use crate::domain::transaction::Transaction;
use crate::domain::verdict::EvaluationResult;
use crate::observability::MetricsRegistry;

/// Submission rejection.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    #[error("evaluation workers have stopped")]
    Stopped,
}

/// Partitioned front of the evaluation workers.
///
/// Transactions are routed to a fixed worker by account id hash, so one
/// account's transactions evaluate in submission order while accounts
/// spread across workers run in parallel. Clones share the same partition
/// senders; dropping every clone closes the intakes and lets the workers
/// drain and stop.
#[derive(Clone)]
pub struct Engine {
    intakes: Vec<mpsc::Sender<Transaction>>,
}

/// Join handles for the spawned workers, kept out of `Engine` so clones of
/// the routing front stay cheap and the owner controls shutdown.
pub struct EngineWorkers {
    handles: Vec<JoinHandle<()>>,
}

impl EngineWorkers {
    /// Wait for every worker to drain its partition and stop.
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "evaluation worker exited abnormally");
            }
        }
    }
}

impl Engine {
    /// Spawn `workers` evaluation workers subscribed to `bus`.
    ///
    /// Workers subscribe before this returns, so updates handed off after
    /// start are never missed. Returns the routing front, the worker
    /// handles and the merged verdict stream.
    pub fn start(
        bus: &RuleBus,
        workers: usize,
        intake_capacity: usize,
        verdict_capacity: usize,
        metrics: Arc<MetricsRegistry>,
    ) -> (Engine, EngineWorkers, mpsc::Receiver<EvaluationResult>) {
        let workers = workers.max(1);
        let (verdict_tx, verdict_rx) = mpsc::channel(verdict_capacity.max(1));

        let mut intakes = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);

        for id in 0..workers {
            let (intake_tx, intake_rx) = mpsc::channel(intake_capacity.max(1));
            let worker = EvaluationWorker::new(
                id,
                bus.subscribe(),
                intake_rx,
                verdict_tx.clone(),
                metrics.clone(),
            );
            intakes.push(intake_tx);
            handles.push(tokio::spawn(worker.run()));
        }

        info!(workers, "evaluation engine started");

        (Engine { intakes }, EngineWorkers { handles }, verdict_rx)
    }

    /// Route a transaction to its partition.
    ///
    /// Waits for capacity when the partition is backed up, applying
    /// backpressure to the caller instead of dropping work.
    pub async fn submit(&self, tx: Transaction) -> Result<(), SubmitError> {
        let partition = self.partition(&tx);
        self.intakes[partition]
            .send(tx)
            .await
            .map_err(|_| SubmitError::Stopped)
    }

    pub fn worker_count(&self) -> usize {
        self.intakes.len()
    }

    /// Compute the partition for a transaction's account.
    #[inline]
    fn partition(&self, tx: &Transaction) -> usize {
        let mut hasher = AHasher::default();
        tx.account_id.hash(&mut hasher);
        (hasher.finish() as usize) % self.intakes.len()
    }
}
