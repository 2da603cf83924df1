use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::bus::{RuleFeed, RuleUpdate};
use crate::domain::transaction::Transaction;
use crate::domain::verdict::EvaluationResult;
use crate::observability::MetricsRegistry;
use crate::store::{RuleStore, GLOBAL_RULES_KEY};

use super::evaluate::evaluate;

/// One evaluation worker, bound to one partition of the transaction stream.
///
/// The worker exclusively owns its rule store replica. Updates from the bus
/// are applied between evaluations, never during one, so each evaluation
/// reads a single coherent snapshot. Transactions in the partition are
/// processed strictly in arrival order.
pub struct EvaluationWorker {
    id: usize,
    store: RuleStore,
    feed: Option<RuleFeed>,
    transactions: mpsc::Receiver<Transaction>,
    verdicts: mpsc::Sender<EvaluationResult>,
    metrics: Arc<MetricsRegistry>,
}

impl EvaluationWorker {
    pub fn new(
        id: usize,
        feed: RuleFeed,
        transactions: mpsc::Receiver<Transaction>,
        verdicts: mpsc::Sender<EvaluationResult>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        EvaluationWorker {
            id,
            store: RuleStore::new(),
            feed: Some(feed),
            transactions,
            verdicts,
            metrics,
        }
    }

    /// Run until the partition intake closes and drains, or the verdict
    /// consumer goes away.
    pub async fn run(self) {
        let EvaluationWorker {
            id,
            store,
            mut feed,
            mut transactions,
            verdicts,
            metrics,
        } = self;

        loop {
            tokio::select! {
                // Queued rule updates drain before the next transaction, so
                // an evaluation never runs against a staler snapshot than it
                // has to.
                biased;

                update = next_update(&mut feed), if feed.is_some() => {
                    match update {
                        Some(update) => apply(&store, &metrics, id, &update),
                        None => {
                            debug!(worker = id, "rule feed closed");
                            feed = None;
                        }
                    }
                }

                maybe_tx = transactions.recv() => {
                    match maybe_tx {
                        Some(tx) => {
                            if !process(&store, &verdicts, &metrics, id, tx).await {
                                debug!(worker = id, "verdict consumer gone, stopping");
                                break;
                            }
                        }
                        None => {
                            debug!(worker = id, "partition intake closed, stopping");
                            break;
                        }
                    }
                }
            }
        }
    }
}

async fn next_update(feed: &mut Option<RuleFeed>) -> Option<RuleUpdate> {
    match feed {
        Some(feed) => feed.recv().await,
        None => std::future::pending().await,
    }
}

fn apply(store: &RuleStore, metrics: &MetricsRegistry, worker: usize, update: &RuleUpdate) {
    store.apply_update(update);
    metrics.record_update_applied();
    debug!(
        worker,
        key = %update.key,
        rules = update.rule_set.len(),
        "applied rule update"
    );
}

async fn process(
    store: &RuleStore,
    verdicts: &mpsc::Sender<EvaluationResult>,
    metrics: &MetricsRegistry,
    worker: usize,
    tx: Transaction,
) -> bool {
    let started = Instant::now();
    let snapshot = store.get(GLOBAL_RULES_KEY);
    let verdict = evaluate(&tx, snapshot.as_deref());

    metrics.record_verdict(verdict.passed);
    metrics.record_latency(started);

    if !verdict.passed {
        warn!(
            worker,
            transaction_id = %verdict.transaction_id,
            rule_id = %verdict.rule_id,
            reason = %verdict.reason,
            "transaction violated rule"
        );
    }

    verdicts.send(verdict).await.is_ok()
}
