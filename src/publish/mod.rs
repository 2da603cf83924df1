pub mod rules_file;

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{error, info};

use crate::bus::{HandoffError, RuleBus, RuleUpdate};
use crate::domain::rule::{Rule, RuleSet, RuleSetError};
use crate::observability::MetricsRegistry;
use crate::store::GLOBAL_RULES_KEY;

/// Failure of a single publish call.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("invalid rule set: {0}")]
    InvalidRuleSet(#[from] RuleSetError),

    #[error("hand-off failed: {0}")]
    Handoff(#[from] HandoffError),
}

/// Receipt for a completed hand-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Rules in the published set
    pub rule_count: usize,

    /// Replicas reached immediately; later subscribers catch up from the
    /// retained value
    pub replicas_reached: usize,
}

/// Accepts full-replacement rule sets and hands them to the bus.
///
/// Each call runs on its own lightweight task, so a slow hand-off never
/// blocks the caller. The returned receiver resolves when the hand-off (not
/// convergence at every replica) completes; dropping it is fine, the
/// outcome is logged either way. Failed publishes are not retried, the
/// caller decides whether to resubmit.
#[derive(Clone)]
pub struct RulePublisher {
    bus: Arc<RuleBus>,
    metrics: Arc<MetricsRegistry>,
}

impl RulePublisher {
    pub fn new(bus: Arc<RuleBus>, metrics: Arc<MetricsRegistry>) -> Self {
        RulePublisher { bus, metrics }
    }

    /// Publish `rules` as the new rule set under the global broadcast key.
    pub fn publish(&self, rules: Vec<Rule>) -> oneshot::Receiver<Result<PublishOutcome, PublishError>> {
        let (done_tx, done_rx) = oneshot::channel();
        let bus = self.bus.clone();
        let metrics = self.metrics.clone();

        tokio::spawn(async move {
            let outcome = Self::handoff(&bus, rules);
            match &outcome {
                Ok(receipt) => {
                    metrics.record_publish(true);
                    info!(
                        rules = receipt.rule_count,
                        replicas = receipt.replicas_reached,
                        "rule set handed off"
                    );
                }
                Err(e) => {
                    metrics.record_publish(false);
                    error!(error = %e, "rule set publish failed");
                }
            }
            let _ = done_tx.send(outcome);
        });

        done_rx
    }

    fn handoff(bus: &RuleBus, rules: Vec<Rule>) -> Result<PublishOutcome, PublishError> {
        let rule_set = RuleSet::try_new(rules)?;
        let rule_count = rule_set.len();
        let replicas_reached =
            bus.handoff(RuleUpdate::new(GLOBAL_RULES_KEY, Arc::new(rule_set)))?;

        Ok(PublishOutcome {
            rule_count,
            replicas_reached,
        })
    }
}
