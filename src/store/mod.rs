use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::bus::RuleUpdate;
use crate::domain::rule::RuleSet;

/// Key under which the entire rule set is broadcast and looked up.
///
/// Rule state is deliberately single-keyed: one update replaces everything,
/// every replica converges on the same value. The store still stores keys
/// generically so the broadcast layer stays value-agnostic.
pub const GLOBAL_RULES_KEY: &str = "GLOBAL_RULES_KEY";

/// A locally materialized replica of broadcast rule state.
///
/// Each evaluation worker (and the API, for readiness reporting) owns one
/// replica fed from the bus. Reads return the current snapshot without any
/// network hop and may trail the publisher by in-flight updates. Applying
/// an update replaces the stored value wholesale, so re-applying an
/// identical update is observably a no-op.
#[derive(Debug, Default)]
pub struct RuleStore {
    values: RwLock<HashMap<String, Arc<RuleSet>>>,
    applied: AtomicU64,
}

impl RuleStore {
    pub fn new() -> Self {
        RuleStore {
            values: RwLock::new(HashMap::new()),
            applied: AtomicU64::new(0),
        }
    }

    /// Current snapshot for `key`, or None before the first update lands.
    pub fn get(&self, key: &str) -> Option<Arc<RuleSet>> {
        self.values.read().get(key).cloned()
    }

    /// Replace the value under `key` with a new snapshot.
    pub fn apply(&self, key: impl Into<String>, rule_set: Arc<RuleSet>) {
        self.values.write().insert(key.into(), rule_set);
        self.applied.fetch_add(1, Ordering::Relaxed);
    }

    /// Apply a bus update.
    pub fn apply_update(&self, update: &RuleUpdate) {
        self.apply(update.key.clone(), update.rule_set.clone());
    }

    /// Total updates applied to this replica since creation.
    pub fn applied_updates(&self) -> u64 {
        self.applied.load(Ordering::Relaxed)
    }

    /// Number of rules currently active under the global key.
    pub fn active_rule_count(&self) -> usize {
        self.get(GLOBAL_RULES_KEY).map(|rs| rs.len()).unwrap_or(0)
    }
}
