use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Metrics registry for the engine.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Total transactions evaluated
    pub transactions_total: AtomicU64,

    /// Verdicts by outcome
    pub verdicts_passed: AtomicU64,
    pub verdicts_failed: AtomicU64,

    /// Evaluation latency buckets (microseconds)
    pub latency_under_10us: AtomicU64,
    pub latency_10_100us: AtomicU64,
    pub latency_100us_1ms: AtomicU64,
    pub latency_over_1ms: AtomicU64,

    /// Rule set publishes
    pub publishes_total: AtomicU64,
    pub publish_errors: AtomicU64,

    /// Updates applied across local replicas
    pub updates_applied_total: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry.
    pub fn new() -> Self {
        MetricsRegistry::default()
    }

    /// Record a verdict outcome.
    pub fn record_verdict(&self, passed: bool) {
        self.transactions_total.fetch_add(1, Ordering::Relaxed);
        if passed {
            self.verdicts_passed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.verdicts_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record evaluation latency.
    pub fn record_latency(&self, start: Instant) {
        let micros = start.elapsed().as_micros() as u64;

        if micros < 10 {
            self.latency_under_10us.fetch_add(1, Ordering::Relaxed);
        } else if micros < 100 {
            self.latency_10_100us.fetch_add(1, Ordering::Relaxed);
        } else if micros < 1000 {
            self.latency_100us_1ms.fetch_add(1, Ordering::Relaxed);
        } else {
            self.latency_over_1ms.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a rule set publish.
    pub fn record_publish(&self, success: bool) {
        self.publishes_total.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.publish_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a rule update applied by a replica.
    pub fn record_update_applied(&self) {
        self.updates_applied_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Export metrics in Prometheus format.
    pub fn to_prometheus(&self) -> String {
        format!(
            r#"# HELP verdikt_transactions_total Total transactions evaluated
# TYPE verdikt_transactions_total counter
verdikt_transactions_total {}

# HELP verdikt_verdicts Verdicts by outcome
# TYPE verdikt_verdicts counter
verdikt_verdicts{{outcome="pass"}} {}
verdikt_verdicts{{outcome="fail"}} {}

# HELP verdikt_evaluation_latency_bucket Evaluation latency histogram
# TYPE verdikt_evaluation_latency_bucket counter
verdikt_evaluation_latency_bucket{{le="0.00001"}} {}
verdikt_evaluation_latency_bucket{{le="0.0001"}} {}
verdikt_evaluation_latency_bucket{{le="0.001"}} {}
verdikt_evaluation_latency_bucket{{le="+Inf"}} {}

# HELP verdikt_rule_publishes_total Rule set publish operations
# TYPE verdikt_rule_publishes_total counter
verdikt_rule_publishes_total {}

# HELP verdikt_rule_publish_errors_total Rule set publish failures
# TYPE verdikt_rule_publish_errors_total counter
verdikt_rule_publish_errors_total {}

# HELP verdikt_rule_updates_applied_total Rule updates applied by local replicas
# TYPE verdikt_rule_updates_applied_total counter
verdikt_rule_updates_applied_total {}
"#,
            self.transactions_total.load(Ordering::Relaxed),
            self.verdicts_passed.load(Ordering::Relaxed),
            self.verdicts_failed.load(Ordering::Relaxed),
            self.latency_under_10us.load(Ordering::Relaxed),
            self.latency_10_100us.load(Ordering::Relaxed),
            self.latency_100us_1ms.load(Ordering::Relaxed),
            self.latency_over_1ms.load(Ordering::Relaxed),
            self.publishes_total.load(Ordering::Relaxed),
            self.publish_errors.load(Ordering::Relaxed),
            self.updates_applied_total.load(Ordering::Relaxed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_verdict() {
        let metrics = MetricsRegistry::new();

        metrics.record_verdict(true);
        metrics.record_verdict(true);
        metrics.record_verdict(false);

        assert_eq!(metrics.transactions_total.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.verdicts_passed.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.verdicts_failed.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_record_latency() {
        let metrics = MetricsRegistry::new();

        let start = Instant::now();
        // Nothing between start and record: lands in a low bucket.
        metrics.record_latency(start);

        let total = metrics.latency_under_10us.load(Ordering::Relaxed)
            + metrics.latency_10_100us.load(Ordering::Relaxed)
            + metrics.latency_100us_1ms.load(Ordering::Relaxed)
            + metrics.latency_over_1ms.load(Ordering::Relaxed);
        assert_eq!(total, 1);
    }

    #[test]
    fn test_record_publish_failures() {
        let metrics = MetricsRegistry::new();

        metrics.record_publish(true);
        metrics.record_publish(false);

        assert_eq!(metrics.publishes_total.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.publish_errors.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_prometheus_format() {
        let metrics = MetricsRegistry::new();
        metrics.record_verdict(true);

        let output = metrics.to_prometheus();

        assert!(output.contains("verdikt_transactions_total 1"));
        assert!(output.contains("verdikt_verdicts{outcome=\"pass\"} 1"));
    }
}
