use serde::{Deserialize, Serialize};

use super::rule::Rule;
use super::transaction::{Transaction, TransactionId};

/// Sentinel rule id reported when no rules were active.
pub const NO_ACTIVE_RULES: &str = "NONE";

/// Sentinel rule id reported when every active rule passed.
pub const ALL_RULES_PASSED: &str = "ALL";

/// Outcome of evaluating one transaction against one rule set snapshot.
///
/// Exactly one result is emitted per evaluated transaction. `rule_id` names
/// the first failing rule, or one of the sentinels when nothing failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Transaction this verdict is for
    pub transaction_id: TransactionId,

    /// First failing rule id, or "NONE" / "ALL"
    pub rule_id: String,

    /// Whether the transaction passed
    pub passed: bool,

    /// Human-readable explanation of the outcome
    pub reason: String,
}

impl EvaluationResult {
    /// Vacuous pass: no rule set was active for the transaction.
    pub fn no_active_rules(transaction_id: TransactionId) -> Self {
        EvaluationResult {
            transaction_id,
            rule_id: NO_ACTIVE_RULES.to_string(),
            passed: true,
            reason: "no active rules".to_string(),
        }
    }

    /// Every rule in the active set passed.
    pub fn passed_all(transaction_id: TransactionId) -> Self {
        EvaluationResult {
            transaction_id,
            rule_id: ALL_RULES_PASSED.to_string(),
            passed: true,
            reason: "passed all rules".to_string(),
        }
    }

    /// The first failing rule, with a reason naming the violated condition.
    pub fn violation(tx: &Transaction, rule: &Rule) -> Self {
        let reason = match rule {
            Rule::Threshold { max_amount, .. } => format!(
                "threshold rule violated: amount {} exceeds max {}",
                tx.amount, max_amount
            ),
            Rule::Location {
                allowed_regions, ..
            } => {
                let allowed: Vec<&str> = allowed_regions.iter().map(|r| r.as_str()).collect();
                format!(
                    "location rule violated: category {} not in [{}]",
                    tx.merchant_category,
                    allowed.join(", ")
                )
            }
            Rule::Frequency {
                time_window_secs, ..
            } => format!(
                "frequency rule violated: too many transactions within {time_window_secs}s"
            ),
        };

        EvaluationResult {
            transaction_id: tx.id.clone(),
            rule_id: rule.rule_id().as_str().to_string(),
            passed: false,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::{AccountId, MerchantCategory};
    use rust_decimal::Decimal;

    fn test_tx(amount: Decimal, category: &str) -> Transaction {
        Transaction::new(amount, AccountId::new("acct-1"), MerchantCategory::new(category))
    }

    #[test]
    fn test_no_active_rules_sentinel() {
        let verdict = EvaluationResult::no_active_rules(TransactionId::from_string("tx-1"));

        assert!(verdict.passed);
        assert_eq!(verdict.rule_id, "NONE");
        assert_eq!(verdict.reason, "no active rules");
    }

    #[test]
    fn test_passed_all_sentinel() {
        let verdict = EvaluationResult::passed_all(TransactionId::from_string("tx-2"));

        assert!(verdict.passed);
        assert_eq!(verdict.rule_id, "ALL");
        assert_eq!(verdict.reason, "passed all rules");
    }

    #[test]
    fn test_threshold_violation_names_amounts() {
        let tx = test_tx(Decimal::new(15000, 2), "GROCERY");
        let rule = Rule::threshold("rule-1", 1, Decimal::new(10000, 2));

        let verdict = EvaluationResult::violation(&tx, &rule);

        assert!(!verdict.passed);
        assert_eq!(verdict.rule_id, "rule-1");
        assert_eq!(
            verdict.reason,
            "threshold rule violated: amount 150.00 exceeds max 100.00"
        );
    }

    #[test]
    fn test_location_violation_lists_allowed_codes() {
        let tx = test_tx(Decimal::new(500, 2), "UK");
        let rule = Rule::location("rule-loc", 2, ["US", "CA"]);

        let verdict = EvaluationResult::violation(&tx, &rule);

        assert!(!verdict.passed);
        assert_eq!(verdict.rule_id, "rule-loc");
        assert_eq!(
            verdict.reason,
            "location rule violated: category UK not in [US, CA]"
        );
    }

    #[test]
    fn test_verdict_serde_roundtrip() {
        let verdict = EvaluationResult::passed_all(TransactionId::from_string("tx-3"));
        let json = serde_json::to_string(&verdict).unwrap();
        let back: EvaluationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, verdict);
    }
}
