use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use thiserror::Error;

use super::transaction::MerchantCategory;

/// Unique rule identifier within a rule set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub String);

impl RuleId {
    pub fn new(id: impl Into<String>) -> Self {
        RuleId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A business rule applied to every transaction.
///
/// The variant set is closed: dispatch sites match without a wildcard arm,
/// so adding a variant refuses to compile until every site handles it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    /// Caps the transaction amount. Amounts at the cap pass.
    Threshold {
        rule_id: RuleId,
        /// Informational ordering hint; never changes evaluation order
        priority: i32,
        #[serde(with = "rust_decimal::serde::str")]
        max_amount: Decimal,
    },

    /// Restricts the merchant category to an allowed set of codes.
    Location {
        rule_id: RuleId,
        priority: i32,
        allowed_regions: SmallVec<[MerchantCategory; 4]>,
    },

    /// Transaction-velocity cap. Evaluation needs per-account windowed
    /// history which is not wired up yet, so the rule currently passes
    /// everything while staying addressable in rule sets.
    Frequency {
        rule_id: RuleId,
        priority: i32,
        time_window_secs: u64,
    },
}

impl Rule {
    /// Threshold rule capping amounts at `max_amount` inclusive.
    pub fn threshold(rule_id: impl Into<String>, priority: i32, max_amount: Decimal) -> Self {
        Rule::Threshold {
            rule_id: RuleId::new(rule_id),
            priority,
            max_amount,
        }
    }

    /// Location rule allowing only the given merchant category codes.
    pub fn location<I, S>(rule_id: impl Into<String>, priority: i32, allowed_regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Rule::Location {
            rule_id: RuleId::new(rule_id),
            priority,
            allowed_regions: allowed_regions
                .into_iter()
                .map(MerchantCategory::new)
                .collect(),
        }
    }

    /// Frequency rule over a sliding window of `time_window_secs`.
    pub fn frequency(rule_id: impl Into<String>, priority: i32, time_window_secs: u64) -> Self {
        Rule::Frequency {
            rule_id: RuleId::new(rule_id),
            priority,
            time_window_secs,
        }
    }

    pub fn rule_id(&self) -> &RuleId {
        match self {
            Rule::Threshold { rule_id, .. } => rule_id,
            Rule::Location { rule_id, .. } => rule_id,
            Rule::Frequency { rule_id, .. } => rule_id,
        }
    }

    pub fn priority(&self) -> i32 {
        match self {
            Rule::Threshold { priority, .. } => *priority,
            Rule::Location { priority, .. } => *priority,
            Rule::Frequency { priority, .. } => *priority,
        }
    }

    /// Stable lowercase kind name, used in verdict reasons and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Rule::Threshold { .. } => "threshold",
            Rule::Location { .. } => "location",
            Rule::Frequency { .. } => "frequency",
        }
    }
}

/// Rule set construction failures.
#[derive(Error, Debug)]
pub enum RuleSetError {
    #[error("duplicate rule id: {0}")]
    DuplicateRuleId(String),

    #[error("rule id must not be empty")]
    EmptyRuleId,
}

/// The complete collection of rules in force, in evaluation order.
///
/// Rule sets are replaced wholesale on every update and never mutated in
/// place; holders of a snapshot keep seeing the version they grabbed. The
/// stored order is the evaluation order. The per-rule priority field is
/// carried for operator tooling and does not reorder anything.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RuleSet {
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// Empty rule set: every transaction passes vacuously.
    pub fn empty() -> Self {
        RuleSet { rules: Vec::new() }
    }

    /// Build a rule set, enforcing unique non-empty rule ids.
    pub fn try_new(rules: Vec<Rule>) -> Result<Self, RuleSetError> {
        let mut seen = std::collections::HashSet::with_capacity(rules.len());
        for rule in &rules {
            let id = rule.rule_id();
            if id.as_str().is_empty() {
                return Err(RuleSetError::EmptyRuleId);
            }
            if !seen.insert(id.clone()) {
                return Err(RuleSetError::DuplicateRuleId(id.as_str().to_string()));
            }
        }
        Ok(RuleSet { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_new_accepts_unique_ids() {
        let rs = RuleSet::try_new(vec![
            Rule::threshold("rule-1", 1, Decimal::new(10000, 2)),
            Rule::location("rule-2", 2, ["US", "CA"]),
            Rule::frequency("rule-3", 3, 3600),
        ])
        .unwrap();

        assert_eq!(rs.len(), 3);
        assert_eq!(rs.rules[0].rule_id().as_str(), "rule-1");
    }

    #[test]
    fn test_try_new_rejects_duplicate_ids() {
        let err = RuleSet::try_new(vec![
            Rule::threshold("rule-1", 1, Decimal::new(10000, 2)),
            Rule::frequency("rule-1", 2, 60),
        ])
        .unwrap_err();

        assert!(matches!(err, RuleSetError::DuplicateRuleId(id) if id == "rule-1"));
    }

    #[test]
    fn test_try_new_rejects_empty_id() {
        let err = RuleSet::try_new(vec![Rule::threshold("", 1, Decimal::ONE)]).unwrap_err();
        assert!(matches!(err, RuleSetError::EmptyRuleId));
    }

    #[test]
    fn test_priority_does_not_reorder() {
        // Stored order survives construction regardless of priorities.
        let rs = RuleSet::try_new(vec![
            Rule::threshold("low", 100, Decimal::ONE),
            Rule::threshold("high", 1, Decimal::ONE),
        ])
        .unwrap();

        assert_eq!(rs.rules[0].rule_id().as_str(), "low");
        assert_eq!(rs.rules[1].rule_id().as_str(), "high");
    }

    #[test]
    fn test_rule_serde_is_tagged_by_type() {
        let rule = Rule::threshold("rule-1", 1, Decimal::new(10000, 2));
        let json = serde_json::to_string(&rule).unwrap();

        assert!(json.contains("\"type\":\"threshold\""));
        assert!(json.contains("\"max_amount\":\"100.00\""));

        let back: Rule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rule);
    }

    #[test]
    fn test_location_rule_from_json() {
        let json = r#"{
            "type": "location",
            "rule_id": "rule-loc",
            "priority": 2,
            "allowed_regions": ["US", "CA"]
        }"#;

        let rule: Rule = serde_json::from_str(json).unwrap();
        match &rule {
            Rule::Location {
                allowed_regions, ..
            } => assert_eq!(allowed_regions.len(), 2),
            other => panic!("expected location rule, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_rule_type_is_rejected() {
        let json = r#"{"type": "sanctions", "rule_id": "rule-x", "priority": 1}"#;
        assert!(serde_json::from_str::<Rule>(json).is_err());
    }
}
