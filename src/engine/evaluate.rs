use crate::domain::rule::{Rule, RuleSet};
use crate::domain::transaction::Transaction;
use crate::domain::verdict::EvaluationResult;

/// Test a single rule against a transaction.
///
/// Pure and total: no side effects, no failure path for well-formed input.
/// There is deliberately no wildcard arm, so a new rule variant does not
/// compile until it is handled here.
#[inline]
pub fn rule_passes(rule: &Rule, tx: &Transaction) -> bool {
    match rule {
        // Inclusive cap: an amount equal to the max passes.
        Rule::Threshold { max_amount, .. } => tx.amount <= *max_amount,

        // Exact, case-sensitive code match.
        Rule::Location {
            allowed_regions, ..
        } => allowed_regions
            .iter()
            .any(|region| region == &tx.merchant_category),

        // Needs per-account windowed history; passes until that lands.
        Rule::Frequency { .. } => true,
    }
}

/// Evaluate a transaction against a rule set snapshot.
///
/// Rules run in stored order and the first failure short-circuits the rest.
/// An absent or empty snapshot is the normal pre-publish state: the
/// transaction passes vacuously. Deterministic for a fixed snapshot and
/// transaction.
pub fn evaluate(tx: &Transaction, snapshot: Option<&RuleSet>) -> EvaluationResult {
    let rule_set = match snapshot {
        Some(rs) if !rs.is_empty() => rs,
        _ => return EvaluationResult::no_active_rules(tx.id.clone()),
    };

    for rule in rule_set.iter() {
        if !rule_passes(rule, tx) {
            return EvaluationResult::violation(tx, rule);
        }
    }

    EvaluationResult::passed_all(tx.id.clone())
}
