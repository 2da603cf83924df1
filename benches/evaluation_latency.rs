use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal::Decimal;
use std::sync::Arc;

use verdikt::domain::rule::{Rule, RuleSet};
use verdikt::domain::transaction::{AccountId, MerchantCategory, Transaction};
use verdikt::engine::{evaluate, rule_passes};
use verdikt::store::{RuleStore, GLOBAL_RULES_KEY};

fn create_test_transaction(amount: Decimal, category: &str) -> Transaction {
    Transaction::new(amount, AccountId::new("acct-1"), MerchantCategory::new(category))
}

fn standard_rule_set() -> RuleSet {
    RuleSet::try_new(vec![
        Rule::threshold("rule-amount", 1, Decimal::new(10000, 2)),
        Rule::location("rule-region", 2, ["US", "CA", "MX", "GB"]),
        Rule::frequency("rule-velocity", 3, 3600),
    ])
    .unwrap()
}

fn bench_threshold_rule(c: &mut Criterion) {
    let rule = Rule::threshold("rule-amount", 1, Decimal::new(10000, 2));
    let tx = create_test_transaction(Decimal::new(5000, 2), "US");

    c.bench_function("threshold_rule_pass", |b| {
        b.iter(|| rule_passes(black_box(&rule), black_box(&tx)))
    });
}

fn bench_location_rule(c: &mut Criterion) {
    let rule = Rule::location("rule-region", 2, ["US", "CA", "MX", "GB"]);
    let hit = create_test_transaction(Decimal::new(5000, 2), "GB");
    let miss = create_test_transaction(Decimal::new(5000, 2), "ZZ");

    c.bench_function("location_rule_match", |b| {
        b.iter(|| rule_passes(black_box(&rule), black_box(&hit)))
    });

    c.bench_function("location_rule_miss", |b| {
        b.iter(|| rule_passes(black_box(&rule), black_box(&miss)))
    });
}

fn bench_evaluate_passing(c: &mut Criterion) {
    let rules = standard_rule_set();
    let tx = create_test_transaction(Decimal::new(5000, 2), "US");

    c.bench_function("evaluate_all_pass", |b| {
        b.iter(|| evaluate(black_box(&tx), black_box(Some(&rules))))
    });
}

fn bench_evaluate_short_circuit(c: &mut Criterion) {
    let rules = standard_rule_set();
    let tx = create_test_transaction(Decimal::new(99900, 2), "ZZ");

    c.bench_function("evaluate_first_rule_fails", |b| {
        b.iter(|| evaluate(black_box(&tx), black_box(Some(&rules))))
    });
}

fn bench_evaluate_vacuous(c: &mut Criterion) {
    let tx = create_test_transaction(Decimal::new(5000, 2), "US");

    c.bench_function("evaluate_no_rules", |b| {
        b.iter(|| evaluate(black_box(&tx), black_box(None)))
    });
}

fn bench_evaluate_wide_rule_set(c: &mut Criterion) {
    let rules: Vec<Rule> = (0..50)
        .map(|i| Rule::threshold(format!("rule-{i}"), i, Decimal::new(1_000_000, 2)))
        .collect();
    let rules = RuleSet::try_new(rules).unwrap();
    let tx = create_test_transaction(Decimal::new(5000, 2), "US");

    c.bench_function("evaluate_50_rules_all_pass", |b| {
        b.iter(|| evaluate(black_box(&tx), black_box(Some(&rules))))
    });
}

fn bench_store_get_and_evaluate(c: &mut Criterion) {
    let store = RuleStore::new();
    store.apply(GLOBAL_RULES_KEY, Arc::new(standard_rule_set()));
    let tx = create_test_transaction(Decimal::new(5000, 2), "US");

    c.bench_function("store_snapshot_and_evaluate", |b| {
        b.iter(|| {
            let snapshot = store.get(black_box(GLOBAL_RULES_KEY));
            evaluate(black_box(&tx), snapshot.as_deref())
        })
    });
}

criterion_group!(
    benches,
    bench_threshold_rule,
    bench_location_rule,
    bench_evaluate_passing,
    bench_evaluate_short_circuit,
    bench_evaluate_vacuous,
    bench_evaluate_wide_rule_set,
    bench_store_get_and_evaluate,
);

criterion_main!(benches);
