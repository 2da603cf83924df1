pub mod api;
pub mod bus;
pub mod config;
pub mod domain;
pub mod engine;
pub mod observability;
pub mod publish;
pub mod store;

pub use bus::{RuleBus, RuleUpdate};
pub use config::Config;
pub use domain::{EvaluationResult, Rule, RuleSet, Transaction};
pub use engine::Engine;
pub use publish::RulePublisher;
pub use store::{RuleStore, GLOBAL_RULES_KEY};
