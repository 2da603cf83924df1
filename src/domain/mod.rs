pub mod rule;
pub mod transaction;
pub mod verdict;

pub use rule::{Rule, RuleId, RuleSet, RuleSetError};
pub use transaction::{AccountId, MerchantCategory, Transaction, TransactionId};
pub use verdict::EvaluationResult;
