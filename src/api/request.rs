use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::rule::Rule;
use crate::domain::transaction::{AccountId, MerchantCategory, Transaction, TransactionId};

/// Request to replace the active rule set.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublishRulesRequest {
    /// The complete replacement set, in evaluation order
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// A transaction submitted for evaluation.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Client-supplied id; generated when omitted
    #[serde(default)]
    pub id: Option<String>,

    /// Amount as an exact decimal string
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,

    /// Originating account
    pub account_id: String,

    /// Merchant category code
    pub merchant_category: String,

    /// When the transaction occurred; defaults to submission time
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Ingestion-boundary validation failures.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("amount must not be negative, got {0}")]
    NegativeAmount(Decimal),

    #[error("account_id must not be empty")]
    EmptyAccountId,

    #[error("merchant_category must not be empty")]
    EmptyMerchantCategory,
}

impl TransactionRequest {
    /// Validate and convert into a domain transaction.
    ///
    /// Everything past this boundary assumes well-formed input, so a
    /// malformed transaction is rejected here and never reaches a worker.
    pub fn into_transaction(self) -> Result<Transaction, ValidationError> {
        if self.amount < Decimal::ZERO {
            return Err(ValidationError::NegativeAmount(self.amount));
        }
        if self.account_id.trim().is_empty() {
            return Err(ValidationError::EmptyAccountId);
        }
        if self.merchant_category.trim().is_empty() {
            return Err(ValidationError::EmptyMerchantCategory);
        }

        Ok(Transaction {
            id: self.id.map(TransactionId::from_string).unwrap_or_default(),
            amount: self.amount,
            account_id: AccountId::new(self.account_id),
            merchant_category: MerchantCategory::new(self.merchant_category),
            occurred_at: self.occurred_at.unwrap_or_else(Utc::now),
        })
    }
}
