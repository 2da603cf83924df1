use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique transaction identifier. Opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub String);

impl TransactionId {
    pub fn new() -> Self {
        TransactionId(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        TransactionId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        TransactionId::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account that originated a transaction. Partition routing hashes this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        AccountId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Merchant category / region code attached to a transaction.
///
/// Codes are compared byte-for-byte: "US" and "us" are different codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MerchantCategory(pub String);

impl MerchantCategory {
    pub fn new(code: impl Into<String>) -> Self {
        MerchantCategory(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MerchantCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An observed financial transaction submitted for evaluation.
///
/// Transactions are immutable once ingested: evaluation never mutates them,
/// it only reads fields. Validation happens at the ingestion boundary, so
/// everything past that point can assume a well-formed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier
    pub id: TransactionId,

    /// Monetary amount (exact decimal, serialized as string)
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,

    /// Originating account
    pub account_id: AccountId,

    /// Merchant category code for the purchase
    pub merchant_category: MerchantCategory,

    /// When the transaction occurred
    pub occurred_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a transaction with a fresh id and the current timestamp.
    pub fn new(
        amount: Decimal,
        account_id: AccountId,
        merchant_category: MerchantCategory,
    ) -> Self {
        Transaction {
            id: TransactionId::new(),
            amount,
            account_id,
            merchant_category,
            occurred_at: Utc::now(),
        }
    }
}
