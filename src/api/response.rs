use serde::Serialize;

use crate::domain::transaction::TransactionId;

/// Response for an accepted rule set publication.
#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub status: String,

    /// Rules in the published set
    pub rule_count: usize,

    /// Replicas the update reached immediately
    pub replicas_reached: usize,
}

impl PublishResponse {
    pub fn published(rule_count: usize, replicas_reached: usize) -> Self {
        PublishResponse {
            status: "published".to_string(),
            rule_count,
            replicas_reached,
        }
    }
}

/// Response for an accepted transaction.
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub status: String,

    /// Id the verdict will be reported under
    pub transaction_id: TransactionId,
}

impl IngestResponse {
    pub fn accepted(transaction_id: TransactionId) -> Self {
        IngestResponse {
            status: "accepted".to_string(),
            transaction_id,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub workers: usize,
    pub active_rules: usize,
    pub applied_updates: u64,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        ErrorResponse {
            error: error.into(),
            code: code.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ErrorResponse::new(message, "BAD_REQUEST")
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        ErrorResponse::new(message, "UNAVAILABLE")
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        ErrorResponse::new(message, "INTERNAL_ERROR")
    }
}
