use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Proof of a captured charge, as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    /// Provider-side reference (e.g. "pay_8f3a...").
    pub reference: String,
    pub amount_minor: i64,
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("payment declined: {0}")]
    Declined(String),

    #[error("payment provider error: {0}")]
    Provider(String),
}

/// Contract with the external payment processor. Consumed only by the
/// reservation coordinator during `confirm`; both failure variants are
/// recoverable from the caller's perspective (retry until the hold TTL).
#[async_trait]
pub trait PaymentAdapter: Send + Sync {
    /// Validate and capture a payment token for the given amount in minor
    /// currency units.
    async fn validate(&self, token: &str, amount_minor: i64)
        -> Result<PaymentReceipt, PaymentError>;
}
