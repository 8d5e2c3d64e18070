use async_trait::async_trait;
use chrono::Utc;
use greenline_core::{PaymentAdapter, PaymentError, PaymentReceipt};
use uuid::Uuid;

/// Deterministic stand-in for the payment processor, used in development
/// and tests: approves every token except empty ones and those prefixed
/// "fail-".
pub struct DevPaymentAdapter;

#[async_trait]
impl PaymentAdapter for DevPaymentAdapter {
    async fn validate(
        &self,
        token: &str,
        amount_minor: i64,
    ) -> Result<PaymentReceipt, PaymentError> {
        if token.trim().is_empty() {
            return Err(PaymentError::Declined("missing payment token".to_string()));
        }
        if token.starts_with("fail-") {
            return Err(PaymentError::Declined("declined by issuer".to_string()));
        }
        Ok(PaymentReceipt {
            reference: format!("dev-{}", Uuid::new_v4()),
            amount_minor,
            captured_at: Utc::now(),
        })
    }
}
