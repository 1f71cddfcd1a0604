use crate::domain::{Money, OrderId, PaymentMethod, PaymentStatus};
use crate::error::PaymentError;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq)]
pub struct CreatePaymentInput {
    pub order_id: OrderId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub metadata: Option<serde_json::Value>,
}

/// Outcome of initiating a payment.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentResult {
    pub success: bool,
    pub transaction_id: Option<String>,
    pub status: PaymentStatus,
    pub error: Option<String>,
    /// Provider data to keep on the payment row.
    pub metadata: Option<serde_json::Value>,
}

impl PaymentResult {
    /// Turns an unsuccessful result into a [`PaymentError::Declined`].
    pub fn into_accepted(self) -> Result<Self, PaymentError> {
        if self.success {
            Ok(self)
        } else {
            Err(PaymentError::Declined(
                self.error.unwrap_or_else(|| "payment was not accepted".to_string()),
            ))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefundResult {
    pub success: bool,
    pub refund_id: Option<String>,
    pub error: Option<String>,
}

/// A way of collecting money for an order.
///
/// `Err` means the provider call itself failed; a provider that answered but
/// refused reports `success: false` instead.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    fn method(&self) -> PaymentMethod;

    /// Create/initiate a payment for an order.
    async fn create_payment(
        &self,
        input: CreatePaymentInput,
    ) -> Result<PaymentResult, PaymentError>;

    /// Confirm that the money for `transaction_id` was actually collected.
    async fn verify_payment(&self, transaction_id: &str) -> Result<bool, PaymentError>;

    /// Return `amount` for `transaction_id`.
    async fn refund(
        &self,
        transaction_id: &str,
        amount: Money,
    ) -> Result<RefundResult, PaymentError>;
}
