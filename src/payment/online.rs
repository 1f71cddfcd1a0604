use super::provider::{CreatePaymentInput, PaymentProvider, PaymentResult, RefundResult};
use crate::domain::{Money, PaymentMethod, PaymentStatus};
use crate::error::PaymentError;
use async_trait::async_trait;
use tracing::{instrument, warn};

const NOT_CONFIGURED: &str = "online gateway not configured";

/// Placeholder for a card/online gateway.
///
/// Every call answers "not accepted", so choosing this method aborts order
/// creation before anything is written.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnlineGatewayProvider;

#[async_trait]
impl PaymentProvider for OnlineGatewayProvider {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::OnlineGateway
    }

    #[instrument(skip(self, input))]
    async fn create_payment(
        &self,
        input: CreatePaymentInput,
    ) -> Result<PaymentResult, PaymentError> {
        warn!(
            order_id = %input.order_id,
            amount = %input.amount,
            "Online payment requested but no gateway is configured"
        );
        Ok(PaymentResult {
            success: false,
            transaction_id: None,
            status: PaymentStatus::Failed,
            error: Some(NOT_CONFIGURED.to_string()),
            metadata: None,
        })
    }

    async fn verify_payment(&self, _transaction_id: &str) -> Result<bool, PaymentError> {
        Ok(false)
    }

    async fn refund(
        &self,
        _transaction_id: &str,
        _amount: Money,
    ) -> Result<RefundResult, PaymentError> {
        Ok(RefundResult {
            success: false,
            refund_id: None,
            error: Some(NOT_CONFIGURED.to_string()),
        })
    }
}
