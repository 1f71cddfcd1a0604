use super::provider::{CreatePaymentInput, PaymentProvider, PaymentResult, RefundResult};
use crate::domain::{Money, PaymentMethod, PaymentStatus};
use crate::error::PaymentError;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Cash on delivery.
///
/// Nothing leaves the process: the payment starts out pending, the courier
/// collects the cash, and refunds are settled by hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct CashOnDeliveryProvider;

impl CashOnDeliveryProvider {
    pub fn transaction_id(order_id: &impl std::fmt::Display) -> String {
        format!("cod_{}", order_id)
    }
}

#[async_trait]
impl PaymentProvider for CashOnDeliveryProvider {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::CashOnDelivery
    }

    #[instrument(fields(order_id = %input.order_id, amount = %input.amount), skip(self, input))]
    async fn create_payment(
        &self,
        input: CreatePaymentInput,
    ) -> Result<PaymentResult, PaymentError> {
        debug!("Creating cash-on-delivery payment");
        Ok(PaymentResult {
            success: true,
            transaction_id: Some(Self::transaction_id(&input.order_id)),
            status: PaymentStatus::Pending,
            error: None,
            metadata: input.metadata,
        })
    }

    async fn verify_payment(&self, _transaction_id: &str) -> Result<bool, PaymentError> {
        // Collected in person at the door.
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn refund(
        &self,
        transaction_id: &str,
        amount: Money,
    ) -> Result<RefundResult, PaymentError> {
        debug!(transaction_id, amount = %amount, "Cash refunds are settled manually");
        Ok(RefundResult {
            success: true,
            refund_id: None,
            error: None,
        })
    }
}
