//! Order status machine.
//!
//! `pending -> confirmed -> preparing -> ready -> out_for_delivery -> delivered`, plus
//! `cancelled` from any non-terminal status. `delivered` and `cancelled` are final.

use crate::config::OrdersConfig;
use crate::domain::{FoodId, OrderStatus, PaymentStatus};
use crate::error::OrderError;
use crate::store::OrderRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPolicy {
    /// Only allow moving one step along the chain at a time.
    pub strict_adjacency: bool,
    pub restore_stock_on_cancel: bool,
}

impl Default for StatusPolicy {
    fn default() -> Self {
        Self::from_config(&OrdersConfig::default())
    }
}

/// What happens to the payment when an order reaches a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentEffect {
    Unchanged,
    /// Mark completed once the provider verifies the transaction.
    Complete,
    /// Mark failed; nothing was collected.
    Fail,
    /// Refund through the provider, then mark refunded.
    Refund,
}

/// Side effects that commit together with a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEffects {
    pub restore_stock: Vec<(FoodId, u32)>,
    pub payment: PaymentEffect,
}

impl StatusPolicy {
    pub fn from_config(config: &OrdersConfig) -> Self {
        Self {
            strict_adjacency: config.strict_adjacency,
            restore_stock_on_cancel: config.restore_stock_on_cancel,
        }
    }

    /// Whether `from -> to` is allowed.
    pub fn check(&self, from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
        let invalid = Err(OrderError::InvalidTransition { from, to });

        if from.is_terminal() {
            return invalid;
        }
        if to == OrderStatus::Cancelled {
            return Ok(());
        }

        match (from.rank(), to.rank()) {
            (Some(current), Some(target)) if target > current => {
                if self.strict_adjacency && target != current + 1 {
                    invalid
                } else {
                    Ok(())
                }
            }
            _ => invalid,
        }
    }

    /// Side effects of moving `record` to `to`. Assumes [`Self::check`] passed.
    pub fn effects(&self, record: &OrderRecord, to: OrderStatus) -> StatusEffects {
        let payment_status = record.payment.as_ref().map(|payment| payment.status);

        match to {
            OrderStatus::Delivered => StatusEffects {
                restore_stock: Vec::new(),
                payment: match payment_status {
                    Some(PaymentStatus::Pending) => PaymentEffect::Complete,
                    _ => PaymentEffect::Unchanged,
                },
            },
            OrderStatus::Cancelled => StatusEffects {
                restore_stock: if self.restore_stock_on_cancel {
                    record
                        .lines
                        .iter()
                        .map(|l| (l.line.food_id.clone(), l.line.quantity))
                        .collect()
                } else {
                    Vec::new()
                },
                payment: match payment_status {
                    Some(PaymentStatus::Pending) => PaymentEffect::Fail,
                    Some(PaymentStatus::Completed) => PaymentEffect::Refund,
                    _ => PaymentEffect::Unchanged,
                },
            },
            _ => StatusEffects {
                restore_stock: Vec::new(),
                payment: PaymentEffect::Unchanged,
            },
        }
    }
}
