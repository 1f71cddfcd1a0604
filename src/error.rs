use crate::domain::{FoodId, OrderId, OrderStatus, PaymentMethod};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors raised by the store actor.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("{table} not found: {id}")]
    NotFound { table: &'static str, id: String },
    #[error("{table} already exists: {id}")]
    Duplicate { table: &'static str, id: String },
    #[error("Insufficient stock for {food_id}: requested {requested}, available {available}")]
    InsufficientStock {
        food_id: FoodId,
        requested: u32,
        available: u32,
    },
    #[error("Order {order_id} is {actual}, expected {expected}")]
    StatusMismatch {
        order_id: OrderId,
        expected: OrderStatus,
        actual: OrderStatus,
    },
    #[error("Constraint violated: {0}")]
    Constraint(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

/// Errors raised by payment providers.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PaymentError {
    #[error("Payment declined: {0}")]
    Declined(String),
    #[error("No provider registered for payment method {0}")]
    Unsupported(PaymentMethod),
    #[error("Payment provider error: {0}")]
    Provider(String),
}

/// Field-level validation detail, shaped like `{ formErrors, fieldErrors }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationErrors {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.field_errors.entry(field.into()).or_default().push(message.into());
    }

    pub fn form(&mut self, message: impl Into<String>) {
        self.form_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    /// `Ok(())` when nothing was recorded, otherwise the collected errors.
    pub fn into_result(self) -> Result<(), OrderError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(OrderError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.form_errors.clone();
        for (field, messages) in &self.field_errors {
            parts.push(format!("{}: {}", field, messages.join(", ")));
        }
        f.write_str(&parts.join("; "))
    }
}

/// Coarse category of an [`OrderError`], for callers that render messages or map
/// to transport status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Forbidden,
    Internal,
}

/// Errors surfaced by the order workflow.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order validation error: {0}")]
    Validation(ValidationErrors),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("{name} is not available")]
    Unavailable { food_id: FoodId, name: String },
    #[error("Insufficient stock for {name}: requested {requested}, available {available}")]
    OutOfStock {
        food_id: FoodId,
        name: String,
        requested: u32,
        available: u32,
    },
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Admin access required")]
    Forbidden,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OrderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Unavailable { .. } | Self::OutOfStock { .. } | Self::InvalidTransition { .. } => {
                ErrorKind::Conflict
            }
            Self::Forbidden => ErrorKind::Forbidden,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn order_not_found(id: &OrderId) -> Self {
        Self::NotFound {
            entity: "Order",
            id: id.to_string(),
        }
    }
}

impl From<StoreError> for OrderError {
    fn from(e: StoreError) -> Self {
        match e {
            // The conditional decrement lost a race with another order.
            StoreError::InsufficientStock {
                food_id,
                requested,
                available,
            } => OrderError::OutOfStock {
                name: food_id.to_string(),
                food_id,
                requested,
                available,
            },
            other => OrderError::Internal(other.to_string()),
        }
    }
}

impl From<PaymentError> for OrderError {
    fn from(e: PaymentError) -> Self {
        OrderError::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(OrderError::Forbidden.kind(), ErrorKind::Forbidden);
        assert_eq!(
            OrderError::order_not_found(&OrderId::from("o-1")).kind(),
            ErrorKind::NotFound
        );
        let conflict = OrderError::InvalidTransition {
            from: OrderStatus::Delivered,
            to: OrderStatus::Pending,
        };
        assert_eq!(conflict.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_store_stock_error_maps_to_conflict() {
        let err: OrderError = StoreError::InsufficientStock {
            food_id: FoodId::from("pizza-1"),
            requested: 6,
            available: 4,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err: OrderError = StoreError::Constraint("boom".into()).into();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_validation_errors_collect_per_field() {
        let mut errors = ValidationErrors::new();
        errors.field("items", "must not be empty");
        errors.field("items", "second");
        errors.form("bad request");
        assert_eq!(errors.to_string(), "bad request; items: must not be empty, second");
        assert!(matches!(errors.into_result(), Err(OrderError::Validation(_))));
        assert!(ValidationErrors::new().into_result().is_ok());
    }
}
