use super::client::StoreClient;
use super::messages::WriteOp;
use crate::domain::{FoodId, Order, OrderId, OrderLine, OrderStatus, Payment, PaymentStatus};
use crate::error::StoreError;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

/// Staged writes that commit atomically or not at all.
///
/// Dropping a unit of work without committing it is a rollback.
pub struct UnitOfWork {
    client: StoreClient,
    label: &'static str,
    ops: Vec<WriteOp>,
    finished: bool,
}

impl UnitOfWork {
    pub(super) fn new(client: StoreClient, label: &'static str) -> Self {
        Self {
            client,
            label,
            ops: Vec::new(),
            finished: false,
        }
    }

    pub fn push(&mut self, op: WriteOp) -> &mut Self {
        self.ops.push(op);
        self
    }

    pub fn insert_order(&mut self, order: Order) -> &mut Self {
        self.push(WriteOp::InsertOrder(order))
    }

    pub fn insert_line(&mut self, line: OrderLine) -> &mut Self {
        self.push(WriteOp::InsertLine(line))
    }

    pub fn insert_payment(&mut self, payment: Payment) -> &mut Self {
        self.push(WriteOp::InsertPayment(payment))
    }

    pub fn decrement_stock(&mut self, food_id: FoodId, quantity: u32) -> &mut Self {
        self.push(WriteOp::DecrementStock { food_id, quantity })
    }

    pub fn restore_stock(&mut self, food_id: FoodId, quantity: u32) -> &mut Self {
        self.push(WriteOp::RestoreStock { food_id, quantity })
    }

    pub fn set_order_status(
        &mut self,
        order_id: OrderId,
        expected: OrderStatus,
        status: OrderStatus,
        at: DateTime<Utc>,
    ) -> &mut Self {
        self.push(WriteOp::SetOrderStatus {
            order_id,
            expected,
            status,
            at,
        })
    }

    pub fn set_payment_status(
        &mut self,
        order_id: OrderId,
        status: PaymentStatus,
        at: DateTime<Utc>,
    ) -> &mut Self {
        self.push(WriteOp::SetPaymentStatus {
            order_id,
            status,
            at,
        })
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[instrument(
        name = "commit_unit",
        skip(self),
        fields(unit = self.label, op_count = self.ops.len())
    )]
    pub async fn commit(mut self) -> Result<(), StoreError> {
        self.finished = true;
        let ops = std::mem::take(&mut self.ops);
        self.client.commit(ops).await
    }

    pub fn rollback(mut self) {
        self.finished = true;
        debug!(unit = self.label, op_count = self.ops.len(), "Unit of work rolled back");
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        if !self.finished && !self.ops.is_empty() {
            debug!(
                unit = self.label,
                op_count = self.ops.len(),
                "Unit of work dropped without commit, staged writes discarded"
            );
        }
    }
}
