use crate::domain::{
    Address, AddressId, Food, FoodId, FoodPatch, FoodSummary, Order, OrderId, OrderLine,
    OrderStatus, Payment, PaymentStatus, User, UserId, UserProfile,
};
use crate::error::StoreError;
use chrono::{DateTime, Utc};
use tokio::sync::oneshot;

pub type StoreResult<T> = Result<T, StoreError>;
pub type StoreResponse<T> = oneshot::Sender<StoreResult<T>>;

/// One staged write of a unit of work.
#[derive(Debug, Clone)]
pub enum WriteOp {
    UpsertUser(User),
    UpsertAddress(Address),
    UpsertFood(Food),
    /// Touches only the patched columns, never `stock`.
    PatchFood { food_id: FoodId, patch: FoodPatch },
    InsertOrder(Order),
    InsertLine(OrderLine),
    InsertPayment(Payment),
    /// Conditional decrement: fails unless `stock >= quantity`.
    DecrementStock { food_id: FoodId, quantity: u32 },
    RestoreStock { food_id: FoodId, quantity: u32 },
    /// Compare-and-set on the order status.
    SetOrderStatus {
        order_id: OrderId,
        expected: OrderStatus,
        status: OrderStatus,
        at: DateTime<Utc>,
    },
    SetPaymentStatus {
        order_id: OrderId,
        status: PaymentStatus,
        at: DateTime<Utc>,
    },
}

/// Which orders to load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub id: Option<OrderId>,
    pub owner: Option<UserId>,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: OrderId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn owned_by(mut self, owner: UserId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_status(mut self, status: Option<OrderStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.id.as_ref().map_or(true, |id| &order.id == id)
            && self.owner.as_ref().map_or(true, |owner| &order.user_id == owner)
            && self.status.map_or(true, |status| order.status == status)
    }
}

/// Offset/limit slice of a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: usize,
    pub limit: usize,
}

/// An order line with the food's current display data.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRecord {
    pub line: OrderLine,
    /// `None` if the food row is gone.
    pub food: Option<FoodSummary>,
}

/// An order joined with everything read paths need, loaded in one actor turn.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub order: Order,
    pub lines: Vec<LineRecord>,
    pub payment: Option<Payment>,
    pub address: Option<Address>,
    pub owner: Option<UserProfile>,
}

/// A window of order records plus the number of matches before windowing.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecords {
    pub records: Vec<OrderRecord>,
    pub total: usize,
}

#[derive(Debug)]
pub enum StoreRequest {
    GetFood {
        id: FoodId,
        respond_to: StoreResponse<Option<Food>>,
    },
    /// Reads several foods in one turn, so a pricing pass sees a single snapshot.
    GetFoods {
        ids: Vec<FoodId>,
        respond_to: StoreResponse<Vec<Food>>,
    },
    GetUser {
        id: UserId,
        respond_to: StoreResponse<Option<User>>,
    },
    GetAddress {
        id: AddressId,
        respond_to: StoreResponse<Option<Address>>,
    },
    LoadOrders {
        filter: OrderFilter,
        window: Option<Window>,
        respond_to: StoreResponse<OrderRecords>,
    },
    Commit {
        ops: Vec<WriteOp>,
        respond_to: StoreResponse<()>,
    },
    #[cfg(test)]
    GetCounts {
        respond_to: StoreResponse<super::tables::TableCounts>,
    },
    Shutdown,
}
