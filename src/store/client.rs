use super::messages::{OrderFilter, OrderRecords, StoreRequest, Window, WriteOp};
use super::unit_of_work::UnitOfWork;
use crate::domain::{Address, AddressId, Food, FoodId, User, UserId};
use crate::error::StoreError;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

/// Handle to the [`super::StoreActor`]. Cheap to clone.
#[derive(Clone)]
pub struct StoreClient {
    sender: mpsc::Sender<StoreRequest>,
}

impl StoreClient {
    pub fn new(sender: mpsc::Sender<StoreRequest>) -> Self {
        Self { sender }
    }

    /// Starts a unit of work. Nothing reaches the store until [`UnitOfWork::commit`].
    pub fn begin(&self, label: &'static str) -> UnitOfWork {
        UnitOfWork::new(self.clone(), label)
    }

    /// Sends staged writes to be applied atomically.
    #[instrument(fields(op_count = ops.len()), skip(self, ops))]
    pub async fn commit(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Commit { ops, respond_to })
            .await
            .map_err(|_| StoreError::ActorCommunicationError("Actor closed".to_string()))?;
        response
            .await
            .map_err(|_| StoreError::ActorCommunicationError("Actor dropped".to_string()))?
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        debug!("Sending shutdown request");
        self.sender
            .send(StoreRequest::Shutdown)
            .await
            .map_err(|_| StoreError::ActorCommunicationError("Actor closed".to_string()))
    }
}

crate::client_method!(StoreClient => fn get_food(id: FoodId) -> Option<Food> as StoreRequest::GetFood, Error = StoreError);
crate::client_method!(StoreClient => fn get_foods(ids: Vec<FoodId>) -> Vec<Food> as StoreRequest::GetFoods, Error = StoreError);
crate::client_method!(StoreClient => fn get_user(id: UserId) -> Option<User> as StoreRequest::GetUser, Error = StoreError);
crate::client_method!(StoreClient => fn get_address(id: AddressId) -> Option<Address> as StoreRequest::GetAddress, Error = StoreError);
crate::client_method!(StoreClient => fn load_orders(filter: OrderFilter, window: Option<Window>) -> OrderRecords as StoreRequest::LoadOrders, Error = StoreError);
#[cfg(test)]
crate::client_method!(StoreClient => fn get_counts() -> super::tables::TableCounts as StoreRequest::GetCounts, Error = StoreError);
