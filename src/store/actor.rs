use super::client::StoreClient;
use super::messages::{OrderFilter, OrderRecords, StoreRequest, StoreResponse, Window, WriteOp};
use super::tables::Tables;
use crate::domain::{Address, AddressId, Food, FoodId, User, UserId};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Owns every table. Requests are handled one at a time, so a commit can never
/// interleave with another commit or with a read.
pub struct StoreActor {
    receiver: mpsc::Receiver<StoreRequest>,
    tables: Tables,
}

impl StoreActor {
    pub fn new(buffer_size: usize) -> (Self, StoreClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            tables: Tables::new(),
        };
        (actor, StoreClient::new(sender))
    }

    /// Main actor loop. Ends on `Shutdown` or when every client is dropped.
    #[instrument(name = "store_actor", skip(self))]
    pub async fn run(mut self) {
        info!("StoreActor starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::GetFood { id, respond_to } => self.handle_get_food(id, respond_to),
                StoreRequest::GetFoods { ids, respond_to } => {
                    self.handle_get_foods(ids, respond_to)
                }
                StoreRequest::GetUser { id, respond_to } => self.handle_get_user(id, respond_to),
                StoreRequest::GetAddress { id, respond_to } => {
                    self.handle_get_address(id, respond_to)
                }
                StoreRequest::LoadOrders {
                    filter,
                    window,
                    respond_to,
                } => self.handle_load_orders(filter, window, respond_to),
                StoreRequest::Commit { ops, respond_to } => self.handle_commit(ops, respond_to),
                #[cfg(test)]
                StoreRequest::GetCounts { respond_to } => {
                    let _ = respond_to.send(Ok(self.tables.counts()));
                }
                StoreRequest::Shutdown => {
                    info!("StoreActor shutting down");
                    break;
                }
            }
        }

        info!("StoreActor stopped");
    }

    #[instrument(fields(food_id = %id), skip(self, respond_to))]
    fn handle_get_food(&self, id: FoodId, respond_to: StoreResponse<Option<Food>>) {
        debug!("Processing get_food request");
        let food = self.tables.foods.get(&id).cloned();
        let _ = respond_to.send(Ok(food));
    }

    #[instrument(fields(count = ids.len()), skip(self, ids, respond_to))]
    fn handle_get_foods(&self, ids: Vec<FoodId>, respond_to: StoreResponse<Vec<Food>>) {
        debug!("Processing get_foods request");
        let foods = ids
            .iter()
            .filter_map(|id| self.tables.foods.get(id).cloned())
            .collect();
        let _ = respond_to.send(Ok(foods));
    }

    #[instrument(fields(user_id = %id), skip(self, respond_to))]
    fn handle_get_user(&self, id: UserId, respond_to: StoreResponse<Option<User>>) {
        debug!("Processing get_user request");
        let user = self.tables.users.get(&id).cloned();
        let _ = respond_to.send(Ok(user));
    }

    #[instrument(fields(address_id = %id), skip(self, respond_to))]
    fn handle_get_address(&self, id: AddressId, respond_to: StoreResponse<Option<Address>>) {
        debug!("Processing get_address request");
        let address = self.tables.addresses.get(&id).cloned();
        let _ = respond_to.send(Ok(address));
    }

    #[instrument(skip(self, respond_to))]
    fn handle_load_orders(
        &self,
        filter: OrderFilter,
        window: Option<Window>,
        respond_to: StoreResponse<OrderRecords>,
    ) {
        debug!("Processing load_orders request");
        let records = self.tables.load_orders(&filter, window);
        debug!(matched = records.total, returned = records.records.len(), "Orders loaded");
        let _ = respond_to.send(Ok(records));
    }

    #[instrument(fields(op_count = ops.len()), skip(self, ops, respond_to))]
    fn handle_commit(&mut self, ops: Vec<WriteOp>, respond_to: StoreResponse<()>) {
        debug!("Processing commit request");
        let result = self.tables.commit(ops);
        match &result {
            Ok(()) => debug!("Commit applied"),
            Err(e) => warn!(error = %e, "Commit rolled back"),
        }
        let _ = respond_to.send(result);
    }
}
