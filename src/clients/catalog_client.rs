use crate::domain::{Address, AddressId, Food, FoodId, FoodPatch, User};
use crate::error::StoreError;
use crate::store::{StoreClient, WriteOp};
use tracing::{info, instrument};

/// Client for the reference data orders depend on: users, addresses and foods.
#[derive(Clone)]
pub struct CatalogClient {
    store: StoreClient,
}

impl CatalogClient {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn upsert_user(&self, user: User) -> Result<(), StoreError> {
        self.write("upsert_user", WriteOp::UpsertUser(user)).await
    }

    /// Fails with `NotFound` unless the owning user exists.
    #[instrument(skip(self, address), fields(address_id = %address.id))]
    pub async fn upsert_address(&self, address: Address) -> Result<(), StoreError> {
        self.write("upsert_address", WriteOp::UpsertAddress(address)).await
    }

    /// Inserts or replaces a food, stock included. Use [`Self::update_food`] for edits
    /// that must not race with orders taking stock.
    #[instrument(skip(self, food), fields(food_id = %food.id))]
    pub async fn upsert_food(&self, food: Food) -> Result<(), StoreError> {
        self.write("upsert_food", WriteOp::UpsertFood(food)).await
    }

    #[instrument(skip(self))]
    pub async fn update_food(&self, food_id: FoodId, patch: FoodPatch) -> Result<Food, StoreError> {
        self.write(
            "update_food",
            WriteOp::PatchFood {
                food_id: food_id.clone(),
                patch,
            },
        )
        .await?;

        let food = self.store.get_food(food_id.clone()).await?;
        info!("Food updated");
        food.ok_or(StoreError::NotFound {
            table: "food",
            id: food_id.to_string(),
        })
    }

    pub async fn get_food(&self, food_id: FoodId) -> Result<Option<Food>, StoreError> {
        self.store.get_food(food_id).await
    }

    pub async fn get_address(&self, address_id: AddressId) -> Result<Option<Address>, StoreError> {
        self.store.get_address(address_id).await
    }

    async fn write(&self, label: &'static str, op: WriteOp) -> Result<(), StoreError> {
        let mut unit = self.store.begin(label);
        unit.push(op);
        unit.commit().await
    }
}
