use crate::clients::{CatalogClient, OrderClient};
use crate::config::AppConfig;
use crate::payment::PaymentProviders;
use crate::store::{StoreActor, StoreClient};
use tracing::{error, info};

/// The running application: the store actor plus the clients wired to it.
pub struct FoodNestSystem {
    pub catalog_client: CatalogClient,
    pub order_client: OrderClient,
    store: StoreClient,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl FoodNestSystem {
    /// Spawns the store actor. Must be called inside a Tokio runtime.
    pub fn new(config: &AppConfig) -> Self {
        let (store_actor, store) = StoreActor::new(config.store.channel_buffer);
        let store_handle = tokio::spawn(store_actor.run());

        let payments = PaymentProviders::from_config(&config.payments);
        let catalog_client = CatalogClient::new(store.clone());
        let order_client = OrderClient::new(store.clone(), payments, config);

        info!(
            channel_buffer = config.store.channel_buffer,
            default_payment_method = %config.payments.default_method,
            "System started"
        );

        Self {
            catalog_client,
            order_client,
            store,
            handles: vec![store_handle],
        }
    }

    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        if let Err(e) = self.store.shutdown().await {
            error!(error = %e, "Store actor already stopped");
        }

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
