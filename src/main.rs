mod auth;
mod clients;
mod config;
mod domain;
mod error;
mod orders;
mod payment;
mod store;

mod app_system;

#[cfg(test)]
mod mock_framework;

use crate::app_system::{setup_tracing, FoodNestSystem};
use crate::auth::Caller;
use crate::clients::ListOrdersQuery;
use crate::config::AppConfig;
use crate::domain::{Address, CreateOrderInput, Food, Money, OrderItemInput, OrderStatus, User};
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    let config_path = std::env::args().nth(1);
    let config = AppConfig::load(config_path.as_deref()).map_err(|e| e.to_string())?;

    // Setup tracing once for the entire application
    setup_tracing(&config.logging.filter);

    info!("Starting FoodNest order system");

    let system = FoodNestSystem::new(&config);

    // Seed a customer, an admin and a menu item
    let span = tracing::info_span!("seeding");
    async {
        let catalog = &system.catalog_client;
        catalog.upsert_user(User::new("u1", "Alice", "alice@example.com")).await?;
        catalog
            .upsert_user(User::new("admin-1", "Dana", "dana@example.com").with_role("admin"))
            .await?;
        catalog
            .upsert_address(Address::new("addr-1", "u1", "Home", "12 Baker St", "London"))
            .await?;
        catalog
            .upsert_food(Food::new("pizza-1", "Margherita Pizza", Money::from_cents(29900), 10))
            .await
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;

    let customer = Caller::from_session("u1", None);
    let admin = Caller::from_session("admin-1", Some("admin"));

    let span = tracing::info_span!("order_processing");
    let order_result = async {
        let order = system
            .order_client
            .create_order(
                &customer,
                CreateOrderInput::new("addr-1", vec![OrderItemInput::new("pizza-1", 2)])
                    .with_notes("Ring twice"),
            )
            .await?;
        info!(order_id = %order.id, total = %order.total_amount, "Order placed");

        for status in [
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
        ] {
            system
                .order_client
                .update_order_status(&admin, order.id.clone(), status)
                .await?;
        }

        system.order_client.get_order_by_id(&customer, order.id).await
    }
    .instrument(span)
    .await;

    match order_result {
        Ok(view) => {
            let payment_status = view.payment.as_ref().map(|payment| payment.status);
            info!(
                order_id = %view.order.id,
                status = %view.order.status,
                payment_status = ?payment_status,
                "Order processed successfully"
            );
            if let Ok(json) = serde_json::to_string_pretty(&view) {
                println!("{}", json);
            }
        }
        Err(e) => error!(error = %e, kind = ?e.kind(), "Order processing failed"),
    }

    match system
        .order_client
        .list_all_orders(&admin, ListOrdersQuery::default())
        .await
    {
        Ok(page) => info!(
            total = page.total,
            page = page.page,
            shown = page.items.len(),
            "Admin order listing"
        ),
        Err(e) => error!(error = %e, "Admin listing failed"),
    }

    match system.order_client.order_stats(&admin).await {
        Ok(stats) => info!(
            total_orders = stats.total_orders,
            revenue = %stats.revenue,
            "Order stats"
        ),
        Err(e) => error!(error = %e, "Stats failed"),
    }

    // Shutdown system gracefully
    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
