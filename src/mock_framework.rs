//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_store_client`] to get a [`StoreClient`] and the receiving end of its
//! channel. The test then plays the store actor: helpers like [`expect_get_foods`] or
//! [`expect_commit`] take the next request, assert its kind and send back a canned reply.

use crate::domain::{Address, Food, FoodId};
use crate::error::StoreError;
use crate::store::{OrderFilter, OrderRecords, StoreClient, StoreRequest, Window, WriteOp};
use tokio::sync::mpsc;

/// Creates a store client whose requests land on the returned receiver.
///
/// No `StoreActor` runs behind it, so success, failure and ordering are whatever the
/// test answers.
pub fn create_mock_store_client() -> (StoreClient, mpsc::Receiver<StoreRequest>) {
    let (sender, receiver) = mpsc::channel(16);
    (StoreClient::new(sender), receiver)
}

/// Answers the next request, which must be `GetAddress`.
pub async fn expect_get_address(
    receiver: &mut mpsc::Receiver<StoreRequest>,
    reply: Option<Address>,
) {
    match receiver.recv().await {
        Some(StoreRequest::GetAddress { respond_to, .. }) => {
            let _ = respond_to.send(Ok(reply));
        }
        other => panic!("expected GetAddress, got {:?}", other),
    }
}

/// Answers the next request, which must be `GetFoods`, returning the ids asked for.
pub async fn expect_get_foods(
    receiver: &mut mpsc::Receiver<StoreRequest>,
    reply: Vec<Food>,
) -> Vec<FoodId> {
    match receiver.recv().await {
        Some(StoreRequest::GetFoods { ids, respond_to }) => {
            let _ = respond_to.send(Ok(reply));
            ids
        }
        other => panic!("expected GetFoods, got {:?}", other),
    }
}

/// Answers the next request, which must be `Commit`, returning the staged writes.
pub async fn expect_commit(
    receiver: &mut mpsc::Receiver<StoreRequest>,
    reply: Result<(), StoreError>,
) -> Vec<WriteOp> {
    match receiver.recv().await {
        Some(StoreRequest::Commit { ops, respond_to }) => {
            let _ = respond_to.send(reply);
            ops
        }
        other => panic!("expected Commit, got {:?}", other),
    }
}

/// Answers the next request, which must be `LoadOrders`, returning its filter and window.
pub async fn expect_load_orders(
    receiver: &mut mpsc::Receiver<StoreRequest>,
    reply: OrderRecords,
) -> (OrderFilter, Option<Window>) {
    match receiver.recv().await {
        Some(StoreRequest::LoadOrders {
            filter,
            window,
            respond_to,
        }) => {
            let _ = respond_to.send(Ok(reply));
            (filter, window)
        }
        other => panic!("expected LoadOrders, got {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Caller;
    use crate::clients::OrderClient;
    use crate::config::AppConfig;
    use crate::domain::{OrderId, UserId};
    use crate::error::OrderError;
    use crate::payment::PaymentProviders;

    #[tokio::test]
    async fn test_mock_store_client() {
        let (client, mut receiver) = create_mock_store_client();

        let task =
            tokio::spawn(async move { client.get_foods(vec![FoodId::from("pizza-1")]).await });

        let asked = expect_get_foods(&mut receiver, Vec::new()).await;
        assert_eq!(asked, vec![FoodId::from("pizza-1")]);
        assert_eq!(task.await.unwrap(), Ok(Vec::new()));
    }

    #[tokio::test]
    async fn test_customer_reads_are_scoped_to_owner() {
        let (store, mut receiver) = create_mock_store_client();
        let config = AppConfig::default();
        let payments = PaymentProviders::from_config(&config.payments);
        let orders = OrderClient::new(store, payments, &config);

        let task = tokio::spawn(async move {
            orders
                .get_order_by_id(&Caller::customer("u2"), OrderId::from("o1"))
                .await
        });

        let (filter, window) = expect_load_orders(
            &mut receiver,
            OrderRecords {
                records: Vec::new(),
                total: 0,
            },
        )
        .await;
        assert_eq!(filter.id, Some(OrderId::from("o1")));
        assert_eq!(filter.owner, Some(UserId::from("u2")));
        assert_eq!(window, None);

        assert_eq!(
            task.await.unwrap().unwrap_err(),
            OrderError::order_not_found(&OrderId::from("o1"))
        );
    }

    #[tokio::test]
    async fn test_closed_store_is_a_communication_error() {
        let (client, receiver) = create_mock_store_client();
        drop(receiver);

        let err = client.get_food(FoodId::from("pizza-1")).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::ActorCommunicationError("Actor closed".to_string())
        );
    }
}
