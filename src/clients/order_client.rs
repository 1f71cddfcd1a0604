use crate::auth::Caller;
use crate::config::{AppConfig, OrdersConfig};
use crate::domain::{
    CreateOrderInput, Order, OrderId, OrderLine, OrderLineId, OrderStatus, Payment, PaymentId,
    PaymentMethod, PaymentStatus,
};
use crate::error::{OrderError, StoreError, ValidationErrors};
use crate::orders::{
    validate, OrderStats, OrderView, Page, PaymentEffect, PriceSnapshot, StatusPolicy,
};
use crate::payment::{CreatePaymentInput, PaymentProviders, PaymentResult};
use crate::store::{OrderFilter, OrderRecord, StoreClient, Window};
use chrono::Utc;
use tracing::{error, info, instrument, warn};

/// Paging and filtering for the admin order listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOrdersQuery {
    /// 1-based.
    pub page: usize,
    /// Falls back to `orders.default_page_size`.
    pub page_size: Option<usize>,
    pub status: Option<OrderStatus>,
}

impl Default for ListOrdersQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: None,
            status: None,
        }
    }
}

/// Client for the order workflow.
///
/// Orchestrates validation, pricing, stock and payment on top of the store actor.
/// Every write path goes through a single unit of work, so a failure at any step
/// leaves the store as it was.
#[derive(Clone)]
pub struct OrderClient {
    store: StoreClient,
    payments: PaymentProviders,
    config: OrdersConfig,
    default_method: PaymentMethod,
    policy: StatusPolicy,
}

impl OrderClient {
    pub fn new(store: StoreClient, payments: PaymentProviders, config: &AppConfig) -> Self {
        Self {
            store,
            payments,
            config: config.orders.clone(),
            default_method: config.payments.default_method,
            policy: StatusPolicy::from_config(&config.orders),
        }
    }

    #[instrument(
        skip(self, caller, input),
        fields(
            user_id = %caller.user_id,
            address_id = %input.address_id,
            item_count = input.items.len()
        )
    )]
    pub async fn create_order(
        &self,
        caller: &Caller,
        input: CreateOrderInput,
    ) -> Result<Order, OrderError> {
        info!("Processing create_order request");

        validate::create_order_input(&input, self.config.max_notes_len)?;

        let method = input.payment_method.unwrap_or(self.default_method);
        let provider = self.payments.get(method).map_err(|e| {
            warn!(error = %e, "Payment method rejected");
            let mut errors = ValidationErrors::new();
            errors.field("paymentMethod", e.to_string());
            OrderError::Validation(errors)
        })?;

        // Step 1: Address must exist and belong to the caller
        match self.store.get_address(input.address_id.clone()).await? {
            Some(address) if address.is_owned_by(&caller.user_id) => {}
            _ => {
                warn!("Address not found for caller");
                return Err(OrderError::NotFound {
                    entity: "Address",
                    id: input.address_id.to_string(),
                });
            }
        }

        // Step 2: Snapshot prices and check availability
        let ids = input.items.iter().map(|item| item.food_id.clone()).collect();
        let foods = self.store.get_foods(ids).await?;
        let snapshot = PriceSnapshot::take(&input.items, &foods).inspect_err(|e| {
            warn!(error = %e, "Order rejected while pricing");
        })?;
        info!(total = %snapshot.total, "Prices resolved");

        // Step 3: Stage the order, its lines and the stock it takes
        let now = Utc::now();
        let order = Order {
            id: OrderId::generate(),
            user_id: caller.user_id.clone(),
            address_id: input.address_id,
            status: OrderStatus::Pending,
            total_amount: snapshot.total,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };

        let mut unit = self.store.begin("create_order");
        unit.insert_order(order.clone());
        for line in &snapshot.lines {
            unit.insert_line(OrderLine {
                id: OrderLineId::generate(),
                order_id: order.id.clone(),
                food_id: line.food_id.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                total_price: line.total_price,
            });
            unit.decrement_stock(line.food_id.clone(), line.quantity);
        }

        // Step 4: Initiate the payment
        let payment_input = CreatePaymentInput {
            order_id: order.id.clone(),
            amount: order.total_amount,
            method,
            metadata: None,
        };
        let result = match provider
            .create_payment(payment_input)
            .await
            .and_then(PaymentResult::into_accepted)
        {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "Payment creation failed");
                unit.rollback();
                return Err(e.into());
            }
        };
        unit.insert_payment(Payment {
            id: PaymentId::generate(),
            order_id: order.id.clone(),
            method,
            status: result.status,
            amount: order.total_amount,
            provider_transaction_id: result.transaction_id,
            metadata: result.metadata,
            created_at: now,
            updated_at: now,
        });

        // Step 5: Commit everything at once
        if let Err(e) = unit.commit().await {
            error!(error = %e, "Order commit failed");
            return Err(Self::commit_error(e, &snapshot));
        }

        info!(order_id = %order.id, total = %order.total_amount, "Order created successfully");
        Ok(order)
    }

    /// Reads one order. Customers only see their own; anything else is `NotFound`.
    #[instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn get_order_by_id(
        &self,
        caller: &Caller,
        order_id: OrderId,
    ) -> Result<OrderView, OrderError> {
        let record = self.load_one(caller, &order_id).await?;
        Ok(OrderView::detail(record))
    }

    /// The caller's orders, newest first.
    #[instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn list_my_orders(&self, caller: &Caller) -> Result<Vec<OrderView>, OrderError> {
        let filter = OrderFilter::all().owned_by(caller.user_id.clone());
        let records = self.store.load_orders(filter, None).await?;
        info!(count = records.total, "Orders listed");
        Ok(records.records.into_iter().map(OrderView::summary).collect())
    }

    #[instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn list_all_orders(
        &self,
        caller: &Caller,
        query: ListOrdersQuery,
    ) -> Result<Page<OrderView>, OrderError> {
        caller.require_admin()?;

        let page_size = query.page_size.unwrap_or(self.config.default_page_size);
        let offset = validate::page_request(query.page, page_size, self.config.max_page_size)?;

        let window = Window {
            offset,
            limit: page_size,
        };
        let records = self
            .store
            .load_orders(OrderFilter::all().with_status(query.status), Some(window))
            .await?;

        Ok(Page {
            items: records.records.into_iter().map(OrderView::admin).collect(),
            page: query.page,
            page_size,
            total: records.total,
        })
    }

    /// Moves an order to `status`, applying the payment and stock side effects of the
    /// move in the same commit. A refund is only requested after that commit wins, and is
    /// recorded in a second one.
    #[instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn update_order_status(
        &self,
        caller: &Caller,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<OrderView, OrderError> {
        info!("Processing update_order_status request");
        caller.require_admin()?;

        let record = self.load_one(caller, &order_id).await?;
        let current = record.order.status;
        self.policy.check(current, status).inspect_err(|e| {
            warn!(error = %e, "Status change rejected");
        })?;

        let effects = self.policy.effects(&record, status);
        let now = Utc::now();

        let mut unit = self.store.begin("update_order_status");
        unit.set_order_status(order_id.clone(), current, status, now);
        for (food_id, quantity) in effects.restore_stock {
            unit.restore_stock(food_id, quantity);
        }

        // Money only moves once the status change has won the compare-and-set.
        let mut refund = None;
        if let Some(payment) = &record.payment {
            match effects.payment {
                PaymentEffect::Unchanged => {}
                PaymentEffect::Fail => {
                    unit.set_payment_status(order_id.clone(), PaymentStatus::Failed, now);
                }
                PaymentEffect::Complete => {
                    if self.verify_payment(payment).await? {
                        unit.set_payment_status(order_id.clone(), PaymentStatus::Completed, now);
                    }
                }
                PaymentEffect::Refund => refund = Some(payment),
            }
        }

        match unit.commit().await {
            Ok(()) => {}
            Err(StoreError::StatusMismatch { actual, .. }) => {
                warn!(actual = %actual, "Order status changed concurrently");
                return Err(OrderError::InvalidTransition {
                    from: actual,
                    to: status,
                });
            }
            Err(e) => {
                error!(error = %e, "Status commit failed");
                return Err(e.into());
            }
        }
        info!(from = %current, to = %status, "Order status updated");

        if let Some(payment) = refund {
            self.refund_payment(payment).await?;
        }

        let record = self.load_one(caller, &order_id).await?;
        Ok(OrderView::detail(record))
    }

    #[instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn order_stats(&self, caller: &Caller) -> Result<OrderStats, OrderError> {
        caller.require_admin()?;
        let records = self.store.load_orders(OrderFilter::all(), None).await?;
        Ok(OrderStats::from_orders(
            records.records.iter().map(|record| &record.order),
        ))
    }

    async fn load_one(
        &self,
        caller: &Caller,
        order_id: &OrderId,
    ) -> Result<OrderRecord, OrderError> {
        let mut filter = OrderFilter::by_id(order_id.clone());
        if !caller.is_admin() {
            filter = filter.owned_by(caller.user_id.clone());
        }

        let records = self.store.load_orders(filter, None).await?;
        records.records.into_iter().next().ok_or_else(|| {
            warn!(order_id = %order_id, "Order not found");
            OrderError::order_not_found(order_id)
        })
    }

    async fn verify_payment(&self, payment: &Payment) -> Result<bool, OrderError> {
        let provider = self.payments.get(payment.method)?;
        let transaction_id = payment.provider_transaction_id.as_deref().unwrap_or_default();
        let verified = provider.verify_payment(transaction_id).await?;
        if !verified {
            warn!(transaction_id, "Payment not verified, leaving it pending");
        }
        Ok(verified)
    }

    /// Refunds a captured payment of an order that is already cancelled, then records it.
    ///
    /// A rejected refund leaves the payment `completed` on the cancelled order.
    async fn refund_payment(&self, payment: &Payment) -> Result<(), OrderError> {
        let provider = self.payments.get(payment.method)?;
        let transaction_id = payment.provider_transaction_id.as_deref().unwrap_or_default();

        let refund = provider.refund(transaction_id, payment.amount).await.inspect_err(|e| {
            error!(error = %e, "Refund call failed");
        })?;
        if !refund.success {
            let reason = refund.error.unwrap_or_else(|| "refund failed".to_string());
            error!(reason = %reason, "Refund rejected by provider");
            return Err(OrderError::Internal(format!(
                "Order {} cancelled but refund rejected: {}",
                payment.order_id, reason
            )));
        }
        info!(refund_id = ?refund.refund_id, "Payment refunded");

        let mut unit = self.store.begin("refund_payment");
        unit.set_payment_status(payment.order_id.clone(), PaymentStatus::Refunded, Utc::now());
        unit.commit().await?;
        Ok(())
    }

    /// A stock failure at commit means another order took the stock after pricing.
    fn commit_error(e: StoreError, snapshot: &PriceSnapshot) -> OrderError {
        match OrderError::from(e) {
            OrderError::OutOfStock {
                food_id,
                name,
                requested,
                available,
            } => OrderError::OutOfStock {
                name: snapshot.name_of(&food_id).map(str::to_string).unwrap_or(name),
                food_id,
                requested,
                available,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Address, Food, Money, OrderItemInput};
    use crate::error::ErrorKind;
    use crate::mock_framework::{
        create_mock_store_client, expect_commit, expect_get_address, expect_get_foods,
    };
    use crate::store::WriteOp;

    fn client(store: StoreClient) -> OrderClient {
        let config = AppConfig::default();
        OrderClient::new(store, PaymentProviders::from_config(&config.payments), &config)
    }

    fn home_address() -> Option<Address> {
        Some(Address::new("addr-1", "u1", "Home", "1 Main St", "Springfield"))
    }

    #[tokio::test]
    async fn test_create_order_stages_one_unit() {
        let (store, mut rx) = create_mock_store_client();
        let client = client(store);

        let handle = tokio::spawn(async move {
            client
                .create_order(
                    &Caller::customer("u1"),
                    CreateOrderInput::new("addr-1", vec![OrderItemInput::new("pizza-1", 2)]),
                )
                .await
        });

        expect_get_address(&mut rx, home_address()).await;
        expect_get_foods(
            &mut rx,
            vec![Food::new("pizza-1", "Pizza", Money::from_cents(29900), 10)],
        )
        .await;
        let ops = expect_commit(&mut rx, Ok(())).await;

        let order = handle.await.unwrap().unwrap();
        assert_eq!(order.total_amount.to_string(), "598.00");
        assert_eq!(order.status, OrderStatus::Pending);

        assert_eq!(ops.len(), 4);
        assert!(matches!(ops[0], WriteOp::InsertOrder(_)));
        assert!(matches!(ops[1], WriteOp::InsertLine(_)));
        assert!(matches!(ops[2], WriteOp::DecrementStock { quantity: 2, .. }));
        match &ops[3] {
            WriteOp::InsertPayment(payment) => {
                assert_eq!(payment.status, PaymentStatus::Pending);
                assert_eq!(payment.amount, order.total_amount);
                assert_eq!(payment.method, PaymentMethod::CashOnDelivery);
            }
            other => panic!("expected payment insert, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_commit_stock_failure_uses_food_name() {
        let (store, mut rx) = create_mock_store_client();
        let client = client(store);

        let handle = tokio::spawn(async move {
            client
                .create_order(
                    &Caller::customer("u1"),
                    CreateOrderInput::new("addr-1", vec![OrderItemInput::new("pizza-1", 2)]),
                )
                .await
        });

        expect_get_address(&mut rx, home_address()).await;
        expect_get_foods(
            &mut rx,
            vec![Food::new("pizza-1", "Pizza", Money::from_cents(29900), 10)],
        )
        .await;
        expect_commit(
            &mut rx,
            Err(StoreError::InsufficientStock {
                food_id: "pizza-1".into(),
                requested: 2,
                available: 1,
            }),
        )
        .await;

        let err = handle.await.unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(matches!(
            err,
            OrderError::OutOfStock { ref name, available: 1, .. } if name == "Pizza"
        ));
    }

    #[tokio::test]
    async fn test_commit_failure_is_internal() {
        let (store, mut rx) = create_mock_store_client();
        let client = client(store);

        let handle = tokio::spawn(async move {
            client
                .create_order(
                    &Caller::customer("u1"),
                    CreateOrderInput::new("addr-1", vec![OrderItemInput::new("pizza-1", 1)]),
                )
                .await
        });

        expect_get_address(&mut rx, home_address()).await;
        expect_get_foods(
            &mut rx,
            vec![Food::new("pizza-1", "Pizza", Money::from_cents(29900), 10)],
        )
        .await;
        expect_commit(&mut rx, Err(StoreError::Constraint("disk on fire".into()))).await;

        let err = handle.await.unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn test_foreign_address_is_not_found() {
        let (store, mut rx) = create_mock_store_client();
        let client = client(store);

        let handle = tokio::spawn(async move {
            client
                .create_order(
                    &Caller::customer("u2"),
                    CreateOrderInput::new("addr-1", vec![OrderItemInput::new("pizza-1", 1)]),
                )
                .await
        });

        expect_get_address(&mut rx, home_address()).await;

        let err = handle.await.unwrap().unwrap_err();
        assert_eq!(
            err,
            OrderError::NotFound {
                entity: "Address",
                id: "addr-1".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_disabled_payment_method_is_a_validation_error() {
        let (store, _rx) = create_mock_store_client();
        let client = client(store);

        let err = client
            .create_order(
                &Caller::customer("u1"),
                CreateOrderInput::new("addr-1", vec![OrderItemInput::new("pizza-1", 1)])
                    .with_payment_method(PaymentMethod::OnlineGateway),
            )
            .await
            .unwrap_err();

        match err {
            OrderError::Validation(errors) => {
                assert!(errors.field_errors.contains_key("paymentMethod"))
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_admin_only_operations_reject_customers() {
        let (store, _rx) = create_mock_store_client();
        let client = client(store);
        let customer = Caller::customer("u1");

        assert_eq!(
            client
                .list_all_orders(&customer, ListOrdersQuery::default())
                .await
                .unwrap_err(),
            OrderError::Forbidden
        );
        assert_eq!(
            client
                .update_order_status(&customer, OrderId::from("o1"), OrderStatus::Confirmed)
                .await
                .unwrap_err(),
            OrderError::Forbidden
        );
        assert_eq!(client.order_stats(&customer).await.unwrap_err(), OrderError::Forbidden);
    }

    #[tokio::test]
    async fn test_overflowing_page_is_rejected_before_loading() {
        let (store, _rx) = create_mock_store_client();
        let client = client(store);
        let query = ListOrdersQuery {
            page: usize::MAX,
            page_size: Some(20),
            status: None,
        };

        match client.list_all_orders(&Caller::admin("admin-1"), query).await {
            Err(OrderError::Validation(errors)) => {
                assert!(errors.field_errors.contains_key("page"))
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
