//! Read-side shapes returned to customers and admins.

use crate::domain::{
    Address, FoodSummary, Money, Order, OrderLine, OrderStatus, Payment, UserProfile,
};
use crate::store::OrderRecord;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineView {
    #[serde(flatten)]
    pub line: OrderLine,
    /// The food as it is now; the line keeps the price paid.
    pub food: Option<FoodSummary>,
}

/// An order with the related rows a given read path exposes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderLineView>,
    pub payment: Option<Payment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

impl OrderView {
    /// Owner or admin detail view: lines, address and payment.
    pub fn detail(record: OrderRecord) -> Self {
        Self::build(record, true, false)
    }

    /// "My orders" entry: lines and payment.
    pub fn summary(record: OrderRecord) -> Self {
        Self::build(record, false, false)
    }

    /// Admin listing entry: everything, including the owner's profile.
    pub fn admin(record: OrderRecord) -> Self {
        Self::build(record, true, true)
    }

    fn build(record: OrderRecord, with_address: bool, with_user: bool) -> Self {
        Self {
            order: record.order,
            items: record
                .lines
                .into_iter()
                .map(|l| OrderLineView {
                    line: l.line,
                    food: l.food,
                })
                .collect(),
            payment: record.payment,
            address: record.address.filter(|_| with_address),
            user: record.owner.filter(|_| with_user),
        }
    }
}

/// One page of results. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> usize {
        if self.page_size == 0 {
            0
        } else {
            self.total.div_ceil(self.page_size)
        }
    }
}

/// Dashboard figures over all orders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total_orders: usize,
    pub by_status: BTreeMap<OrderStatus, usize>,
    /// Sum of totals of delivered orders.
    pub revenue: Money,
}

impl OrderStats {
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        let mut by_status = BTreeMap::new();
        let mut total_orders = 0;
        let mut revenue = Money::ZERO;
        for order in orders {
            total_orders += 1;
            *by_status.entry(order.status).or_insert(0) += 1;
            if order.status == OrderStatus::Delivered {
                revenue = revenue + order.total_amount;
            }
        }
        Self {
            total_orders,
            by_status,
            revenue,
        }
    }
}
