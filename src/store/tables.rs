use super::entity::{Entity, Row, Table};
use super::messages::{LineRecord, OrderFilter, OrderRecord, OrderRecords, Window, WriteOp};
use crate::domain::{
    Address, AddressId, Food, FoodId, Order, OrderId, OrderLine, OrderLineId, Payment, User,
    UserId,
};
use crate::error::StoreError;
use std::collections::{HashMap, HashSet};

impl Entity for User {
    type Id = UserId;
    const TABLE: &'static str = "user";

    fn id(&self) -> &UserId {
        &self.id
    }
}

impl Entity for Address {
    type Id = AddressId;
    const TABLE: &'static str = "address";

    fn id(&self) -> &AddressId {
        &self.id
    }
}

impl Entity for Food {
    type Id = FoodId;
    const TABLE: &'static str = "food";

    fn id(&self) -> &FoodId {
        &self.id
    }

    fn validate(&self) -> Result<(), String> {
        if self.price.is_negative() {
            return Err(format!("food {} has a negative price", self.id));
        }
        Ok(())
    }
}

impl Entity for Order {
    type Id = OrderId;
    const TABLE: &'static str = "order";

    fn id(&self) -> &OrderId {
        &self.id
    }

    fn validate(&self) -> Result<(), String> {
        if self.total_amount.is_negative() {
            return Err(format!("order {} has a negative total", self.id));
        }
        Ok(())
    }
}

impl Entity for OrderLine {
    type Id = OrderLineId;
    const TABLE: &'static str = "order_item";

    fn id(&self) -> &OrderLineId {
        &self.id
    }

    fn validate(&self) -> Result<(), String> {
        if self.quantity == 0 {
            return Err(format!("order line {} has zero quantity", self.id));
        }
        if self.unit_price.times(self.quantity) != self.total_price {
            return Err(format!(
                "order line {} total {} != {} x {}",
                self.id, self.total_price, self.unit_price, self.quantity
            ));
        }
        Ok(())
    }
}

/// Keyed by order id: the key itself enforces one payment per order.
impl Entity for Payment {
    type Id = OrderId;
    const TABLE: &'static str = "payment";

    fn id(&self) -> &OrderId {
        &self.order_id
    }
}

/// Row counts per table.
#[cfg(test)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub users: usize,
    pub addresses: usize,
    pub foods: usize,
    pub orders: usize,
    pub order_lines: usize,
    pub payments: usize,
}

/// Journal entry: the row as it was before one applied write.
enum Undo {
    User(UserId, Option<Row<User>>),
    Address(AddressId, Option<Row<Address>>),
    Food(FoodId, Option<Row<Food>>),
    Order(OrderId, Option<Row<Order>>),
    Line(OrderLineId, Option<Row<OrderLine>>),
    Payment(OrderId, Option<Row<Payment>>),
}

/// Every table of the store.
#[derive(Default)]
pub struct Tables {
    pub users: Table<User>,
    pub addresses: Table<Address>,
    pub foods: Table<Food>,
    pub orders: Table<Order>,
    pub order_lines: Table<OrderLine>,
    pub payments: Table<Payment>,
}

impl Tables {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn counts(&self) -> TableCounts {
        TableCounts {
            users: self.users.len(),
            addresses: self.addresses.len(),
            foods: self.foods.len(),
            orders: self.orders.len(),
            order_lines: self.order_lines.len(),
            payments: self.payments.len(),
        }
    }

    /// Applies `ops` in order, all or nothing.
    ///
    /// Each applied write journals the row it replaced; the first failure replays the
    /// journal backwards, so the tables end up exactly as they were.
    pub fn commit(&mut self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        let mut journal = Vec::with_capacity(ops.len());
        for op in ops {
            match self.apply(op) {
                Ok(undo) => journal.push(undo),
                Err(e) => {
                    for undo in journal.into_iter().rev() {
                        self.undo(undo);
                    }
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    fn apply(&mut self, op: WriteOp) -> Result<Undo, StoreError> {
        match op {
            WriteOp::UpsertUser(user) => {
                let id = user.id.clone();
                let previous = self.users.upsert(user)?;
                Ok(Undo::User(id, previous))
            }
            WriteOp::UpsertAddress(address) => {
                self.users.require(&address.user_id)?;
                let id = address.id.clone();
                let previous = self.addresses.upsert(address)?;
                Ok(Undo::Address(id, previous))
            }
            WriteOp::UpsertFood(food) => {
                let id = food.id.clone();
                let previous = self.foods.upsert(food)?;
                Ok(Undo::Food(id, previous))
            }
            WriteOp::InsertOrder(order) => {
                self.users.require(&order.user_id)?;
                let address = self.addresses.require(&order.address_id)?;
                if !address.is_owned_by(&order.user_id) {
                    return Err(StoreError::Constraint(format!(
                        "address {} does not belong to user {}",
                        order.address_id, order.user_id
                    )));
                }
                let id = order.id.clone();
                self.orders.insert(order)?;
                Ok(Undo::Order(id, None))
            }
            WriteOp::InsertLine(line) => {
                self.orders.require(&line.order_id)?;
                self.foods.require(&line.food_id)?;
                let id = line.id.clone();
                self.order_lines.insert(line)?;
                Ok(Undo::Line(id, None))
            }
            WriteOp::InsertPayment(payment) => {
                let order = self.orders.require(&payment.order_id)?;
                if order.total_amount != payment.amount {
                    return Err(StoreError::Constraint(format!(
                        "payment amount {} != order total {}",
                        payment.amount, order.total_amount
                    )));
                }
                let id = payment.order_id.clone();
                self.payments.insert(payment)?;
                Ok(Undo::Payment(id, None))
            }
            WriteOp::PatchFood { food_id, patch } => {
                let previous = self.foods.snapshot(&food_id);
                let mut patched = self.foods.require(&food_id)?.clone();
                patched.apply(patch);
                patched.validate().map_err(StoreError::Constraint)?;
                *self.foods.require_mut(&food_id)? = patched;
                Ok(Undo::Food(food_id, previous))
            }
            WriteOp::DecrementStock { food_id, quantity } => {
                let previous = self.foods.snapshot(&food_id);
                let food = self.foods.require_mut(&food_id)?;
                if food.stock < quantity {
                    return Err(StoreError::InsufficientStock {
                        food_id,
                        requested: quantity,
                        available: food.stock,
                    });
                }
                food.stock -= quantity;
                Ok(Undo::Food(food_id, previous))
            }
            WriteOp::RestoreStock { food_id, quantity } => {
                let previous = self.foods.snapshot(&food_id);
                let food = self.foods.require_mut(&food_id)?;
                food.stock = food.stock.checked_add(quantity).ok_or_else(|| {
                    StoreError::Constraint(format!("stock overflow for food {}", food_id))
                })?;
                Ok(Undo::Food(food_id, previous))
            }
            WriteOp::SetOrderStatus {
                order_id,
                expected,
                status,
                at,
            } => {
                let previous = self.orders.snapshot(&order_id);
                let order = self.orders.require_mut(&order_id)?;
                if order.status != expected {
                    return Err(StoreError::StatusMismatch {
                        order_id,
                        expected,
                        actual: order.status,
                    });
                }
                order.status = status;
                order.updated_at = at;
                Ok(Undo::Order(order_id, previous))
            }
            WriteOp::SetPaymentStatus {
                order_id,
                status,
                at,
            } => {
                let previous = self.payments.snapshot(&order_id);
                let payment = self.payments.require_mut(&order_id)?;
                payment.status = status;
                payment.updated_at = at;
                Ok(Undo::Payment(order_id, previous))
            }
        }
    }

    fn undo(&mut self, undo: Undo) {
        match undo {
            Undo::User(id, row) => self.users.restore(id, row),
            Undo::Address(id, row) => self.addresses.restore(id, row),
            Undo::Food(id, row) => self.foods.restore(id, row),
            Undo::Order(id, row) => self.orders.restore(id, row),
            Undo::Line(id, row) => self.order_lines.restore(id, row),
            Undo::Payment(id, row) => self.payments.restore(id, row),
        }
    }

    /// Matching orders, newest first, joined with lines, payment, address and owner.
    pub fn load_orders(&self, filter: &OrderFilter, window: Option<Window>) -> OrderRecords {
        let matching: Vec<&Order> = match &filter.id {
            // Point lookup; avoids scanning the whole table.
            Some(id) => self.orders.get(id).filter(|o| filter.matches(o)).into_iter().collect(),
            None => self
                .orders
                .newest_first()
                .into_iter()
                .filter(|o| filter.matches(o))
                .collect(),
        };
        let total = matching.len();

        let selected: Vec<&Order> = match window {
            Some(window) => matching
                .into_iter()
                .skip(window.offset)
                .take(window.limit)
                .collect(),
            None => matching,
        };

        let mut lines = self.lines_by_order(&selected);
        OrderRecords {
            records: selected
                .into_iter()
                .map(|order| self.join(order, lines.remove(&order.id).unwrap_or_default()))
                .collect(),
            total,
        }
    }

    /// Lines of the given orders in insertion order, from a single pass over the table.
    fn lines_by_order<'a>(
        &'a self,
        orders: &[&'a Order],
    ) -> HashMap<&'a OrderId, Vec<&'a OrderLine>> {
        let mut index: HashMap<&OrderId, Vec<&OrderLine>> = HashMap::new();
        if orders.is_empty() {
            return index;
        }
        let wanted: HashSet<&OrderId> = orders.iter().map(|order| &order.id).collect();
        for line in self.order_lines.oldest_first() {
            if wanted.contains(&line.order_id) {
                index.entry(&line.order_id).or_default().push(line);
            }
        }
        index
    }

    fn join(&self, order: &Order, lines: Vec<&OrderLine>) -> OrderRecord {
        let lines = lines
            .into_iter()
            .map(|line| LineRecord {
                line: line.clone(),
                food: self.foods.get(&line.food_id).map(Food::summary),
            })
            .collect();

        OrderRecord {
            order: order.clone(),
            lines,
            payment: self.payments.get(&order.id).cloned(),
            address: self.addresses.get(&order.address_id).cloned(),
            owner: self.users.get(&order.user_id).map(User::profile),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Money, OrderStatus, PaymentId, PaymentMethod, PaymentStatus};
    use chrono::Utc;

    fn seeded() -> Tables {
        let mut tables = Tables::new();
        tables
            .commit(vec![
                WriteOp::UpsertUser(User::new("u1", "Ana", "ana@example.com")),
                WriteOp::UpsertAddress(Address::new("addr-1", "u1", "Home", "1 Main St", "Town")),
                WriteOp::UpsertFood(Food::new("pizza-1", "Pizza", Money::from_cents(29900), 10)),
            ])
            .unwrap();
        tables
    }

    fn order(id: &str, total: Money) -> Order {
        let now = Utc::now();
        Order {
            id: OrderId::from(id),
            user_id: UserId::from("u1"),
            address_id: AddressId::from("addr-1"),
            status: OrderStatus::Pending,
            total_amount: total,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn line(id: &str, order_id: &str, quantity: u32) -> OrderLine {
        OrderLine {
            id: OrderLineId::from(id),
            order_id: OrderId::from(order_id),
            food_id: FoodId::from("pizza-1"),
            quantity,
            unit_price: Money::from_cents(29900),
            total_price: Money::from_cents(29900).times(quantity),
        }
    }

    fn payment(order_id: &str, amount: Money) -> Payment {
        let now = Utc::now();
        Payment {
            id: PaymentId::generate(),
            order_id: OrderId::from(order_id),
            method: PaymentMethod::CashOnDelivery,
            status: PaymentStatus::Pending,
            amount,
            provider_transaction_id: Some(format!("cod_{}", order_id)),
            metadata: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_commit_applies_everything() {
        let mut tables = seeded();
        let total = Money::from_cents(59800);
        tables
            .commit(vec![
                WriteOp::InsertOrder(order("o1", total)),
                WriteOp::InsertLine(line("l1", "o1", 2)),
                WriteOp::DecrementStock {
                    food_id: FoodId::from("pizza-1"),
                    quantity: 2,
                },
                WriteOp::InsertPayment(payment("o1", total)),
            ])
            .unwrap();

        assert_eq!(tables.foods.get(&FoodId::from("pizza-1")).unwrap().stock, 8);
        let records = tables.load_orders(&OrderFilter::by_id(OrderId::from("o1")), None);
        assert_eq!(records.total, 1);
        let record = &records.records[0];
        assert_eq!(record.lines.len(), 1);
        assert_eq!(record.payment.as_ref().unwrap().amount, total);
        assert_eq!(record.owner.as_ref().unwrap().name, "Ana");
    }

    #[test]
    fn test_failed_decrement_rolls_back_earlier_writes() {
        let mut tables = seeded();
        let before = tables.counts();
        let total = Money::from_cents(29900).times(11);

        let result = tables.commit(vec![
            WriteOp::InsertOrder(order("o1", total)),
            WriteOp::InsertLine(line("l1", "o1", 11)),
            WriteOp::DecrementStock {
                food_id: FoodId::from("pizza-1"),
                quantity: 11,
            },
            WriteOp::InsertPayment(payment("o1", total)),
        ]);

        assert_eq!(
            result,
            Err(StoreError::InsufficientStock {
                food_id: FoodId::from("pizza-1"),
                requested: 11,
                available: 10,
            })
        );
        assert_eq!(tables.counts(), before);
        assert_eq!(tables.foods.get(&FoodId::from("pizza-1")).unwrap().stock, 10);
    }

    #[test]
    fn test_second_decrement_in_same_commit_sees_the_first() {
        let mut tables = seeded();
        let decrement = |quantity| WriteOp::DecrementStock {
            food_id: FoodId::from("pizza-1"),
            quantity,
        };

        let result = tables.commit(vec![decrement(6), decrement(6)]);
        assert!(matches!(result, Err(StoreError::InsufficientStock { available: 4, .. })));
        assert_eq!(tables.foods.get(&FoodId::from("pizza-1")).unwrap().stock, 10);
    }

    #[test]
    fn test_payment_must_match_order_total_and_be_unique() {
        let mut tables = seeded();
        let total = Money::from_cents(29900);
        tables.commit(vec![WriteOp::InsertOrder(order("o1", total))]).unwrap();

        let wrong =
            tables.commit(vec![WriteOp::InsertPayment(payment("o1", Money::from_cents(1)))]);
        assert!(matches!(wrong, Err(StoreError::Constraint(_))));

        tables.commit(vec![WriteOp::InsertPayment(payment("o1", total))]).unwrap();
        let again = tables.commit(vec![WriteOp::InsertPayment(payment("o1", total))]);
        assert!(matches!(again, Err(StoreError::Duplicate { table: "payment", .. })));
    }

    #[test]
    fn test_status_compare_and_set() {
        let mut tables = seeded();
        tables
            .commit(vec![WriteOp::InsertOrder(order("o1", Money::ZERO))])
            .unwrap();
        let set = |expected, status| WriteOp::SetOrderStatus {
            order_id: OrderId::from("o1"),
            expected,
            status,
            at: Utc::now(),
        };

        tables
            .commit(vec![set(OrderStatus::Pending, OrderStatus::Confirmed)])
            .unwrap();
        let stale = tables.commit(vec![set(OrderStatus::Pending, OrderStatus::Cancelled)]);
        assert!(matches!(
            stale,
            Err(StoreError::StatusMismatch {
                actual: OrderStatus::Confirmed,
                ..
            })
        ));
        assert_eq!(
            tables.orders.get(&OrderId::from("o1")).unwrap().status,
            OrderStatus::Confirmed
        );
    }

    #[test]
    fn test_order_requires_owned_address() {
        let mut tables = seeded();
        tables
            .commit(vec![WriteOp::UpsertUser(User::new("u2", "Bo", "bo@example.com"))])
            .unwrap();
        let mut foreign = order("o1", Money::ZERO);
        foreign.user_id = UserId::from("u2");

        let result = tables.commit(vec![WriteOp::InsertOrder(foreign)]);
        assert!(matches!(result, Err(StoreError::Constraint(_))));
    }

    #[test]
    fn test_load_orders_filters_and_windows_newest_first() {
        let mut tables = seeded();
        for id in ["o1", "o2", "o3"] {
            tables
                .commit(vec![WriteOp::InsertOrder(order(id, Money::ZERO))])
                .unwrap();
        }

        let page = tables.load_orders(&OrderFilter::all(), Some(Window { offset: 1, limit: 1 }));
        assert_eq!(page.total, 3);
        let ids: Vec<&str> = page.records.iter().map(|r| r.order.id.as_str()).collect();
        assert_eq!(ids, vec!["o2"]);

        let none = tables.load_orders(
            &OrderFilter::all().with_status(Some(OrderStatus::Delivered)),
            None,
        );
        assert_eq!(none.total, 0);

        let others = tables.load_orders(&OrderFilter::all().owned_by(UserId::from("u9")), None);
        assert!(others.records.is_empty());
    }

    #[test]
    fn test_each_order_gets_only_its_own_lines_in_insertion_order() {
        let mut tables = seeded();
        tables
            .commit(vec![
                WriteOp::InsertOrder(order("o1", Money::ZERO)),
                WriteOp::InsertOrder(order("o2", Money::ZERO)),
                WriteOp::InsertLine(line("l-b", "o1", 1)),
                WriteOp::InsertLine(line("l-a", "o2", 2)),
                WriteOp::InsertLine(line("l-c", "o1", 3)),
            ])
            .unwrap();

        let records = tables.load_orders(&OrderFilter::all(), None);
        let lines_of = |id: &str| -> Vec<String> {
            let record = records
                .records
                .iter()
                .find(|r| r.order.id.as_str() == id)
                .unwrap();
            record.lines.iter().map(|l| l.line.id.to_string()).collect()
        };
        assert_eq!(lines_of("o1"), vec!["l-b", "l-c"]);
        assert_eq!(lines_of("o2"), vec!["l-a"]);

        let page = tables.load_orders(&OrderFilter::all(), Some(Window { offset: 0, limit: 1 }));
        assert_eq!(page.records[0].order.id.as_str(), "o2");
        assert_eq!(page.records[0].lines.len(), 1);
    }
}
