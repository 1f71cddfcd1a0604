//! Price snapshot: resolves current prices, checks availability and stock, and
//! freezes line totals. Read-only; stock is only taken when the order commits.

use crate::domain::{Food, FoodId, Money, OrderItemInput};
use crate::error::OrderError;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub food_id: FoodId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub total_price: Money,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceSnapshot {
    pub lines: Vec<PricedLine>,
    pub total: Money,
}

impl PriceSnapshot {
    /// Prices `items` against `foods`, failing on the first line that cannot be served.
    ///
    /// `foods` is whatever the store returned for the requested ids; a missing entry
    /// means the food does not exist.
    pub fn take(items: &[OrderItemInput], foods: &[Food]) -> Result<Self, OrderError> {
        let by_id: HashMap<&FoodId, &Food> = foods.iter().map(|food| (&food.id, food)).collect();

        let lines = items
            .iter()
            .map(|item| {
                let food = by_id.get(&item.food_id).ok_or_else(|| OrderError::NotFound {
                    entity: "Food",
                    id: item.food_id.to_string(),
                })?;
                if !food.is_available {
                    return Err(OrderError::Unavailable {
                        food_id: food.id.clone(),
                        name: food.name.clone(),
                    });
                }
                if food.stock < item.quantity {
                    return Err(OrderError::OutOfStock {
                        food_id: food.id.clone(),
                        name: food.name.clone(),
                        requested: item.quantity,
                        available: food.stock,
                    });
                }
                Ok(PricedLine {
                    food_id: food.id.clone(),
                    name: food.name.clone(),
                    quantity: item.quantity,
                    unit_price: food.price,
                    total_price: food.price.times(item.quantity),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let total = lines.iter().map(|line| line.total_price).sum();
        Ok(Self { lines, total })
    }

    pub fn name_of(&self, food_id: &FoodId) -> Option<&str> {
        self.lines
            .iter()
            .find(|line| &line.food_id == food_id)
            .map(|line| line.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn menu() -> Vec<Food> {
        vec![
            Food::new("pizza-1", "Pizza", "299.00".parse().unwrap(), 10),
            Food::new("cola", "Cola", "1.15".parse().unwrap(), 100),
            Food::new("soup", "Soup", "4.50".parse().unwrap(), 5).unavailable(),
        ]
    }

    #[test]
    fn test_totals_are_exact() {
        let snapshot = PriceSnapshot::take(
            &[OrderItemInput::new("pizza-1", 2), OrderItemInput::new("cola", 3)],
            &menu(),
        )
        .unwrap();

        assert_eq!(snapshot.lines[0].total_price.to_string(), "598.00");
        assert_eq!(snapshot.lines[1].total_price.to_string(), "3.45");
        assert_eq!(snapshot.total.to_string(), "601.45");
        assert_eq!(snapshot.name_of(&FoodId::from("cola")), Some("Cola"));
    }

    #[test]
    fn test_unknown_food_is_not_found() {
        let err = PriceSnapshot::take(&[OrderItemInput::new("ghost", 1)], &menu()).unwrap_err();
        assert_eq!(
            err,
            OrderError::NotFound {
                entity: "Food",
                id: "ghost".to_string()
            }
        );
    }

    #[test]
    fn test_unavailable_and_out_of_stock_are_conflicts() {
        let err = PriceSnapshot::take(&[OrderItemInput::new("soup", 1)], &menu()).unwrap_err();
        assert!(matches!(err, OrderError::Unavailable { ref name, .. } if name == "Soup"));
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err = PriceSnapshot::take(
            &[OrderItemInput::new("cola", 1), OrderItemInput::new("pizza-1", 11)],
            &menu(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            OrderError::OutOfStock {
                food_id: FoodId::from("pizza-1"),
                name: "Pizza".to_string(),
                requested: 11,
                available: 10,
            }
        );
    }
}
