use super::Money;
use serde::{Deserialize, Serialize};

string_id!(
    /// Identifier of a menu item.
    FoodId
);

/// A menu item. The order workflow reads it and decrements `stock`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: FoodId,
    pub name: String,
    /// Current price. Orders snapshot it; later changes never touch placed orders.
    pub price: Money,
    pub stock: u32,
    pub is_available: bool,
}

/// Current display data for a food, joined onto order lines when reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodSummary {
    pub id: FoodId,
    pub name: String,
    pub price: Money,
    pub is_available: bool,
}

/// Partial update of the columns an admin edits. Stock is never patched this way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodPatch {
    pub price: Option<Money>,
    pub is_available: Option<bool>,
}

impl Food {
    pub fn new(id: impl Into<FoodId>, name: impl Into<String>, price: Money, stock: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            stock,
            is_available: true,
        }
    }

    pub fn unavailable(mut self) -> Self {
        self.is_available = false;
        self
    }

    pub fn summary(&self) -> FoodSummary {
        FoodSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            is_available: self.is_available,
        }
    }

    /// Applies `patch` to this food.
    pub fn apply(&mut self, patch: FoodPatch) {
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(is_available) = patch.is_available {
            self.is_available = is_available;
        }
    }
}
