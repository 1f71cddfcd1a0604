use super::UserId;
use serde::{Deserialize, Serialize};

string_id!(
    /// Identifier of a delivery address.
    AddressId
);

/// A delivery address owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    /// e.g. "Home", "Work"
    pub label: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub phone: String,
    pub is_default: bool,
}

impl Address {
    pub fn new(
        id: impl Into<AddressId>,
        user_id: impl Into<UserId>,
        label: impl Into<String>,
        street: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            label: label.into(),
            street: street.into(),
            city: city.into(),
            state: String::new(),
            postal_code: String::new(),
            phone: String::new(),
            is_default: false,
        }
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}
