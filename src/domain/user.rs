use serde::{Deserialize, Serialize};

string_id!(
    /// Identifier of a registered user.
    UserId
);

/// Represents a registered user, as supplied by the auth layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Free-form role string from the session store. Resolved into a
    /// [`crate::auth::Capability`] once, at the boundary.
    pub role: Option<String>,
}

/// The owner's basic profile shown next to an order in admin listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl User {
    /// Creates a new customer.
    ///
    /// # Arguments
    /// * `id` - Identifier issued by the auth layer
    /// * `name` - User's display name
    /// * `email` - User's email address
    pub fn new(id: impl Into<UserId>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}
