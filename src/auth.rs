//! Caller identity handed to the order workflow by the session layer.

use crate::domain::UserId;
use crate::error::OrderError;

/// What the caller may do, resolved once from the session's role string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Customer,
    Admin,
}

impl Capability {
    pub fn from_role(role: Option<&str>) -> Self {
        match role {
            Some("admin") => Capability::Admin,
            _ => Capability::Customer,
        }
    }
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub capability: Capability,
}

impl Caller {
    pub fn from_session(user_id: impl Into<UserId>, role: Option<&str>) -> Self {
        Self {
            user_id: user_id.into(),
            capability: Capability::from_role(role),
        }
    }

    pub fn customer(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            capability: Capability::Customer,
        }
    }

    pub fn admin(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            capability: Capability::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.capability == Capability::Admin
    }

    pub fn require_admin(&self) -> Result<(), OrderError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(OrderError::Forbidden)
        }
    }

    pub fn can_see(&self, owner: &UserId) -> bool {
        self.is_admin() || &self.user_id == owner
    }
}
