//! System orchestration, startup, and shutdown logic.

pub mod food_system;
pub mod tracing;

pub use self::food_system::*;
pub use self::tracing::*;
