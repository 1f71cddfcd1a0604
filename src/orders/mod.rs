//! Order workflow building blocks: input validation, pricing, the status machine
//! and the read-side views. [`crate::clients::OrderClient`] wires them to the store
//! and the payment providers.

pub mod pricing;
pub mod status;
pub mod validate;
pub mod view;

pub use pricing::PriceSnapshot;
pub use status::{PaymentEffect, StatusPolicy};
pub use view::{OrderStats, OrderView, Page};
