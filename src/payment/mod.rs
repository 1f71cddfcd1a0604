//! Payment providers.
//!
//! The order workflow only talks to [`PaymentProvider`] trait objects looked up in
//! [`PaymentProviders`] by method, so a new provider slots in without touching it.

mod cod;
mod online;
mod provider;
mod registry;

#[cfg(test)]
pub use cod::CashOnDeliveryProvider;
pub use provider::*;
pub use registry::PaymentProviders;
