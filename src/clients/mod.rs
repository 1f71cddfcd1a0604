//! Clients for the store actor's callers.
//!
//! `client_method!` lives in [`macros`] and generates the request/response plumbing
//! for plain store reads; the clients here orchestrate multi-step workflows on top.

#[macro_use]
pub mod macros;

mod catalog_client;
mod order_client;

pub use catalog_client::CatalogClient;
pub use order_client::{ListOrdersQuery, OrderClient};
