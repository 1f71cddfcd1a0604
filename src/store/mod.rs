//! In-process relational store.
//!
//! A single [`StoreActor`] owns every table and serializes reads and commits.
//! Writes go through a unit of work from [`StoreClient::begin`], which the actor applies
//! atomically.

mod actor;
mod client;
mod entity;
mod messages;
mod tables;
mod unit_of_work;

pub use actor::StoreActor;
pub use client::StoreClient;
pub use messages::{OrderFilter, OrderRecord, Window, WriteOp};
#[cfg(test)]
pub use messages::{LineRecord, OrderRecords, StoreRequest};
#[cfg(test)]
pub use tables::TableCounts;
