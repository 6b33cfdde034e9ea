//! Core of the consched convention schedule client.
//!
//! This crate keeps a local cache of convention events in sync with a remote
//! schedule and answers queries over it:
//! - `event` / `wire`: the domain record and its remote representation
//! - `transform`: wire record to domain record
//! - `store`: the local event store contract and implementations
//! - `remote`: the remote schedule endpoint contract and HTTP implementation
//! - `sync`: workers that emit cached, then refreshed, query results

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod remote;
pub mod store;
pub mod sync;
pub mod transform;
pub mod wire;

pub use error::{SchedError, SchedResult};
pub use event::Event;
pub use wire::WireEvent;
