//! Order persistence for the delivery dashboard.
//!
//! The workflow engine never touches storage; this crate is the
//! collaborator that lists, loads, and writes orders:
//! - [`OrderStore`] trait, the contract the workflow service relies on
//! - [`InMemoryOrderStore`] for tests and local runs
//! - [`PostgresOrderStore`] for the real database

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{OrderStoreError, Result};
pub use memory::InMemoryOrderStore;
pub use postgres::PostgresOrderStore;
pub use store::{OrderStore, UpdateOptions};
