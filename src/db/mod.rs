//! Row store access
//!
//! The content layer talks to a [`RowStore`]: typed select/insert/update/delete
//! over named tables with equality, range, null and `or` filters plus ordering.
//!
//! Two adapters:
//! - [`MongoRowStore`] - production, one collection per table
//! - [`MemoryRowStore`] - dev mode and tests

pub mod memory;
pub mod mongo;
pub mod query;
pub mod store;

pub use memory::MemoryRowStore;
pub use mongo::{MongoClient, MongoRowStore};
pub use query::{Direction, Filter, Order, Query};
pub use store::{Row, RowStore, StoreError, StoreResult, Table};
