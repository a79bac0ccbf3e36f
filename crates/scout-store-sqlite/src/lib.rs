//! SQLite backend for the scout document store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Live subscriptions are fed from an
//! in-process change broadcast: every write announces which collection it
//! touched, and each open feed reloads its snapshot when it hears about its
//! own collection.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
