//! Command Execution
//!
//! [`CommandHandler`] sits between the line parser and the store: it turns a
//! line into a [`Command`](crate::protocol::Command), applies it to the
//! [`StorageEngine`](crate::storage::StorageEngine) and builds the
//! [`Reply`](crate::protocol::Reply).
//!
//! Supported: `SET`, `GET`, `DEL`, `EXPIRE`.

pub mod handler;

pub use handler::CommandHandler;
