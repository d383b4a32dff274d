//! Core types and trait definitions for the roster organisation directory.
//!
//! No database or terminal dependencies; the storage backend and the CLI
//! both build on it.

pub mod choice;
pub mod error;
pub mod model;
pub mod removal;
pub mod store;

pub use error::{Error, Result};
