//! Abstraction layers for external dependencies
//!
//! This module provides trait-based abstractions for table file I/O to
//! enable testing the distribution pipeline without touching the disk.

pub mod table_store;

pub use table_store::{MockTableStore, RealTableStore, TableStore};
