//! # taskshare
//!
//! Splits a spreadsheet of pending administrative tasks among a fixed team.
//! Rows are owned directly when their login column contains a worker's
//! alias; the remaining rows of the residual task type are dealt out by
//! weighted quota. Each worker then gets one consolidated final file.
//!
//! ## Usage
//!
//! ```bash
//! taskshare run --input tasks.xlsx --output SAIDA [--config taskshare.toml]
//! ```
//!
//! ## Modules
//!
//! - `abstractions` - Trait-based table storage for testing without disk I/O
//! - `config` - Layered configuration (defaults, TOML, environment)
//! - `distribution` - Direct filters, weighted allocation and final aggregation
//! - `error` - Unified error type with error codes
//! - `pipeline` - End-to-end run orchestration
//! - `table` - In-memory tables and spreadsheet/CSV I/O
pub mod abstractions;
pub mod config;
pub mod distribution;
pub mod error;
pub mod pipeline;
pub mod table;

pub use error::{Result, TaskShareError};
