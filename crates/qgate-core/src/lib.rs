//! # qgate-core
//!
//! Core types and utilities shared by the qgate crates.
//!
//! This crate provides:
//! - [`QgateError`] - Error type for configuration, I/O, and command failures
//! - [`logging`] - Tracing setup
//!
//! ## Example
//!
//! ```no_run
//! use qgate_core::{QgateError, logging};
//!
//! fn main() -> qgate_core::Result<()> {
//!     let _guard = logging::init_logging(None, false)?;
//!
//!     let config_path = std::path::Path::new("quality.yml");
//!     if !config_path.exists() {
//!         return Err(QgateError::config_not_found(config_path));
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

pub use error::{QgateError, Result};
pub use logging::{LogGuard, init_logging};
