//! # qgate-config
//!
//! The `quality.yml` model and everything that inspects it before anything
//! runs:
//!
//! - [`model`] - tools, hook groups, hooks, and output rules
//! - [`loader`] - reading the file from disk
//! - [`validator`] - severity-tagged structural, safety, and consistency checks
//! - [`rules`] - the pattern tables behind the safety and typo checks
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use qgate_config::{ConfigValidator, load_config};
//!
//! let path = Path::new("quality.yml");
//! let config = load_config(path)?;
//! let result = ConfigValidator::new(&config).with_source(path).validate();
//! println!("{}", result.formatted());
//! # Ok::<(), qgate_core::QgateError>(())
//! ```

pub mod loader;
pub mod model;
pub mod rules;
pub mod validator;

pub use loader::{DEFAULT_CONFIG_FILE, load_config};
pub use model::{Config, Hook, HookGroup, HookStage, OutputRules, ShowOn, Tool};
pub use validator::{
    ConfigValidator, Severity, ValidationError, ValidationResult, validate_file,
};
