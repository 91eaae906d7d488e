//! Project analysis and starter configuration for qgate.
//!
//! [`ProjectAnalyzer`] infers a project's stack from its file tree,
//! [`generate_config`] turns that into a `quality.yml` document, and
//! [`init`] ties the two together for `qgate --init`.

pub mod detection;
pub mod error;
pub mod generator;
pub mod init;

pub use detection::{Framework, Language, ProjectAnalyzer, ProjectStructure};
pub use error::{InitError, Result};
pub use generator::generate_config;
pub use init::{InitOptions, InitReport, init, preview};
