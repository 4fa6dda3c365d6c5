//! Configuration management module
//!
//! Responsible for loading and managing client configuration from environment variables and JSON files.

pub mod file;
pub mod settings;

pub use settings::{AuthMode, Configuration, LoggingConfig};
