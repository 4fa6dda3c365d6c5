//! Utilities module
//!
//! Contains error handling, logging and file helpers

pub mod error;
pub mod files;
pub mod logging;
