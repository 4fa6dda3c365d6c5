//! API Connector Library
//!
//! Outbound REST client core for e-commerce platform integrations: request building,
//! dispatch through a pluggable transport, traffic logging and lenient JSON decoding.

pub mod config;
pub mod http;
pub mod models;
pub mod services;
pub mod utils;

// Re-export common types
pub use config::{AuthMode, Configuration};
pub use http::{Headers, HttpRequest, RequestBody, RequestFactory, Transport, TransportOptions};
pub use models::{ApiResponse, TokenizationResponse};
pub use services::{JsonSerializer, Serializer, SerializerContext, V1Api};
pub use utils::error::{ApiError, ApiResult};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}
