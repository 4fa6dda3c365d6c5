//! Error handling module
//!
//! Defines error types and handling logic used in the project

use crate::http::{HttpRequest, TransportFailure};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// The transport could not complete the request/response cycle
    #[error("Transport error: {message}")]
    Transport {
        /// The request that was being dispatched
        request: Box<HttpRequest>,
        /// Message reported by the transport
        message: String,
        /// Code reported by the transport (HTTP status if known, otherwise 0)
        code: i32,
        /// Underlying failure
        #[source]
        source: Option<TransportFailure>,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// HTTP client error that was not translated into a transport error
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] TransportFailure),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    /// Wrap a transport failure together with the request it was raised for
    pub fn transport(request: HttpRequest, failure: TransportFailure) -> Self {
        ApiError::Transport {
            request: Box::new(request),
            message: failure.message().to_string(),
            code: failure.code(),
            source: Some(failure),
        }
    }

    /// Numeric code carried by the error
    pub fn code(&self) -> i32 {
        match self {
            ApiError::Transport { code, .. } => *code,
            ApiError::HttpClient(failure) => failure.code(),
            _ => 0,
        }
    }

    /// The originating request, for transport errors
    pub fn http_request(&self) -> Option<&HttpRequest> {
        match self {
            ApiError::Transport { request, .. } => Some(request),
            _ => None,
        }
    }

    /// Get error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Transport { .. } | ApiError::HttpClient(_) => "transport_error",
            ApiError::Configuration(_) => "configuration_error",
            ApiError::Authentication(_) => "authentication_error",
            ApiError::Serialization(_) => "serialization_error",
        }
    }

    /// Whether detailed error information should be logged
    pub fn should_log_details(&self) -> bool {
        !matches!(self, ApiError::Authentication(_))
    }
}

/// Result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Error handling helper functions
pub mod helpers {
    use super::*;

    /// Create configuration error
    pub fn configuration_error(message: impl Into<String>) -> ApiError {
        ApiError::Configuration(message.into())
    }

    /// Create authentication error
    pub fn auth_error(message: impl Into<String>) -> ApiError {
        ApiError::Authentication(message.into())
    }
}

/// Error context extension trait
pub trait ErrorContext<T> {
    /// Add configuration error context
    fn configuration_context(self, message: &str) -> ApiResult<T>;

    /// Add authentication error context
    fn authentication_context(self, message: &str) -> ApiResult<T>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn configuration_context(self, message: &str) -> ApiResult<T> {
        self.map_err(|e| ApiError::Configuration(format!("{}: {}", message, e)))
    }

    fn authentication_context(self, message: &str) -> ApiResult<T> {
        self.map_err(|e| ApiError::Authentication(format!("{}: {}", message, e)))
    }
}
