//! Data models module
//!
//! Response envelope and the response payloads used by the client core

pub mod response;
pub mod tokenization;

pub use response::ApiResponse;
pub use tokenization::TokenizationResponse;
