//! Service layer module
//!
//! Contains the V1 API client core and the serializer it decodes with

pub mod api;
pub mod serializer;

pub use api::V1Api;
pub use serializer::{JsonSerializer, Serializer, SerializerContext};
