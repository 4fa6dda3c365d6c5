//! Request factory
//!
//! Builds [`HttpRequest`] values for the verbs the API client uses

use super::request::{Headers, HttpRequest, RequestBody};
use reqwest::Method;

/// Creates POST/GET/PATCH requests
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestFactory;

impl RequestFactory {
    pub const METHOD_POST: &'static str = "POST";
    pub const METHOD_GET: &'static str = "GET";
    pub const METHOD_PATCH: &'static str = "PATCH";

    pub fn new() -> Self {
        Self
    }

    pub fn create_post_request(
        &self,
        uri: impl Into<String>,
        headers: Headers,
        body: Option<RequestBody>,
    ) -> HttpRequest {
        HttpRequest::new(Method::POST, uri, headers, body)
    }

    pub fn create_get_request(
        &self,
        uri: impl Into<String>,
        headers: Headers,
        body: Option<RequestBody>,
    ) -> HttpRequest {
        HttpRequest::new(Method::GET, uri, headers, body)
    }

    pub fn create_patch_request(
        &self,
        uri: impl Into<String>,
        headers: Headers,
        body: Option<RequestBody>,
    ) -> HttpRequest {
        HttpRequest::new(Method::PATCH, uri, headers, body)
    }
}
