//! Response envelope
//!
//! Every endpoint response is an [`ApiResponse`] wrapping the endpoint payload.
//! The bookkeeping fields live on the envelope so they never collide with payload fields.

use crate::http::{HttpRequest, TransportResponse};
use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

/// Decoded payload plus request/response bookkeeping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiResponse<P> {
    /// Endpoint-specific payload
    pub payload: P,
    http_request: Option<HttpRequest>,
    http_response: Option<TransportResponse>,
    status: Option<bool>,
    message: Option<String>,
    errors: BTreeMap<String, String>,
    has_errors: Option<bool>,
}

impl<P> ApiResponse<P> {
    pub fn new(payload: P) -> Self {
        Self {
            payload,
            http_request: None,
            http_response: None,
            status: None,
            message: None,
            errors: BTreeMap::new(),
            has_errors: None,
        }
    }

    pub fn http_request(&self) -> Option<&HttpRequest> {
        self.http_request.as_ref()
    }

    pub fn set_http_request(&mut self, request: HttpRequest) {
        self.http_request = Some(request);
    }

    pub fn http_response(&self) -> Option<&TransportResponse> {
        self.http_response.as_ref()
    }

    /// Mutable access, e.g. to re-read the response body
    pub fn http_response_mut(&mut self) -> Option<&mut TransportResponse> {
        self.http_response.as_mut()
    }

    pub fn set_http_response(&mut self, response: TransportResponse) {
        self.http_response = Some(response);
    }

    pub fn status(&self) -> Option<bool> {
        self.status
    }

    pub fn set_status(&mut self, status: bool) {
        self.status = Some(status);
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Record an error label under `offset`
    pub fn set_error(&mut self, offset: impl Into<String>, label: impl Into<String>) {
        self.errors.insert(offset.into(), label.into());
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Override the derived error flag
    pub fn set_has_errors(&mut self, has_errors: bool) {
        self.has_errors = Some(has_errors);
    }

    /// Explicit override if one was set, otherwise whether any error is recorded
    pub fn has_errors(&self) -> bool {
        self.has_errors.unwrap_or(!self.errors.is_empty())
    }

    pub fn into_payload(self) -> P {
        self.payload
    }
}

impl<P> Deref for ApiResponse<P> {
    type Target = P;

    fn deref(&self) -> &P {
        &self.payload
    }
}

impl<P> DerefMut for ApiResponse<P> {
    fn deref_mut(&mut self) -> &mut P {
        &mut self.payload
    }
}
