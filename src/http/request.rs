//! Request values
//!
//! Immutable request description handed to a [`Transport`](super::Transport)

use reqwest::{Method, Version};
use std::fmt;

/// Ordered header list with case-insensitive names
///
/// Inserting a name that already exists (in any case) replaces the value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert or replace a header
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Add a header without replacing existing values of the same name
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Overlay `other` on top of these headers; values from `other` win
    pub fn merge(&mut self, other: Headers) {
        for (name, value) in other.0 {
            self.insert(name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.insert(k, v);
        }
        headers
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Headers {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// Request payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Raw bytes, sent as-is
    Raw(Vec<u8>),
    /// `application/x-www-form-urlencoded` key/value pairs
    Form(Vec<(String, String)>),
}

impl RequestBody {
    /// Build a form body from string pairs
    pub fn form<K: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        RequestBody::Form(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl fmt::Display for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Raw(bytes) => write!(f, "{}", String::from_utf8_lossy(bytes)),
            RequestBody::Form(pairs) => {
                let joined = pairs
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect::<Vec<_>>()
                    .join("&");
                write!(f, "{}", joined)
            }
        }
    }
}

impl From<String> for RequestBody {
    fn from(body: String) -> Self {
        RequestBody::Raw(body.into_bytes())
    }
}

impl From<&str> for RequestBody {
    fn from(body: &str) -> Self {
        RequestBody::Raw(body.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(body: Vec<u8>) -> Self {
        RequestBody::Raw(body)
    }
}

/// An outbound HTTP request
///
/// The URI is kept verbatim; malformed values are reported by the transport when sent.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    method: Method,
    uri: String,
    headers: Headers,
    body: Option<RequestBody>,
    version: Version,
}

impl HttpRequest {
    /// Create an HTTP/1.1 request
    pub fn new(
        method: Method,
        uri: impl Into<String>,
        headers: Headers,
        body: Option<RequestBody>,
    ) -> Self {
        Self {
            method,
            uri: uri.into(),
            headers,
            body,
            version: Version::HTTP_11,
        }
    }

    /// Same request with a different protocol version
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Body rendered for logs; empty when there is no body
    pub fn body_string(&self) -> String {
        self.body.as_ref().map(|b| b.to_string()).unwrap_or_default()
    }
}
