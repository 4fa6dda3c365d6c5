//! V1 API client core
//!
//! Endpoint clients compose a [`V1Api`] and use it to build requests, dispatch them
//! through a [`Transport`], and decode the body into a typed [`ApiResponse`].
//!
//! Only transport failures are errors. Any HTTP status is a completed round trip, and a
//! body that is empty or does not decode into the payload type yields `P::default()`.

use crate::config::{AuthMode, Configuration};
use crate::http::{
    DebugSink, Headers, HttpRequest, ReqwestTransport, RequestBody, RequestFactory, Transport,
    TransportOptions,
};
use crate::models::{ApiResponse, TokenizationResponse};
use crate::services::serializer::{JsonSerializer, Serializer, SerializerContext, JSON_FORMAT};
use crate::utils::error::{helpers, ApiError, ApiResult, ErrorContext};
use crate::utils::files::{FileOpener, FsFileOpener};
use crate::utils::logging::Logger;
use chrono::{DateTime, Local, Timelike};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn, Instrument};
use uuid::Uuid;

/// Message set on every completed round trip
pub const SUCCESS_MESSAGE: &str = "Request Complete successfully";

/// Attributes never populated from a response body by default
pub const DEFAULT_IGNORED_ATTRIBUTES: [&str; 1] = ["headers"];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Request/response core shared by endpoint clients
///
/// Collaborators are passed in explicitly. [`V1Api::new`] uses [`JsonSerializer`],
/// [`RequestFactory`] and [`FsFileOpener`] with no logger; the `with_*` methods replace them.
pub struct V1Api<T = ReqwestTransport, S = JsonSerializer> {
    transport: T,
    config: Configuration,
    request_factory: RequestFactory,
    serializer: S,
    logger: Option<Arc<dyn Logger>>,
    file_opener: Arc<dyn FileOpener>,
    ignored_attributes: Vec<String>,
}

impl V1Api<ReqwestTransport, JsonSerializer> {
    /// Create a client over a default `reqwest` transport
    pub fn from_config(config: Configuration) -> ApiResult<Self> {
        Ok(Self::new(ReqwestTransport::new()?, config))
    }
}

impl<T: Transport> V1Api<T, JsonSerializer> {
    pub fn new(transport: T, config: Configuration) -> Self {
        Self {
            transport,
            config,
            request_factory: RequestFactory::new(),
            serializer: JsonSerializer::new(),
            logger: None,
            file_opener: Arc::new(FsFileOpener),
            ignored_attributes: DEFAULT_IGNORED_ATTRIBUTES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl<T: Transport, S: Serializer> V1Api<T, S> {
    pub fn with_serializer<S2: Serializer>(self, serializer: S2) -> V1Api<T, S2> {
        V1Api {
            transport: self.transport,
            config: self.config,
            request_factory: self.request_factory,
            serializer,
            logger: self.logger,
            file_opener: self.file_opener,
            ignored_attributes: self.ignored_attributes,
        }
    }

    pub fn with_request_factory(mut self, request_factory: RequestFactory) -> Self {
        self.request_factory = request_factory;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_file_opener(mut self, file_opener: Arc<dyn FileOpener>) -> Self {
        self.file_opener = file_opener;
        self
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn serializer(&self) -> &S {
        &self.serializer
    }

    /// Build a POST request to the service URL
    ///
    /// `Content-Type` comes from the configuration; caller headers win on collision.
    /// With [`AuthMode::BearerToken`] a client-credentials token is fetched first and sent
    /// as `Authorization: Bearer <token>`, unless the caller already supplies `Authorization`.
    pub async fn create_http_post_request(
        &self,
        headers: Headers,
        body: Option<RequestBody>,
    ) -> ApiResult<HttpRequest> {
        let uri = self.config.service_url.clone();
        self.log(format_args!("Path: {}", uri));

        let mut http_headers = Headers::new().with("Content-Type", self.config.content_type.as_str());

        if self.config.auth_mode == AuthMode::BearerToken && !headers.contains("Authorization") {
            let token = self.get_auth_token().await?;
            let access_token = token.access_token.ok_or_else(|| {
                helpers::auth_error("Token endpoint response did not contain an access_token")
            })?;
            http_headers.insert("Authorization", format!("Bearer {}", access_token));
        }

        http_headers.merge(headers);

        debug!("Built POST request for {}", uri);
        Ok(self.request_factory.create_post_request(uri, http_headers, body))
    }

    /// Build a GET request to `service_url + path`
    pub fn create_http_get_request(
        &self,
        path: &str,
        headers: Headers,
        body: Option<RequestBody>,
    ) -> HttpRequest {
        let uri = self.resolve_uri(path);
        let http_headers = self.default_headers(headers);

        debug!("Built GET request for {}", uri);
        self.request_factory.create_get_request(uri, http_headers, body)
    }

    /// Build a PATCH request to `service_url + path`
    pub fn create_http_patch_request(
        &self,
        path: &str,
        headers: Headers,
        body: Option<RequestBody>,
    ) -> HttpRequest {
        let uri = self.resolve_uri(path);
        let http_headers = self.default_headers(headers);

        debug!("Built PATCH request for {}", uri);
        self.request_factory.create_patch_request(uri, http_headers, body)
    }

    /// Transport options for the next call
    ///
    /// With `debug` enabled the debug file is opened and registered as the debug sink.
    pub fn create_http_client_options(&self) -> ApiResult<TransportOptions> {
        let mut options = TransportOptions::new();

        if self.config.debug {
            let debug_file = self.config.debug_file.as_str();

            if debug_file.trim().is_empty() {
                return Err(helpers::configuration_error(format!(
                    "Failed to open the debug file, filename is blank: {:?}",
                    debug_file
                )));
            }

            let writer = self
                .file_opener
                .open(debug_file)
                .configuration_context(&format!("Failed to open the debug file: {}", debug_file))?;

            options = options.with_debug_sink(DebugSink::new(debug_file, writer));
        }

        Ok(options)
    }

    /// Dispatch `request` and decode the body into `P`
    ///
    /// `options` is consumed; anything it holds is released before this returns.
    pub async fn send_request_and_handle_response<P>(
        &self,
        request: HttpRequest,
        options: TransportOptions,
        context: &SerializerContext,
    ) -> ApiResult<ApiResponse<P>>
    where
        P: DeserializeOwned + Default,
    {
        let span = tracing::info_span!(
            "api_request",
            request_id = %Uuid::new_v4(),
            method = %request.method(),
            uri = %request.uri(),
        );

        self.round_trip(request, options, context).instrument(span).await
    }

    async fn round_trip<P>(
        &self,
        request: HttpRequest,
        mut options: TransportOptions,
        context: &SerializerContext,
    ) -> ApiResult<ApiResponse<P>>
    where
        P: DeserializeOwned + Default,
    {
        let start = now_in_seconds();
        self.log(format_args!("Request: {}", request.body_string()));
        self.log(format_args!("Start Time: {}", start.format(TIMESTAMP_FORMAT)));

        let sent = self.transport.send(&request, &mut options).await;
        drop(options);

        let mut http_response = match sent {
            Ok(response) => response,
            Err(failure) => {
                warn!("Transport failure for {}: {} (code {})", request.uri(), failure, failure.code());
                return Err(ApiError::transport(request, failure));
            }
        };

        let content = http_response.body_mut().get_contents();
        http_response.body_mut().rewind();

        let end = now_in_seconds();
        let elapsed = (end - start).num_seconds();
        self.log(format_args!("End Time: {}", end.format(TIMESTAMP_FORMAT)));
        self.log(format_args!("Time Difference: {}", elapsed));
        self.log(format_args!("Response: {}", content));

        let payload = if content.is_empty() {
            None
        } else {
            match self.serializer.deserialize::<P>(&content, JSON_FORMAT, context) {
                Ok(payload) => Some(payload),
                Err(e) => {
                    debug!("Response body did not decode into the payload type, using default: {}", e);
                    None
                }
            }
        };

        let mut response = ApiResponse::new(payload.unwrap_or_default());
        response.set_http_request(request);
        response.set_http_response(http_response);
        response.set_status(true);
        response.set_message(SUCCESS_MESSAGE);

        Ok(response)
    }

    /// Context excluding the fixed ignored attributes
    pub fn serializer_context(&self) -> SerializerContext {
        SerializerContext {
            ignored_attributes: self.ignored_attributes.clone(),
        }
    }

    /// Encode a request payload with the client's serializer and context
    pub fn serialize_body<B: Serialize>(&self, body: &B) -> ApiResult<RequestBody> {
        let json = self
            .serializer
            .serialize(body, JSON_FORMAT, &self.serializer_context())?;
        Ok(RequestBody::from(json))
    }

    /// Fetch an OAuth2 client-credentials token
    ///
    /// Goes straight to the transport: no traffic logging and no request attached to failures.
    async fn get_auth_token(&self) -> ApiResult<TokenizationResponse> {
        let auth_url = self
            .config
            .auth_token_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                helpers::configuration_error("auth_token_url is required for bearer token authorization")
            })?;

        let form = vec![
            ("grant_type".to_string(), self.config.grant_type.clone().unwrap_or_default()),
            ("client_id".to_string(), self.config.client_id.clone().unwrap_or_default()),
            ("client_secret".to_string(), self.config.client_secret.clone().unwrap_or_default()),
            ("resource".to_string(), self.config.service_url.clone()),
        ];

        let mut http_response = self.transport.request(Method::POST, auth_url, &form).await?;
        let content = http_response.body_mut().get_contents();
        http_response.body_mut().rewind();

        if content.is_empty() {
            return Ok(TokenizationResponse::default());
        }

        Ok(self
            .serializer
            .deserialize(&content, JSON_FORMAT, &SerializerContext::new())
            .unwrap_or_default())
    }

    fn resolve_uri(&self, path: &str) -> String {
        let uri = format!("{}{}", self.config.service_url.trim_end_matches('/'), path);
        self.log(format_args!("Path: {}", uri));
        uri
    }

    fn default_headers(&self, headers: Headers) -> Headers {
        let mut http_headers = Headers::new()
            .with("Content-Type", "application/json")
            .with("User-Agent", self.config.user_agent.as_str())
            .with("x-api-key", self.config.api_key.as_str());

        if !headers.is_empty() {
            http_headers.merge(headers);
        }

        http_headers
    }

    fn log(&self, message: fmt::Arguments<'_>) {
        if let Some(logger) = &self.logger {
            logger.info(&message.to_string());
        }
    }
}

/// Current local time truncated to whole seconds
fn now_in_seconds() -> DateTime<Local> {
    let now = Local::now();
    now.with_nanosecond(0).unwrap_or(now)
}
