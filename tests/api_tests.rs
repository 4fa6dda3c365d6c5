//! V1 API client core tests

use apiconnector::config::{AuthMode, Configuration};
use apiconnector::http::{
    Headers, HttpRequest, RequestBody, Transport, TransportFailure, TransportOptions,
    TransportResponse,
};
use apiconnector::models::{ApiResponse, TokenizationResponse};
use apiconnector::services::api::SUCCESS_MESSAGE;
use apiconnector::services::{SerializerContext, V1Api};
use apiconnector::utils::error::ApiError;
use apiconnector::utils::files::FileOpener;
use apiconnector::utils::logging::Logger;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Transport returning canned responses and recording what it was given
#[derive(Default)]
struct StubTransport {
    status: Option<StatusCode>,
    body: String,
    failure: Option<(String, i32)>,
    token_body: String,
    token_failure: bool,
    sent: Mutex<Vec<HttpRequest>>,
    debug_sinks: Mutex<Vec<bool>>,
    token_requests: Mutex<Vec<(Method, String, Vec<(String, String)>)>>,
}

impl StubTransport {
    fn responding(status: StatusCode, body: &str) -> Self {
        Self {
            status: Some(status),
            body: body.to_string(),
            ..Default::default()
        }
    }

    fn failing(message: &str, code: i32) -> Self {
        Self {
            failure: Some((message.to_string(), code)),
            ..Default::default()
        }
    }

    fn with_token(mut self, body: &str) -> Self {
        self.token_body = body.to_string();
        self
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(
        &self,
        request: &HttpRequest,
        options: &mut TransportOptions,
    ) -> Result<TransportResponse, TransportFailure> {
        self.sent.lock().unwrap().push(request.clone());
        self.debug_sinks.lock().unwrap().push(options.debug_sink().is_some());

        if let Some((message, code)) = &self.failure {
            return Err(TransportFailure::new(message.clone(), *code));
        }
        Ok(TransportResponse::new(
            self.status.unwrap_or(StatusCode::OK),
            Headers::from([("content-type", "application/json")]),
            self.body.clone(),
        ))
    }

    async fn request(
        &self,
        method: Method,
        url: &str,
        form: &[(String, String)],
    ) -> Result<TransportResponse, TransportFailure> {
        self.token_requests
            .lock()
            .unwrap()
            .push((method, url.to_string(), form.to_vec()));

        if self.token_failure {
            return Err(TransportFailure::new("token endpoint unreachable", 0));
        }
        Ok(TransportResponse::new(StatusCode::OK, Headers::new(), self.token_body.clone()))
    }
}

#[derive(Default)]
struct RecordingLogger {
    messages: Mutex<Vec<String>>,
}

impl Logger for RecordingLogger {
    fn info(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

impl RecordingLogger {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

struct FailingOpener;

impl FileOpener for FailingOpener {
    fn open(&self, _path: &str) -> io::Result<Box<dyn Write + Send>> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"))
    }
}

/// Payload with fields that collide with the envelope and the ignored attribute
#[derive(Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
struct OrderPayload {
    id: Option<String>,
    status: Option<String>,
    message: Option<String>,
    headers: HashMap<String, String>,
}

/// Payload without `#[serde(default)]`: a missing field fails decoding
#[derive(Debug, Default, PartialEq, Deserialize)]
struct StrictPayload {
    id: String,
    quantity: u32,
}

fn test_config() -> Configuration {
    Configuration {
        service_url: "https://api.example.com/".to_string(),
        api_key: "key-123".to_string(),
        content_type: "application/vnd.api+json".to_string(),
        user_agent: "connector-tests/1.0".to_string(),
        ..Default::default()
    }
}

fn api(transport: StubTransport) -> V1Api<StubTransport> {
    V1Api::new(transport, test_config())
}

#[tokio::test]
async fn test_post_request_uses_service_url_and_content_type() {
    let api = api(StubTransport::default());

    let request = api
        .create_http_post_request(Headers::new(), Some(RequestBody::from("{\"sku\":\"A1\"}")))
        .await
        .unwrap();

    assert_eq!(request.method(), &Method::POST);
    assert_eq!(request.uri(), "https://api.example.com/");
    assert_eq!(request.headers().get("Content-Type"), Some("application/vnd.api+json"));
    assert!(!request.headers().contains("Authorization"));
    assert_eq!(request.body_string(), "{\"sku\":\"A1\"}");
}

#[tokio::test]
async fn test_post_request_caller_headers_win() {
    let api = api(StubTransport::default());

    let request = api
        .create_http_post_request(
            Headers::from([("content-type", "text/plain"), ("X-Store", "7")]),
            None,
        )
        .await
        .unwrap();

    assert_eq!(request.headers().get("Content-Type"), Some("text/plain"));
    assert_eq!(request.headers().get("x-store"), Some("7"));
    assert_eq!(request.headers().len(), 2);
}

#[test]
fn test_get_request_headers_overlay() {
    let api = api(StubTransport::default());
    let cases = vec![
        Headers::new(),
        Headers::from([("x-api-key", "override")]),
        Headers::from([("User-Agent", "custom/2.0"), ("Accept", "application/json")]),
        Headers::from([("CONTENT-TYPE", "text/csv"), ("x-api-key", "k"), ("X-Trace", "abc")]),
    ];

    for headers in cases {
        let request = api.create_http_get_request("/orders", headers.clone(), None);

        for (name, value) in headers.iter() {
            assert_eq!(request.headers().get(name), Some(value), "header {}", name);
        }
        for default in ["Content-Type", "User-Agent", "x-api-key"] {
            assert!(request.headers().contains(default));
        }
    }
}

#[test]
fn test_get_request_defaults() {
    let api = api(StubTransport::default());

    let request = api.create_http_get_request("/orders/1", Headers::new(), None);

    assert_eq!(request.method(), &Method::GET);
    assert_eq!(request.uri(), "https://api.example.com/orders/1");
    assert_eq!(request.headers().get("Content-Type"), Some("application/json"));
    assert_eq!(request.headers().get("User-Agent"), Some("connector-tests/1.0"));
    assert_eq!(request.headers().get("x-api-key"), Some("key-123"));
}

#[test]
fn test_patch_request_uri() {
    let api = api(StubTransport::default());

    let request = api.create_http_patch_request("/orders/1", Headers::new(), None);

    assert_eq!(request.method(), &Method::PATCH);
    assert_eq!(request.uri(), "https://api.example.com/orders/1");
}

#[test]
fn test_trailing_slashes_stripped() {
    let config = Configuration {
        service_url: "https://api.example.com///".to_string(),
        ..Default::default()
    };
    let api = V1Api::new(StubTransport::default(), config);

    let request = api.create_http_get_request("/status", Headers::new(), None);
    assert_eq!(request.uri(), "https://api.example.com/status");
}

#[test]
fn test_client_options_without_debug() {
    let api = api(StubTransport::default());

    let options = api.create_http_client_options().unwrap();
    assert!(options.is_empty());
}

#[test]
fn test_client_options_blank_debug_file() {
    for debug_file in ["", "   "] {
        let config = Configuration {
            debug: true,
            debug_file: debug_file.to_string(),
            ..Default::default()
        };
        let api = V1Api::new(StubTransport::default(), config);

        let result = api.create_http_client_options();
        assert!(matches!(result, Err(ApiError::Configuration(_))));
    }
}

#[test]
fn test_client_options_opens_debug_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wire.log");
    let config = Configuration {
        debug: true,
        debug_file: path.to_str().unwrap().to_string(),
        ..Default::default()
    };
    let api = V1Api::new(StubTransport::default(), config);

    let options = api.create_http_client_options().unwrap();

    assert!(!options.is_empty());
    assert_eq!(options.debug_sink().map(|s| s.path()), path.to_str());
    assert!(path.exists());
}

#[test]
fn test_client_options_unopenable_debug_file() {
    let config = Configuration {
        debug: true,
        debug_file: "/var/log/connector.log".to_string(),
        ..Default::default()
    };
    let api = V1Api::new(StubTransport::default(), config).with_file_opener(Arc::new(FailingOpener));

    match api.create_http_client_options() {
        Err(ApiError::Configuration(msg)) => {
            assert!(msg.contains("/var/log/connector.log"));
            assert!(msg.contains("permission denied"));
        }
        other => panic!("Expected configuration error, got {:?}", other.map(|o| o.keys())),
    }
}

#[tokio::test]
async fn test_debug_sink_reaches_transport() {
    let dir = tempfile::tempdir().unwrap();
    let config = Configuration {
        debug: true,
        debug_file: dir.path().join("wire.log").to_str().unwrap().to_string(),
        ..test_config()
    };
    let api = V1Api::new(StubTransport::responding(StatusCode::OK, "{}"), config);

    let request = api.create_http_get_request("/orders", Headers::new(), None);
    let options = api.create_http_client_options().unwrap();
    let _: ApiResponse<OrderPayload> = api
        .send_request_and_handle_response(request, options, &api.serializer_context())
        .await
        .unwrap();

    assert_eq!(*api.transport().debug_sinks.lock().unwrap(), vec![true]);
}

#[tokio::test]
async fn test_transport_failure_carries_request() {
    let api = api(StubTransport::failing("Connection refused", 7));
    let request = api.create_http_get_request("/orders/1", Headers::new(), None);

    let result: Result<ApiResponse<OrderPayload>, ApiError> = api
        .send_request_and_handle_response(request.clone(), TransportOptions::new(), &api.serializer_context())
        .await;

    match result {
        Err(ApiError::Transport { request: failed, message, code, source }) => {
            assert_eq!(*failed, request);
            assert_eq!(message, "Connection refused");
            assert_eq!(code, 7);
            assert!(source.is_some());
        }
        other => panic!("Expected transport error, got {:?}", other.map(|r| r.payload)),
    }
}

#[tokio::test]
async fn test_token_payload_decoded() {
    let api = api(StubTransport::responding(StatusCode::OK, r#"{"access_token":"abc"}"#));
    let request = api.create_http_get_request("/token", Headers::new(), None);

    let response: ApiResponse<TokenizationResponse> = api
        .send_request_and_handle_response(request.clone(), TransportOptions::new(), &api.serializer_context())
        .await
        .unwrap();

    assert_eq!(response.access_token.as_deref(), Some("abc"));
    assert!(response.token_type.is_none());
    assert_eq!(response.status(), Some(true));
    assert_eq!(response.message(), Some(SUCCESS_MESSAGE));
    assert_eq!(response.http_request(), Some(&request));

    let http_response = response.http_response().unwrap();
    assert_eq!(http_response.status(), StatusCode::OK);
    assert_eq!(http_response.body().position(), 0);
    assert_eq!(http_response.body().clone().get_contents(), r#"{"access_token":"abc"}"#);
}

#[tokio::test]
async fn test_empty_body_yields_default_payload() {
    let api = api(StubTransport::responding(StatusCode::NO_CONTENT, ""));
    let request = api.create_http_get_request("/orders/1", Headers::new(), None);

    let response: ApiResponse<TokenizationResponse> = api
        .send_request_and_handle_response(request, TransportOptions::new(), &api.serializer_context())
        .await
        .unwrap();

    assert_eq!(response.payload, TokenizationResponse::default());
    assert_eq!(response.status(), Some(true));
    assert_eq!(response.message(), Some(SUCCESS_MESSAGE));
}

#[tokio::test]
async fn test_undecodable_bodies_yield_default_payload() {
    let bodies = [
        "not json at all",
        "[1, 2, 3]",
        "\"just a string\"",
        "42",
        r#"{"id": 5}"#,
        r#"{"quantity": 3}"#,
    ];

    for body in bodies {
        let api = api(StubTransport::responding(StatusCode::OK, body));
        let request = api.create_http_get_request("/items/1", Headers::new(), None);

        let response: ApiResponse<StrictPayload> = api
            .send_request_and_handle_response(request, TransportOptions::new(), &api.serializer_context())
            .await
            .unwrap();

        assert_eq!(response.payload, StrictPayload::default(), "body {}", body);
        assert_eq!(response.status(), Some(true));
    }
}

#[tokio::test]
async fn test_array_body_does_not_fill_struct_payload() {
    for body in [r#"["Bearer","3599"]"#, r#"[["Bearer"]]"#, "[]"] {
        let api = api(StubTransport::responding(StatusCode::OK, body));
        let request = api.create_http_get_request("/token", Headers::new(), None);

        let response: ApiResponse<TokenizationResponse> = api
            .send_request_and_handle_response(request, TransportOptions::new(), &api.serializer_context())
            .await
            .unwrap();

        assert_eq!(response.payload, TokenizationResponse::default(), "body {}", body);
        assert_eq!(response.status(), Some(true));
        assert_eq!(response.message(), Some(SUCCESS_MESSAGE));
    }
}

#[tokio::test]
async fn test_array_body_decodes_into_sequence_payload() {
    let api = api(StubTransport::responding(
        StatusCode::OK,
        r#"[{"id":"1","headers":{"x":"y"}},{"id":"2","status":"paid"}]"#,
    ));
    let request = api.create_http_get_request("/orders", Headers::new(), None);

    let response: ApiResponse<Vec<OrderPayload>> = api
        .send_request_and_handle_response(request, TransportOptions::new(), &api.serializer_context())
        .await
        .unwrap();

    assert_eq!(response.len(), 2);
    assert_eq!(response[0].id.as_deref(), Some("1"));
    assert!(response[0].headers.is_empty());
    assert_eq!(response[1].status.as_deref(), Some("paid"));
}

#[tokio::test]
async fn test_error_status_is_not_an_error() {
    let api = api(StubTransport::responding(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"id":"1","message":"Internal failure"}"#,
    ));
    let request = api.create_http_patch_request("/orders/1", Headers::new(), Some("{}".into()));

    let response: ApiResponse<OrderPayload> = api
        .send_request_and_handle_response(request, TransportOptions::new(), &api.serializer_context())
        .await
        .unwrap();

    assert_eq!(response.http_response().unwrap().status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.status(), Some(true));
    assert_eq!(response.id.as_deref(), Some("1"));
}

#[tokio::test]
async fn test_envelope_fields_override_payload_names() {
    let api = api(StubTransport::responding(
        StatusCode::OK,
        r#"{"id":"9","status":"pending","message":"queued","headers":{"x":"y"},"unknown":[1]}"#,
    ));
    let request = api.create_http_get_request("/orders/9", Headers::new(), None);

    let response: ApiResponse<OrderPayload> = api
        .send_request_and_handle_response(request, TransportOptions::new(), &api.serializer_context())
        .await
        .unwrap();

    assert_eq!(response.message(), Some(SUCCESS_MESSAGE));
    assert_eq!(response.status(), Some(true));
    assert_eq!(response.payload.message.as_deref(), Some("queued"));
    assert_eq!(response.payload.status.as_deref(), Some("pending"));
    // Ignored by the default context
    assert!(response.payload.headers.is_empty());
}

#[tokio::test]
async fn test_empty_context_populates_headers_field() {
    let api = api(StubTransport::responding(StatusCode::OK, r#"{"headers":{"x":"y"}}"#));
    let request = api.create_http_get_request("/orders/9", Headers::new(), None);

    let response: ApiResponse<OrderPayload> = api
        .send_request_and_handle_response(request, TransportOptions::new(), &SerializerContext::new())
        .await
        .unwrap();

    assert_eq!(response.payload.headers.get("x").map(String::as_str), Some("y"));
}

#[tokio::test]
async fn test_repeated_calls_are_equal() {
    let api = api(StubTransport::responding(StatusCode::OK, r#"{"id":"1","status":"paid"}"#));

    let mut responses = Vec::new();
    for _ in 0..2 {
        let request = api.create_http_get_request("/orders/1", Headers::new(), None);
        let response: ApiResponse<OrderPayload> = api
            .send_request_and_handle_response(request, TransportOptions::new(), &api.serializer_context())
            .await
            .unwrap();
        responses.push(response);
    }

    assert_eq!(responses[0].payload, responses[1].payload);
    assert_eq!(responses[0].status(), responses[1].status());
    assert_eq!(responses[0].message(), responses[1].message());
    assert_eq!(responses[0], responses[1]);
}

#[tokio::test]
async fn test_traffic_logging() {
    let logger = Arc::new(RecordingLogger::default());
    let api = api(StubTransport::responding(StatusCode::OK, r#"{"id":"1"}"#)).with_logger(logger.clone());

    let request = api.create_http_patch_request("/orders/1", Headers::new(), Some("{\"state\":\"shipped\"}".into()));
    let _: ApiResponse<OrderPayload> = api
        .send_request_and_handle_response(request, TransportOptions::new(), &api.serializer_context())
        .await
        .unwrap();

    let messages = logger.messages();
    assert_eq!(messages.len(), 6);
    assert_eq!(messages[0], "Path: https://api.example.com/orders/1");
    assert_eq!(messages[1], "Request: {\"state\":\"shipped\"}");
    assert!(messages[2].starts_with("Start Time: "));
    assert_eq!(messages[2].len(), "Start Time: 2024-01-01 00:00:00".len());
    assert!(messages[3].starts_with("End Time: "));
    assert!(messages[4].starts_with("Time Difference: "));
    assert!(messages[4]["Time Difference: ".len()..].parse::<i64>().unwrap() >= 0);
    assert_eq!(messages[5], "Response: {\"id\":\"1\"}");
}

#[tokio::test]
async fn test_no_logging_on_transport_failure_after_start() {
    let logger = Arc::new(RecordingLogger::default());
    let api = api(StubTransport::failing("timed out", 0)).with_logger(logger.clone());
    let request = api.create_http_get_request("/orders/1", Headers::new(), None);

    let result: Result<ApiResponse<OrderPayload>, ApiError> = api
        .send_request_and_handle_response(request, TransportOptions::new(), &api.serializer_context())
        .await;

    assert!(result.is_err());
    let messages = logger.messages();
    assert_eq!(messages.len(), 3);
    assert!(messages[2].starts_with("Start Time: "));
}

#[test]
fn test_serializer_context() {
    let api = api(StubTransport::default());
    assert_eq!(api.serializer_context(), SerializerContext::ignoring(["headers"]));
}

#[test]
fn test_serialize_body_skips_headers() {
    let api = api(StubTransport::default());
    let payload = OrderPayload {
        id: Some("3".to_string()),
        headers: HashMap::from([("x".to_string(), "y".to_string())]),
        ..Default::default()
    };

    let body = api.serialize_body(&payload).unwrap();
    let value: serde_json::Value = serde_json::from_str(&body.to_string()).unwrap();

    assert_eq!(value["id"], "3");
    assert!(value.get("headers").is_none());
}

fn bearer_config() -> Configuration {
    Configuration {
        auth_mode: AuthMode::BearerToken,
        auth_token_url: Some("https://login.example.com/oauth2/token".to_string()),
        grant_type: Some("client_credentials".to_string()),
        client_id: Some("client-1".to_string()),
        client_secret: Some("s3cret".to_string()),
        ..test_config()
    }
}

#[tokio::test]
async fn test_bearer_token_attached_to_post() {
    let transport = StubTransport::default().with_token(r#"{"token_type":"Bearer","expires_in":3599,"access_token":"tok-1"}"#);
    let api = V1Api::new(transport, bearer_config());

    let request = api.create_http_post_request(Headers::new(), None).await.unwrap();

    assert_eq!(request.headers().get("Authorization"), Some("Bearer tok-1"));

    let token_requests = api.transport().token_requests.lock().unwrap();
    assert_eq!(token_requests.len(), 1);
    let (method, url, form) = &token_requests[0];
    assert_eq!(method, &Method::POST);
    assert_eq!(url, "https://login.example.com/oauth2/token");
    assert_eq!(
        form,
        &vec![
            ("grant_type".to_string(), "client_credentials".to_string()),
            ("client_id".to_string(), "client-1".to_string()),
            ("client_secret".to_string(), "s3cret".to_string()),
            ("resource".to_string(), "https://api.example.com/".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_bearer_caller_authorization_wins() {
    let transport = StubTransport::default().with_token(r#"{"access_token":"tok-1"}"#);
    let api = V1Api::new(transport, bearer_config());

    let request = api
        .create_http_post_request(Headers::from([("authorization", "Bearer caller")]), None)
        .await
        .unwrap();

    assert_eq!(request.headers().get("Authorization"), Some("Bearer caller"));
    assert!(api.transport().token_requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_bearer_caller_authorization_skips_unreachable_token_endpoint() {
    let transport = StubTransport {
        token_failure: true,
        ..Default::default()
    };
    let config = Configuration {
        auth_token_url: None,
        ..bearer_config()
    };
    let api = V1Api::new(transport, config);

    let request = api
        .create_http_post_request(Headers::from([("Authorization", "Basic dXNlcjpwYXNz")]), None)
        .await
        .unwrap();

    assert_eq!(request.headers().get("authorization"), Some("Basic dXNlcjpwYXNz"));
    assert!(api.transport().token_requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_bearer_without_token_url() {
    let config = Configuration {
        auth_token_url: None,
        ..bearer_config()
    };
    let api = V1Api::new(StubTransport::default(), config);

    let result = api.create_http_post_request(Headers::new(), None).await;
    assert!(matches!(result, Err(ApiError::Configuration(_))));
}

#[tokio::test]
async fn test_bearer_token_missing_access_token() {
    for token_body in ["", "{}", "not json"] {
        let api = V1Api::new(StubTransport::default().with_token(token_body), bearer_config());

        let result = api.create_http_post_request(Headers::new(), None).await;
        assert!(matches!(result, Err(ApiError::Authentication(_))), "token body {:?}", token_body);
    }
}

#[tokio::test]
async fn test_bearer_token_transport_failure_untranslated() {
    let transport = StubTransport {
        token_failure: true,
        ..Default::default()
    };
    let api = V1Api::new(transport, bearer_config());

    let result = api.create_http_post_request(Headers::new(), None).await;
    match result {
        Err(ApiError::HttpClient(failure)) => assert_eq!(failure.message(), "token endpoint unreachable"),
        other => panic!("Expected untranslated transport failure, got {:?}", other),
    }
}
