//! HTTP layer
//!
//! Request values, the request factory and the transport seam

pub mod factory;
pub mod request;
pub mod transport;

pub use factory::RequestFactory;
pub use request::{Headers, HttpRequest, RequestBody};
pub use transport::{
    DebugSink, ReqwestTransport, ResponseBody, Transport, TransportFailure, TransportOptions,
    TransportResponse, DEBUG_OPTION,
};
