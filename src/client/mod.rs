//! HTTP client functionality

pub mod cookies;
pub mod http;
pub mod transport;
pub mod wrapper;

// Re-exports
pub use cookies::CookieJar;
pub use http::{ReqwestTransport, DEFAULT_MAX_REDIRECTS};
pub use transport::{RawResponse, Transport, TransportFailure};
pub use wrapper::Client;
