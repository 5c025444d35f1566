//! Pulsewrap library interface
//!
//! A small blocking HTTP client: verb methods over a pluggable transport,
//! client-wide defaults (user agent, cookie file, redirects, referrer,
//! headers, transport options) and a parser that turns a raw transfer into
//! a structured [`Response`].
//!
//! # Module Organization
//!
//! - [`client`] - `Client`, the `Transport` seam and the reqwest transport
//! - [`request`] - `RequestConfig` builder, params, typed transport options
//! - [`response`] - raw response parsing
//! - [`config`] - `ClientState` and its TOML loader
//! - [`errors`] - Error types (PulsewrapError, Result)
//! - [`core`] - CLI execution logic

pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod errors;
pub mod http;
pub mod request;
pub mod response;
pub mod status;

pub use client::{Client, RawResponse, ReqwestTransport, Transport, TransportFailure};
pub use config::ClientState;
pub use errors::{PulsewrapError, Result};
pub use http::Method;
pub use request::{OptionKey, OptionValue, Params, RequestConfig, TransportOption, TransportOptions};
pub use response::Response;
