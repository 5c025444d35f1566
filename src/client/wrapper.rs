//! Verb-level client
//!
//! [`Client`] owns the [`ClientState`] and a [`Transport`]. Each call builds a
//! fresh [`RequestConfig`], runs it, and parses the raw transfer. Calls are
//! blocking and take `&mut self`, so a client serves one request at a time;
//! use one client per thread.

use tracing::warn;

use crate::config::ClientState;
use crate::errors::{PulsewrapError, Result};
use crate::http::Method;
use crate::request::{Params, RequestConfig};
use crate::response::Response;
use super::http::ReqwestTransport;
use super::transport::Transport;

/// HTTP client with verb helpers and a last-error slot
#[derive(Debug)]
pub struct Client<T: Transport = ReqwestTransport> {
    state: ClientState,
    transport: T,
    last_error: String,
}

impl Client<ReqwestTransport> {
    /// Client over the default reqwest transport
    pub fn new(state: ClientState) -> Self {
        Self::with_transport(state, ReqwestTransport::new())
    }
}

impl Default for Client<ReqwestTransport> {
    fn default() -> Self {
        Self::new(ClientState::default())
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(state: ClientState, transport: T) -> Self {
        Self {
            state,
            transport,
            last_error: String::new(),
        }
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    /// Change configuration between requests
    pub fn state_mut(&mut self) -> &mut ClientState {
        &mut self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Description of the last failure; empty after a successful request
    pub fn last_error(&self) -> &str {
        &self.last_error
    }

    /// GET; params are appended to the query string
    pub fn get(&mut self, url: &str, params: impl Into<Params>) -> Result<Response> {
        self.request(Method::Get, url, params, &[])
    }

    /// POST; params become a form-urlencoded body
    pub fn post(&mut self, url: &str, params: impl Into<Params>, headers: &[&str]) -> Result<Response> {
        self.request(Method::Post, url, params, headers)
    }

    pub fn put(&mut self, url: &str, params: impl Into<Params>) -> Result<Response> {
        self.request(Method::Put, url, params, &[])
    }

    pub fn delete(&mut self, url: &str, params: impl Into<Params>) -> Result<Response> {
        self.request(Method::Delete, url, params, &[])
    }

    /// HEAD; params are appended to the query string
    pub fn head(&mut self, url: &str, params: impl Into<Params>) -> Result<Response> {
        self.request(Method::Head, url, params, &[])
    }

    /// Send any method. `headers` are `Name: Value` lines sent ahead of the
    /// client's default headers.
    pub fn request(
        &mut self,
        method: Method,
        url: &str,
        params: impl Into<Params>,
        headers: &[&str],
    ) -> Result<Response> {
        self.last_error.clear();

        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let result = RequestConfig::build(method, url, &params.into(), &headers, &self.state)
            .and_then(|config| {
                let raw = self.transport.execute(&config).map_err(|failure| {
                    warn!(code = failure.code, message = %failure.message, url = %config.url, "Transport failure");
                    PulsewrapError::from(failure)
                })?;
                Response::parse(&raw.bytes, raw.header_size)
            });

        if let Err(e) = &result {
            self.last_error = e.to_string();
        }
        result
    }
}
