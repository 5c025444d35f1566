//! Request configuration builder
//!
//! Turns a method, URL, parameters and headers plus the client state into the
//! full option set a transport executes.

use tracing::debug;

use crate::config::ClientState;
use crate::errors::Result;
use crate::http::{Dispatch, Method};
use super::options::{OptionKey, TransportOption, TransportOptions};
use super::params::{append_query, Params};

/// Configured request ready to be sent. Built fresh for every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestConfig {
    pub method: Method,
    /// Final URL, including any query built from params
    pub url: String,
    /// Encoded body; `None` means no body option was set at all
    pub body: Option<String>,
    /// `Name: Value` lines: per-call headers first, then client defaults
    pub headers: Vec<String>,
    pub options: TransportOptions,
}

impl RequestConfig {
    /// Build the configuration for one request.
    ///
    /// Custom options from `state.default_options` are applied after every
    /// built-in option and so replace same-keyed defaults.
    pub fn build(
        method: Method,
        url: &str,
        params: &Params,
        extra_headers: &[String],
        state: &ClientState,
    ) -> Result<Self> {
        let encoded = params.encode()?;

        let (url, body) = if method.params_in_query() {
            let url = match &encoded {
                Some(query) => append_query(url, query),
                None => url.to_string(),
            };
            (url, None)
        } else {
            (url.to_string(), encoded)
        };

        let mut options = TransportOptions::new();
        options.set(match method.dispatch() {
            Dispatch::HttpGet => TransportOption::HttpGet(true),
            Dispatch::NoBody => TransportOption::NoBody(true),
            Dispatch::Post => TransportOption::Post(true),
            Dispatch::Override(m) => TransportOption::CustomRequest(m),
        });
        options.set(TransportOption::Url(url));
        if let Some(body) = body {
            options.set(TransportOption::PostFields(body));
        }

        options.set(TransportOption::Header(true));
        options.set(TransportOption::ReturnTransfer(true));
        options.set(TransportOption::UserAgent(state.user_agent.clone()));
        if let Some(cookie_file) = &state.cookie_file {
            options.set(TransportOption::CookieFile(cookie_file.clone()));
            options.set(TransportOption::CookieJar(cookie_file.clone()));
        }
        if state.follow_redirects {
            options.set(TransportOption::FollowLocation(true));
        }
        if let Some(referrer) = &state.referrer {
            options.set(TransportOption::Referer(referrer.clone()));
        }

        options.merge(&state.default_options);

        // Header lines travel in `headers`; raw lines given as an option go last
        let mut headers: Vec<String> = extra_headers.to_vec();
        headers.extend(state.header_lines());
        if let Some(TransportOption::HttpHeader(lines)) = options.remove(OptionKey::HttpHeader) {
            headers.extend(lines);
        }

        let config = RequestConfig {
            method,
            url: options.url().unwrap_or_default().to_string(),
            body: options.post_fields().map(str::to_string),
            headers,
            options,
        };

        debug!(
            method = %config.method,
            url = %config.url,
            headers = config.headers.len(),
            has_body = config.body.is_some(),
            "Built request configuration"
        );

        Ok(config)
    }
}
