//! Default transport over reqwest
//!
//! Executes a [`RequestConfig`] with a blocking reqwest client built for that
//! one request and hands the transfer back as raw bytes, header block first,
//! the way a libcurl handle with header inclusion on would.

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE, REFERER};
use reqwest::redirect::Policy;
use reqwest::{Method, Version};
use std::error::Error as StdError;
use std::io::{ErrorKind, Write};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use crate::errors::codes;
use crate::request::{RequestConfig, TransportOptions};
use super::cookies::CookieJar;
use super::transport::{RawResponse, Transport, TransportFailure};

/// Redirect limit when following without `MAXREDIRS`
pub const DEFAULT_MAX_REDIRECTS: u32 = 20;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Transport backed by `reqwest::blocking`
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestTransport;

impl ReqwestTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for ReqwestTransport {
    fn execute(&mut self, config: &RequestConfig) -> Result<RawResponse, TransportFailure> {
        let options = &config.options;

        let url = Url::parse(&config.url).map_err(|e| {
            TransportFailure::new(codes::URL_MALFORMAT, format!("URL rejected: {}: {}", config.url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(TransportFailure::new(
                codes::UNSUPPORTED_PROTOCOL,
                format!("Protocol \"{}\" not supported", url.scheme()),
            ));
        }

        let jar = open_cookie_jar(options)?;
        // Client and jar are dropped when this call returns, on every path
        let client = build_client(options, jar.clone())?;
        let method = effective_method(options)?;

        if options.verbose() {
            info!(method = %method, url = %url, "Sending request");
        }

        let host = url.host_str().unwrap_or_default().to_string();
        let mut request = client.request(method, url);

        let mut has_content_type = false;
        for line in &config.headers {
            let Some((name, value)) = parse_header_line(line)? else {
                debug!(line = %line, "Skipping header line without a colon");
                continue;
            };
            has_content_type |= name == CONTENT_TYPE;
            request = request.header(name, value);
        }
        if let Some(referer) = options.referer() {
            request = request.header(REFERER, referer);
        }
        if let Some(body) = options.post_fields() {
            if !has_content_type {
                request = request.header(CONTENT_TYPE, FORM_CONTENT_TYPE);
            }
            request = request.body(body.to_string());
        }

        let response = request.send().map_err(|e| classify(e, &host))?;
        let raw = into_raw(response, options, &host)?;

        if let (Some(jar), Some(path)) = (&jar, options.cookie_jar()) {
            if let Err(e) = jar.save(path) {
                warn!(path = %path.display(), error = %e, "Failed to write cookie jar");
            }
        }

        Ok(raw)
    }
}

fn open_cookie_jar(options: &TransportOptions) -> Result<Option<Arc<CookieJar>>, TransportFailure> {
    let jar = match (options.cookie_file(), options.cookie_jar()) {
        (Some(path), _) => CookieJar::load(path)
            .map_err(|e| TransportFailure::new(codes::INTERNAL, e.to_string()))?,
        (None, Some(_)) => CookieJar::default(),
        (None, None) => return Ok(None),
    };
    Ok(Some(Arc::new(jar)))
}

fn build_client(options: &TransportOptions, jar: Option<Arc<CookieJar>>) -> Result<Client, TransportFailure> {
    let mut builder = Client::builder()
        // Referer is sent only when configured
        .referer(false)
        // No timeout unless one is configured
        .timeout(options.timeout());

    if let Some(user_agent) = options.user_agent() {
        builder = builder.user_agent(user_agent);
    }

    builder = if options.follow_location() {
        let limit = options.max_redirs().unwrap_or(DEFAULT_MAX_REDIRECTS);
        builder.redirect(Policy::limited(limit as usize))
    } else {
        builder.redirect(Policy::none())
    };

    if let Some(timeout) = options.connect_timeout() {
        builder = builder.connect_timeout(timeout);
    }
    if !options.ssl_verify_peer() {
        builder = builder.danger_accept_invalid_certs(true);
    }
    if let Some(jar) = jar {
        builder = builder.cookie_provider(jar);
    }

    builder
        .build()
        .map_err(|e| TransportFailure::new(codes::INTERNAL, format!("Failed to create client: {}", e)))
}

/// Method actually sent: explicit override first, then the convenience flags
pub fn effective_method(options: &TransportOptions) -> Result<Method, TransportFailure> {
    if let Some(custom) = options.custom_request() {
        return Method::from_bytes(custom.as_bytes())
            .map_err(|_| TransportFailure::new(codes::INTERNAL, format!("Invalid method: {}", custom)));
    }
    Ok(if options.no_body() {
        Method::HEAD
    } else if options.post() {
        Method::POST
    } else if options.http_get() {
        Method::GET
    } else if options.post_fields().is_some() {
        Method::POST
    } else {
        Method::GET
    })
}

/// Serialize status line, headers and body back into one blob
fn into_raw(response: Response, options: &TransportOptions, host: &str) -> Result<RawResponse, TransportFailure> {
    let status = response.status();
    let version = match response.version() {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    };

    let mut head = format!("HTTP/{} {}", version, status.as_u16());
    if let Some(reason) = status.canonical_reason() {
        head.push(' ');
        head.push_str(reason);
    }
    head.push_str("\r\n");
    for (name, value) in response.headers() {
        head.push_str(name.as_str());
        head.push_str(": ");
        head.push_str(&String::from_utf8_lossy(value.as_bytes()));
        head.push_str("\r\n");
    }
    head.push_str("\r\n");

    let body = response.bytes().map_err(|e| classify(e, host))?;

    debug!(status = status.as_u16(), body_len = body.len(), "Transfer complete");

    if !options.return_transfer() {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(&body)
            .and_then(|_| stdout.flush())
            .map_err(|e| TransportFailure::new(codes::INTERNAL, format!("Failed writing body: {}", e)))?;
        return Ok(RawResponse::new(head.into_bytes(), None));
    }

    if !options.include_header() {
        return Ok(RawResponse::new(body.to_vec(), Some(0)));
    }

    let header_size = head.len();
    let mut bytes = head.into_bytes();
    bytes.extend_from_slice(&body);
    Ok(RawResponse::new(bytes, Some(header_size)))
}

/// Split a `Name: Value` line into a validated header pair.
///
/// Lines without a colon give `None`; an invalid name or value is an error.
fn parse_header_line(line: &str) -> Result<Option<(HeaderName, HeaderValue)>, TransportFailure> {
    let Some((name, value)) = line.split_once(':') else {
        return Ok(None);
    };
    let invalid = || TransportFailure::new(codes::INTERNAL, format!("Invalid header line: {:?}", line));
    let name = HeaderName::from_bytes(name.trim().as_bytes()).map_err(|_| invalid())?;
    let value = HeaderValue::from_str(value.trim()).map_err(|_| invalid())?;
    Ok(Some((name, value)))
}

/// Map a reqwest error to a numeric code and message.
///
/// Matching looks only at the source chain, never at the request URL.
pub(crate) fn classify(err: reqwest::Error, host: &str) -> TransportFailure {
    let err = err.without_url();
    let detail = error_chain(&err);
    let causes = source_chain(&err).to_ascii_lowercase();

    if err.is_timeout() || io_kind(&err) == Some(ErrorKind::TimedOut) {
        return TransportFailure::new(codes::OPERATION_TIMEDOUT, format!("Operation timed out: {}", detail));
    }
    if err.is_redirect() {
        return TransportFailure::new(codes::TOO_MANY_REDIRECTS, format!("Maximum redirects followed: {}", detail));
    }
    if causes.contains("dns error")
        || causes.contains("failed to lookup address")
        || causes.contains("name or service not known")
        || causes.contains("no such host")
    {
        return TransportFailure::new(codes::COULDNT_RESOLVE_HOST, format!("Could not resolve host: {}", host));
    }
    if matches!(
        io_kind(&err),
        Some(ErrorKind::ConnectionRefused | ErrorKind::AddrNotAvailable | ErrorKind::HostUnreachable | ErrorKind::NetworkUnreachable)
    ) {
        return TransportFailure::new(codes::COULDNT_CONNECT, format!("Failed to connect to {}: {}", host, detail));
    }
    if causes.contains("certificate") || causes.contains("tls") || causes.contains("ssl") {
        return TransportFailure::new(codes::SSL_CONNECT_ERROR, format!("TLS connect error: {}", detail));
    }
    if err.is_connect() {
        return TransportFailure::new(codes::COULDNT_CONNECT, format!("Failed to connect to {}: {}", host, detail));
    }
    if err.is_body() || err.is_decode() {
        return TransportFailure::new(codes::RECV_ERROR, format!("Failure when receiving data: {}", detail));
    }
    TransportFailure::new(codes::INTERNAL, detail)
}

/// Error message with every source joined
fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Messages of the underlying causes only
fn source_chain(err: &reqwest::Error) -> String {
    let mut causes = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }
    causes.join(": ")
}

/// Kind of the first I/O error in the source chain
fn io_kind(err: &reqwest::Error) -> Option<ErrorKind> {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            return Some(io.kind());
        }
        source = cause.source();
    }
    None
}
