//! HTTP method type and dispatch

use std::fmt;
use std::str::FromStr;

use crate::errors::PulsewrapError;

/// HTTP GET method
pub const GET: &str = "GET";

/// HTTP POST method
pub const POST: &str = "POST";

/// HTTP PUT method
pub const PUT: &str = "PUT";

/// HTTP DELETE method
pub const DELETE: &str = "DELETE";

/// HTTP HEAD method
pub const HEAD: &str = "HEAD";

/// Request method
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    /// Any other token, spelled as given
    Custom(String),
}

/// How a method is handed to the transport.
///
/// Transports have dedicated paths for the three common verbs; every other
/// method travels as an explicit override string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// GET convenience flag
    HttpGet,
    /// HEAD convenience flag (no response body)
    NoBody,
    /// POST convenience flag
    Post,
    /// Explicit method string
    Override(String),
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => GET,
            Method::Head => HEAD,
            Method::Post => POST,
            Method::Put => PUT,
            Method::Delete => DELETE,
            Method::Custom(m) => m,
        }
    }

    /// Convenience flag or explicit override for this method
    pub fn dispatch(&self) -> Dispatch {
        match self {
            Method::Get => Dispatch::HttpGet,
            Method::Head => Dispatch::NoBody,
            Method::Post => Dispatch::Post,
            other => Dispatch::Override(other.as_str().to_string()),
        }
    }

    /// Whether request params belong in the query string rather than the body
    pub fn params_in_query(&self) -> bool {
        matches!(self, Method::Get | Method::Head)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = PulsewrapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // RFC 9110 token characters
        let is_token = !trimmed.is_empty()
            && trimmed.bytes().all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b));
        if !is_token {
            return Err(PulsewrapError::InvalidMethod(s.to_string()));
        }

        // Case is folded only to recognize the standard verbs; other
        // tokens are case-sensitive and kept as given
        let standard = [
            (GET, Method::Get),
            (HEAD, Method::Head),
            (POST, Method::Post),
            (PUT, Method::Put),
            (DELETE, Method::Delete),
        ];
        Ok(standard
            .into_iter()
            .find(|(name, _)| trimmed.eq_ignore_ascii_case(name))
            .map(|(_, method)| method)
            .unwrap_or_else(|| Method::Custom(trimmed.to_string())))
    }
}
