//! Error types for Pulsewrap

use thiserror::Error;

/// Numeric codes carried by transport failures.
///
/// Values follow the libcurl numbering so callers that already switch on
/// those codes keep working.
pub mod codes {
    /// Protocol not supported by the transport
    pub const UNSUPPORTED_PROTOCOL: u32 = 1;
    /// Internal or otherwise unclassified failure
    pub const INTERNAL: u32 = 2;
    /// The URL could not be parsed
    pub const URL_MALFORMAT: u32 = 3;
    /// DNS lookup failed
    pub const COULDNT_RESOLVE_HOST: u32 = 6;
    /// TCP connect failed
    pub const COULDNT_CONNECT: u32 = 7;
    /// Timeout elapsed
    pub const OPERATION_TIMEDOUT: u32 = 28;
    /// TLS handshake failed
    pub const SSL_CONNECT_ERROR: u32 = 35;
    /// Redirect limit reached
    pub const TOO_MANY_REDIRECTS: u32 = 47;
    /// Connection dropped while reading the response
    pub const RECV_ERROR: u32 = 56;
}

/// Main error type for Pulsewrap
#[derive(Error, Debug)]
pub enum PulsewrapError {
    /// The transport could not complete the exchange
    #[error("{code} - {message}")]
    Transport {
        code: u32,
        message: String,
    },

    #[error("Unknown transport option: {0}")]
    UnknownOption(String),

    #[error("Invalid value for option {option}: {value}")]
    InvalidOptionValue {
        option: String,
        value: String,
    },

    #[error("Invalid HTTP method: {0:?}")]
    InvalidMethod(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Encoding error: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Cookie error: {0}")]
    Cookie(String),
}

impl PulsewrapError {
    /// Transport code when this is a transport failure
    pub fn transport_code(&self) -> Option<u32> {
        match self {
            PulsewrapError::Transport { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PulsewrapError>;
