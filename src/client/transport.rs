//! Transport seam
//!
//! A transport executes a fully built [`RequestConfig`] and returns the raw
//! transfer. The client never looks past this trait, so tests and embedders
//! can plug in their own.

use std::fmt;

use crate::errors::PulsewrapError;
use crate::request::RequestConfig;

/// Raw bytes of a completed transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// Header block followed by the body
    pub bytes: Vec<u8>,
    /// Size of the header block, when the transport knows it
    pub header_size: Option<usize>,
}

impl RawResponse {
    pub fn new(bytes: impl Into<Vec<u8>>, header_size: Option<usize>) -> Self {
        Self {
            bytes: bytes.into(),
            header_size,
        }
    }
}

/// A transfer that did not complete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub code: u32,
    pub message: String,
}

impl TransportFailure {
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.code, self.message)
    }
}

impl std::error::Error for TransportFailure {}

impl From<TransportFailure> for PulsewrapError {
    fn from(failure: TransportFailure) -> Self {
        PulsewrapError::Transport {
            code: failure.code,
            message: failure.message,
        }
    }
}

/// Executes one request to completion.
///
/// Implementations acquire whatever handle they need per call and release
/// it before returning, on success and on failure.
pub trait Transport {
    fn execute(&mut self, config: &RequestConfig) -> Result<RawResponse, TransportFailure>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&mut self, config: &RequestConfig) -> Result<RawResponse, TransportFailure> {
        (**self).execute(config)
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn execute(&mut self, config: &RequestConfig) -> Result<RawResponse, TransportFailure> {
        (**self).execute(config)
    }
}
