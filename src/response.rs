//! Raw response parsing
//!
//! A transport hands back the header block and the body as one blob, plus
//! (usually) the offset where the body starts. [`Response::parse`] splits the
//! blob there and turns the header block into a status and a header map.
//!
//! Repeated headers are all kept in arrival order. [`Response::header`]
//! returns the last one, [`Response::header_all`] returns every value.

use bytes::Bytes;
use indexmap::IndexMap;
use std::borrow::Cow;
use tracing::debug;

use crate::errors::{PulsewrapError, Result};

/// Parsed HTTP response. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    version: String,
    status: u16,
    reason: String,
    headers: IndexMap<String, Vec<String>>,
    body: Bytes,
}

impl Response {
    /// Parse a raw transfer.
    ///
    /// `boundary` is the header size reported by the transport. Without it
    /// the first blank line ends the headers, skipping over any interim
    /// responses (`100 Continue`, redirects) that precede the final one.
    pub fn parse(raw: &[u8], boundary: Option<usize>) -> Result<Self> {
        let (head, body) = match boundary {
            Some(offset) => raw.split_at(offset.min(raw.len())),
            None => split_at_blank_line(raw),
        };

        let head = String::from_utf8_lossy(head);
        let block = last_response_block(&head)
            .ok_or_else(|| PulsewrapError::MalformedResponse("missing status line".to_string()))?;

        let mut lines = block.into_iter();
        let status_line = lines.next().unwrap_or_default();
        let (version, status, reason) = parse_status_line(status_line)?;

        let mut headers: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut last_name: Option<String> = None;
        for line in lines {
            // obs-fold continuation
            if line.starts_with(' ') || line.starts_with('\t') {
                if let Some(value) = last_name
                    .as_ref()
                    .and_then(|name| headers.get_mut(name))
                    .and_then(|values| values.last_mut())
                {
                    value.push(' ');
                    value.push_str(line.trim());
                }
                continue;
            }
            if let Some((name, value)) = line.split_once(':') {
                let name = name.trim().to_ascii_lowercase();
                if name.is_empty() {
                    continue;
                }
                headers.entry(name.clone()).or_default().push(value.trim().to_string());
                last_name = Some(name);
            }
        }

        let response = Response {
            version,
            status,
            reason,
            headers,
            body: Bytes::copy_from_slice(body),
        };

        debug!(
            status = response.status,
            headers = response.headers.len(),
            body_len = response.body.len(),
            "Parsed response"
        );

        Ok(response)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Protocol version from the status line, e.g. `1.1` or `2`
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Reason phrase; may be empty
    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Last value of a header, looked up case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_all(name).last().map(String::as_str)
    }

    /// Every value of a header in arrival order
    pub fn header_all(&self, name: &str) -> &[String] {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Lower-cased header name to values
    pub fn headers(&self) -> &IndexMap<String, Vec<String>> {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body decoded as UTF-8, invalid sequences replaced
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn into_body(self) -> Bytes {
        self.body
    }
}

/// Split at the end of the header block when no boundary is known
fn split_at_blank_line(raw: &[u8]) -> (&[u8], &[u8]) {
    let mut end = match find_separator(raw) {
        Some(end) => end,
        None => return (raw, &[]),
    };

    // Only an interim block is followed by another header block; anything
    // after a final response is body, even when it starts with `HTTP/`
    let mut start = 0;
    while is_interim(&raw[start..end]) && raw[end..].starts_with(b"HTTP/") {
        match find_separator(&raw[end..]) {
            Some(next) => {
                start = end;
                end += next;
            }
            None => break,
        }
    }

    raw.split_at(end)
}

/// `1xx`, or a `3xx` carrying `Location` (a followed redirect hop)
fn is_interim(block: &[u8]) -> bool {
    let text = String::from_utf8_lossy(block);
    let mut lines = text.lines();
    let status = lines
        .next()
        .and_then(|line| line.split(' ').nth(1))
        .and_then(|code| code.parse::<u16>().ok());

    match status {
        Some(100..=199) => true,
        Some(300..=399) => lines.any(|line| {
            line.split_once(':')
                .is_some_and(|(name, _)| name.trim().eq_ignore_ascii_case("location"))
        }),
        _ => false,
    }
}

/// Offset just past the first blank line
fn find_separator(raw: &[u8]) -> Option<usize> {
    let crlf = find(raw, b"\r\n\r\n").map(|pos| pos + 4);
    let lf = find(raw, b"\n\n").map(|pos| pos + 2);
    match (crlf, lf) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Lines of the last header block that starts with a status line
fn last_response_block(head: &str) -> Option<Vec<&str>> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in head.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
        .into_iter()
        .rev()
        .find(|block| block.first().is_some_and(|line| line.starts_with("HTTP/")))
}

fn parse_status_line(line: &str) -> Result<(String, u16, String)> {
    let malformed = || PulsewrapError::MalformedResponse(format!("bad status line: {line:?}"));

    let mut parts = line.splitn(3, ' ');
    let version = parts
        .next()
        .and_then(|v| v.strip_prefix("HTTP/"))
        .ok_or_else(malformed)?
        .to_string();
    let status = parts
        .next()
        .filter(|code| code.len() == 3)
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(malformed)?;
    let reason = parts.next().unwrap_or_default().trim().to_string();

    Ok((version, status, reason))
}
