//! Typed transport options
//!
//! Options arrive as loosely typed name/value pairs (config files, CLI flags)
//! and are validated into [`TransportOption`] values up front, so an unknown
//! name or a mistyped value fails when the client is configured rather than
//! when a request is sent.

use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::{PulsewrapError, Result};

/// Redundant prefix accepted in front of option names
const OPTION_PREFIX: &str = "CURLOPT_";

/// Identifies a transport option; one value per key is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionKey {
    Url,
    HttpGet,
    NoBody,
    Post,
    CustomRequest,
    PostFields,
    Header,
    ReturnTransfer,
    UserAgent,
    Referer,
    CookieFile,
    CookieJar,
    FollowLocation,
    MaxRedirs,
    Timeout,
    TimeoutMs,
    ConnectTimeout,
    HttpHeader,
    Verbose,
    SslVerifyPeer,
}

const ALL_KEYS: &[OptionKey] = &[
    OptionKey::Url,
    OptionKey::HttpGet,
    OptionKey::NoBody,
    OptionKey::Post,
    OptionKey::CustomRequest,
    OptionKey::PostFields,
    OptionKey::Header,
    OptionKey::ReturnTransfer,
    OptionKey::UserAgent,
    OptionKey::Referer,
    OptionKey::CookieFile,
    OptionKey::CookieJar,
    OptionKey::FollowLocation,
    OptionKey::MaxRedirs,
    OptionKey::Timeout,
    OptionKey::TimeoutMs,
    OptionKey::ConnectTimeout,
    OptionKey::HttpHeader,
    OptionKey::Verbose,
    OptionKey::SslVerifyPeer,
];

impl OptionKey {
    /// Canonical upper-case name, without prefix
    pub fn name(self) -> &'static str {
        match self {
            OptionKey::Url => "URL",
            OptionKey::HttpGet => "HTTPGET",
            OptionKey::NoBody => "NOBODY",
            OptionKey::Post => "POST",
            OptionKey::CustomRequest => "CUSTOMREQUEST",
            OptionKey::PostFields => "POSTFIELDS",
            OptionKey::Header => "HEADER",
            OptionKey::ReturnTransfer => "RETURNTRANSFER",
            OptionKey::UserAgent => "USERAGENT",
            OptionKey::Referer => "REFERER",
            OptionKey::CookieFile => "COOKIEFILE",
            OptionKey::CookieJar => "COOKIEJAR",
            OptionKey::FollowLocation => "FOLLOWLOCATION",
            OptionKey::MaxRedirs => "MAXREDIRS",
            OptionKey::Timeout => "TIMEOUT",
            OptionKey::TimeoutMs => "TIMEOUT_MS",
            OptionKey::ConnectTimeout => "CONNECTTIMEOUT",
            OptionKey::HttpHeader => "HTTPHEADER",
            OptionKey::Verbose => "VERBOSE",
            OptionKey::SslVerifyPeer => "SSL_VERIFYPEER",
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OptionKey {
    type Err = PulsewrapError;

    /// Case-insensitive; a leading `CURLOPT_` is ignored
    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        let bare = upper.strip_prefix(OPTION_PREFIX).unwrap_or(&upper);
        ALL_KEYS
            .iter()
            .copied()
            .find(|key| key.name() == bare)
            .ok_or_else(|| PulsewrapError::UnknownOption(s.to_string()))
    }
}

/// Untyped option value as found in config files or on the command line
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<String>),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Int(n) => write!(f, "{n}"),
            OptionValue::Text(s) => f.write_str(s),
            OptionValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Text(s.to_string())
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        OptionValue::Int(n)
    }
}

/// A validated transport option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportOption {
    Url(String),
    /// GET convenience flag
    HttpGet(bool),
    /// HEAD convenience flag
    NoBody(bool),
    /// POST convenience flag
    Post(bool),
    /// Explicit method string
    CustomRequest(String),
    PostFields(String),
    /// Return response headers in front of the body
    Header(bool),
    /// Hand the response back to the caller instead of writing it out
    ReturnTransfer(bool),
    UserAgent(String),
    Referer(String),
    /// Cookies are read from this file before the request
    CookieFile(PathBuf),
    /// Cookies are written to this file after the request
    CookieJar(PathBuf),
    FollowLocation(bool),
    MaxRedirs(u32),
    Timeout(Duration),
    TimeoutMs(Duration),
    ConnectTimeout(Duration),
    /// Raw `Name: Value` header lines
    HttpHeader(Vec<String>),
    Verbose(bool),
    SslVerifyPeer(bool),
}

impl TransportOption {
    pub fn key(&self) -> OptionKey {
        match self {
            TransportOption::Url(_) => OptionKey::Url,
            TransportOption::HttpGet(_) => OptionKey::HttpGet,
            TransportOption::NoBody(_) => OptionKey::NoBody,
            TransportOption::Post(_) => OptionKey::Post,
            TransportOption::CustomRequest(_) => OptionKey::CustomRequest,
            TransportOption::PostFields(_) => OptionKey::PostFields,
            TransportOption::Header(_) => OptionKey::Header,
            TransportOption::ReturnTransfer(_) => OptionKey::ReturnTransfer,
            TransportOption::UserAgent(_) => OptionKey::UserAgent,
            TransportOption::Referer(_) => OptionKey::Referer,
            TransportOption::CookieFile(_) => OptionKey::CookieFile,
            TransportOption::CookieJar(_) => OptionKey::CookieJar,
            TransportOption::FollowLocation(_) => OptionKey::FollowLocation,
            TransportOption::MaxRedirs(_) => OptionKey::MaxRedirs,
            TransportOption::Timeout(_) => OptionKey::Timeout,
            TransportOption::TimeoutMs(_) => OptionKey::TimeoutMs,
            TransportOption::ConnectTimeout(_) => OptionKey::ConnectTimeout,
            TransportOption::HttpHeader(_) => OptionKey::HttpHeader,
            TransportOption::Verbose(_) => OptionKey::Verbose,
            TransportOption::SslVerifyPeer(_) => OptionKey::SslVerifyPeer,
        }
    }

    /// Validate a name/value pair into a typed option
    pub fn parse(name: &str, value: OptionValue) -> Result<Self> {
        let key: OptionKey = name.parse()?;
        let invalid = || PulsewrapError::InvalidOptionValue {
            option: key.name().to_string(),
            value: value.to_string(),
        };

        let option = match key {
            OptionKey::Url => TransportOption::Url(as_text(&value).ok_or_else(invalid)?),
            OptionKey::HttpGet => TransportOption::HttpGet(as_bool(&value).ok_or_else(invalid)?),
            OptionKey::NoBody => TransportOption::NoBody(as_bool(&value).ok_or_else(invalid)?),
            OptionKey::Post => TransportOption::Post(as_bool(&value).ok_or_else(invalid)?),
            OptionKey::CustomRequest => {
                TransportOption::CustomRequest(as_text(&value).ok_or_else(invalid)?)
            }
            OptionKey::PostFields => TransportOption::PostFields(as_text(&value).ok_or_else(invalid)?),
            OptionKey::Header => TransportOption::Header(as_bool(&value).ok_or_else(invalid)?),
            OptionKey::ReturnTransfer => {
                TransportOption::ReturnTransfer(as_bool(&value).ok_or_else(invalid)?)
            }
            OptionKey::UserAgent => TransportOption::UserAgent(as_text(&value).ok_or_else(invalid)?),
            OptionKey::Referer => TransportOption::Referer(as_text(&value).ok_or_else(invalid)?),
            OptionKey::CookieFile => {
                TransportOption::CookieFile(as_text(&value).ok_or_else(invalid)?.into())
            }
            OptionKey::CookieJar => {
                TransportOption::CookieJar(as_text(&value).ok_or_else(invalid)?.into())
            }
            OptionKey::FollowLocation => {
                TransportOption::FollowLocation(as_bool(&value).ok_or_else(invalid)?)
            }
            OptionKey::MaxRedirs => {
                let n = as_uint(&value).ok_or_else(invalid)?;
                TransportOption::MaxRedirs(u32::try_from(n).map_err(|_| invalid())?)
            }
            OptionKey::Timeout => {
                TransportOption::Timeout(Duration::from_secs(as_uint(&value).ok_or_else(invalid)?))
            }
            OptionKey::TimeoutMs => {
                TransportOption::TimeoutMs(Duration::from_millis(as_uint(&value).ok_or_else(invalid)?))
            }
            OptionKey::ConnectTimeout => TransportOption::ConnectTimeout(Duration::from_secs(
                as_uint(&value).ok_or_else(invalid)?,
            )),
            OptionKey::HttpHeader => match &value {
                OptionValue::List(lines) => TransportOption::HttpHeader(lines.clone()),
                OptionValue::Text(line) => TransportOption::HttpHeader(vec![line.clone()]),
                _ => return Err(invalid()),
            },
            OptionKey::Verbose => TransportOption::Verbose(as_bool(&value).ok_or_else(invalid)?),
            OptionKey::SslVerifyPeer => {
                TransportOption::SslVerifyPeer(as_bool(&value).ok_or_else(invalid)?)
            }
        };
        Ok(option)
    }
}

fn as_bool(value: &OptionValue) -> Option<bool> {
    match value {
        OptionValue::Bool(b) => Some(*b),
        OptionValue::Int(n) => Some(*n != 0),
        OptionValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" | "" => Some(false),
            _ => None,
        },
        OptionValue::List(_) => None,
    }
}

fn as_uint(value: &OptionValue) -> Option<u64> {
    match value {
        OptionValue::Int(n) => u64::try_from(*n).ok(),
        OptionValue::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_text(value: &OptionValue) -> Option<String> {
    match value {
        OptionValue::Text(s) => Some(s.clone()),
        OptionValue::Int(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Ordered set of options where a later `set` replaces an earlier one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOptions {
    entries: IndexMap<OptionKey, TransportOption>,
}

impl TransportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option, replacing any previous value for the same key
    pub fn set(&mut self, option: TransportOption) -> &mut Self {
        self.entries.insert(option.key(), option);
        self
    }

    /// Parse and set an option from a name/value pair
    pub fn set_named(&mut self, name: &str, value: impl Into<OptionValue>) -> Result<&mut Self> {
        let option = TransportOption::parse(name, value.into())?;
        Ok(self.set(option))
    }

    /// Apply every option of `other` on top of this set
    pub fn merge(&mut self, other: &TransportOptions) {
        for option in other.iter() {
            self.set(option.clone());
        }
    }

    /// Remove and return an option, keeping the order of the rest
    pub fn remove(&mut self, key: OptionKey) -> Option<TransportOption> {
        self.entries.shift_remove(&key)
    }

    pub fn get(&self, key: OptionKey) -> Option<&TransportOption> {
        self.entries.get(&key)
    }

    pub fn contains(&self, key: OptionKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransportOption> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn flag(&self, key: OptionKey) -> bool {
        matches!(
            self.get(key),
            Some(TransportOption::HttpGet(true))
                | Some(TransportOption::NoBody(true))
                | Some(TransportOption::Post(true))
                | Some(TransportOption::Header(true))
                | Some(TransportOption::ReturnTransfer(true))
                | Some(TransportOption::FollowLocation(true))
                | Some(TransportOption::Verbose(true))
        )
    }

    pub fn url(&self) -> Option<&str> {
        match self.get(OptionKey::Url) {
            Some(TransportOption::Url(url)) => Some(url),
            _ => None,
        }
    }

    pub fn http_get(&self) -> bool {
        self.flag(OptionKey::HttpGet)
    }

    pub fn no_body(&self) -> bool {
        self.flag(OptionKey::NoBody)
    }

    pub fn post(&self) -> bool {
        self.flag(OptionKey::Post)
    }

    pub fn custom_request(&self) -> Option<&str> {
        match self.get(OptionKey::CustomRequest) {
            Some(TransportOption::CustomRequest(m)) => Some(m),
            _ => None,
        }
    }

    pub fn post_fields(&self) -> Option<&str> {
        match self.get(OptionKey::PostFields) {
            Some(TransportOption::PostFields(body)) => Some(body),
            _ => None,
        }
    }

    pub fn include_header(&self) -> bool {
        self.flag(OptionKey::Header)
    }

    pub fn return_transfer(&self) -> bool {
        self.flag(OptionKey::ReturnTransfer)
    }

    pub fn user_agent(&self) -> Option<&str> {
        match self.get(OptionKey::UserAgent) {
            Some(TransportOption::UserAgent(ua)) => Some(ua),
            _ => None,
        }
    }

    pub fn referer(&self) -> Option<&str> {
        match self.get(OptionKey::Referer) {
            Some(TransportOption::Referer(r)) => Some(r),
            _ => None,
        }
    }

    pub fn cookie_file(&self) -> Option<&PathBuf> {
        match self.get(OptionKey::CookieFile) {
            Some(TransportOption::CookieFile(p)) => Some(p),
            _ => None,
        }
    }

    pub fn cookie_jar(&self) -> Option<&PathBuf> {
        match self.get(OptionKey::CookieJar) {
            Some(TransportOption::CookieJar(p)) => Some(p),
            _ => None,
        }
    }

    pub fn follow_location(&self) -> bool {
        self.flag(OptionKey::FollowLocation)
    }

    pub fn max_redirs(&self) -> Option<u32> {
        match self.get(OptionKey::MaxRedirs) {
            Some(TransportOption::MaxRedirs(n)) => Some(*n),
            _ => None,
        }
    }

    /// Overall timeout; `TIMEOUT_MS` wins when both are set
    pub fn timeout(&self) -> Option<Duration> {
        match (self.get(OptionKey::TimeoutMs), self.get(OptionKey::Timeout)) {
            (Some(TransportOption::TimeoutMs(d)), _) => Some(*d),
            (_, Some(TransportOption::Timeout(d))) => Some(*d),
            _ => None,
        }
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        match self.get(OptionKey::ConnectTimeout) {
            Some(TransportOption::ConnectTimeout(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn verbose(&self) -> bool {
        self.flag(OptionKey::Verbose)
    }

    /// Peer verification, on unless explicitly disabled
    pub fn ssl_verify_peer(&self) -> bool {
        !matches!(self.get(OptionKey::SslVerifyPeer), Some(TransportOption::SslVerifyPeer(false)))
    }
}

impl FromIterator<TransportOption> for TransportOptions {
    fn from_iter<I: IntoIterator<Item = TransportOption>>(iter: I) -> Self {
        let mut options = TransportOptions::new();
        for option in iter {
            options.set(option);
        }
        options
    }
}
