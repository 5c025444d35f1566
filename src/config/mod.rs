//! Client configuration
//!
//! [`ClientState`] holds what a client carries between requests and can be
//! loaded from a TOML file.

mod config;

pub use config::{ClientState, DEFAULT_USER_AGENT};
