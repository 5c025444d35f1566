//! Client state and config file handling

use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::errors::{PulsewrapError, Result};
use crate::request::{OptionValue, TransportOption, TransportOptions};

/// User agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str = concat!("pulsewrap/", env!("CARGO_PKG_VERSION"));

/// Configuration held by a client between requests.
///
/// Read on every request; the caller may change it freely in between.
#[derive(Debug, Clone)]
pub struct ClientState {
    pub user_agent: String,
    /// File cookies are read from and written back to
    pub cookie_file: Option<PathBuf>,
    pub follow_redirects: bool,
    pub referrer: Option<String>,
    /// Transport options applied after the built-in defaults
    pub default_options: TransportOptions,
    /// Headers sent with every request, after per-call headers
    pub default_headers: IndexMap<String, String>,
}

impl Default for ClientState {
    fn default() -> Self {
        Self::new(DEFAULT_USER_AGENT)
    }
}

impl ClientState {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            cookie_file: None,
            follow_redirects: false,
            referrer: None,
            default_options: TransportOptions::new(),
            default_headers: IndexMap::new(),
        }
    }

    pub fn with_cookie_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookie_file = Some(path.into());
        self
    }

    pub fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }

    pub fn with_option(mut self, option: TransportOption) -> Self {
        self.default_options.set(option);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// Default headers as `Name: Value` lines
    pub fn header_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.default_headers
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value))
    }

    /// Load state from a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PulsewrapError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Parse state from TOML text; unknown option names are rejected
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| PulsewrapError::Config(format!("Invalid config TOML: {}", e)))?;

        let mut state = ClientState::new(
            file.client.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        );
        state.cookie_file = file.client.cookie_file;
        state.follow_redirects = file.client.follow_redirects;
        state.referrer = file.client.referrer;
        for (name, value) in file.options {
            state.default_options.set_named(&name, value)?;
        }
        state.default_headers = file.headers;
        Ok(state)
    }

    /// `<config dir>/pulsewrap/config.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("pulsewrap"))
            .unwrap_or_else(|| PathBuf::from(".pulsewrap"))
            .join("config.toml")
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    client: ClientSection,
    #[serde(default)]
    options: IndexMap<String, OptionValue>,
    #[serde(default)]
    headers: IndexMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct ClientSection {
    user_agent: Option<String>,
    cookie_file: Option<PathBuf>,
    #[serde(default)]
    follow_redirects: bool,
    referrer: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use crate::request::{OptionKey, Params, RequestConfig};
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let state = ClientState::default();
        assert!(state.user_agent.starts_with("pulsewrap/"));
        assert!(state.cookie_file.is_none());
        assert!(!state.follow_redirects);
        assert!(state.referrer.is_none());
        assert!(state.default_options.is_empty());
        assert!(state.default_headers.is_empty());
    }

    #[test]
    fn test_header_lines_keep_order() {
        let state = ClientState::default()
            .with_header("X-B", "2")
            .with_header("X-A", "1");
        let lines: Vec<String> = state.header_lines().collect();
        assert_eq!(lines, vec!["X-B: 2", "X-A: 1"]);
    }

    #[test]
    fn test_from_toml() {
        let state = ClientState::from_toml(
            r#"
            [client]
            user_agent = "custom/1.0"
            cookie_file = "/tmp/cookies.json"
            follow_redirects = true
            referrer = "https://ref.example"

            [options]
            timeout = 30
            CURLOPT_MAXREDIRS = "4"

            [headers]
            X-Api-Key = "secret"
            Accept = "application/json"
            "#,
        )
        .unwrap();

        assert_eq!(state.user_agent, "custom/1.0");
        assert_eq!(state.cookie_file, Some(PathBuf::from("/tmp/cookies.json")));
        assert!(state.follow_redirects);
        assert_eq!(state.referrer.as_deref(), Some("https://ref.example"));
        assert_eq!(state.default_options.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(state.default_options.max_redirs(), Some(4));
        assert_eq!(state.header_lines().collect::<Vec<_>>(), vec!["X-Api-Key: secret", "Accept: application/json"]);
    }

    #[test]
    fn test_from_toml_header_option_array() {
        let state = ClientState::from_toml(
            r#"
            [options]
            CURLOPT_HTTPHEADER = ["X-Raw-A: 1", "X-Raw-B: 2"]

            [headers]
            X-Default = "d"
            "#,
        )
        .unwrap();

        assert_eq!(
            state.default_options.get(OptionKey::HttpHeader),
            Some(&TransportOption::HttpHeader(vec!["X-Raw-A: 1".to_string(), "X-Raw-B: 2".to_string()]))
        );

        let config = RequestConfig::build(Method::Get, "http://h/", &Params::None, &[], &state).unwrap();
        assert_eq!(config.headers, vec!["X-Default: d", "X-Raw-A: 1", "X-Raw-B: 2"]);
    }

    #[test]
    fn test_from_toml_empty_uses_defaults() {
        let state = ClientState::from_toml("").unwrap();
        assert_eq!(state.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_from_toml_rejects_unknown_option() {
        let err = ClientState::from_toml("[options]\nwarp_speed = 9\n").unwrap_err();
        assert!(matches!(err, PulsewrapError::UnknownOption(name) if name == "warp_speed"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ClientState::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, PulsewrapError::Config(_)));
    }
}
