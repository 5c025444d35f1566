//! Cookie file persistence
//!
//! Cookies live in a JSON file between requests. The file is loaded into a
//! [`cookie_store::CookieStore`] that reqwest reads and fills during the
//! exchange (redirect hops included), then written back atomically.

use cookie::Cookie;
use cookie_store::CookieStore;
use reqwest::header::HeaderValue;
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;
use std::sync::{PoisonError, RwLock};
use tempfile::NamedTempFile;
use tracing::trace;
use url::Url;

use crate::errors::{PulsewrapError, Result};

/// Cookie store shared with reqwest for the duration of one request
#[derive(Debug, Default)]
pub struct CookieJar {
    store: RwLock<CookieStore>,
}

impl CookieJar {
    pub fn new(store: CookieStore) -> Self {
        Self {
            store: RwLock::new(store),
        }
    }

    /// Load from `path`; a missing or empty file gives an empty jar
    pub fn load(path: &Path) -> Result<Self> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                trace!(path = %path.display(), "Cookie file absent, starting empty");
                return Ok(Self::default());
            }
            Err(e) => return Err(PulsewrapError::Io(e)),
        };
        if file.metadata()?.len() == 0 {
            return Ok(Self::default());
        }

        let store = cookie_store::serde::json::load_all(BufReader::new(file))
            .map_err(|e| PulsewrapError::Cookie(format!("Failed to read {}: {}", path.display(), e)))?;
        trace!(path = %path.display(), "Loaded cookie file");
        Ok(Self::new(store))
    }

    /// Write every cookie, session cookies included, to `path`.
    ///
    /// Goes through a temp file in the same directory and a rename so a
    /// crash never leaves a half-written jar.
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        let mut temp = NamedTempFile::new_in(parent)?;
        {
            let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
            cookie_store::serde::json::save_incl_expired_and_nonpersistent(&store, &mut temp)
                .map_err(|e| PulsewrapError::Cookie(format!("Failed to write cookies: {}", e)))?;
        }
        temp.persist(path)
            .map_err(|e| PulsewrapError::Cookie(format!("Failed to save {}: {}", path.display(), e)))?;

        // Jars hold session credentials
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600));
        }

        trace!(path = %path.display(), "Saved cookie file");
        Ok(())
    }

    /// Name/value pairs that would be sent to `url`
    pub fn cookies_for(&self, url: &Url) -> Vec<(String, String)> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store
            .get_request_values(url)
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    /// Store cookies from raw `Set-Cookie` values received from `url`
    pub fn store_set_cookies<'a>(&self, values: impl IntoIterator<Item = &'a str>, url: &Url) {
        let cookies: Vec<Cookie<'static>> = values
            .into_iter()
            .filter_map(|value| Cookie::parse(value.to_string()).ok())
            .collect();
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        store.store_response_cookies(cookies.into_iter(), url);
    }
}

impl reqwest::cookie::CookieStore for CookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let values: Vec<&str> = cookie_headers.filter_map(|value| value.to_str().ok()).collect();
        self.store_set_cookies(values, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let header = self
            .cookies_for(url)
            .into_iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");
        if header.is_empty() {
            return None;
        }
        HeaderValue::from_str(&header).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::cookie::CookieStore as _;
    use tempfile::TempDir;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty_jar() {
        let dir = TempDir::new().unwrap();
        let jar = CookieJar::load(&dir.path().join("nope.json")).unwrap();
        assert!(jar.cookies_for(&url("http://example.com/")).is_empty());
    }

    #[test]
    fn test_session_cookie_round_trips_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jar.json");

        let jar = CookieJar::default();
        jar.store_set_cookies(["session=abc123; Path=/"], &url("http://example.com/login"));
        jar.save(&path).unwrap();

        let reloaded = CookieJar::load(&path).unwrap();
        assert_eq!(
            reloaded.cookies_for(&url("http://example.com/account")),
            vec![("session".to_string(), "abc123".to_string())]
        );
        assert!(reloaded.cookies_for(&url("http://other.example/")).is_empty());
    }

    #[test]
    fn test_cookie_header_for_reqwest() {
        let jar = CookieJar::default();
        let first = HeaderValue::from_static("a=1; Path=/");
        let second = HeaderValue::from_static("b=2; Path=/");
        let target = url("http://example.com/");
        jar.set_cookies(&mut [&first, &second].into_iter(), &target);

        let header = jar.cookies(&target).unwrap();
        let mut parts: Vec<&str> = header.to_str().unwrap().split("; ").collect();
        parts.sort();
        assert_eq!(parts, vec!["a=1", "b=2"]);
        assert!(CookieJar::default().cookies(&target).is_none());
    }

    #[test]
    fn test_corrupt_file_is_cookie_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jar.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(CookieJar::load(&path), Err(PulsewrapError::Cookie(_))));
    }
}
