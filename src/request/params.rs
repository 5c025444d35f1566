//! Request parameters and their form-urlencoded representation

use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};

use crate::errors::Result;

/// Parameters supplied with a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Params {
    /// No parameters
    #[default]
    None,
    /// Ordered key/value pairs, form-urlencoded on send (duplicate keys allowed)
    Pairs(Vec<(String, String)>),
    /// Pre-encoded string, sent untouched
    Raw(String),
}

impl Params {
    /// Build from any iterator of key/value pairs
    pub fn pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Params::Pairs(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Params::None => true,
            Params::Pairs(p) => p.is_empty(),
            Params::Raw(s) => s.is_empty(),
        }
    }

    /// Encode as `application/x-www-form-urlencoded`, pairs joined with `&`.
    ///
    /// Returns `None` when there is nothing to send.
    pub fn encode(&self) -> Result<Option<String>> {
        let encoded = match self {
            Params::None => return Ok(None),
            Params::Pairs(pairs) => serde_urlencoded::to_string(pairs)?,
            Params::Raw(raw) => raw.clone(),
        };
        Ok(if encoded.is_empty() { None } else { Some(encoded) })
    }
}

impl From<&str> for Params {
    fn from(raw: &str) -> Self {
        Params::Raw(raw.to_string())
    }
}

impl From<String> for Params {
    fn from(raw: String) -> Self {
        Params::Raw(raw)
    }
}

impl<K: Into<String>, V: Into<String>> From<Vec<(K, V)>> for Params {
    fn from(pairs: Vec<(K, V)>) -> Self {
        Params::pairs(pairs)
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Params {
    fn from(pairs: [(K, V); N]) -> Self {
        Params::pairs(pairs)
    }
}

impl<K: Into<String>, V: Into<String>> From<IndexMap<K, V>> for Params {
    fn from(map: IndexMap<K, V>) -> Self {
        Params::pairs(map)
    }
}

impl<K: Into<String>, V: Into<String>> From<BTreeMap<K, V>> for Params {
    fn from(map: BTreeMap<K, V>) -> Self {
        Params::pairs(map)
    }
}

impl<K: Into<String>, V: Into<String>> From<HashMap<K, V>> for Params {
    fn from(map: HashMap<K, V>) -> Self {
        Params::pairs(map)
    }
}

/// Append an encoded query to `url`, reusing an existing `?`
pub fn append_query(url: &str, encoded: &str) -> String {
    if encoded.is_empty() {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(query: &str) -> Vec<(String, String)> {
        serde_urlencoded::from_str(query).unwrap()
    }

    #[test]
    fn test_encode_pairs_uses_ampersand() {
        let params = Params::from([("a", "1"), ("b", "two words")]);
        assert_eq!(params.encode().unwrap().as_deref(), Some("a=1&b=two+words"));
    }

    #[test]
    fn test_encode_escapes_reserved() {
        let params = Params::from([("q", "a&b=c;d")]);
        let encoded = params.encode().unwrap().unwrap();
        assert!(!encoded.contains(';'));
        assert_eq!(decode(&encoded), vec![("q".to_string(), "a&b=c;d".to_string())]);
    }

    #[test]
    fn test_empty_encodes_to_none() {
        assert_eq!(Params::None.encode().unwrap(), None);
        assert_eq!(Params::Pairs(Vec::new()).encode().unwrap(), None);
        assert_eq!(Params::from("").encode().unwrap(), None);
    }

    #[test]
    fn test_raw_passes_through() {
        let params = Params::from("already=encoded%20value");
        assert_eq!(params.encode().unwrap().as_deref(), Some("already=encoded%20value"));
    }

    #[test]
    fn test_append_query_separator() {
        assert_eq!(append_query("http://h/a", "y=2"), "http://h/a?y=2");
        assert_eq!(append_query("http://h/a?x=1", "y=2"), "http://h/a?x=1&y=2");
        assert_eq!(append_query("http://h/a", ""), "http://h/a");
    }

    #[test]
    fn test_query_round_trip() {
        let original = vec![
            ("name".to_string(), "Jane Doe".to_string()),
            ("tag".to_string(), "a/b?c".to_string()),
            ("tag".to_string(), "ünïcode".to_string()),
        ];
        let encoded = Params::Pairs(original.clone()).encode().unwrap().unwrap();
        let url = append_query("http://example.com/search", &encoded);
        let (_, query) = url.split_once('?').unwrap();
        assert_eq!(decode(query), original);
    }
}
