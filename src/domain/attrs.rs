//! Free-form attributes attached to shows, groups and units
//!
//! Stored as a single text column with one `key: value` line per entry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// String to string attribute map with a stable (sorted) encoding.
/// Deserialized maps go through [`Attrs::set`] like every other entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct Attrs(BTreeMap<String, String>);

impl Attrs {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Sets a value, trimming both sides. Keys that are empty or contain `:`
    /// or a line break are ignored since they could not be decoded again.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into().trim().to_string();
        if key.is_empty() || key.contains([':', '\n', '\r']) {
            return;
        }
        let value = value.into().replace(['\n', '\r'], " ").trim().to_string();
        self.0.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Encodes as `key: value` lines in key order
    pub fn encode(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Decodes the line format. Blank lines, lines without `:` and lines with
    /// an empty key are dropped.
    pub fn decode(s: &str) -> Self {
        let mut attrs = Self::new();
        for line in s.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            attrs.set(key, value);
        }
        attrs
    }
}

impl From<BTreeMap<String, String>> for Attrs {
    fn from(map: BTreeMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl From<Attrs> for BTreeMap<String, String> {
    fn from(attrs: Attrs) -> Self {
        attrs.0
    }
}

impl fmt::Display for Attrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (k, v) in iter {
            attrs.set(k, v);
        }
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_is_sorted() {
        let attrs: Attrs = [("lens", "35mm"), ("camera", "alexa")].into_iter().collect();
        assert_eq!(attrs.encode(), "camera: alexa\nlens: 35mm");
    }

    #[test]
    fn decode_drops_malformed_lines() {
        let attrs = Attrs::decode("camera: alexa\n\nno colon here\n: orphan\nlens:35mm\n");
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get("camera"), Some("alexa"));
        assert_eq!(attrs.get("lens"), Some("35mm"));
    }

    #[test]
    fn value_may_contain_colon() {
        let attrs = Attrs::decode("timecode: 01:00:00:00");
        assert_eq!(attrs.get("timecode"), Some("01:00:00:00"));
    }

    #[test]
    fn empty_roundtrip() {
        assert_eq!(Attrs::new().encode(), "");
        assert!(Attrs::decode("").is_empty());
    }

    #[test]
    fn deserialized_entries_are_sanitized() {
        let attrs: Attrs =
            serde_json::from_str(r#"{"note":"line1\nevil: injected","a:b":"c"}"#).unwrap();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("note"), Some("line1 evil: injected"));
        assert_eq!(attrs.get("evil"), None);
        assert_eq!(Attrs::decode(&attrs.encode()), attrs);
    }

    #[test]
    fn serializes_as_plain_map() {
        let attrs: Attrs = [("fps", "24")].into_iter().collect();
        assert_eq!(serde_json::to_string(&attrs).unwrap(), r#"{"fps":"24"}"#);
    }

    #[test]
    fn roundtrip_preserves_entries() {
        let mut attrs = Attrs::new();
        attrs.set("fps", "24");
        attrs.set("note", "client asked: keep grain");
        assert_eq!(Attrs::decode(&attrs.encode()), attrs);
    }
}
