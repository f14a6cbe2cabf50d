//! Ordered tag bag with a delimited boundary encoding.
//!
//! Tags are free-form `key` or `key:value` markers attached to accounts,
//! entries, and transactions. Internally they are a structured, ordered set;
//! the comma-delimited string form (with backslash escaping for `\` and `,`)
//! exists only at the API boundary, where external systems exchange the
//! encoded representation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// An ordered set of `key` / `key:value` markers.
///
/// Tags compare and iterate in lexicographic order, so the encoded form is
/// stable for a given set regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct Tags {
    entries: BTreeSet<String>,
}

impl Tags {
    /// Creates an empty tag set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a comma-delimited tag string.
    ///
    /// Empty segments are discarded; surrounding whitespace is trimmed.
    /// `\,` decodes to a literal comma and `\\` to a literal backslash.
    #[must_use]
    pub fn decode(encoded: &str) -> Self {
        let mut entries = BTreeSet::new();
        let mut current = String::new();
        let mut escaped = false;

        for c in encoded.chars() {
            if escaped {
                current.push(c);
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == ',' {
                let tag = current.trim();
                if !tag.is_empty() {
                    entries.insert(tag.to_string());
                }
                current.clear();
            } else {
                current.push(c);
            }
        }
        let tag = current.trim();
        if !tag.is_empty() {
            entries.insert(tag.to_string());
        }

        Self { entries }
    }

    /// Encodes the tag set to its boundary string form.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for tag in &self.entries {
            if !out.is_empty() {
                out.push(',');
            }
            for c in tag.chars() {
                if c == '\\' || c == ',' {
                    out.push('\\');
                }
                out.push(c);
            }
        }
        out
    }

    /// Adds a tag. Whitespace is trimmed; empty tags are ignored.
    ///
    /// Returns true if the tag was not already present.
    pub fn add(&mut self, tag: impl AsRef<str>) -> bool {
        let tag = tag.as_ref().trim();
        !tag.is_empty() && self.entries.insert(tag.to_string())
    }

    /// Adds a `key:value` pair.
    pub fn add_pair(&mut self, key: &str, value: &str) -> bool {
        self.add(format!("{key}:{value}"))
    }

    /// Removes a tag. Returns true if it was present.
    pub fn remove(&mut self, tag: &str) -> bool {
        self.entries.remove(tag.trim())
    }

    /// Returns true if the exact tag is present.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains(tag.trim())
    }

    /// Returns the value of the first `key:value` tag with the given key.
    #[must_use]
    pub fn value_of(&self, key: &str) -> Option<&str> {
        let prefix = format!("{key}:");
        self.entries
            .iter()
            .find(|t| t.starts_with(&prefix))
            .map(|t| t[prefix.len()..].trim())
    }

    /// Returns true if every tag in `other` is present in this set.
    #[must_use]
    pub fn contains_all(&self, other: &Tags) -> bool {
        other.entries.is_subset(&self.entries)
    }

    /// Returns true if any tag in `other` is present, or `other` is empty.
    #[must_use]
    pub fn contains_any(&self, other: &Tags) -> bool {
        other.entries.is_empty() || !other.entries.is_disjoint(&self.entries)
    }

    /// Number of tags in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the set has no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates the tags in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Merges all tags from `other` into this set.
    pub fn extend_from(&mut self, other: &Tags) {
        self.entries.extend(other.entries.iter().cloned());
    }
}

impl std::fmt::Display for Tags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl From<Tags> for String {
    fn from(tags: Tags) -> Self {
        tags.encode()
    }
}

impl From<String> for Tags {
    fn from(encoded: String) -> Self {
        Self::decode(&encoded)
    }
}

impl std::str::FromStr for Tags {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::decode(s))
    }
}

impl FromIterator<String> for Tags {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut tags = Self::new();
        for tag in iter {
            tags.add(tag);
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_decode_and_contains() {
        let tags = Tags::decode("group:INBOUND,type:DEPOSIT, reversed:true");
        assert_eq!(tags.len(), 3);
        assert!(tags.contains("reversed:true"));
        assert!(tags.contains("group:INBOUND"));
        assert!(!tags.contains("completed:true"));
    }

    #[test]
    fn test_encode_is_sorted_and_stable() {
        let mut a = Tags::new();
        a.add("type:DEPOSIT");
        a.add("group:INBOUND");

        let mut b = Tags::new();
        b.add("group:INBOUND");
        b.add("type:DEPOSIT");

        assert_eq!(a.encode(), b.encode());
        assert_eq!(a.encode(), "group:INBOUND,type:DEPOSIT");
    }

    #[test]
    fn test_escaped_round_trip() {
        let mut tags = Tags::new();
        tags.add("detail:a,b");
        tags.add("path:c\\d");

        let encoded = tags.encode();
        let decoded = Tags::decode(&encoded);
        assert_eq!(tags, decoded);
        assert!(decoded.contains("detail:a,b"));
        assert!(decoded.contains("path:c\\d"));
    }

    #[rstest]
    #[case("group:INBOUND,credit:ACC-1", "group", Some("INBOUND"))]
    #[case("group:INBOUND,credit:ACC-1", "credit", Some("ACC-1"))]
    #[case("group:INBOUND,credit:ACC-1", "missing", None)]
    #[case("flag", "flag", None)]
    fn test_value_of(
        #[case] encoded: &str,
        #[case] key: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(Tags::decode(encoded).value_of(key), expected);
    }

    #[test]
    fn test_empty_segments_discarded() {
        let tags = Tags::decode(",a,, b ,");
        assert_eq!(tags.len(), 2);
        assert!(tags.contains("a"));
        assert!(tags.contains("b"));
    }

    #[test]
    fn test_contains_all_and_any() {
        let tags = Tags::decode("a,b,c");
        let subset = Tags::decode("a,c");
        let disjoint = Tags::decode("x,y");
        let empty = Tags::new();

        assert!(tags.contains_all(&subset));
        assert!(!tags.contains_all(&disjoint));
        assert!(tags.contains_any(&subset));
        assert!(!tags.contains_any(&disjoint));
        // An empty probe matches anything, mirroring the boundary contract.
        assert!(tags.contains_any(&empty));
    }

    #[test]
    fn test_add_ignores_blank() {
        let mut tags = Tags::new();
        assert!(!tags.add("   "));
        assert!(tags.is_empty());
    }
}
