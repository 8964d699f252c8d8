//! Structural paths into a JSON document.
//!
//! Canonical string form is `root` followed by `.key` for object keys and
//! `[n]` for array indices, e.g. `root.monsters[2].stats.hp`. Keys that would
//! read ambiguously in bare form are written as quoted brackets using JSON
//! string escaping: `root["a.b"]`, `root["[0]"]`.
//!
//! The relative form (no `root`, no leading dot: `stats.hp`, `tags[0]`) is the
//! identity string of a grid column.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{GridError, Result};

/// Literal prefix of every canonical path string.
pub const ROOT: &str = "root";

/// One step of a path: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl Segment {
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Segment::Key(k) => Some(k),
            Segment::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            Segment::Index(i) => Some(*i),
            Segment::Key(_) => None,
        }
    }

    pub fn is_index(&self) -> bool {
        matches!(self, Segment::Index(_))
    }

    /// Header label: the key itself, or `[n]` for an index.
    pub fn label(&self) -> String {
        match self {
            Segment::Key(k) => k.clone(),
            Segment::Index(i) => format!("[{i}]"),
        }
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

/// An ordered sequence of segments rooted at the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// The empty path (the document root).
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Parse a path string, with or without the leading `root`.
    ///
    /// `a[0].b[1]` parses to `["a", 0, "b", 1]`; `root` parses to the empty path.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let mut rest = trimmed;
        if let Some(after) = trimmed.strip_prefix(ROOT) {
            if after.is_empty() || after.starts_with(['.', '[']) {
                rest = after;
            }
        }
        let segments = PathParser { input, rest }.parse()?;
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    pub fn push(&mut self, segment: impl Into<Segment>) {
        self.segments.push(segment.into());
    }

    pub fn with_key(&self, key: &str) -> Self {
        let mut path = self.clone();
        path.push(key);
        path
    }

    pub fn with_index(&self, index: usize) -> Self {
        let mut path = self.clone();
        path.push(index);
        path
    }

    pub fn with_segment(&self, segment: Segment) -> Self {
        let mut path = self.clone();
        path.segments.push(segment);
        path
    }

    /// Concatenate `other` onto this path.
    pub fn join(&self, other: &Path) -> Self {
        let mut segments = Vec::with_capacity(self.len() + other.len());
        segments.extend_from_slice(&self.segments);
        segments.extend_from_slice(&other.segments);
        Self { segments }
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.segments.split_last()?;
        Some(Self::from_segments(init.to_vec()))
    }

    /// The first `len` segments (the whole path if shorter).
    pub fn prefix(&self, len: usize) -> Self {
        Self::from_segments(self.segments.iter().take(len).cloned().collect())
    }

    /// Segments after the first `len`.
    pub fn suffix(&self, len: usize) -> Self {
        Self::from_segments(self.segments.iter().skip(len).cloned().collect())
    }

    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Relative form used as a column identity: `stats.hp`, `tags[0]`.
    pub fn to_relative_string(&self) -> String {
        let mut out = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            // Writing into a String cannot fail.
            let _ = write_segment(&mut out, segment, i == 0);
        }
        out
    }

    /// Resolve against a document by sequential indexing.
    ///
    /// Traversal through a missing key, an out-of-range index, or a
    /// primitive yields `None`.
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(root, |current, segment| child(current, segment))
    }

    pub fn resolve_mut<'a>(&self, root: &'a mut Value) -> Option<&'a mut Value> {
        self.segments
            .iter()
            .try_fold(root, |current, segment| child_mut(current, segment))
    }
}

impl FromIterator<Segment> for Path {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self::from_segments(iter.into_iter().collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ROOT)?;
        for segment in &self.segments {
            write_segment(f, segment, false)?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Path::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Step one segment into a value.
pub(crate) fn child<'a>(value: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match (value, segment) {
        (Value::Object(map), Segment::Key(key)) => map.get(key),
        (Value::Array(items), Segment::Index(index)) => items.get(*index),
        _ => None,
    }
}

fn child_mut<'a>(value: &'a mut Value, segment: &Segment) -> Option<&'a mut Value> {
    match (value, segment) {
        (Value::Object(map), Segment::Key(key)) => map.get_mut(key),
        (Value::Array(items), Segment::Index(index)) => items.get_mut(*index),
        _ => None,
    }
}

fn needs_quoting(key: &str) -> bool {
    key.is_empty()
        || key
            .chars()
            .any(|c| matches!(c, '.' | '[' | ']' | '"' | '\\') || c.is_whitespace())
}

fn write_segment(out: &mut impl fmt::Write, segment: &Segment, leading: bool) -> fmt::Result {
    match segment {
        Segment::Index(index) => write!(out, "[{index}]"),
        Segment::Key(key) if needs_quoting(key) || (leading && key == ROOT) => {
            let quoted = serde_json::to_string(key).unwrap_or_else(|_| format!("\"{key}\""));
            write!(out, "[{quoted}]")
        }
        Segment::Key(key) if leading => out.write_str(key),
        Segment::Key(key) => write!(out, ".{key}"),
    }
}

struct PathParser<'a> {
    input: &'a str,
    rest: &'a str,
}

impl PathParser<'_> {
    fn parse(mut self) -> Result<Vec<Segment>> {
        let mut segments = Vec::new();
        // Relative form starts with a bare key.
        if !self.rest.is_empty() && !self.rest.starts_with(['.', '[']) {
            segments.push(self.bare_key()?);
        }
        while !self.rest.is_empty() {
            if let Some(after) = self.rest.strip_prefix('.') {
                self.rest = after;
                segments.push(self.bare_key()?);
            } else if let Some(after) = self.rest.strip_prefix('[') {
                self.rest = after;
                segments.push(self.bracket()?);
            } else {
                return Err(self.error("expected `.` or `[`"));
            }
        }
        Ok(segments)
    }

    fn bare_key(&mut self) -> Result<Segment> {
        let end = self.rest.find(['.', '[']).unwrap_or(self.rest.len());
        let (key, rest) = self.rest.split_at(end);
        if key.is_empty() {
            return Err(self.error("empty key"));
        }
        if key.contains([']', '"']) {
            return Err(self.error(format!("unexpected character in key `{key}`")));
        }
        self.rest = rest;
        Ok(Segment::Key(key.to_string()))
    }

    fn bracket(&mut self) -> Result<Segment> {
        if self.rest.starts_with('"') {
            let end = quoted_end(self.rest).ok_or_else(|| self.error("unterminated quoted key"))?;
            let (literal, rest) = self.rest.split_at(end);
            let key: String = serde_json::from_str(literal)
                .map_err(|e| self.error(format!("invalid quoted key: {e}")))?;
            self.rest = rest
                .strip_prefix(']')
                .ok_or_else(|| self.error("expected `]` after quoted key"))?;
            return Ok(Segment::Key(key));
        }

        let end = self
            .rest
            .find(']')
            .ok_or_else(|| self.error("unterminated `[`"))?;
        let (digits, rest) = self.rest.split_at(end);
        let index = digits
            .trim()
            .parse::<usize>()
            .map_err(|_| self.error(format!("invalid index `{digits}`")))?;
        self.rest = rest.strip_prefix(']').unwrap_or(rest);
        Ok(Segment::Index(index))
    }

    fn error(&self, reason: impl Into<String>) -> GridError {
        GridError::invalid_path(self.input, reason)
    }
}

/// Byte offset just past the closing quote of a JSON string literal.
fn quoted_end(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in s.char_indices().skip(1) {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return Some(i + 1);
        }
    }
    None
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use serde_json::json;

    fn segs(path: &Path) -> Vec<Segment> {
        path.segments().to_vec()
    }

    #[test]
    fn test_parse_root_is_empty() {
        assert!(Path::parse("root").unwrap().is_empty());
        assert!(Path::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_trailing_index_groups() {
        let path = Path::parse("a[0].b[1]").unwrap();
        assert_eq!(
            segs(&path),
            vec![
                Segment::from("a"),
                Segment::Index(0),
                Segment::from("b"),
                Segment::Index(1)
            ]
        );
    }

    #[test]
    fn test_parse_with_root_prefix() {
        let path = Path::parse("root.monsters[2].stats.hp").unwrap();
        assert_eq!(path.len(), 4);
        assert_eq!(path.to_string(), "root.monsters[2].stats.hp");
    }

    #[test]
    fn test_parse_nested_indices() {
        let path = Path::parse("root[0][1]").unwrap();
        assert_eq!(segs(&path), vec![Segment::Index(0), Segment::Index(1)]);
    }

    #[test]
    fn test_root_like_key_is_not_stripped() {
        let path = Path::parse("rootbeer.x").unwrap();
        assert_eq!(segs(&path), vec![Segment::from("rootbeer"), Segment::from("x")]);
    }

    #[test]
    fn test_key_that_looks_like_index_is_quoted() {
        let path = Path::from_segments(vec![Segment::from("[0]"), Segment::Index(0)]);
        let text = path.to_string();
        assert_eq!(text, r#"root["[0]"][0]"#);
        assert_eq!(Path::parse(&text).unwrap(), path);
    }

    #[test]
    fn test_keys_with_dots_and_quotes_round_trip() {
        let path = Path::from_segments(vec![
            Segment::from("a.b"),
            Segment::from("say \"hi\""),
            Segment::from(""),
            Segment::from("with space"),
        ]);
        assert_eq!(Path::parse(&path.to_string()).unwrap(), path);
    }

    #[test]
    fn test_relative_string() {
        let path = Path::parse("root.stats.hp").unwrap();
        assert_eq!(path.to_relative_string(), "stats.hp");
        let path = Path::parse("root.tags[0]").unwrap();
        assert_eq!(path.to_relative_string(), "tags[0]");
        assert_eq!(Path::root().to_relative_string(), "");
    }

    #[test]
    fn test_relative_string_quotes_leading_root_key() {
        let path = Path::from_segments(vec![Segment::from("root"), Segment::from("x")]);
        let relative = path.to_relative_string();
        assert_eq!(relative, r#"["root"].x"#);
        assert_eq!(Path::parse(&relative).unwrap(), path);
    }

    #[test]
    fn test_parse_errors() {
        assert!(Path::parse("root.").is_err());
        assert!(Path::parse("root[").is_err());
        assert!(Path::parse("root[abc]").is_err());
        assert!(Path::parse("root..a").is_err());
        assert!(Path::parse(r#"root["open"#).is_err());
    }

    #[test]
    fn test_resolve() {
        let doc = json!({"monsters": [{"id": 1, "stats": {"hp": 10}}], "none": null});
        let path = Path::parse("root.monsters[0].stats.hp").unwrap();
        assert_eq!(path.resolve(&doc), Some(&json!(10)));
        assert_eq!(Path::root().resolve(&doc), Some(&doc));
    }

    #[test]
    fn test_resolve_missing_is_none() {
        let doc = json!({"monsters": [{"id": 1}], "none": null});
        assert!(Path::parse("root.none.x").unwrap().resolve(&doc).is_none());
        assert!(Path::parse("root.monsters[5]").unwrap().resolve(&doc).is_none());
        assert!(Path::parse("root.monsters.id").unwrap().resolve(&doc).is_none());
        assert!(Path::parse("root.monsters[0].id.deeper").unwrap().resolve(&doc).is_none());
    }

    #[test]
    fn test_parent_prefix_suffix() {
        let path = Path::parse("root.a[1].b").unwrap();
        assert_eq!(path.parent().unwrap().to_string(), "root.a[1]");
        assert_eq!(path.prefix(1).to_string(), "root.a");
        assert_eq!(path.suffix(2).to_string(), "root.b");
        assert!(path.starts_with(&path.prefix(2)));
        assert!(Path::root().parent().is_none());
    }

    #[test]
    fn test_serde_as_string() {
        let path = Path::parse("root.a[1]").unwrap();
        let text = serde_json::to_string(&path).unwrap();
        assert_eq!(text, r#""root.a[1]""#);
        let back: Path = serde_json::from_str(&text).unwrap();
        assert_eq!(back, path);
    }
}
