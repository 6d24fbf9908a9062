//! Text snapshot format.
//!
//! A snapshot is UTF-8 text made of named sections holding `key=value` lines:
//!
//! ```text
//! [Default]
//! fabric-id=AAECAw==
//! session=
//!
//! [Other]
//! ...
//! ```
//!
//! Parsing is tolerant: blank lines, `;`/`#` comments and lines that are
//! neither a header nor an assignment are skipped. Entries that appear before
//! the first header belong to the unnamed global section `""`.
//!
//! Rendering is deterministic: the global section first (without a header),
//! then every named section in name order, each followed by a blank line.
//! Keys within a section are rendered in key order.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::io::{self, BufRead, Write};
use tracing::warn;

/// Name of the unnamed section holding entries before the first header.
pub const GLOBAL_SECTION: &str = "";

/// A mapping from key to text value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    entries: BTreeMap<String, String>,
}

impl Section {
    /// Creates an empty section.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Inserts or overwrites a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Removes a value, returning it if it was present.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterates over keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> SectionIter<'_> {
        SectionIter {
            inner: self.entries.iter(),
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the section holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Iterator over the entries of a [`Section`].
#[derive(Debug)]
pub struct SectionIter<'a> {
    inner: btree_map::Iter<'a, String, String>,
}

impl<'a> Iterator for SectionIter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<'a> IntoIterator for &'a Section {
    type Item = (&'a str, &'a str);
    type IntoIter = SectionIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An ordered collection of uniquely named sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    sections: BTreeMap<String, Section>,
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a document from a text stream.
    ///
    /// An empty stream produces an empty document.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream cannot be read or is not valid UTF-8.
    pub fn parse<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut document = Self::new();
        let mut current = GLOBAL_SECTION.to_string();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                current = name.trim().to_string();
                document.section_mut(&current);
                continue;
            }

            match line.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => {
                    document
                        .section_mut(&current)
                        .insert(key.trim(), value.trim());
                }
                _ => warn!(line = index + 1, "skipping malformed line"),
            }
        }

        Ok(document)
    }

    /// Writes the document to a text stream.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn serialize<W: Write>(&self, mut writer: W) -> io::Result<()> {
        write!(writer, "{self}")?;
        writer.flush()
    }

    /// Renders the document as text.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Returns a section by name.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// Returns a section by name, creating it if missing.
    pub fn section_mut(&mut self, name: &str) -> &mut Section {
        self.sections.entry(name.to_string()).or_default()
    }

    /// Removes a section, returning it if it was present.
    pub fn remove_section(&mut self, name: &str) -> Option<Section> {
        self.sections.remove(name)
    }

    /// Iterates over section names in order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Returns true if the document has no sections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, section) in &self.sections {
            if name.is_empty() {
                if section.is_empty() {
                    continue;
                }
            } else {
                writeln!(f, "[{name}]")?;
            }
            for (key, value) in section {
                writeln!(f, "{key}={value}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Checks that `key` survives a render and parse unchanged.
///
/// # Errors
///
/// Returns a short reason when the key cannot be stored.
pub fn validate_key(key: &str) -> Result<(), &'static str> {
    if key.is_empty() {
        return Err("key is empty");
    }
    if key.chars().any(char::is_control) {
        return Err("key contains a control character");
    }
    if key.contains('=') {
        return Err("key contains '='");
    }
    if key.trim() != key {
        return Err("key has leading or trailing whitespace");
    }
    if key.starts_with(&['[', ';', '#'][..]) {
        return Err("key starts with a reserved character");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parse(text: &str) -> Document {
        Document::parse(text.as_bytes()).unwrap()
    }

    #[test]
    fn parse_empty_stream() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n   \n").is_empty());
    }

    #[test]
    fn parse_sections_and_entries() {
        let doc = parse("[Default]\na=AQI=\nb=\n\n[Other]\nc=Zm9v\n");

        let default = doc.section("Default").unwrap();
        assert_eq!(default.get("a"), Some("AQI="));
        assert_eq!(default.get("b"), Some(""));
        assert_eq!(default.len(), 2);
        assert_eq!(doc.section("Other").unwrap().get("c"), Some("Zm9v"));
        assert_eq!(doc.section_names().collect::<Vec<_>>(), vec!["Default", "Other"]);
    }

    #[test]
    fn split_at_first_equals_keeps_padding() {
        let doc = parse("[Default]\nkey=Zg==\n");
        assert_eq!(doc.section("Default").unwrap().get("key"), Some("Zg=="));
    }

    #[test]
    fn trims_whitespace() {
        let doc = parse("  [ Default ]  \n  key  =  Zm9v  \n");
        assert_eq!(doc.section("Default").unwrap().get("key"), Some("Zm9v"));
    }

    #[test]
    fn skips_comments_and_malformed_lines() {
        let doc = parse("; comment\n# another\n[Default]\nnot an assignment\n=novalue\nk=v\n");
        let default = doc.section("Default").unwrap();
        assert_eq!(default.len(), 1);
        assert_eq!(default.get("k"), Some("v"));
    }

    #[test]
    fn entries_before_header_are_global() {
        let doc = parse("loose=1\n[Default]\nk=v\n");
        assert_eq!(doc.section(GLOBAL_SECTION).unwrap().get("loose"), Some("1"));
        assert_eq!(doc.to_text(), "loose=1\n\n[Default]\nk=v\n\n");
    }

    #[test]
    fn duplicate_keys_last_wins() {
        let doc = parse("[Default]\nk=first\nk=second\n");
        assert_eq!(doc.section("Default").unwrap().get("k"), Some("second"));
    }

    #[test]
    fn reopened_section_merges() {
        let doc = parse("[A]\nx=1\n[B]\ny=2\n[A]\nz=3\n");
        assert_eq!(doc.section("A").unwrap().len(), 2);
    }

    #[test]
    fn render_is_deterministic() {
        let mut doc = Document::new();
        doc.section_mut("Default").insert("zeta", "Mw==");
        doc.section_mut("Default").insert("alpha", "MQ==");
        doc.section_mut("Aux");

        assert_eq!(doc.to_text(), "[Aux]\n\n[Default]\nalpha=MQ==\nzeta=Mw==\n\n");
    }

    #[test]
    fn serialize_then_parse_roundtrip() {
        let mut doc = Document::new();
        doc.section_mut("Default").insert("a", "");
        doc.section_mut("Default").insert("b", "AP8=");
        doc.section_mut("Empty");

        let mut out = Vec::new();
        doc.serialize(&mut out).unwrap();
        assert_eq!(Document::parse(out.as_slice()).unwrap(), doc);
    }

    #[test]
    fn rejects_invalid_utf8() {
        let result = Document::parse(&[b'[', 0xFF, b']', b'\n'][..]);
        assert!(result.is_err());
    }

    #[test]
    fn section_mutation() {
        let mut section = Section::new();
        assert!(section.insert("k", "v1").is_none());
        assert_eq!(section.insert("k", "v2").as_deref(), Some("v1"));
        assert!(section.contains("k"));
        assert_eq!(section.remove("k").as_deref(), Some("v2"));
        assert!(section.remove("k").is_none());
        assert!(section.is_empty());
    }

    #[test]
    fn remove_section() {
        let mut doc = parse("[A]\nx=1\n");
        assert!(doc.remove_section("A").is_some());
        assert!(doc.remove_section("A").is_none());
        assert!(doc.is_empty());
    }

    #[test]
    fn key_validation() {
        assert!(validate_key("fabric-1/node.key").is_ok());
        assert!(validate_key("with space inside").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("a=b").is_err());
        assert!(validate_key("line\nbreak").is_err());
        assert!(validate_key(" padded").is_err());
        assert!(validate_key("[section]").is_err());
        assert!(validate_key(";comment").is_err());
        assert!(validate_key("#comment").is_err());
    }

    proptest! {
        #[test]
        fn rendered_documents_parse_back(
            entries in prop::collection::btree_map(
                "[A-Za-z0-9][A-Za-z0-9 ._/-]{0,15}[A-Za-z0-9]",
                "[A-Za-z0-9+/]{0,24}={0,2}",
                0..16,
            )
        ) {
            let mut doc = Document::new();
            for (key, value) in &entries {
                prop_assert!(validate_key(key).is_ok());
                doc.section_mut("Default").insert(key.as_str(), value.as_str());
            }

            prop_assert_eq!(Document::parse(doc.to_text().as_bytes()).unwrap(), doc);
        }
    }
}
