//! Front-matter parsing

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use crate::error::ContentMetadataError;

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Front-matter of a content entry, as authored
///
/// Every field is optional at this stage; mandatory fields are checked when
/// the entry is built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    pub updated: Option<String>,
    #[serde(deserialize_with = "string_or_vec", default)]
    pub tags: Vec<String>,
    pub draft: bool,
    pub summary: Option<String>,

    /// Keys this model does not know about
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Split a source file into its front-matter and the remaining body
    ///
    /// Accepts a YAML block fenced by `---` lines or a JSON object fenced by
    /// `;;;` lines.
    pub fn parse(content: &str) -> Result<(Self, &str), ContentMetadataError> {
        let content = content.trim_start_matches('\u{feff}').trim_start();

        if content.starts_with("---") {
            let (block, body) = split_block(content, "---")?;
            return Ok((Self::from_yaml(block)?, body));
        }

        if content.starts_with(";;;") {
            let (block, body) = split_block(content, ";;;")?;
            return Ok((Self::from_json(block)?, body));
        }

        Err(ContentMetadataError::MissingFrontMatter)
    }

    fn from_yaml(block: &str) -> Result<Self, ContentMetadataError> {
        if block.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(block).map_err(|e| ContentMetadataError::Malformed(e.to_string()))
    }

    fn from_json(block: &str) -> Result<Self, ContentMetadataError> {
        if block.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(block).map_err(|e| ContentMetadataError::Malformed(e.to_string()))
    }

    /// Parse the date string into a DateTime
    pub fn parse_date(&self) -> Option<DateTime<Local>> {
        self.date.as_deref().and_then(parse_date_string)
    }

    /// Parse the updated date string into a DateTime
    pub fn parse_updated(&self) -> Option<DateTime<Local>> {
        self.updated.as_deref().and_then(parse_date_string)
    }
}

/// Find the fenced block at the start of `content`
///
/// Returns the block text and the body following the closing fence.
fn split_block<'a>(content: &'a str, fence: &str) -> Result<(&'a str, &'a str), ContentMetadataError> {
    let rest = content
        .strip_prefix(fence)
        .ok_or(ContentMetadataError::MissingFrontMatter)?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .ok_or(ContentMetadataError::MissingFrontMatter)?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == fence {
            let block = &rest[..offset];
            let body = rest[offset + line.len()..].trim_start_matches(['\n', '\r']);
            return Ok((block, body));
        }
        offset += line.len();
    }

    Err(ContentMetadataError::Malformed(format!(
        "front-matter opened with '{}' is never closed",
        fence
    )))
}

/// Parse an ISO 8601 date or date-time string
///
/// Strings with an explicit offset keep it; naive ones are read as local time.
pub fn parse_date_string(s: &str) -> Option<DateTime<Local>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }

    let datetime_formats = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%Y/%m/%d %H:%M",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Local.from_local_datetime(&dt).earliest();
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            let dt = d.and_hms_opt(0, 0, 0)?;
            return Local.from_local_datetime(&dt).earliest();
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
date: 2024-01-15 10:30:00
tags:
  - rust
  - writing
draft: false
summary: A first post.
---

This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, Some("Hello World".to_string()));
        assert_eq!(fm.tags, vec!["rust", "writing"]);
        assert!(!fm.draft);
        assert_eq!(fm.summary.as_deref(), Some("A first post."));
        assert_eq!(remaining, "This is the content.\n");
    }

    #[test]
    fn test_parse_json_frontmatter() {
        let content = r#";;;
{"title": "Test Post", "date": "2024-02-01", "tags": ["a", "b"], "draft": true}
;;;

This is content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, Some("Test Post".to_string()));
        assert_eq!(fm.tags, vec!["a", "b"]);
        assert!(fm.draft);
        assert!(remaining.contains("This is content."));
    }

    #[test]
    fn test_parse_single_string_tags() {
        let content = "---\ntitle: Single Tag Post\ndate: 2024-01-15\ntags: Notes\n---\nBody\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.tags, vec!["Notes"]);
    }

    #[test]
    fn test_duplicate_tags_preserved() {
        let content = "---\ntitle: Dup\ndate: 2024-01-15\ntags: [rust, web, rust]\n---\nBody\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.tags, vec!["rust", "web", "rust"]);
    }

    #[test]
    fn test_unknown_keys_kept_aside() {
        let content = "---\ntitle: Extra\ndate: 2024-01-15\ncover: /img/a.png\n---\nBody\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(
            fm.extra.get("cover").and_then(|v| v.as_str()),
            Some("/img/a.png")
        );
    }

    #[test]
    fn test_missing_frontmatter() {
        let err = FrontMatter::parse("# Just a heading\n").unwrap_err();
        assert_eq!(err, ContentMetadataError::MissingFrontMatter);
    }

    #[test]
    fn test_unclosed_frontmatter() {
        let err = FrontMatter::parse("---\ntitle: Oops\n\nBody\n").unwrap_err();
        assert!(matches!(err, ContentMetadataError::Malformed(_)));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = FrontMatter::parse("---\ntitle: [unclosed\n---\nBody\n").unwrap_err();
        assert!(matches!(err, ContentMetadataError::Malformed(_)));
    }

    #[test]
    fn test_empty_block_is_default() {
        let (fm, body) = FrontMatter::parse("---\n---\nBody\n").unwrap();
        assert!(fm.title.is_none());
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn test_horizontal_rule_in_body_is_not_a_fence() {
        let content = "---\ntitle: Rules\ndate: 2024-01-15\n---\nAbove\n\n---\n\nBelow\n";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Rules"));
        assert!(body.contains("Above"));
        assert!(body.contains("Below"));
    }

    #[test]
    fn test_parse_date() {
        let fm = FrontMatter {
            date: Some("2024-01-15 10:30:00".to_string()),
            ..Default::default()
        };
        let dt = fm.parse_date().unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 10:30");
    }

    #[test]
    fn test_parse_date_variants() {
        assert!(parse_date_string("2024-01-15").is_some());
        assert!(parse_date_string("2024/01/15").is_some());
        assert!(parse_date_string("2024-01-15T08:00:00").is_some());
        assert!(parse_date_string("2024-01-15T08:00:00+02:00").is_some());
        assert!(parse_date_string("yesterday").is_none());
        assert!(parse_date_string("2024-13-40").is_none());
    }
}
