//! Per-entry and per-record errors, and the diagnostics they turn into
//!
//! Nothing here is fatal to a build: a failing entry or record is skipped
//! and reported, everything else keeps rendering.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// A content entry whose front matter or body cannot be accepted
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContentMetadataError {
    #[error("no front-matter block found")]
    MissingFrontMatter,

    #[error("malformed front-matter: {0}")]
    Malformed(String),

    #[error("required field missing: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("failed to render body: {0}")]
    Render(String),
}

/// A listing record that cannot be shown
///
/// `index` is the position of the record in its listing (0-based).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListingRecordError {
    #[error("listing record #{index}: required field missing: {field}")]
    MissingField { index: usize, field: &'static str },

    #[error("listing record #{index}: {reason}")]
    Malformed { index: usize, reason: String },
}

impl ListingRecordError {
    pub fn index(&self) -> usize {
        match self {
            Self::MissingField { index, .. } | Self::Malformed { index, .. } => *index,
        }
    }
}

/// A skipped entry or record, as reported to whoever drives the build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Where the problem comes from (file path, or `listing[index]`)
    pub source: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(source: impl Into<String>, err: impl fmt::Display) -> Self {
        Self {
            source: source.into(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.message)
    }
}

/// Items that loaded successfully, plus a diagnostic for each one that didn't
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub items: Vec<T>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Loaded<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Keep the item, or log and record the failure
    pub fn push<E: fmt::Display>(&mut self, source: impl Into<String>, result: Result<T, E>) {
        match result {
            Ok(item) => self.items.push(item),
            Err(e) => self.report(source, e),
        }
    }

    pub fn report(&mut self, source: impl Into<String>, err: impl fmt::Display) {
        let diagnostic = Diagnostic::new(source, err);
        tracing::warn!("Skipping {}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl<T> Default for Loaded<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_error_names_index() {
        let err = ListingRecordError::MissingField {
            index: 3,
            field: "description",
        };
        assert_eq!(
            err.to_string(),
            "listing record #3: required field missing: description"
        );
        assert_eq!(err.index(), 3);

        let err = ListingRecordError::Malformed {
            index: 1,
            reason: "expected a mapping".to_string(),
        };
        assert_eq!(err.to_string(), "listing record #1: expected a mapping");
        assert_eq!(err.index(), 1);
    }

    #[test]
    fn test_loaded_keeps_going_after_failure() {
        let mut loaded: Loaded<u32> = Loaded::new();
        loaded.push("a.md", Ok::<_, ContentMetadataError>(1));
        loaded.push(
            "b.md",
            Err(ContentMetadataError::MissingField { field: "title" }),
        );
        loaded.push("c.md", Ok::<_, ContentMetadataError>(3));

        assert_eq!(loaded.items, vec![1, 3]);
        assert_eq!(loaded.diagnostics.len(), 1);
        assert_eq!(
            loaded.diagnostics[0].to_string(),
            "b.md: required field missing: title"
        );
        assert!(!loaded.is_clean());
    }
}
