//! Content entries (articles)

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::{FrontMatter, MarkdownRenderer};
use crate::config::SiteConfig;
use crate::error::ContentMetadataError;

/// What an entry needs from its surroundings to be rendered
pub struct RenderContext<'a> {
    pub config: &'a SiteConfig,
    pub renderer: &'a MarkdownRenderer,
}

/// An article, parsed and rendered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// Entry title
    pub title: String,

    /// Publication date
    pub date: DateTime<Local>,

    /// Last updated date
    pub updated: Option<DateTime<Local>>,

    /// Tags in authored order
    pub tags: Vec<String>,

    /// Drafts are left out of public listings
    pub draft: bool,

    /// Short description for listings
    pub summary: String,

    /// Raw markdown body
    pub raw: String,

    /// Rendered HTML body
    pub content: String,

    /// Rendered excerpt (before `<!-- more -->`)
    pub excerpt: Option<String>,

    /// Source file path, relative to the source directory
    pub source: String,

    /// URL-friendly name, taken from the file name
    pub slug: String,

    /// URL path (with root)
    pub path: String,

    /// Full permalink URL
    pub permalink: String,

    /// Front-matter keys with no meaning here
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

/// Metadata of an entry, as shown on index and listing pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySummary {
    pub title: String,
    pub date: String,
    pub tags: Vec<String>,
    pub summary: String,
    pub path: String,
    pub draft: bool,
}

impl Entry {
    /// Build an entry from the text of its source file
    ///
    /// Pure: the same source text and context always give the same entry.
    pub fn parse(
        source: &str,
        text: &str,
        ctx: &RenderContext<'_>,
    ) -> Result<Self, ContentMetadataError> {
        let (fm, body) = FrontMatter::parse(text)?;

        let title = fm
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ContentMetadataError::MissingField { field: "title" })?
            .to_string();

        let date_str = fm
            .date
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .ok_or(ContentMetadataError::MissingField { field: "date" })?;
        let date = fm.parse_date().ok_or_else(|| ContentMetadataError::InvalidField {
            field: "date",
            reason: format!("'{}' is not an ISO 8601 date", date_str),
        })?;

        let updated = match fm.updated.as_deref() {
            Some(s) => Some(fm.parse_updated().ok_or_else(|| {
                ContentMetadataError::InvalidField {
                    field: "updated",
                    reason: format!("'{}' is not an ISO 8601 date", s),
                }
            })?),
            None => None,
        };

        if body.trim().is_empty() {
            return Err(ContentMetadataError::MissingField { field: "body" });
        }

        let (excerpt_md, full_md) = MarkdownRenderer::split_excerpt(body);
        let content = ctx
            .renderer
            .render(&full_md)
            .map_err(|e| ContentMetadataError::Render(e.to_string()))?;
        let excerpt = excerpt_md
            .map(|e| ctx.renderer.render(&e))
            .transpose()
            .map_err(|e| ContentMetadataError::Render(e.to_string()))?;

        let slug = Path::new(source)
            .file_stem()
            .and_then(|s| s.to_str())
            .map(slug::slugify)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slug::slugify(&title));

        let path = permalink_path(ctx.config, &date, &slug);
        let permalink = format!(
            "{}{}",
            ctx.config.url.trim_end_matches('/'),
            path
        );

        Ok(Self {
            title,
            date,
            updated,
            tags: fm.tags,
            draft: fm.draft,
            summary: fm.summary.unwrap_or_default(),
            raw: body.to_string(),
            content,
            excerpt,
            source: source.to_string(),
            slug,
            path,
            permalink,
            extra: fm.extra,
        })
    }

    /// Metadata for index pages
    pub fn summary(&self) -> EntrySummary {
        EntrySummary {
            title: self.title.clone(),
            date: self.date.format("%Y-%m-%d").to_string(),
            tags: self.tags.clone(),
            summary: self.summary.clone(),
            path: self.path.clone(),
            draft: self.draft,
        }
    }
}

/// Expand the configured permalink pattern for an entry
fn permalink_path(config: &SiteConfig, date: &DateTime<Local>, slug: &str) -> String {
    let result = config
        .permalink
        .replace(":year", &date.format("%Y").to_string())
        .replace(":month", &date.format("%m").to_string())
        .replace(":day", &date.format("%d").to_string())
        .replace(":i_month", &date.format("%-m").to_string())
        .replace(":i_day", &date.format("%-d").to_string())
        .replace(":title", slug)
        .replace(":name", slug);

    format!(
        "{}/{}",
        config.root.trim_end_matches('/'),
        result.trim_start_matches('/')
    )
}
