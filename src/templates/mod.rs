//! Built-in templates using the Tera template engine
//!
//! All templates are embedded in the binary; sites carry no theme directory.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::content::Entry;
use crate::helpers::count_words;
use crate::listing::Card;

/// Template renderer with the embedded folio theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Bodies are already HTML; user text is escaped explicitly in templates
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("folio/layout.html")),
            ("index.html", include_str!("folio/index.html")),
            ("entry.html", include_str!("folio/entry.html")),
            ("archive.html", include_str!("folio/archive.html")),
            ("tags.html", include_str!("folio/tags.html")),
            ("tag.html", include_str!("folio/tag.html")),
            ("listing.html", include_str!("folio/listing.html")),
            // Partials
            ("partials/header.html", include_str!("folio/partials/header.html")),
            ("partials/footer.html", include_str!("folio/partials/footer.html")),
        ])?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("escape_attr", escape_attr_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("date_format", date_format_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(crate::helpers::strip_html(&s)))
}

/// Tera filter: escape a value for a quoted attribute, leaving `/` alone
fn escape_attr_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("escape_attr", "value", String, value);
    Ok(tera::Value::String(crate::helpers::escape_html(&s)))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "…".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// Tera filter: format a `YYYY-MM-DD` date string
///
/// `format="LL"` gives "May 30, 2023"; anything else returns the input.
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "YYYY-MM-DD".to_string(),
    };

    if format == "LL" {
        if let Ok(date) = chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
            return Ok(tera::Value::String(date.format("%B %-d, %Y").to_string()));
        }
    }

    Ok(tera::Value::String(s))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub url: String,
    pub root: String,
    pub menu: Vec<MenuItem>,
    pub current_year: String,
    pub feed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuItem {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagLink {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryData {
    pub title: String,
    pub date: String,
    pub updated: Option<String>,
    pub path: String,
    pub permalink: String,
    pub tags: Vec<TagLink>,
    pub summary: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub draft: bool,
    pub word_count: usize,
}

impl EntryData {
    /// Template view of an entry; `tag_path` maps a tag name to its page
    pub fn new(entry: &Entry, tag_path: impl Fn(&str) -> String) -> Self {
        Self {
            title: entry.title.clone(),
            date: entry.date.format("%Y-%m-%d").to_string(),
            updated: entry.updated.map(|u| u.format("%Y-%m-%d").to_string()),
            path: entry.path.clone(),
            permalink: entry.permalink.clone(),
            tags: entry
                .tags
                .iter()
                .map(|t| TagLink {
                    name: t.clone(),
                    path: tag_path(t),
                })
                .collect(),
            summary: entry.summary.clone(),
            excerpt: entry.excerpt.clone(),
            content: entry.content.clone(),
            draft: entry.draft,
            word_count: count_words(&entry.content),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationData {
    pub per_page: usize,
    pub total: usize,
    pub current: usize,
    pub prev_link: String,
    pub next_link: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavEntry {
    pub title: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveYearData {
    pub year: i32,
    pub entries: Vec<EntryData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagData {
    pub name: String,
    pub path: String,
    pub count: usize,
    pub entries: Vec<EntryData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingData {
    pub name: String,
    pub title: String,
    pub path: String,
    pub cards: Vec<Card>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{ListingRecord, RawListingRecord};

    fn site_data() -> SiteData {
        SiteData {
            title: "Test <Site>".to_string(),
            subtitle: String::new(),
            description: String::new(),
            author: "Me".to_string(),
            language: "en".to_string(),
            url: "https://example.com".to_string(),
            root: "/".to_string(),
            menu: vec![MenuItem {
                name: "Home".to_string(),
                path: "/".to_string(),
            }],
            current_year: "2024".to_string(),
            feed: true,
        }
    }

    fn card(title: &str, description: &str, href: Option<&str>) -> Card {
        let raw = RawListingRecord {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            href: href.map(String::from),
            img_src: None,
        };
        Card::from(&ListingRecord::validate(0, raw).unwrap())
    }

    #[test]
    fn test_all_templates_parse() {
        assert!(TemplateRenderer::new().is_ok());
    }

    #[test]
    fn test_listing_renders_cards_in_order() {
        let renderer = TemplateRenderer::new().unwrap();
        let listing = ListingData {
            name: "projects".to_string(),
            title: "Projects".to_string(),
            path: "/projects/".to_string(),
            cards: vec![card("A", "d1", None), card("B", "d2", Some("https://x"))],
        };
        let mut context = Context::new();
        context.insert("site", &site_data());
        context.insert("current_path", &listing.path);
        context.insert("listing", &listing);

        let html = renderer.render("listing.html", &context).unwrap();
        assert_eq!(html.matches(r#"class="card""#).count(), 2);

        let a = html.find("<h3 class=\"card-title\">A</h3>").unwrap();
        let b = html.find("<h3 class=\"card-title\">B</h3>").unwrap();
        assert!(a < b);

        // Only B is wrapped in a link
        assert_eq!(html.matches("class=\"card-link\"").count(), 1);
        assert!(html.contains(r#"<a class="card-link" href="https://x""#));
        // Site title is escaped
        assert!(html.contains("Test &lt;Site&gt;"));
    }

    #[test]
    fn test_card_urls_escaped_in_attributes() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut hostile = card("Q", "d", Some(r#"https://x/?q="><script>"#));
        hostile.img_src = Some(r#"/img/a".png"#.to_string());
        let listing = ListingData {
            name: "projects".to_string(),
            title: "Projects".to_string(),
            path: "/projects/".to_string(),
            cards: vec![hostile],
        };
        let mut context = Context::new();
        context.insert("site", &site_data());
        context.insert("current_path", &listing.path);
        context.insert("listing", &listing);

        let html = renderer.render("listing.html", &context).unwrap();
        assert!(html.contains(r#"href="https://x/?q=&quot;&gt;&lt;script&gt;""#));
        assert!(html.contains(r#"src="/img/a&quot;.png""#));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_truncate_chars_filter() {
        let mut args = HashMap::new();
        args.insert("length".to_string(), tera::Value::from(5));
        let out = truncate_chars_filter(&tera::Value::from("Hello world"), &args).unwrap();
        assert_eq!(out, tera::Value::from("Hello…"));
    }

    #[test]
    fn test_date_format_filter() {
        let mut args = HashMap::new();
        args.insert("format".to_string(), tera::Value::from("LL"));
        let out = date_format_filter(&tera::Value::from("2023-05-03"), &args).unwrap();
        assert_eq!(out, tera::Value::from("May 3, 2023"));
    }
}
