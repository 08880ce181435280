//! Generator module - writes the static site using the built-in Tera templates

use anyhow::{Context as _, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use tera::Context;
use walkdir::WalkDir;

use crate::content::{tag_slug, ContentIndex, Entry, EntrySummary, IndexPolicy};
use crate::helpers::{
    absolutize_urls, escape_xml, full_url_for, strip_html, strip_invalid_xml_chars, url_for,
};
use crate::listing::Listing;
use crate::templates::{
    ArchiveYearData, EntryData, ListingData, MenuItem, NavEntry, PaginationData, SiteData,
    TagData, TemplateRenderer,
};
use crate::Site;

/// One record of `search.json`: the entry summary plus its plain text
#[derive(Debug, Serialize)]
struct SearchRecord {
    #[serde(flatten)]
    summary: EntrySummary,
    content: String,
}

/// Static site generator using Tera templates
pub struct Generator {
    site: Site,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;

        Ok(Self {
            site: site.clone(),
            renderer,
        })
    }

    /// Generate the entire site; returns the number of pages written
    pub fn generate(&self, entries: &[Entry], listings: &[Listing]) -> Result<usize> {
        fs::create_dir_all(&self.site.public_dir)?;

        // Copy source assets (images, etc.)
        self.copy_source_assets()?;

        let policy = IndexPolicy::from_render_drafts(self.site.config.render_drafts);
        let index = ContentIndex::build(entries, policy);
        let site_data = self.build_site_data(listings);

        let mut written = 0;
        written += self.generate_index_pages(&index, &site_data)?;
        written += self.generate_entry_pages(entries, &index, &site_data)?;
        written += self.generate_archive_page(&index, &site_data)?;
        written += self.generate_tag_pages(&index, &site_data)?;
        written += self.generate_listing_pages(listings, &site_data)?;

        if self.site.config.feed.enable {
            self.generate_atom_feed(&index)?;
        }
        self.generate_search_index(&index)?;

        Ok(written)
    }

    /// Build site data for templates
    fn build_site_data(&self, listings: &[Listing]) -> SiteData {
        let config = &self.site.config;

        let mut menu = vec![
            MenuItem {
                name: "Home".to_string(),
                path: url_for(config, ""),
            },
            MenuItem {
                name: "Archives".to_string(),
                path: url_for(config, &format!("{}/", config.archive_dir)),
            },
            MenuItem {
                name: "Tags".to_string(),
                path: url_for(config, &format!("{}/", config.tag_dir)),
            },
        ];
        menu.extend(listings.iter().map(|l| MenuItem {
            name: l.title.clone(),
            path: self.listing_path(l),
        }));

        SiteData {
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            url: config.url.clone(),
            root: url_for(config, ""),
            menu,
            current_year: chrono::Local::now().format("%Y").to_string(),
            feed: config.feed.enable,
        }
    }

    fn tag_path(&self, tag: &str) -> String {
        url_for(
            &self.site.config,
            &format!("{}/{}/", self.site.config.tag_dir, tag_slug(tag)),
        )
    }

    fn listing_path(&self, listing: &Listing) -> String {
        url_for(&self.site.config, &format!("{}/", listing.slug()))
    }

    fn entry_data(&self, entry: &Entry) -> EntryData {
        EntryData::new(entry, |t| self.tag_path(t))
    }

    /// Entry data without the body, for list pages
    fn entry_link_data(&self, entry: &Entry) -> EntryData {
        let mut data = self.entry_data(entry);
        data.content = String::new();
        data.excerpt = None;
        data
    }

    /// Create a base context with common variables
    fn create_base_context(&self, site_data: &SiteData, current_path: &str) -> Context {
        let mut context = Context::new();
        context.insert("site", site_data);
        context.insert("current_path", current_path);
        context
    }

    /// Map a URL path (with root) to the `index.html` it is served from
    fn output_path(&self, url_path: &str) -> PathBuf {
        let root = self.site.config.root.trim_end_matches('/');
        let relative = url_path
            .strip_prefix(root)
            .unwrap_or(url_path)
            .trim_matches('/');
        if relative.is_empty() {
            self.site.public_dir.join("index.html")
        } else {
            self.site.public_dir.join(relative).join("index.html")
        }
    }

    fn render_to(&self, template: &str, context: &Context, url_path: &str) -> Result<()> {
        let html = self.renderer.render(template, context)?;
        write_file(&self.output_path(url_path), &html)
    }

    /// Generate index pages with pagination
    fn generate_index_pages(&self, index: &ContentIndex<'_>, site_data: &SiteData) -> Result<usize> {
        let config = &self.site.config;
        let per_page = config.page_size();
        let total_pages = index.len().div_ceil(per_page).max(1);
        let page_url = |n: usize| {
            if n == 1 {
                url_for(config, "")
            } else {
                url_for(config, &format!("{}/{}/", config.pagination_dir, n))
            }
        };

        for page_num in 1..=total_pages {
            let start = (page_num - 1) * per_page;
            let end = (start + per_page).min(index.len());
            let page_entries: Vec<EntryData> = index.entries()[start..end]
                .iter()
                .map(|e| self.entry_data(e))
                .collect();

            let pagination = PaginationData {
                per_page,
                total: total_pages,
                current: page_num,
                prev_link: if page_num > 1 {
                    page_url(page_num - 1)
                } else {
                    String::new()
                },
                next_link: if page_num < total_pages {
                    page_url(page_num + 1)
                } else {
                    String::new()
                },
            };

            let current_url = page_url(page_num);
            let mut context = self.create_base_context(site_data, &current_url);
            context.insert("page_entries", &page_entries);
            context.insert("pagination", &pagination);

            self.render_to("index.html", &context, &current_url)?;
            tracing::debug!("Generated index page {}", page_num);
        }

        Ok(total_pages)
    }

    /// Generate one page per entry, drafts included
    fn generate_entry_pages(
        &self,
        entries: &[Entry],
        index: &ContentIndex<'_>,
        site_data: &SiteData,
    ) -> Result<usize> {
        for entry in entries {
            let (older, newer) = index.neighbours(entry);
            let nav = |e: &Entry| NavEntry {
                title: e.title.clone(),
                path: e.path.clone(),
            };

            let mut context = self.create_base_context(site_data, &entry.path);
            context.insert("entry", &self.entry_data(entry));
            context.insert("prev_entry", &older.map(nav));
            context.insert("next_entry", &newer.map(nav));

            self.render_to("entry.html", &context, &entry.path)
                .with_context(|| format!("Failed to write entry {}", entry.source))?;
            tracing::debug!("Generated entry: {}", entry.path);
        }

        Ok(entries.len())
    }

    /// Generate archive page
    fn generate_archive_page(&self, index: &ContentIndex<'_>, site_data: &SiteData) -> Result<usize> {
        let archive_years: Vec<ArchiveYearData> = index
            .by_year()
            .into_iter()
            .map(|(year, entries)| ArchiveYearData {
                year,
                entries: entries.into_iter().map(|e| self.entry_link_data(e)).collect(),
            })
            .collect();

        let path = url_for(
            &self.site.config,
            &format!("{}/", self.site.config.archive_dir),
        );
        let mut context = self.create_base_context(site_data, &path);
        context.insert("archive_years", &archive_years);

        self.render_to("archive.html", &context, &path)?;
        tracing::debug!("Generated archive page");

        Ok(1)
    }

    /// Generate the tag overview and one page per tag
    fn generate_tag_pages(&self, index: &ContentIndex<'_>, site_data: &SiteData) -> Result<usize> {
        let all_tags: Vec<TagData> = index
            .by_tag()
            .into_iter()
            .map(|group| TagData {
                name: group.name.to_string(),
                path: url_for(
                    &self.site.config,
                    &format!("{}/{}/", self.site.config.tag_dir, group.slug),
                ),
                count: group.entries.len(),
                entries: group
                    .entries
                    .into_iter()
                    .map(|e| self.entry_link_data(e))
                    .collect(),
            })
            .collect();

        let overview = url_for(&self.site.config, &format!("{}/", self.site.config.tag_dir));
        let mut context = self.create_base_context(site_data, &overview);
        context.insert("all_tags", &all_tags);
        self.render_to("tags.html", &context, &overview)?;

        for tag in &all_tags {
            let mut context = self.create_base_context(site_data, &tag.path);
            context.insert("tag", tag);
            self.render_to("tag.html", &context, &tag.path)?;
            tracing::debug!("Generated tag page: {}", tag.name);
        }

        Ok(all_tags.len() + 1)
    }

    /// Generate one card page per listing
    fn generate_listing_pages(&self, listings: &[Listing], site_data: &SiteData) -> Result<usize> {
        for listing in listings {
            let data = ListingData {
                name: listing.name.clone(),
                title: listing.title.clone(),
                path: self.listing_path(listing),
                cards: listing.cards(),
            };

            let mut context = self.create_base_context(site_data, &data.path);
            context.insert("listing", &data);
            self.render_to("listing.html", &context, &data.path)?;
            tracing::debug!(
                "Generated listing page: {} ({} cards)",
                listing.name,
                data.cards.len()
            );
        }

        Ok(listings.len())
    }

    /// Generate Atom feed
    fn generate_atom_feed(&self, index: &ContentIndex<'_>) -> Result<()> {
        let config = &self.site.config;
        let base_url = config.url.trim_end_matches('/');
        let updated = index
            .entries()
            .iter()
            .map(|e| e.updated.unwrap_or(e.date))
            .max()
            .map(|d| d.to_rfc3339())
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());

        let mut feed = String::new();
        feed.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
        feed.push('\n');
        feed.push_str(r#"<feed xmlns="http://www.w3.org/2005/Atom">"#);
        feed.push('\n');
        feed.push_str(&format!("  <title>{}</title>\n", escape_xml(&config.title)));
        let home = full_url_for(config, "");
        feed.push_str(&format!(
            "  <link href=\"{}\" rel=\"self\"/>\n",
            full_url_for(config, "atom.xml")
        ));
        feed.push_str(&format!("  <link href=\"{}\"/>\n", home));
        feed.push_str(&format!("  <updated>{}</updated>\n", updated));
        feed.push_str(&format!("  <id>{}</id>\n", home));
        feed.push_str(&format!(
            "  <author><name>{}</name></author>\n",
            escape_xml(&config.author)
        ));

        for entry in index.entries().iter().take(config.feed.limit) {
            feed.push_str("  <entry>\n");
            feed.push_str(&format!("    <title>{}</title>\n", escape_xml(&entry.title)));
            feed.push_str(&format!("    <link href=\"{}\"/>\n", entry.permalink));
            feed.push_str(&format!("    <id>{}</id>\n", entry.permalink));
            feed.push_str(&format!(
                "    <published>{}</published>\n",
                entry.date.to_rfc3339()
            ));
            feed.push_str(&format!(
                "    <updated>{}</updated>\n",
                entry.updated.unwrap_or(entry.date).to_rfc3339()
            ));
            if !entry.summary.is_empty() {
                feed.push_str(&format!(
                    "    <summary>{}</summary>\n",
                    escape_xml(&entry.summary)
                ));
            }
            for tag in &entry.tags {
                feed.push_str(&format!("    <category term=\"{}\"/>\n", escape_xml(tag)));
            }
            let content = entry.excerpt.as_ref().unwrap_or(&entry.content);
            let content = strip_invalid_xml_chars(&absolutize_urls(content, base_url));
            feed.push_str(&format!(
                "    <content type=\"html\"><![CDATA[{}]]></content>\n",
                content.replace("]]>", "]]]]><![CDATA[>")
            ));
            feed.push_str("  </entry>\n");
        }

        feed.push_str("</feed>\n");

        write_file(&self.site.public_dir.join("atom.xml"), &feed)?;
        tracing::info!("Generated atom.xml");

        Ok(())
    }

    /// Generate search index (JSON)
    fn generate_search_index(&self, index: &ContentIndex<'_>) -> Result<()> {
        let search_data: Vec<SearchRecord> = index
            .summaries()
            .into_iter()
            .zip(index.entries())
            .map(|(summary, e)| SearchRecord {
                summary,
                content: strip_html(&e.content),
            })
            .collect();

        let json = serde_json::to_string_pretty(&search_data)?;
        write_file(&self.site.public_dir.join("search.json"), &json)?;
        tracing::info!("Generated search.json");

        Ok(())
    }

    /// Copy source assets (images, etc.) to public directory
    ///
    /// Markdown files and `_`-prefixed directories (entries, drafts, data)
    /// are not copied.
    fn copy_source_assets(&self) -> Result<()> {
        let source_dir = &self.site.source_dir;
        if !source_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(source_dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('_'))
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let ext = path.extension().and_then(|e| e.to_str());
            if matches!(ext, Some("md") | Some("markdown")) {
                continue;
            }

            let relative = path.strip_prefix(source_dir)?;
            let dest = self.site.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
            tracing::debug!("Copied asset: {:?}", relative);
        }

        Ok(())
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
    }
    fs::write(path, content).map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", path, e))?;
    tracing::debug!("Generated: {:?}", path);
    Ok(())
}
