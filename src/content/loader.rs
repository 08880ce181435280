//! Content loader - loads entries from the source directory

use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::{Entry, MarkdownRenderer, RenderContext};
use crate::error::Loaded;
use crate::Site;

/// Directory holding published entries
pub const POSTS_DIR: &str = "_posts";
/// Directory holding drafts; everything in it is a draft
pub const DRAFTS_DIR: &str = "_drafts";

/// Loads content from the source directory
pub struct ContentLoader<'a> {
    site: &'a Site,
    renderer: MarkdownRenderer,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(site: &'a Site) -> Self {
        let renderer = MarkdownRenderer::with_options(&site.config.highlight);
        Self { site, renderer }
    }

    /// Load every entry under `_posts` and `_drafts`, newest first
    ///
    /// Entries that fail to load are skipped and reported in the diagnostics.
    pub fn load_entries(&self) -> Loaded<Entry> {
        let mut loaded = Loaded::new();

        for (dir, is_draft_dir) in [(POSTS_DIR, false), (DRAFTS_DIR, true)] {
            let dir = self.site.source_dir.join(dir);
            if !dir.exists() {
                continue;
            }

            for entry in WalkDir::new(&dir)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if !path.is_file() || !is_markdown_file(path) {
                    continue;
                }

                let source = self.relative_source(path);
                let result = self.load_entry(path, &source).map(|mut entry| {
                    if is_draft_dir {
                        entry.draft = true;
                    }
                    entry
                });
                loaded.push(source, result);
            }
        }

        // Sort by date descending (newest first)
        loaded.items.sort_by(|a, b| b.date.cmp(&a.date));

        tracing::debug!(
            "Loaded {} entries ({} skipped)",
            loaded.items.len(),
            loaded.diagnostics.len()
        );

        loaded
    }

    /// Load a single entry from a file
    fn load_entry(&self, path: &Path, source: &str) -> anyhow::Result<Entry> {
        let text = fs::read_to_string(path)?;
        let ctx = RenderContext {
            config: &self.site.config,
            renderer: &self.renderer,
        };
        Ok(Entry::parse(source, &text, &ctx)?)
    }

    /// Source path relative to the source dir, with forward slashes
    fn relative_source(&self, path: &Path) -> String {
        path.strip_prefix(&self.site.source_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}
