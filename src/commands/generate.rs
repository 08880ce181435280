//! Generate static files

use anyhow::Result;
use std::time::Instant;

use crate::content::loader::ContentLoader;
use crate::content::{ContentIndex, IndexPolicy};
use crate::error::Diagnostic;
use crate::generator::Generator;
use crate::listing::ListingLoader;
use crate::Site;

/// What a build produced, and what it had to skip
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Entries rendered to their own page
    pub entries: usize,
    /// Entries shown on index pages
    pub listed: usize,
    /// Listing pages rendered
    pub listings: usize,
    /// HTML pages written
    pub pages: usize,
    /// Entries and records that were skipped
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Generate the static site
///
/// Broken entries and listing records are skipped and reported; the rest of
/// the site is still written.
pub fn run(site: &Site) -> Result<BuildReport> {
    let start = Instant::now();

    let entries = ContentLoader::new(site).load_entries();
    let listings = ListingLoader::new(site).load_all();

    let listed = ContentIndex::build(
        &entries.items,
        IndexPolicy::from_render_drafts(site.config.render_drafts),
    )
    .len();
    tracing::info!(
        "Loaded {} entries ({} listed) and {} listings",
        entries.items.len(),
        listed,
        listings.items.len()
    );

    let generator = Generator::new(site)?;
    let pages = generator.generate(&entries.items, &listings.items)?;

    let mut diagnostics = entries.diagnostics;
    diagnostics.extend(listings.diagnostics);
    if !diagnostics.is_empty() {
        tracing::warn!("{} item(s) skipped", diagnostics.len());
    }

    let duration = start.elapsed();
    tracing::info!("Generated {} pages in {:.2}s", pages, duration.as_secs_f64());

    Ok(BuildReport {
        entries: entries.items.len(),
        listed,
        listings: listings.items.len(),
        pages,
        diagnostics,
    })
}
