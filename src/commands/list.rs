//! List site content

use anyhow::Result;

use crate::content::loader::ContentLoader;
use crate::content::{ContentIndex, IndexPolicy};
use crate::listing::ListingLoader;
use crate::Site;

/// List site content by type
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    match content_type {
        "post" | "posts" | "draft" | "drafts" => {
            let want_drafts = content_type.starts_with("draft");
            let loaded = ContentLoader::new(site).load_entries();
            let entries: Vec<_> = loaded
                .items
                .iter()
                .filter(|e| e.draft == want_drafts)
                .collect();
            println!(
                "{} ({}):",
                if want_drafts { "Drafts" } else { "Posts" },
                entries.len()
            );
            for entry in entries {
                println!(
                    "  {} - {} [{}]",
                    entry.date.format("%Y-%m-%d"),
                    entry.title,
                    entry.source
                );
            }
            print_skipped(&loaded.diagnostics);
        }
        "tag" | "tags" => {
            let loaded = ContentLoader::new(site).load_entries();
            let policy = IndexPolicy::from_render_drafts(site.config.render_drafts);
            let index = ContentIndex::build(&loaded.items, policy);
            let mut tags = index.by_tag();
            tags.sort_by(|a, b| b.entries.len().cmp(&a.entries.len()));
            println!("Tags ({}):", tags.len());
            for tag in tags {
                println!("  {} ({})", tag.name, tag.entries.len());
            }
        }
        "listing" | "listings" => {
            let loaded = ListingLoader::new(site).load_all();
            println!("Listings ({}):", loaded.items.len());
            for listing in &loaded.items {
                println!("  {} ({} records)", listing.title, listing.records.len());
                for record in &listing.records {
                    match &record.href {
                        Some(href) => println!("    - {} <{}>", record.title, href),
                        None => println!("    - {}", record.title),
                    }
                }
            }
            print_skipped(&loaded.diagnostics);
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, draft, tag, listing",
                content_type
            );
        }
    }

    Ok(())
}

fn print_skipped(diagnostics: &[crate::error::Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    println!("Skipped ({}):", diagnostics.len());
    for d in diagnostics {
        println!("  {}", d);
    }
}
