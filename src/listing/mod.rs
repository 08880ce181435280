//! Listings - statically declared records shown as cards (e.g. projects)
//!
//! Each data file under `source/_data/` is one listing. The file holds either
//! a bare sequence of records or a document with an optional `title` and an
//! `items` sequence (the only form TOML allows).

mod record;

pub use record::{validate_records, Card, ListingRecord, RawListingRecord};

use anyhow::{anyhow, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::error::Loaded;
use crate::Site;

/// A named, ordered listing
#[derive(Debug, Clone)]
pub struct Listing {
    /// File stem of the data file
    pub name: String,
    /// Display title
    pub title: String,
    /// Valid records, in file order
    pub records: Vec<ListingRecord>,
}

impl Listing {
    /// One card per record, in record order
    pub fn cards(&self) -> Vec<Card> {
        self.records.iter().map(Card::from).collect()
    }

    /// URL path segment of the listing page
    pub fn slug(&self) -> String {
        slug::slugify(&self.name)
    }
}

/// A data file, with its records left as plain values until validation
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListingFile {
    Items(Vec<Value>),
    Document {
        #[serde(default)]
        title: Option<String>,
        items: Vec<Value>,
    },
}

impl ListingFile {
    fn parse(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let file: Self = match ext {
            "yml" | "yaml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            "toml" => toml::from_str(&content)?,
            _ => return Err(anyhow!("unsupported listing format: {:?}", path)),
        };
        Ok(file)
    }

    fn into_parts(self) -> (Option<String>, Vec<Value>) {
        match self {
            Self::Items(items) => (None, items),
            Self::Document { title, items } => (title, items),
        }
    }
}

/// Loads every listing from the data directory
pub struct ListingLoader<'a> {
    site: &'a Site,
}

impl<'a> ListingLoader<'a> {
    pub fn new(site: &'a Site) -> Self {
        Self { site }
    }

    /// Load all listings, sorted by name
    ///
    /// An unreadable file, a file whose page would clash with another page,
    /// and each invalid record are reported as diagnostics; the rest still
    /// load.
    pub fn load_all(&self) -> Loaded<Listing> {
        let mut loaded = Loaded::new();
        let mut taken: HashSet<String> = self.reserved_slugs();
        let data_dir = self.site.data_dir();
        if !data_dir.exists() {
            return loaded;
        }

        for entry in WalkDir::new(&data_dir)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !is_listing_file(path) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let slug = slug::slugify(name);
            if slug.is_empty() || taken.contains(&slug) {
                loaded.report(
                    path.display().to_string(),
                    anyhow!("listing page /{}/ clashes with another page", slug),
                );
                continue;
            }

            match ListingFile::parse(path) {
                Ok(file) => {
                    taken.insert(slug);
                    let (title, raw) = file.into_parts();
                    let records = validate_records(name, raw);
                    loaded.diagnostics.extend(records.diagnostics);
                    loaded.items.push(Listing {
                        name: name.to_string(),
                        title: title.unwrap_or_else(|| default_title(name)),
                        records: records.items,
                    });
                }
                Err(e) => loaded.report(path.display().to_string(), e),
            }
        }

        tracing::debug!("Loaded {} listings", loaded.items.len());
        loaded
    }

    /// Top-level directories the generator already writes into
    fn reserved_slugs(&self) -> HashSet<String> {
        let config = &self.site.config;
        [&config.tag_dir, &config.archive_dir, &config.pagination_dir]
            .into_iter()
            .map(slug::slugify)
            .collect()
    }
}

fn is_listing_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml" | "yaml" | "json" | "toml")
    )
}

/// "side-projects" -> "Side Projects"
fn default_title(name: &str) -> String {
    name.split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn site_with_data(files: &[(&str, &str)]) -> (TempDir, Site) {
        let tmp = TempDir::new().unwrap();
        let data = tmp.path().join("source").join("_data");
        fs::create_dir_all(&data).unwrap();
        for (name, content) in files {
            fs::write(data.join(name), content).unwrap();
        }
        let site = Site::new(tmp.path()).unwrap();
        (tmp, site)
    }

    #[test]
    fn test_load_yaml_sequence() {
        let (_tmp, site) = site_with_data(&[(
            "projects.yml",
            "- title: A\n  description: d1\n- title: B\n  description: d2\n  href: https://x\n",
        )]);
        let loaded = ListingLoader::new(&site).load_all();
        assert!(loaded.is_clean());
        let listing = &loaded.items[0];
        assert_eq!(listing.name, "projects");
        assert_eq!(listing.title, "Projects");
        let cards = listing.cards();
        assert_eq!(cards.len(), 2);
        assert_eq!((cards[0].title.as_str(), cards[0].linked), ("A", false));
        assert_eq!((cards[1].title.as_str(), cards[1].linked), ("B", true));
    }

    #[test]
    fn test_load_json_and_toml_documents() {
        let (_tmp, site) = site_with_data(&[
            (
                "talks.json",
                r#"{"title": "Talks I Gave", "items": [{"title": "T", "description": "d", "imgSrc": "/t.png"}]}"#,
            ),
            (
                "tools.toml",
                "[[items]]\ntitle = \"hammer\"\ndescription = \"hits things\"\n",
            ),
        ]);
        let loaded = ListingLoader::new(&site).load_all();
        assert!(loaded.is_clean());
        assert_eq!(loaded.items.len(), 2);
        assert_eq!(loaded.items[0].title, "Talks I Gave");
        assert_eq!(loaded.items[0].records[0].img_src.as_deref(), Some("/t.png"));
        assert_eq!(loaded.items[1].name, "tools");
        assert_eq!(loaded.items[1].records[0].title, "hammer");
    }

    #[test]
    fn test_bad_record_and_bad_file_reported() {
        let (_tmp, site) = site_with_data(&[
            (
                "projects.yml",
                "- title: A\n  description: d1\n- title: B\n- title: C\n  description: d3\n",
            ),
            ("broken.yml", "title: [oops\n"),
        ]);
        let loaded = ListingLoader::new(&site).load_all();
        assert_eq!(loaded.items.len(), 1);
        let titles: Vec<_> = loaded.items[0]
            .records
            .iter()
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(titles, vec!["A", "C"]);
        assert_eq!(loaded.diagnostics.len(), 2);
        assert!(loaded.diagnostics.iter().any(|d| d.source == "projects[1]"));
        assert!(loaded
            .diagnostics
            .iter()
            .any(|d| d.source.ends_with("broken.yml")));
    }

    #[test]
    fn test_default_title() {
        assert_eq!(default_title("side-projects"), "Side Projects");
        assert_eq!(default_title("reading_list"), "Reading List");
    }

    #[test]
    fn test_scalar_title_does_not_sink_the_file() {
        let (_tmp, site) = site_with_data(&[(
            "projects.yml",
            "- title: A\n  description: d1\n- title: 2048\n  description: puzzle game\n- title: C\n  description: d3\n",
        )]);
        let loaded = ListingLoader::new(&site).load_all();
        assert!(loaded.is_clean());
        assert_eq!(loaded.items.len(), 1);
        let titles: Vec<_> = loaded.items[0]
            .records
            .iter()
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(titles, vec!["A", "2048", "C"]);
    }

    #[test]
    fn test_misshapen_record_skipped_in_toml() {
        let (_tmp, site) = site_with_data(&[(
            "tools.toml",
            "[[items]]\ntitle = \"hammer\"\ndescription = \"hits\"\n\n[[items]]\ntitle = [\"a\", \"b\"]\ndescription = \"bad\"\n\n[[items]]\ntitle = \"saw\"\ndescription = \"cuts\"\n",
        )]);
        let loaded = ListingLoader::new(&site).load_all();
        let titles: Vec<_> = loaded.items[0]
            .records
            .iter()
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(titles, vec!["hammer", "saw"]);
        assert_eq!(loaded.diagnostics.len(), 1);
        assert_eq!(loaded.diagnostics[0].source, "tools[1]");
    }

    #[test]
    fn test_clashing_listing_names_rejected() {
        let item = "- title: A\n  description: d\n";
        let (_tmp, site) = site_with_data(&[
            ("tags.yml", item),
            ("archives.yml", item),
            ("projects.json", r#"[{"title": "J", "description": "d"}]"#),
            ("projects.yml", item),
            ("talks.yml", item),
        ]);
        let loaded = ListingLoader::new(&site).load_all();
        let names: Vec<_> = loaded.items.iter().map(|l| l.name.as_str()).collect();
        // Files are visited by name, so projects.json claims the page first
        assert_eq!(names, vec!["projects", "talks"]);
        assert_eq!(loaded.items[0].records[0].title, "J");
        assert_eq!(loaded.diagnostics.len(), 3);
        for bad in ["tags.yml", "archives.yml", "projects.yml"] {
            assert!(loaded.diagnostics.iter().any(|d| d.source.ends_with(bad)));
        }
    }
}
