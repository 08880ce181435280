//! Public index of entries

use chrono::Datelike;
use std::collections::BTreeMap;

use super::{Entry, EntrySummary};

/// URL segment of a tag page
///
/// Tags that differ only in case or punctuation share a page. A tag with
/// nothing to slug (`++`) is addressed by its hex-encoded bytes instead.
pub fn tag_slug(tag: &str) -> String {
    let tag = tag.trim();
    let slug = slug::slugify(tag);
    if slug.is_empty() {
        tag.bytes().map(|b| format!("{:02x}", b)).collect()
    } else {
        slug
    }
}

/// Entries sharing one tag page
#[derive(Debug)]
pub struct TagGroup<'a> {
    /// Spelling shown on the page: the first one met, newest entry first
    pub name: &'a str,
    pub slug: String,
    pub entries: Vec<&'a Entry>,
}

/// Which entries a public listing may show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexPolicy {
    /// Drafts are left out
    #[default]
    PublicOnly,
    /// Drafts are listed as well
    IncludeDrafts,
}

impl IndexPolicy {
    pub fn from_render_drafts(render_drafts: bool) -> Self {
        if render_drafts {
            Self::IncludeDrafts
        } else {
            Self::PublicOnly
        }
    }

    pub fn admits(&self, entry: &Entry) -> bool {
        match self {
            Self::PublicOnly => !entry.draft,
            Self::IncludeDrafts => true,
        }
    }
}

/// Entries that appear on index, archive, tag and feed pages, newest first
///
/// Entries that are not listed can still be rendered on their own page.
#[derive(Debug)]
pub struct ContentIndex<'a> {
    entries: Vec<&'a Entry>,
}

impl<'a> ContentIndex<'a> {
    pub fn build(entries: &'a [Entry], policy: IndexPolicy) -> Self {
        let mut listed: Vec<&Entry> = entries.iter().filter(|e| policy.admits(e)).collect();
        listed.sort_by(|a, b| b.date.cmp(&a.date));
        Self { entries: listed }
    }

    pub fn entries(&self) -> &[&'a Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, entry: &Entry) -> bool {
        self.entries.iter().any(|e| e.source == entry.source)
    }

    pub fn summaries(&self) -> Vec<EntrySummary> {
        self.entries.iter().map(|e| e.summary()).collect()
    }

    /// Neighbours of an entry in the index: (older, newer)
    pub fn neighbours(&self, entry: &Entry) -> (Option<&'a Entry>, Option<&'a Entry>) {
        match self.entries.iter().position(|e| e.source == entry.source) {
            Some(pos) => (
                self.entries.get(pos + 1).copied(),
                pos.checked_sub(1).and_then(|i| self.entries.get(i).copied()),
            ),
            None => (None, None),
        }
    }

    /// Entries grouped by tag page, sorted by slug
    ///
    /// An entry that repeats a tag (in any spelling) is still listed once
    /// under it.
    pub fn by_tag(&self) -> Vec<TagGroup<'a>> {
        let mut groups: BTreeMap<String, TagGroup<'a>> = BTreeMap::new();
        for &entry in &self.entries {
            for tag in &entry.tags {
                let tag = tag.trim();
                if tag.is_empty() {
                    continue;
                }
                let slug = tag_slug(tag);
                let group = groups.entry(slug.clone()).or_insert_with(|| TagGroup {
                    name: tag,
                    slug,
                    entries: Vec::new(),
                });
                if !group.entries.iter().any(|e| e.source == entry.source) {
                    group.entries.push(entry);
                }
            }
        }
        groups.into_values().collect()
    }

    /// Entries grouped by year, newest year first
    pub fn by_year(&self) -> Vec<(i32, Vec<&'a Entry>)> {
        let mut years: BTreeMap<i32, Vec<&'a Entry>> = BTreeMap::new();
        for &entry in &self.entries {
            years.entry(entry.date.year()).or_default().push(entry);
        }
        years.into_iter().rev().collect()
    }
}
