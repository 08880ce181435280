//! Create a new entry

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::content::loader::{DRAFTS_DIR, POSTS_DIR};
use crate::Site;

/// Front-matter written into a fresh entry
#[derive(Serialize)]
struct Scaffold<'a> {
    title: &'a str,
    date: String,
    tags: Vec<String>,
    draft: bool,
    summary: &'a str,
}

/// Create a new entry file under `_posts` (or `_drafts`)
///
/// The body is left empty; the entry is skipped at build time until it has one.
pub fn create_entry(site: &Site, title: &str, draft: bool) -> Result<PathBuf> {
    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Title {:?} gives an empty file name", title);
    }

    let target_dir = site
        .source_dir
        .join(if draft { DRAFTS_DIR } else { POSTS_DIR });
    fs::create_dir_all(&target_dir)?;

    let file_path = target_dir.join(format!("{}.md", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let scaffold = Scaffold {
        title,
        date: chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        tags: Vec::new(),
        draft,
        summary: "",
    };
    let content = format!("---\n{}---\n\n", serde_yaml::to_string(&scaffold)?);

    fs::write(&file_path, content)?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FrontMatter;
    use tempfile::TempDir;

    #[test]
    fn test_create_entry() {
        let tmp = TempDir::new().unwrap();
        let site = Site::new(tmp.path()).unwrap();

        let path = create_entry(&site, "Why I Still Write: Notes", false).unwrap();
        assert_eq!(
            path,
            site.source_dir.join("_posts/why-i-still-write-notes.md")
        );

        let text = fs::read_to_string(&path).unwrap();
        let (fm, _) = FrontMatter::parse(&text).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Why I Still Write: Notes"));
        assert!(fm.parse_date().is_some());
        assert!(!fm.draft);
    }

    #[test]
    fn test_create_draft_and_refuse_overwrite() {
        let tmp = TempDir::new().unwrap();
        let site = Site::new(tmp.path()).unwrap();

        let path = create_entry(&site, "Half Baked", true).unwrap();
        assert!(path.starts_with(site.source_dir.join("_drafts")));
        assert!(create_entry(&site, "Half Baked", true).is_err());
    }
}
