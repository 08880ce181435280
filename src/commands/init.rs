//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# Site
title: My Site
subtitle: ''
description: ''
author: John Doe
language: en

# URL
url: http://example.com
root: /
permalink: :year/:month/:day/:title/

# Directory
source_dir: source
public_dir: public
tag_dir: tags
archive_dir: archives
data_dir: _data

# Writing
render_drafts: false
highlight:
  line_number: true
  theme: base16-ocean.dark

# Home page
per_page: 10
pagination_dir: page

# Feed
feed:
  enable: true
  limit: 20
"#;

const HELLO_WORLD: &str = r#"---
title: Hello World
date: 2024-01-01
tags: [meta]
summary: The first entry of this site.
---

Welcome! Entries live in `source/_posts`, drafts in `source/_drafts`.

<!-- more -->

Run `folio generate` to build the site into `public/`.
"#;

const PROJECTS: &str = r#"- title: folio
  description: The generator that built this site.
  href: https://example.com/folio
- title: Notebook
  description: Things I am still figuring out.
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir.join("source/_posts"))?;
    fs::create_dir_all(target_dir.join("source/_drafts"))?;
    fs::create_dir_all(target_dir.join("source/_data"))?;

    write_if_missing(&target_dir.join("_config.yml"), DEFAULT_CONFIG)?;
    write_if_missing(&target_dir.join("source/_posts/hello-world.md"), HELLO_WORLD)?;
    write_if_missing(&target_dir.join("source/_data/projects.yml"), PROJECTS)?;

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        tracing::debug!("Keeping existing {:?}", path);
        return Ok(());
    }
    fs::write(path, content)?;
    tracing::debug!("Created {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Site;
    use tempfile::TempDir;

    #[test]
    fn test_init_then_generate() {
        let tmp = TempDir::new().unwrap();
        init_site(tmp.path()).unwrap();

        let site = Site::new(tmp.path()).unwrap();
        assert_eq!(site.config.title, "My Site");

        let report = site.generate().unwrap();
        assert!(report.is_clean());
        assert_eq!(report.entries, 1);
        assert_eq!(report.listings, 1);
        assert!(site.public_dir.join("2024/01/01/hello-world/index.html").exists());
        assert!(site.public_dir.join("projects/index.html").exists());
    }
}
