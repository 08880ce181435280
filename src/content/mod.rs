//! Content module - entries, front-matter and body rendering

pub mod embed;
mod entry;
mod frontmatter;
mod index;
pub mod loader;
mod markdown;

pub use entry::{Entry, EntrySummary, RenderContext};
pub use frontmatter::FrontMatter;
pub use index::{tag_slug, ContentIndex, IndexPolicy, TagGroup};
pub use markdown::MarkdownRenderer;
