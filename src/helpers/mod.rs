//! Helper functions shared by content rendering and page generation

mod html;
mod url;

pub use html::*;
pub use url::*;
