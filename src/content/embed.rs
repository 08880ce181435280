//! Embedded external content (social posts) inside entry bodies
//!
//! A body may contain a tag such as
//!
//! ```text
//! {% tweet 1234567890 theme=dark lang="en" %}
//! ```
//!
//! which is replaced by a fixed container wrapping the markup the
//! third-party widget script looks for. Every property is passed through
//! as a `data-*` attribute exactly as authored; rendering of the post itself
//! happens client-side.

use lazy_static::lazy_static;
use pulldown_cmark::{Event, Parser, Tag};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::ops::Range;

use super::markdown::markdown_options;
use crate::helpers::escape_html;

lazy_static! {
    static ref EMBED_TAG: Regex = Regex::new(r"\{%\s*([A-Za-z_]\w*)\s+([^%]*?)\s*%\}").unwrap();
    static ref PROPERTY: Regex =
        Regex::new(r#"([A-Za-z_][\w-]*)=(?:"([^"]*)"|(\S+))"#).unwrap();
}

const TWEET_SCRIPT: &str =
    r#"<script async src="https://platform.twitter.com/widgets.js" charset="utf-8"></script>"#;

/// Supported embed widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedKind {
    Tweet,
}

impl EmbedKind {
    fn from_tag(name: &str) -> Option<Self> {
        match name {
            "tweet" => Some(Self::Tweet),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Tweet => "tweet",
        }
    }

    fn script(&self) -> &'static str {
        match self {
            Self::Tweet => TWEET_SCRIPT,
        }
    }
}

/// One embedded widget: an identifier plus its pass-through properties
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedWidget {
    pub kind: EmbedKind,
    pub id: String,
    /// Properties in authored order
    pub props: Vec<(String, String)>,
}

impl EmbedWidget {
    /// Parse the arguments of an embed tag: the id first, then `key=value` pairs
    pub fn parse(kind: EmbedKind, args: &str) -> Option<Self> {
        let args = args.trim();
        let (id, rest) = match args.split_once(char::is_whitespace) {
            Some((id, rest)) => (id, rest),
            None => (args, ""),
        };
        if id.is_empty() || id.contains('=') {
            return None;
        }

        let props = PROPERTY
            .captures_iter(rest)
            .map(|cap| {
                let value = cap.get(2).or_else(|| cap.get(3)).map_or("", |m| m.as_str());
                (cap[1].to_string(), value.to_string())
            })
            .collect();

        Some(Self {
            kind,
            id: id.to_string(),
            props,
        })
    }

    /// Render the widget markup inside its container
    pub fn render(&self) -> String {
        let mut attrs = format!(r#" data-id="{}""#, escape_html(&self.id));
        for (key, value) in &self.props {
            attrs.push_str(&format!(r#" data-{}="{}""#, key, escape_html(value)));
        }

        let inner = match self.kind {
            EmbedKind::Tweet => format!(
                r#"<blockquote class="twitter-tweet"{}><a href="https://twitter.com/i/status/{}">View post</a></blockquote>"#,
                attrs,
                escape_html(&self.id)
            ),
        };

        format!(
            r#"<div class="folio-embed folio-embed-{}">{}</div>"#,
            self.kind.name(),
            inner
        )
    }
}

/// Byte ranges of code blocks and code spans in a Markdown body
fn code_ranges(markdown: &str) -> Vec<Range<usize>> {
    Parser::new_ext(markdown, markdown_options())
        .into_offset_iter()
        .filter(|(event, _)| matches!(event, Event::Start(Tag::CodeBlock(_)) | Event::Code(_)))
        .map(|(_, range)| range)
        .collect()
}

/// Replace every known embed tag in a Markdown body with widget markup
///
/// Tags inside code blocks and code spans are text, not widgets. The widget
/// script is appended once per body for each kind used. Unknown tags are
/// left untouched.
pub fn expand_embeds(markdown: &str) -> Cow<'_, str> {
    if !EMBED_TAG.is_match(markdown) {
        return Cow::Borrowed(markdown);
    }

    let code = code_ranges(markdown);
    let mut used: Vec<EmbedKind> = Vec::new();

    let expanded = EMBED_TAG.replace_all(markdown, |cap: &Captures| {
        let in_code = cap
            .get(0)
            .is_some_and(|m| code.iter().any(|r| r.contains(&m.start())));
        if in_code {
            return cap[0].to_string();
        }

        let widget = EmbedKind::from_tag(&cap[1]).and_then(|kind| EmbedWidget::parse(kind, &cap[2]));
        match widget {
            Some(widget) => {
                if !used.contains(&widget.kind) {
                    used.push(widget.kind);
                }
                // Blank lines around it keep the container a standalone HTML block
                format!("\n\n{}\n\n", widget.render())
            }
            None => cap[0].to_string(),
        }
    });

    if used.is_empty() {
        return expanded;
    }

    let mut out = expanded.into_owned();
    for kind in used {
        out.push_str("\n\n");
        out.push_str(kind.script());
        out.push('\n');
    }
    Cow::Owned(out)
}
