//! News article page state and rich-text handling.
//!
//! Article bodies are server-supplied HTML. They go through `ammonia` before
//! anything else looks at them, and only the sanitized markup is flattened to
//! terminal text.

use crate::catalog::{Article, FetchError};
use tracing::warn;

/// What the article page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleView {
    /// Request in flight
    Loading,
    /// Request failed
    Failed(String),
    /// Backend has no such article
    NotFound,
    /// Article exists but has no writer attached
    MissingWriter,
    /// Article ready to display
    Ready(Article),
}

impl ArticleView {
    /// Build the page state from a finished article request.
    pub fn from_result(result: Result<Option<Article>, FetchError>) -> Self {
        match result {
            Ok(Some(article)) if article.writer.is_none() => ArticleView::MissingWriter,
            Ok(Some(article)) => ArticleView::Ready(article),
            Ok(None) => ArticleView::NotFound,
            Err(e) => {
                warn!(error = %e, "Error fetching article");
                ArticleView::Failed("Error fetching article".to_string())
            }
        }
    }

    /// Message for every state except `Ready`.
    pub fn message(&self) -> Option<&str> {
        match self {
            ArticleView::Loading => Some("Loading..."),
            ArticleView::Failed(message) => Some(message),
            ArticleView::NotFound => Some("No article found."),
            ArticleView::MissingWriter => Some("Writer information is not available."),
            ArticleView::Ready(_) => None,
        }
    }
}

/// Remove script-executing tags and attributes, keep formatting tags.
pub fn sanitize_html(html: &str) -> String {
    ammonia::clean(html)
}

/// Tags that end a line of text.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre",
    "tr", "table", "hr",
];

/// Sanitize article HTML and flatten it to display lines.
///
/// # Arguments
/// * `html` - Untrusted HTML from the backend
///
/// # Returns
/// * `Vec<String>` - Non-empty text lines, one per block
pub fn render_rich_text(html: &str) -> Vec<String> {
    let clean = sanitize_html(html);
    let mut text = String::with_capacity(clean.len());
    let mut rest = clean.as_str();

    // Text '<' is always escaped in sanitized output, so every '<' opens a tag
    while let Some(open) = rest.find('<') {
        text.push_str(&rest[..open]);
        let Some(close) = rest[open..].find('>') else {
            rest = "";
            break;
        };
        let tag = &rest[open + 1..open + close];
        let name: String = tag
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        if BLOCK_TAGS.contains(&name.as_str()) {
            text.push('\n');
            if name == "li" && !tag.starts_with('/') {
                text.push_str("• ");
            }
        }
        rest = &rest[open + close + 1..];
    }
    text.push_str(rest);

    decode_entities(&text)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Decode the entities ammonia emits when serializing text.
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
