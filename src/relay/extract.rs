//! Turns a Reddit entry summary into a markdown post body.
//!
//! Reddit's feed summaries end with a row of anchors: the author, the shared
//! link and the comments page. Each anchor becomes one bullet line, and the
//! `[link]` anchor's target is lifted out as the post URL.
use scraper::{ElementRef, Html};
use std::fmt::Write;

use crate::util::unescape_html;

const LINK_TOKEN: &str = "[link]";
const COMMENTS_TOKEN: &str = "[comments]";
const AUTHOR_PREFIX: &str = "/u/";

/// Markdown body and shared URL pulled from a summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    /// One `- [label](href)` line per anchor, in document order.
    pub body: String,
    /// Target of the anchor whose text is exactly `[link]`.
    pub url: Option<String>,
}

/// Label shown for an anchor with the given visible text.
pub fn derive_label(text: &str) -> String {
    if text == LINK_TOKEN {
        return "Link Shared on Reddit".to_string();
    }
    if text == COMMENTS_TOKEN {
        return "Original Reddit Comments".to_string();
    }
    if text.starts_with(AUTHOR_PREFIX) {
        return format!("Author: {text}");
    }

    let text = text.strip_prefix('[').unwrap_or(text);
    let text = text.strip_suffix(']').unwrap_or(text);
    unescape_html(text).into_owned()
}

/// Build the post body from `html` and find the shared URL.
///
/// If several anchors read `[link]` the last one wins.
pub fn format_and_extract(html: &str) -> Extracted {
    let fragment = Html::parse_fragment(html);
    let mut extracted = Extracted::default();

    for node in fragment.root_element().descendants() {
        let Some(anchor) = ElementRef::wrap(node) else {
            continue;
        };
        if anchor.value().name() != "a" {
            continue;
        }

        let text: String = anchor.text().collect();
        let text = text.trim();
        let href = anchor.value().attr("href").unwrap_or_default();

        if text == LINK_TOKEN {
            extracted.url = Some(href.to_string());
        }

        // Writing to a String cannot fail
        let _ = writeln!(extracted.body, "- [{}]({})", derive_label(text), href);
    }

    extracted
}
