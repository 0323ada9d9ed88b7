//! "Quick Links" table-of-contents extraction.
//!
//! Authors wrote an in-page TOC as a "Quick Links:" paragraph followed by a run
//! of short numbered or linked paragraphs. The run ends at the first paragraph
//! that is neither, or that reads like body copy.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::text::{detag, numeral_for, slugify};
use crate::model::QuickLink;

/// Detagged length at which a paragraph stops looking like a TOC entry.
const MAX_ITEM_CHARS: usize = 200;

static ANNOUNCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<p\b[^>]*>\s*(?:<(?:strong|b|em|i|u|span)\b[^>]*>\s*)*quick\s+links?\s*:?\s*(?:</(?:strong|b|em|i|u|span)\s*>\s*)*:?\s*</p\s*>",
    )
    .unwrap()
});
static ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^\s*<p\b[^>]*>(.*?)</p\s*>").unwrap());
static NUMERAL_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[IVXLCDM]+|[0-9]+)\s*[.):]\s*").unwrap());
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b[^>]*\bhref[^>]*>(.*?)</a\s*>").unwrap());

/// Pull the quick-links block out of `html`.
///
/// Returns the markup with the announcement and consumed items removed, plus
/// one entry per item. Without an announcement the markup comes back as-is.
pub fn extract_quick_links(html: &str) -> (String, Vec<QuickLink>) {
    let Some(announce) = ANNOUNCE_RE.find(html) else {
        return (html.to_string(), Vec::new());
    };

    let mut links = Vec::new();
    let mut cursor = announce.end();
    while let Some(caps) = ITEM_RE.captures(&html[cursor..]) {
        let inner = &caps[1];
        let text = detag(inner);
        let numbered = NUMERAL_PREFIX_RE.is_match(&text);
        let linked = LINK_RE.is_match(inner);
        if !(numbered || linked) || text.chars().count() >= MAX_ITEM_CHARS {
            break;
        }

        let label = item_label(&text, inner);
        links.push(QuickLink {
            numeral: numeral_for(links.len()),
            id: slugify(&label),
            label,
        });
        cursor += caps[0].len();
    }

    debug!(count = links.len(), "quick links extracted");

    let mut out = String::with_capacity(html.len());
    out.push_str(&html[..announce.start()]);
    out.push_str(&html[cursor..]);
    (out, links)
}

fn item_label(text: &str, inner: &str) -> String {
    let label = NUMERAL_PREFIX_RE.replace(text, "").trim().to_string();
    if !label.is_empty() {
        return label;
    }
    LINK_RE
        .captures(inner)
        .map(|c| detag(&c[1]))
        .unwrap_or_default()
}
