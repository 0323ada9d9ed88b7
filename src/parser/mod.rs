pub mod faq;
pub mod junk;
pub mod nesting;
pub mod quick_links;
pub mod sections;
pub mod text;

use crate::model::{ParseOptions, ParsedContent};
use text::suffix_duplicates;

/// Three-pass pipeline: raw blob → stripped markup → quick links → sections.
pub fn parse_content(raw: &str) -> ParsedContent {
    parse_content_with(raw, &ParseOptions::default())
}

pub fn parse_content_with(raw: &str, options: &ParseOptions) -> ParsedContent {
    let clean = junk::strip_junk(raw);
    let (body, mut quick_links) = quick_links::extract_quick_links(&clean);
    if options.unique_ids {
        suffix_duplicates(quick_links.iter_mut().map(|q| &mut q.id));
    }
    let mut content = sections::segment(&body, options);
    content.quick_links = quick_links;
    content
}

// ── Tests ──
