use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::faq;
use super::text::{detag, slugify, suffix_duplicates};
use crate::model::{JumpLink, ParseOptions, ParsedContent, Section};

static BOUNDARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h2\b[^>]*>(.*?)</h2\s*>").unwrap());
static KEY_TAKEAWAYS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bkey\s+takeaways?\b").unwrap());
static FAQ_TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bfrequently\s+asked\b|^faqs?$").unwrap());
static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<li\b[^>]*>(.*?)</li\s*>").unwrap());
static PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<p\b[^>]*>(.*?)</p\s*>").unwrap());
static LEADING_CLOSERS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\s*</[A-Za-z][A-Za-z0-9]*\s*>)+").unwrap());
static MEDIA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(?:img|iframe|video|audio|table|object|embed|svg)\b").unwrap()
});

/// Paragraph fallback for key takeaways keeps only text longer than this.
const MIN_TAKEAWAY_PARAGRAPH_CHARS: usize = 20;

pub const NO_BOUNDARY_ID: &str = "content";
pub const INTRO_ID: &str = "intro";

/// An ordinary section with its navigation entry, if it has one.
struct Entry {
    section: Section,
    jump: Option<JumpLink>,
}

struct Boundary {
    start: usize,
    end: usize,
    title: String,
}

/// Split sanitized markup at `<h2>` boundaries, diverting key takeaways and
/// FAQs into their own lists. Quick links are left for the caller.
pub fn segment(html: &str, options: &ParseOptions) -> ParsedContent {
    let boundaries: Vec<Boundary> = BOUNDARY_RE
        .captures_iter(html)
        .filter_map(|c| {
            let whole = c.get(0)?;
            Some(Boundary {
                start: whole.start(),
                end: whole.end(),
                title: detag(&c[1]),
            })
        })
        .collect();

    let Some(first) = boundaries.first() else {
        return ParsedContent {
            sections: vec![Section {
                id: NO_BOUNDARY_ID.to_string(),
                title: String::new(),
                html: html.to_string(),
            }],
            ..Default::default()
        };
    };

    let mut entries = Vec::new();
    let mut key_takeaways = Vec::new();
    let mut faqs = Vec::new();

    let intro = LEADING_CLOSERS_RE.replace(&html[..first.start], "");
    let intro = intro.trim();
    if !is_blank(intro) {
        entries.push(Entry {
            section: Section {
                id: INTRO_ID.to_string(),
                title: String::new(),
                html: intro.to_string(),
            },
            jump: None,
        });
    }

    for (i, boundary) in boundaries.iter().enumerate() {
        let stop = boundaries.get(i + 1).map_or(html.len(), |next| next.start);
        let body = html[boundary.end..stop].trim();

        if KEY_TAKEAWAYS_RE.is_match(&boundary.title) {
            key_takeaways.extend(collect_takeaways(body));
            continue;
        }

        if FAQ_TITLE_RE.is_match(&boundary.title) {
            let found = faq::from_subheadings(body);
            if !found.is_empty() {
                faqs.extend(found);
                continue;
            }
        }

        let id = slugify(&boundary.title);
        entries.push(Entry {
            section: Section {
                id: id.clone(),
                title: boundary.title.clone(),
                html: body.to_string(),
            },
            jump: Some(JumpLink {
                id,
                label: boundary.title.clone(),
            }),
        });
    }

    if faqs.is_empty() {
        let donor = entries.iter().enumerate().find_map(|(idx, entry)| {
            let found = faq::from_markers(&entry.section.html);
            (!found.is_empty()).then_some((idx, found))
        });
        if let Some((idx, found)) = donor {
            debug!(section = %entries[idx].section.id, count = found.len(), "faq markers found");
            entries.remove(idx);
            faqs = found;
        }
    }

    if options.unique_ids {
        suffix_duplicates(entries.iter_mut().map(|e| &mut e.section.id));
        for entry in &mut entries {
            if let Some(jump) = entry.jump.as_mut() {
                jump.id = entry.section.id.clone();
            }
        }
    }

    debug!(
        sections = entries.len(),
        key_takeaways = key_takeaways.len(),
        faqs = faqs.len(),
        "page segmented"
    );

    let mut content = ParsedContent {
        key_takeaways,
        faqs,
        ..Default::default()
    };
    for entry in entries {
        content.jump_links.extend(entry.jump);
        content.sections.push(entry.section);
    }
    content
}

/// List items when the body has any, otherwise paragraphs with real text.
fn collect_takeaways(body: &str) -> Vec<String> {
    if LIST_ITEM_RE.is_match(body) {
        return LIST_ITEM_RE
            .captures_iter(body)
            .map(|c| detag(&c[1]))
            .filter(|t| !t.is_empty())
            .collect();
    }
    PARAGRAPH_RE
        .captures_iter(body)
        .map(|c| detag(&c[1]))
        .filter(|t| t.chars().count() > MIN_TAKEAWAY_PARAGRAPH_CHARS)
        .collect()
}

/// Wrapper-only markup: no readable text and nothing visual.
fn is_blank(html: &str) -> bool {
    detag(html).is_empty() && !MEDIA_RE.is_match(html)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Faq;

    fn seg(html: &str) -> ParsedContent {
        segment(html, &ParseOptions::default())
    }

    fn ids(content: &ParsedContent) -> Vec<&str> {
        content.sections.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn no_boundary_single_section() {
        let html = "<p>Just one block</p><h3>Minor</h3><p>more</p>";
        let content = seg(html);
        assert_eq!(
            content.sections,
            vec![Section { id: "content".into(), title: String::new(), html: html.into() }]
        );
        assert!(content.key_takeaways.is_empty());
        assert!(content.faqs.is_empty());
        assert!(content.jump_links.is_empty());
        assert!(content.quick_links.is_empty());
    }

    #[test]
    fn key_takeaways_from_list() {
        let content = seg("<h2>Key Takeaways</h2><ul><li>A</li><li>B</li></ul>");
        assert_eq!(content.key_takeaways, vec!["A", "B"]);
        assert!(content.sections.is_empty());
        assert!(content.jump_links.is_empty());
    }

    #[test]
    fn key_takeaways_from_paragraphs() {
        let content = seg(
            "<h2>key takeaway</h2><p>Short one</p><p>This paragraph is long enough to keep.</p><h2>Next</h2><p>x</p>",
        );
        assert_eq!(content.key_takeaways, vec!["This paragraph is long enough to keep."]);
        assert_eq!(ids(&content), vec!["next"]);
    }

    #[test]
    fn faq_primary() {
        let content = seg("<h2>FAQs</h2><h3>Q1?</h3><p>A1</p><h3>Q2?</h3><p>A2</p>");
        assert_eq!(
            content.faqs,
            vec![
                Faq { question: "Q1?".into(), answer: "A1".into() },
                Faq { question: "Q2?".into(), answer: "A2".into() },
            ]
        );
        assert!(content.sections.is_empty());
        assert!(content.jump_links.is_empty());
    }

    #[test]
    fn faq_title_without_subheadings_stays_ordinary() {
        let content = seg("<h2>Frequently Asked Questions</h2><p>Call us with questions.</p>");
        assert!(content.faqs.is_empty());
        assert_eq!(ids(&content), vec!["frequently-asked-questions"]);
        assert_eq!(content.jump_links[0].label, "Frequently Asked Questions");
    }

    #[test]
    fn faq_title_must_be_exact_for_short_form() {
        let content = seg("<h2>FAQ about fees</h2><h3>Sub</h3><p>x</p>");
        assert!(content.faqs.is_empty());
        assert_eq!(ids(&content), vec!["faq-about-fees"]);
    }

    #[test]
    fn faq_fallback_uses_first_qualifying_section_only() {
        let html = "<h2>Overview</h2><p>Q: lonely?</p>\
            <h2>Common Questions</h2><p>Q: One?</p><p>Yes.</p><p>Q: Two?</p><p>No.</p>\
            <h2>More Questions</h2><p>Q: Three?</p><p>Maybe.</p><p>Q: Four?</p><p>Sure.</p>";
        let content = seg(html);
        let questions: Vec<_> = content.faqs.iter().map(|f| f.question.as_str()).collect();
        assert_eq!(questions, vec!["One?", "Two?"]);
        assert_eq!(ids(&content), vec!["overview", "more-questions"]);
        let jump_ids: Vec<_> = content.jump_links.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(jump_ids, vec!["overview", "more-questions"]);
    }

    #[test]
    fn faq_fallback_skipped_when_primary_found() {
        let html = "<h2>FAQ</h2><h3>Real?</h3><p>Yes.</p>\
            <h2>Other</h2><p>Q: One?</p><p>a</p><p>Q: Two?</p><p>b</p>";
        let content = seg(html);
        assert_eq!(content.faqs.len(), 1);
        assert_eq!(ids(&content), vec!["other"]);
    }

    #[test]
    fn intro_kept_and_trimmed() {
        let content = seg("</div></section>\n<p>Welcome.</p>\n<h2>First</h2><p>a</p>");
        assert_eq!(content.sections[0].id, "intro");
        assert_eq!(content.sections[0].title, "");
        assert_eq!(content.sections[0].html, "<p>Welcome.</p>");
        assert_eq!(ids(&content), vec!["intro", "first"]);
        assert_eq!(content.jump_links.len(), 1);
        assert_eq!(content.jump_links[0].id, "first");
    }

    #[test]
    fn wrapper_only_intro_dropped() {
        let content = seg("<div class=\"row\"><div>\n<h2>First</h2><p>a</p>");
        assert_eq!(ids(&content), vec!["first"]);
    }

    #[test]
    fn image_intro_kept() {
        let content = seg("<p><img src=\"hero.jpg\" alt=\"\"></p><h2>First</h2>");
        assert_eq!(ids(&content), vec!["intro", "first"]);
        assert_eq!(content.sections[1].html, "");
    }

    #[test]
    fn section_bodies_and_titles() {
        let content = seg("<h2 id=\"x\"><span>Wills &amp; Trusts</span></h2>\n<p>Body</p>\n<h2>  Next  Step </h2><p>b</p>");
        assert_eq!(content.sections[0].title, "Wills & Trusts");
        assert_eq!(content.sections[0].id, "wills-trusts");
        assert_eq!(content.sections[0].html, "<p>Body</p>");
        assert_eq!(content.sections[1].title, "Next Step");
        assert_eq!(content.jump_links[1], JumpLink { id: "next-step".into(), label: "Next Step".into() });
    }

    #[test]
    fn duplicate_ids_kept_by_default() {
        let content = seg("<h2>Costs</h2><p>a</p><h2>COSTS</h2><p>b</p>");
        assert_eq!(ids(&content), vec!["costs", "costs"]);
    }

    #[test]
    fn duplicate_ids_suffixed_when_asked() {
        let html = "<h2>Costs</h2><p>a</p><h2>Costs</h2><p>b</p><h2>costs</h2><p>c</p>";
        let content = segment(html, &ParseOptions { unique_ids: true });
        assert_eq!(ids(&content), vec!["costs", "costs-2", "costs-3"]);
        let jump_ids: Vec<_> = content.jump_links.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(jump_ids, vec!["costs", "costs-2", "costs-3"]);
    }
}
