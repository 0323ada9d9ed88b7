//! Junk stripping: an ordered catalog of text-to-text rules that scrub legacy
//! exporter artifacts out of a page blob.
//!
//! Rule order matters. Removals run before the cleanup rules so that the
//! empty-container sweep sees whatever the removals left behind, and inline
//! styles go before image dimensions.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, trace};

use super::nesting::{block_span, remove_all_blocks};
use super::text::detag;

pub struct Rule {
    pub name: &'static str,
    pub apply: fn(&str) -> String,
}

pub const RULES: &[Rule] = &[
    Rule { name: "truncate_footer", apply: truncate_footer },
    Rule { name: "strip_scripts_and_styles", apply: strip_scripts_and_styles },
    Rule { name: "strip_leading_header", apply: strip_leading_header },
    Rule { name: "remove_home_links", apply: remove_home_links },
    Rule { name: "remove_contact_forms", apply: remove_contact_forms },
    Rule { name: "remove_map_iframes", apply: remove_map_iframes },
    Rule { name: "remove_form_leftovers", apply: remove_form_leftovers },
    Rule { name: "remove_ebook_dividers", apply: remove_ebook_dividers },
    Rule { name: "remove_decorative_images", apply: remove_decorative_images },
    Rule { name: "replace_smileys", apply: replace_smileys },
    Rule { name: "strip_inline_styles", apply: strip_inline_styles },
    Rule { name: "strip_image_dimensions", apply: strip_image_dimensions },
    Rule { name: "downgrade_h1", apply: downgrade_h1 },
    Rule { name: "remove_empty_shells", apply: remove_empty_shells },
    Rule { name: "remove_empty_paragraphs", apply: remove_empty_paragraphs },
    Rule { name: "remove_empty_containers", apply: remove_empty_containers },
    Rule { name: "trim_stray_edges", apply: trim_stray_edges },
];

/// Template ids/classes used by the exporter's contact-form widgets.
const CONTACT_FORM_TEMPLATES: &[&str] = &[
    "contact-form",
    "contact_form",
    "contactform",
    "wpcf7",
    "form-template",
    "quote-form",
    "consultation-form",
];

/// Boilerplate that only ever appears in the exported contact/address blurbs.
const CONTACT_BOILERPLATE: &[&str] = &[
    "our office address",
    "office address:",
    "send us a message",
    "fill out the form below",
    "fields marked with an *",
    "call us today for a free consultation",
];

/// Containers that disappear once their content is gone.
const EMPTY_CONTAINER_TAGS: &[&str] = &[
    "div", "section", "article", "span", "p", "strong", "b", "em", "i", "u", "a", "li", "ul", "ol",
    "blockquote", "figure", "center", "font", "h2", "h3", "h4", "h5", "h6",
];

static FOOTER_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<footer\b|<!--\s*(?:footer|bottom)|<(?:div|section)\b[^>]*\b(?:id|class)\s*=\s*"(?:[^"]*\s)?(?:footer|site-footer|bottom-section|site-bottom)(?:\s[^"]*)?""#,
    )
    .unwrap()
});
static SCRIPT_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<noscript\b[^>]*>.*?</noscript\s*>|<link\b[^>]*rel\s*=\s*["']?stylesheet[^>]*>|</?script\b[^>]*>"#,
    )
    .unwrap()
});
static HEADER_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<header\b[^>]*>|<(?:div|section)\b[^>]*\b(?:id|class)\s*=\s*"(?:[^"]*\s)?(?:header|site-header|masthead)(?:\s[^"]*)?"[^>]*>"#,
    )
    .unwrap()
});
static CONTENT_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(?:p|h[1-6]|ul|ol|table|blockquote|article)\b").unwrap());
static HOME_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<a\b[^>]*\bhref\s*=\s*["'](?:/|\./|/?index\.html?|#top)["'][^>]*>.*?</a\s*>"#,
    )
    .unwrap()
});
static CONTACT_FORM_RE: LazyLock<Regex> = LazyLock::new(|| {
    let names = CONTACT_FORM_TEMPLATES
        .iter()
        .map(|n| regex::escape(n))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(
        r#"(?i)<(?:div|section|form)\b[^>]*\b(?:id|class|data-template|name)\s*=\s*"[^"]*(?:{names})[^"]*"[^>]*>"#
    ))
    .unwrap()
});
static MAP_IFRAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<iframe\b[^>]*\bsrc\s*=\s*["'][^"']*(?:google\.[a-z.]+/maps|maps\.google|/maps/embed|openstreetmap)[^"']*["'][^>]*(?:/>|>.*?</iframe\s*>)"#,
    )
    .unwrap()
});
static FORM_CONTROL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<label\b[^>]*>.*?</label\s*>|<button\b[^>]*>.*?</button\s*>|<textarea\b[^>]*>.*?</textarea\s*>|<select\b[^>]*>.*?</select\s*>|<input\b[^>]*>|</?form\b[^>]*>",
    )
    .unwrap()
});
static PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<p\b[^>]*>.*?</p\s*>").unwrap());
static IMG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<img\b[^>]*>").unwrap());
static IMG_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bsrc\s*=\s*["']([^"']*)["']"#).unwrap());
static IMG_ALT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\balt\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());
static IMG_CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bclass\s*=\s*["']([^"']*)["']"#).unwrap());
static EBOOK_DIVIDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)e-?book[-_]?cover|ebook[-_]?divider|cover[-_]?divider").unwrap());
static DECORATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)logo|quote[-_]?marks?|quotes?[-_](?:open|close|left|right)|signature").unwrap()
});
static SMILEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)smil(?:ey|ies)|emoji|emoticon").unwrap());
static OPEN_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[A-Za-z][A-Za-z0-9]*\b[^>]*>").unwrap());
static STYLE_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\s+style\s*=\s*(?:"[^"]*"|'[^']*')"#).unwrap());
static DIMENSION_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+(?:width|height)\s*=\s*(?:"[^"]*"|'[^']*'|[0-9]+%?)"#).unwrap()
});
static H1_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<(/?)h1\b").unwrap());
static EMPTY_SHELL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<div\b[^>]*\bclass\s*=\s*"[^"]*\b(?:spacer|divider|separator|clearfix|clear)\b[^"]*"[^>]*>(?:\s|&nbsp;|&#160;|<br\s*/?>|<hr\b[^>]*>)*</div\s*>|<section\b[^>]*>\s*<div\b[^>]*>(?:\s|&nbsp;|&#160;|<br\s*/?>)*</div\s*>\s*</section\s*>"#,
    )
    .unwrap()
});
static EMPTY_PARAGRAPH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<p\b[^>]*>(?:\s|&nbsp;|&#160;|<br\s*/?>)*</p\s*>").unwrap()
});
static EMPTY_CONTAINER_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    EMPTY_CONTAINER_TAGS
        .iter()
        .map(|tag| {
            Regex::new(&format!(
                r"(?is)<{tag}\b[^>]*>(?:\s|&nbsp;|&#160;|<br\s*/?>)*</{tag}\s*>"
            ))
            .unwrap()
        })
        .collect()
});
static LEADING_CLOSERS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\s*</[A-Za-z][A-Za-z0-9]*\s*>)+").unwrap());
static LEADING_WRAPPER_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^<(?:div|section|article|main|center)\b[^>]*>").unwrap());
static TRAILING_OPENERS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:<(?:div|section|article|span|main|center)\b[^>]*>\s*)+$").unwrap()
});

/// Run the full catalog, repeating until a pass changes nothing.
///
/// Every rule either shortens the markup or (h1 downgrade) keeps its length
/// while removing an `<h1>`, so the loop always settles.
pub fn strip_junk(raw: &str) -> String {
    let mut current = run_rules(raw);
    let mut passes = 1usize;
    loop {
        let next = run_rules(&current);
        if next == current {
            trace!(passes, "junk stripping settled");
            return current;
        }
        current = next;
        passes += 1;
    }
}

fn run_rules(raw: &str) -> String {
    let mut html = raw.to_string();
    for rule in RULES {
        let next = (rule.apply)(&html);
        if next != html {
            debug!(
                rule = rule.name,
                removed = html.len().saturating_sub(next.len()),
                "junk rule applied"
            );
            html = next;
        }
    }
    html
}

pub fn truncate_footer(html: &str) -> String {
    match FOOTER_MARKER_RE.find(html) {
        Some(m) => html[..m.start()].to_string(),
        None => html.to_string(),
    }
}

/// Cutting a block can splice its neighbours into a fresh `<script>`, so
/// repeat until none is left. Unclosed script tags lose the tag itself.
pub fn strip_scripts_and_styles(html: &str) -> String {
    let mut current = html.to_string();
    while SCRIPT_STYLE_RE.is_match(&current) {
        current = SCRIPT_STYLE_RE.replace_all(&current, "").into_owned();
    }
    current
}

/// Drop the header wrapper and everything before it (doctype, head, body
/// open), but only while no content element precedes it.
pub fn strip_leading_header(html: &str) -> String {
    let mut current = html.to_string();
    while let Some(span) = block_span(&current, &HEADER_OPEN_RE) {
        if CONTENT_TAG_RE.is_match(&current[..span.start]) {
            break;
        }
        current = current[span.end..].to_string();
    }
    current
}

pub fn remove_home_links(html: &str) -> String {
    HOME_LINK_RE.replace_all(html, "").into_owned()
}

pub fn remove_contact_forms(html: &str) -> String {
    remove_all_blocks(html, &CONTACT_FORM_RE)
}

pub fn remove_map_iframes(html: &str) -> String {
    MAP_IFRAME_RE.replace_all(html, "").into_owned()
}

pub fn remove_form_leftovers(html: &str) -> String {
    let without_controls = FORM_CONTROL_RE.replace_all(html, "");
    PARAGRAPH_RE
        .replace_all(&without_controls, |caps: &Captures| {
            let text = detag(&caps[0]).to_lowercase();
            if CONTACT_BOILERPLATE.iter().any(|b| text.contains(b)) {
                String::new()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

pub fn remove_ebook_dividers(html: &str) -> String {
    drop_images_by_src(html, &EBOOK_DIVIDER_RE)
}

pub fn remove_decorative_images(html: &str) -> String {
    drop_images_by_src(html, &DECORATIVE_RE)
}

fn drop_images_by_src(html: &str, pattern: &Regex) -> String {
    IMG_RE
        .replace_all(html, |caps: &Captures| {
            let tag = &caps[0];
            match IMG_SRC_RE.captures(tag) {
                Some(src) if pattern.is_match(&src[1]) => String::new(),
                _ => tag.to_string(),
            }
        })
        .into_owned()
}

/// `<img class="wp-smiley" alt="🙂" ...>` → `🙂`.
pub fn replace_smileys(html: &str) -> String {
    IMG_RE
        .replace_all(html, |caps: &Captures| {
            let tag = &caps[0];
            let by_src = IMG_SRC_RE
                .captures(tag)
                .is_some_and(|c| SMILEY_RE.is_match(&c[1]));
            let by_class = IMG_CLASS_RE
                .captures(tag)
                .is_some_and(|c| SMILEY_RE.is_match(&c[1]));
            if !(by_src || by_class) {
                return tag.to_string();
            }
            IMG_ALT_RE
                .captures(tag)
                .and_then(|c| c.get(1).or_else(|| c.get(2)))
                .map(|alt| alt.as_str().to_string())
                .unwrap_or_default()
        })
        .into_owned()
}

pub fn strip_inline_styles(html: &str) -> String {
    OPEN_TAG_RE
        .replace_all(html, |caps: &Captures| {
            STYLE_ATTR_RE.replace_all(&caps[0], "").into_owned()
        })
        .into_owned()
}

pub fn strip_image_dimensions(html: &str) -> String {
    IMG_RE
        .replace_all(html, |caps: &Captures| {
            DIMENSION_ATTR_RE.replace_all(&caps[0], "").into_owned()
        })
        .into_owned()
}

/// The page template owns the only `<h1>`.
pub fn downgrade_h1(html: &str) -> String {
    H1_RE.replace_all(html, "<${1}h2").into_owned()
}

pub fn remove_empty_shells(html: &str) -> String {
    EMPTY_SHELL_RE.replace_all(html, "").into_owned()
}

pub fn remove_empty_paragraphs(html: &str) -> String {
    EMPTY_PARAGRAPH_RE.replace_all(html, "").into_owned()
}

/// Removing a child can empty its parent, so sweep until nothing changes.
pub fn remove_empty_containers(html: &str) -> String {
    let mut current = html.to_string();
    loop {
        let mut next = current.clone();
        for re in EMPTY_CONTAINER_RES.iter() {
            next = re.replace_all(&next, "").into_owned();
        }
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Drop leading closing tags and leading wrapper opens that never close,
/// then any wrapper opens dangling at the end.
pub fn trim_stray_edges(html: &str) -> String {
    let mut current = html.trim();
    loop {
        if let Some(m) = LEADING_CLOSERS_RE.find(current) {
            current = current[m.end()..].trim_start();
            continue;
        }
        match LEADING_WRAPPER_OPEN_RE.find(current) {
            Some(m) if block_span(current, &LEADING_WRAPPER_OPEN_RE).is_none() => {
                current = current[m.end()..].trim_start();
            }
            _ => break,
        }
    }
    TRAILING_OPENERS_RE.replace(current, "").trim().to_string()
}
