//! Text helpers shared across passes: detagging, slugs, numerals.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static BLOCK_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?(?:p|div|section|article|br|hr|li|ul|ol|h[1-6]|tr|td|th|table|blockquote|figure|figcaption)\b[^>]*>").unwrap()
});
static ANY_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static NON_ALNUM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

pub const SLUG_MAX_LEN: usize = 60;

const ROMAN_NUMERALS: [&str; 15] = [
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII", "XIII", "XIV", "XV",
];

/// Strip every tag, decode entities and collapse whitespace.
///
/// Block-level tags become a space so that `<p>A</p><p>B</p>` reads "A B";
/// inline tags vanish without a gap.
pub fn detag(html: &str) -> String {
    let text = COMMENT_RE.replace_all(html, "");
    let text = BLOCK_TAG_RE.replace_all(&text, " ");
    let text = ANY_TAG_RE.replace_all(&text, "");
    let decoded = html_escape::decode_html_entities(&text);
    collapse_whitespace(&decoded)
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase, hyphenate non-alphanumeric runs, trim hyphens, cap at 60 chars.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let hyphenated = NON_ALNUM_RE.replace_all(&lower, "-");
    hyphenated
        .trim_matches('-')
        .chars()
        .take(SLUG_MAX_LEN)
        .collect()
}

/// Positional numeral: I..XV, then the 1-based decimal ordinal.
pub fn numeral_for(index: usize) -> String {
    ROMAN_NUMERALS
        .get(index)
        .map(|n| n.to_string())
        .unwrap_or_else(|| (index + 1).to_string())
}

/// Give repeated ids a positional suffix (`-2`, `-3`, ...) in iteration order.
pub fn suffix_duplicates<'a>(ids: impl IntoIterator<Item = &'a mut String>) {
    let mut used: HashSet<String> = HashSet::new();
    for id in ids {
        if used.insert(id.clone()) {
            continue;
        }
        let mut n = 2;
        while used.contains(&format!("{id}-{n}")) {
            n += 1;
        }
        *id = format!("{id}-{n}");
        used.insert(id.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn detag_separates_blocks() {
        assert_eq!(detag("<p>A1</p><p>A2</p>"), "A1 A2");
    }

    #[test]
    fn detag_joins_inline() {
        assert_eq!(detag("<strong>Hel</strong>lo &amp; <em>bye</em>"), "Hello & bye");
    }

    #[test]
    fn detag_drops_comments_and_nbsp() {
        assert_eq!(detag("<!-- x -->&nbsp;Text&nbsp;"), "Text");
    }

    #[test]
    fn slug_basic() {
        assert_eq!(slugify("  What Is  a Living Trust? "), "what-is-a-living-trust");
        assert_eq!(slugify("Fees & Costs (2024)"), "fees-costs-2024");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn slug_truncates() {
        let long = "word ".repeat(40);
        let slug = slugify(&long);
        assert_eq!(slug.chars().count(), SLUG_MAX_LEN);
        assert!(slug.starts_with("word-word"));
    }

    #[test]
    fn numerals() {
        assert_eq!(numeral_for(0), "I");
        assert_eq!(numeral_for(3), "IV");
        assert_eq!(numeral_for(14), "XV");
        assert_eq!(numeral_for(15), "16");
        assert_eq!(numeral_for(20), "21");
    }

    #[test]
    fn duplicates_suffixed() {
        let mut ids: Vec<String> = ["a", "b", "a", "a-2", "a"].iter().map(|s| s.to_string()).collect();
        suffix_duplicates(ids.iter_mut());
        assert_eq!(ids, vec!["a", "b", "a-2", "a-2-2", "a-3"]);
    }

    proptest! {
        #[test]
        fn slug_ignores_case_and_spacing(words in prop::collection::vec("[a-zA-Z]{1,8}", 1..6)) {
            let spaced = words.join("   ");
            let plain = words.join(" ").to_uppercase();
            prop_assert_eq!(slugify(&spaced), slugify(&plain));
        }

        #[test]
        fn slug_shape(input in ".{0,120}") {
            let slug = slugify(&input);
            prop_assert!(slug.chars().count() <= SLUG_MAX_LEN);
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        }
    }
}
