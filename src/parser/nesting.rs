//! Balanced removal of nested containers.
//!
//! The opening tag is located with a caller-supplied pattern; the matching
//! close is found by counting open/close tokens of the same tag name. When the
//! markup never balances, callers get their input back untouched.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static TAG_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9]*)\b[^>]*?(/?)>").unwrap());
static TAG_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<([A-Za-z][A-Za-z0-9]*)").unwrap());

/// Byte range of the first balanced container whose opening tag matches `open`.
pub fn block_span(html: &str, open: &Regex) -> Option<Range<usize>> {
    let m = open.find(html)?;
    let name = TAG_NAME_RE.captures(m.as_str())?.get(1)?.as_str();

    let mut depth = 1usize;
    for caps in TAG_TOKEN_RE.captures_iter(&html[m.end()..]) {
        if !caps[2].eq_ignore_ascii_case(name) {
            continue;
        }
        let closing = !caps[1].is_empty();
        let self_closing = !caps[3].is_empty();
        if closing {
            depth -= 1;
            if depth == 0 {
                let whole = caps.get(0)?;
                return Some(m.start()..m.end() + whole.end());
            }
        } else if !self_closing {
            depth += 1;
        }
    }
    None
}

/// Remove the first balanced container matching `open`, or return `html` as-is.
pub fn remove_block(html: &str, open: &Regex) -> String {
    match block_span(html, open) {
        Some(span) => {
            let mut out = String::with_capacity(html.len() - span.len());
            out.push_str(&html[..span.start]);
            out.push_str(&html[span.end..]);
            out
        }
        None => html.to_string(),
    }
}

/// Remove matching containers one at a time until none are left or the next
/// one is unbalanced.
pub fn remove_all_blocks(html: &str, open: &Regex) -> String {
    let mut current = html.to_string();
    loop {
        let next = remove_block(&current, open);
        if next == current {
            return current;
        }
        current = next;
    }
}
