//! FAQ extraction from a section body.
//!
//! Two shapes show up in exported pages: a labeled FAQ section whose questions
//! are `<h3>` sub-headings, and ordinary sections where authors typed
//! "Q:"/"A:" markers into paragraphs.

use std::sync::LazyLock;

use regex::Regex;

use super::text::detag;
use crate::model::Faq;

static SUBHEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h3\b[^>]*>(.*?)</h3\s*>").unwrap());
static MARKER_ELEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<p\b[^>]*>(.*?)</p\s*>|<h3\b[^>]*>(.*?)</h3\s*>|<h4\b[^>]*>(.*?)</h4\s*>")
        .unwrap()
});
static QUESTION_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Q\s*[.:]\s*").unwrap());
static ANSWER_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^A\s*[.:]\s*").unwrap());
static INLINE_ANSWER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+A\s*[.:]\s+").unwrap());

/// Minimum marked questions before a section counts as an unlabeled FAQ.
pub const MIN_MARKED_QUESTIONS: usize = 2;

/// One FAQ per `<h3>`: heading text is the question, everything up to the next
/// `<h3>` (or the end of the body) is the answer.
pub fn from_subheadings(body: &str) -> Vec<Faq> {
    let headings: Vec<_> = SUBHEADING_RE
        .captures_iter(body)
        .filter_map(|c| {
            let whole = c.get(0)?;
            Some((whole.start(), whole.end(), detag(&c[1])))
        })
        .collect();

    headings
        .iter()
        .enumerate()
        .map(|(i, (_, end, question))| {
            let stop = headings.get(i + 1).map_or(body.len(), |next| next.0);
            Faq {
                question: question.clone(),
                answer: detag(&body[*end..stop]),
            }
        })
        .collect()
}

/// FAQs from paragraphs/sub-headings whose text starts with `Q.` or `Q:`.
///
/// Returns nothing unless at least [`MIN_MARKED_QUESTIONS`] markers are found.
pub fn from_markers(html: &str) -> Vec<Faq> {
    let markers: Vec<_> = MARKER_ELEMENT_RE
        .captures_iter(html)
        .filter_map(|c| {
            let whole = c.get(0)?;
            let inner = c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3))?;
            let text = detag(inner.as_str());
            let marker = QUESTION_MARKER_RE.find(&text)?;
            Some((whole.start(), whole.end(), text[marker.end()..].to_string()))
        })
        .collect();

    if markers.len() < MIN_MARKED_QUESTIONS {
        return Vec::new();
    }

    markers
        .iter()
        .enumerate()
        .map(|(i, (_, end, text))| {
            let stop = markers.get(i + 1).map_or(html.len(), |next| next.0);
            let following = detag(&html[*end..stop]);
            let (question, inline_answer) = match INLINE_ANSWER_RE.find(text) {
                Some(m) => (text[..m.start()].trim(), text[m.end()..].trim()),
                None => (text.trim(), ""),
            };
            let answer = [inline_answer, following.as_str()]
                .iter()
                .filter(|part| !part.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join(" ");
            Faq {
                question: question.to_string(),
                answer: ANSWER_MARKER_RE.replace(&answer, "").into_owned(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faq(q: &str, a: &str) -> Faq {
        Faq { question: q.into(), answer: a.into() }
    }

    #[test]
    fn subheadings() {
        let body = "<h3>Q1?</h3><p>A1</p><h3>Q2?</h3><p>A2</p><p>more</p>";
        assert_eq!(from_subheadings(body), vec![faq("Q1?", "A1"), faq("Q2?", "A2 more")]);
    }

    #[test]
    fn subheadings_ignore_leading_copy() {
        let body = "<p>Common questions:</p><h3 id=\"x\">Why?</h3><ul><li>Because</li></ul>";
        assert_eq!(from_subheadings(body), vec![faq("Why?", "Because")]);
    }

    #[test]
    fn no_subheadings() {
        assert!(from_subheadings("<p>Just text</p>").is_empty());
    }

    #[test]
    fn markers_with_separate_answers() {
        let html = "<p>Intro copy.</p><p><strong>Q:</strong> How long does probate take?</p><p>A: Usually months.</p><p>Q. Is a will public?</p><p>Yes, once filed.</p>";
        assert_eq!(
            from_markers(html),
            vec![
                faq("How long does probate take?", "Usually months."),
                faq("Is a will public?", "Yes, once filed."),
            ]
        );
    }

    #[test]
    fn markers_with_inline_answers() {
        let html = "<h4>Q: Can I change my trust? A: Yes, if revocable.</h4><h4>Q: Who inherits? A. Your heirs.</h4>";
        assert_eq!(
            from_markers(html),
            vec![faq("Can I change my trust?", "Yes, if revocable."), faq("Who inherits?", "Your heirs.")]
        );
    }

    #[test]
    fn single_marker_is_not_enough() {
        assert!(from_markers("<p>Q: Only one?</p><p>Yes.</p>").is_empty());
    }

    #[test]
    fn quality_is_not_a_marker() {
        assert!(from_markers("<p>Quality matters.</p><p>Quick: act now.</p>").is_empty());
    }
}
