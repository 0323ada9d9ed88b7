//! Normalizes legacy page-builder HTML exports into structured page content:
//! sanitized sections, key takeaways, FAQs, jump links and quick links.

pub mod db;
pub mod model;
pub mod parser;
pub mod settings;

pub use model::{Faq, JumpLink, ParseOptions, ParsedContent, QuickLink, Section};
pub use parser::{parse_content, parse_content_with};
