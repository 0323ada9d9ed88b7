use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JumpLink {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickLink {
    pub numeral: String,
    pub label: String,
    pub id: String,
}

/// Everything the renderer needs for one page. Each list keeps source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedContent {
    pub sections: Vec<Section>,
    pub key_takeaways: Vec<String>,
    pub faqs: Vec<Faq>,
    pub jump_links: Vec<JumpLink>,
    pub quick_links: Vec<QuickLink>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Suffix repeated section and quick-link ids with `-2`, `-3`, ...
    pub unique_ids: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_camel_case() {
        let content = ParsedContent {
            key_takeaways: vec!["A".into()],
            jump_links: vec![JumpLink { id: "a".into(), label: "A".into() }],
            ..Default::default()
        };
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["keyTakeaways"][0], "A");
        assert_eq!(json["jumpLinks"][0]["label"], "A");
        assert!(json["quickLinks"].as_array().unwrap().is_empty());
        let back: ParsedContent = serde_json::from_value(json).unwrap();
        assert_eq!(back, content);
    }
}
