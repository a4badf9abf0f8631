//! Compound selectors: `tag`, `.class`, `#id` and combinations like
//! `div.p-novel__body`. Combinators and attribute selectors are not supported.

use std::fmt;
use std::str::FromStr;

use super::{Document, DomError, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unsupported character {ch:?} in selector {selector:?}")]
    Unsupported { selector: String, ch: char },
    #[error("missing name after {marker:?} in selector {selector:?}")]
    MissingName { selector: String, marker: char },
    #[error("selector {selector:?} has more than one id")]
    DuplicateId { selector: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let source = input.trim();
        if source.is_empty() {
            return Err(SelectorError::Empty);
        }

        let mut selector = Self {
            source: source.to_string(),
            tag: None,
            id: None,
            classes: Vec::new(),
        };

        let tag_end = source
            .find(|c: char| !is_name_char(c) && c != '*')
            .unwrap_or(source.len());
        let tag = &source[..tag_end];
        if !tag.is_empty() && tag != "*" {
            if tag.contains('*') {
                return Err(SelectorError::Unsupported {
                    selector: source.to_string(),
                    ch: '*',
                });
            }
            selector.tag = Some(tag.to_ascii_lowercase());
        }

        let mut rest = &source[tag_end..];
        while let Some(marker) = rest.chars().next() {
            if marker != '.' && marker != '#' {
                return Err(SelectorError::Unsupported {
                    selector: source.to_string(),
                    ch: marker,
                });
            }
            let body = &rest[1..];
            let end = body.find(|c: char| !is_name_char(c)).unwrap_or(body.len());
            let name = &body[..end];
            if name.is_empty() {
                return Err(SelectorError::MissingName {
                    selector: source.to_string(),
                    marker,
                });
            }
            if marker == '.' {
                selector.classes.push(name.to_string());
            } else if selector.id.replace(name.to_string()).is_some() {
                return Err(SelectorError::DuplicateId {
                    selector: source.to_string(),
                });
            }
            rest = &body[end..];
        }

        Ok(selector)
    }

    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(tag) = doc.tag(node) else {
            return false;
        };
        if self.tag.as_deref().is_some_and(|t| t != tag) {
            return false;
        }
        if let Some(id) = &self.id {
            if doc.attr(node, "id") != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|c| doc.has_class(node, c))
    }

    /// Create a detached element this selector matches. Without a tag the
    /// element is a `div`.
    pub fn create_element(&self, doc: &mut Document) -> Result<NodeId, DomError> {
        let el = doc.create_element(self.tag.as_deref().unwrap_or("div"));
        if let Some(id) = &self.id {
            doc.set_attr(el, "id", id)?;
        }
        for class in &self.classes {
            doc.add_class(el, class)?;
        }
        Ok(el)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compound() {
        let s = Selector::parse("div.p-novel__body").unwrap();
        assert_eq!(s.tag.as_deref(), Some("div"));
        assert_eq!(s.classes, vec!["p-novel__body"]);
        assert_eq!(s.id, None);
        assert_eq!(s.to_string(), "div.p-novel__body");

        let s: Selector = "#main.a.b".parse().unwrap();
        assert_eq!(s.tag, None);
        assert_eq!(s.id.as_deref(), Some("main"));
        assert_eq!(s.classes, vec!["a", "b"]);

        let s = Selector::parse("*.x").unwrap();
        assert_eq!(s.tag, None);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Selector::parse("  "), Err(SelectorError::Empty));
        assert!(matches!(
            Selector::parse("div p"),
            Err(SelectorError::Unsupported { ch: ' ', .. })
        ));
        assert!(matches!(
            Selector::parse("div > p"),
            Err(SelectorError::Unsupported { .. })
        ));
        assert!(matches!(
            Selector::parse("div."),
            Err(SelectorError::MissingName { marker: '.', .. })
        ));
        assert!(matches!(
            Selector::parse("#a#b"),
            Err(SelectorError::DuplicateId { .. })
        ));
        assert!(matches!(
            Selector::parse("[data-x]"),
            Err(SelectorError::Unsupported { ch: '[', .. })
        ));
    }

    #[test]
    fn test_matches_and_query() {
        let mut doc = Document::new();
        let outer = doc.append_element(doc.root(), "div").unwrap();
        let body = doc.append_element(outer, "DIV").unwrap();
        doc.add_class(body, "p-novel__body").unwrap();
        doc.add_class(body, "extra").unwrap();
        doc.set_attr(body, "id", "honbun").unwrap();
        let text = doc.append_text(body, "本文").unwrap();

        let sel = Selector::parse("div.p-novel__body").unwrap();
        assert!(sel.matches(&doc, body));
        assert!(!sel.matches(&doc, outer));
        assert!(!sel.matches(&doc, text));
        assert_eq!(doc.query_selector(doc.root(), &sel), Some(body));

        let by_id = Selector::parse("#honbun").unwrap();
        assert_eq!(doc.query_selector(doc.root(), &by_id), Some(body));

        let any_div = Selector::parse("div").unwrap();
        assert_eq!(doc.query_selector(doc.root(), &any_div), Some(outer));
        assert_eq!(doc.query_selector_all(doc.root(), &any_div), vec![outer, body]);
        // scope itself is never matched
        assert_eq!(doc.query_selector(body, &sel), None);
    }

    #[test]
    fn test_create_element_matches_itself() {
        let mut doc = Document::new();
        for source in ["div.p-novel__body", "#honbun.a.b", "section", ".x"] {
            let selector = Selector::parse(source).unwrap();
            let el = selector.create_element(&mut doc).unwrap();
            assert!(selector.matches(&doc, el), "{source}");
        }
        let bare = Selector::parse(".x").unwrap().create_element(&mut doc).unwrap();
        assert_eq!(doc.tag(bare), Some("div"));
    }
}
