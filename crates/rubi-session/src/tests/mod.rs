
use std::collections::HashMap;
use std::sync::Arc;

use rubi_core::analyzer::{Analyzer, AnalyzerError, Token};
use rubi_core::settings::settings;

use crate::dom::{Document, NodeId};
use crate::{attach, AnnotationEngine};

/// Analyzer backed by a fixed surface → katakana reading table.
///
/// Unknown surfaces fail, so tests can exercise the abort path per surface.
pub(super) struct TableAnalyzer {
    readings: HashMap<String, String>,
}

impl TableAnalyzer {
    pub(super) fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            readings: pairs
                .iter()
                .map(|(s, r)| (s.to_string(), r.to_string()))
                .collect(),
        }
    }
}

impl Analyzer for TableAnalyzer {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>, AnalyzerError> {
        match self.readings.get(text) {
            Some(r) => Ok(vec![Token::new(text, Some(r.clone()))]),
            None => Err(AnalyzerError::Failed {
                input: text.to_string(),
                reason: "not in table".to_string(),
            }),
        }
    }
}

pub(super) fn make_test_analyzer() -> Arc<dyn Analyzer> {
    Arc::new(TableAnalyzer::new(&[
        ("私", "ワタシ"),
        ("猫", "ネコ"),
        ("好", "ス"),
        ("吾輩", "ワガハイ"),
        ("名前", "ナマエ"),
    ]))
}

/// `<body><div class="p-novel__body"><p>…</p>…</div></body>`, one `<p>` per line.
pub(super) fn make_page(lines: &[&str]) -> (Document, NodeId) {
    let mut doc = Document::new();
    let container = doc.append_element(doc.root(), "div").unwrap();
    doc.add_class(container, "p-novel__body").unwrap();
    for line in lines {
        let p = doc.append_element(container, "p").unwrap();
        doc.append_text(p, line).unwrap();
    }
    (doc, container)
}

pub(super) fn attach_page(lines: &[&str]) -> (Document, AnnotationEngine) {
    let (mut doc, container) = make_page(lines);
    let engine = attach(&mut doc, container, make_test_analyzer(), settings()).unwrap();
    (doc, engine)
}
