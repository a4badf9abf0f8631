use std::path::Path;

use tracing::debug_span;

use super::lattice::{best_path, build_lattice};
use super::{Analyzer, AnalyzerError, Token};
use crate::dict::{DictError, ReadingDictionary};
use crate::settings::settings;

/// Analyzer backed by a [`ReadingDictionary`].
pub struct DictionaryAnalyzer {
    dict: ReadingDictionary,
    unknown_word_cost: i16,
    segment_penalty: i64,
}

impl DictionaryAnalyzer {
    /// Use the costs configured in `[analyzer]`.
    pub fn new(dict: ReadingDictionary) -> Self {
        let analyzer = &settings().analyzer;
        Self::with_costs(dict, analyzer.unknown_word_cost, analyzer.segment_penalty)
    }

    pub fn with_costs(dict: ReadingDictionary, unknown_word_cost: i16, segment_penalty: i64) -> Self {
        Self {
            dict,
            unknown_word_cost,
            segment_penalty,
        }
    }

    /// Load the dictionary at `path` (file or asset directory).
    pub fn open(path: &Path) -> Result<Self, DictError> {
        Ok(Self::new(ReadingDictionary::open(path)?))
    }

    pub fn dictionary(&self) -> &ReadingDictionary {
        &self.dict
    }
}

impl Analyzer for DictionaryAnalyzer {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>, AnalyzerError> {
        let _span = debug_span!("tokenize", len = text.len()).entered();
        let lattice = build_lattice(&self.dict, text, self.unknown_word_cost);
        let path = best_path(&lattice, self.segment_penalty);
        if path.is_empty() && !text.is_empty() {
            return Err(AnalyzerError::Failed {
                input: text.to_string(),
                reason: "lattice has no complete path".to_string(),
            });
        }
        Ok(path
            .into_iter()
            .map(|node| Token::new(node.surface.clone(), node.reading.clone()))
            .collect())
    }
}
