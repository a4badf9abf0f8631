//! Morphological analysis: text → tokens carrying a surface and a reading.
//!
//! The annotation engine only depends on the [`Analyzer`] trait. The bundled
//! [`DictionaryAnalyzer`] segments text with a reading dictionary and a
//! min-cost lattice search.

mod dictionary;
mod lattice;

pub use dictionary::DictionaryAnalyzer;
pub use lattice::{best_path, build_lattice, Lattice, LatticeNode};

use serde::Serialize;

/// A token produced by an analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub surface: String,
    /// Phonetic form, if the analyzer knows one.
    pub reading: Option<String>,
}

impl Token {
    pub fn new(surface: impl Into<String>, reading: Option<String>) -> Self {
        Self {
            surface: surface.into(),
            reading,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalyzerError {
    #[error("analysis failed for {input:?}: {reason}")]
    Failed { input: String, reason: String },
}

pub trait Analyzer: Send + Sync {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>, AnalyzerError>;
}

/// Concatenate each token's reading, falling back to its surface.
///
/// An empty reading counts as missing.
pub fn compose_reading(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| match t.reading.as_deref() {
            Some(r) if !r.is_empty() => r,
            _ => t.surface.as_str(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_reading() {
        let tokens = vec![
            Token::new("日本", Some("ニホン".to_string())),
            Token::new("語", None),
            Token::new("学", Some(String::new())),
        ];
        assert_eq!(compose_reading(&tokens), "ニホン語学");
        assert_eq!(compose_reading(&[]), "");
    }
}
