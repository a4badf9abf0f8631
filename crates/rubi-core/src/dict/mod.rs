//! Surface → reading dictionary storage.
//!
//! `ReadingDictionary` maps surface forms (as they appear in running text) to
//! their candidate readings in a double-array trie. It is built from a TSV
//! source and stored in the RBDX binary format.

mod entry;
mod reading_dict;
mod source;
#[cfg(test)]
mod tests;

pub use entry::ReadingEntry;
pub use reading_dict::ReadingDictionary;
pub use source::parse_tsv;

use std::io;

/// Error type for dictionary loading, saving and source parsing.
#[derive(Debug, thiserror::Error)]
pub enum DictError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid header (too short)")]
    InvalidHeader,

    #[error("invalid magic bytes (expected RBDX)")]
    InvalidMagic,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    #[error("checksum mismatch (expected {expected:#010x}, found {found:#010x})")]
    ChecksumMismatch { expected: u32, found: u32 },

    #[error("serialization error: {0}")]
    Serialize(bincode::Error),

    #[error("deserialization error: {0}")]
    Deserialize(bincode::Error),

    #[error("parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

impl From<lexime_trie::TrieError> for DictError {
    fn from(e: lexime_trie::TrieError) -> Self {
        match e {
            lexime_trie::TrieError::InvalidMagic => DictError::InvalidMagic,
            lexime_trie::TrieError::InvalidVersion(v) => DictError::UnsupportedVersion(v),
            lexime_trie::TrieError::TruncatedData => DictError::InvalidHeader,
            other => DictError::Parse {
                line: 0,
                reason: format!("trie: {other}"),
            },
        }
    }
}

/// All readings for a surface found by prefix search.
pub struct SearchResult<'a> {
    pub surface: &'a str,
    pub entries: &'a [ReadingEntry],
}

pub trait Dictionary: Send + Sync {
    fn lookup(&self, surface: &str) -> Option<&[ReadingEntry]>;

    /// All dictionary surfaces that are prefixes of `text`, shortest first.
    fn common_prefix_search(&self, text: &str) -> Vec<SearchResult<'_>>;
}
