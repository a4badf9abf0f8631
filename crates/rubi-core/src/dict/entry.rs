use serde::{Deserialize, Serialize};

/// One reading for a dictionary surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingEntry {
    /// Phonetic form, usually katakana in morphological dictionaries.
    pub reading: String,
    /// Word cost (lower = more preferred)
    pub cost: i16,
}
