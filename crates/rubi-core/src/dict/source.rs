//! TSV dictionary source: `surface<TAB>reading[<TAB>cost]` per line.
//!
//! Blank lines and lines starting with `#` are ignored. Entries without a
//! cost get [`DEFAULT_COST`]. Readings must be kana.

use super::{DictError, ReadingDictionary, ReadingEntry};
use crate::unicode::{is_hiragana, is_katakana};

pub const DEFAULT_COST: i16 = 5000;

pub fn parse_tsv(content: &str) -> Result<ReadingDictionary, DictError> {
    let mut entries = Vec::new();
    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split('\t');
        let surface = fields.next().unwrap_or_default().trim();
        let reading = fields.next().map(str::trim).ok_or_else(|| DictError::Parse {
            line: line_no,
            reason: "expected surface<TAB>reading".to_string(),
        })?;
        if surface.is_empty() || reading.is_empty() {
            return Err(DictError::Parse {
                line: line_no,
                reason: "surface and reading must be non-empty".to_string(),
            });
        }
        if let Some(bad) = reading.chars().find(|&c| !is_hiragana(c) && !is_katakana(c)) {
            return Err(DictError::Parse {
                line: line_no,
                reason: format!("reading {reading:?} contains non-kana {bad:?}"),
            });
        }
        let cost = match fields.next().map(str::trim) {
            None | Some("") => DEFAULT_COST,
            Some(raw_cost) => raw_cost.parse::<i16>().map_err(|e| DictError::Parse {
                line: line_no,
                reason: format!("invalid cost {raw_cost:?}: {e}"),
            })?,
        };
        if fields.next().is_some() {
            return Err(DictError::Parse {
                line: line_no,
                reason: "too many fields".to_string(),
            });
        }

        entries.push((
            surface.to_string(),
            vec![ReadingEntry {
                reading: reading.to_string(),
                cost,
            }],
        ));
    }
    Ok(ReadingDictionary::from_entries(entries))
}
