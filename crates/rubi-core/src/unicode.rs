//! Character-level Unicode classification and kana normalization.

use std::ops::RangeInclusive;

/// Default ideograph boundary: CJK Unified Ideographs U+4E00..U+9FAF.
///
/// This stops short of the end of the block (U+9FFF) and leaves out the
/// extension blocks and the compatibility ideographs. Wider coverage is
/// configured through `[classifier] ideograph_ranges` rather than by
/// changing this constant.
pub const DEFAULT_IDEOGRAPH_RANGE: RangeInclusive<char> = '\u{4E00}'..='\u{9FAF}';

/// Katakana that have a hiragana counterpart at a fixed offset (ァ..ヶ).
const KATAKANA_SHIFTABLE: RangeInclusive<char> = '\u{30A1}'..='\u{30F6}';

const KANA_OFFSET: u32 = 0x60;

/// Check the full Hiragana block (U+3040..U+309F).
pub fn is_hiragana(c: char) -> bool {
    ('\u{3040}'..='\u{309F}').contains(&c)
}

/// Check the full Katakana block (U+30A0..U+30FF). Includes rarely-used symbols
/// (゠ U+30A0, ヿ U+30FF) but no unassigned codepoints.
pub fn is_katakana(c: char) -> bool {
    ('\u{30A0}'..='\u{30FF}').contains(&c)
}

/// Ideograph check against the default boundary.
pub fn is_ideograph(c: char) -> bool {
    DEFAULT_IDEOGRAPH_RANGE.contains(&c)
}

/// Convert a katakana string to hiragana.
///
/// Only ァ..ヶ are shifted. The prolonged sound mark ー, ヷ..ヺ, ASCII and
/// everything else pass through unchanged.
pub fn katakana_to_hiragana(s: &str) -> String {
    s.chars()
        .map(|c| {
            if KATAKANA_SHIFTABLE.contains(&c) {
                char::from_u32(c as u32 - KANA_OFFSET).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

/// Set of inclusive code-point ranges that count as annotatable ideographs.
///
/// The default holds only [`DEFAULT_IDEOGRAPH_RANGE`], so `is_ideograph` and
/// `ScriptClassifier::default().is_ideograph` always agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptClassifier {
    ranges: Vec<RangeInclusive<char>>,
}

impl ScriptClassifier {
    /// Build from explicit ranges. Empty or inverted ranges are dropped.
    pub fn new(ranges: impl IntoIterator<Item = RangeInclusive<char>>) -> Self {
        let mut ranges: Vec<_> = ranges.into_iter().filter(|r| !r.is_empty()).collect();
        ranges.sort_by_key(|r| *r.start());
        Self { ranges }
    }

    /// Classifier configured by `[classifier] ideograph_ranges` in the global settings.
    pub fn from_settings() -> Self {
        crate::settings::settings().classifier.classifier()
    }

    pub fn ranges(&self) -> &[RangeInclusive<char>] {
        &self.ranges
    }

    pub fn is_ideograph(&self, c: char) -> bool {
        match self.ranges.as_slice() {
            [only] => only.contains(&c),
            ranges => ranges.iter().any(|r| r.contains(&c)),
        }
    }
}

impl Default for ScriptClassifier {
    fn default() -> Self {
        Self {
            ranges: vec![DEFAULT_IDEOGRAPH_RANGE],
        }
    }
}
