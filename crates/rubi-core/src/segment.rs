//! Split text into alternating literal and annotatable (ideograph) runs.

use serde::Serialize;
use tracing::{debug, debug_span};

use crate::unicode::ScriptClassifier;

/// One piece of a segmented string. Produced by [`segment`] and consumed
/// right away by the materializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Run {
    /// Text rendered as-is.
    Literal { text: String },
    /// Maximal run of ideographs that can be annotated.
    Candidate { surface: String },
}

impl Run {
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal { text: text.into() }
    }

    pub fn candidate(surface: impl Into<String>) -> Self {
        Self::Candidate {
            surface: surface.into(),
        }
    }

    /// The covered slice of the original input.
    pub fn text(&self) -> &str {
        match self {
            Self::Literal { text } => text,
            Self::Candidate { surface } => surface,
        }
    }

    pub fn is_candidate(&self) -> bool {
        matches!(self, Self::Candidate { .. })
    }
}

/// Segment with the default ideograph boundary.
pub fn segment(text: &str) -> Vec<Run> {
    segment_with(text, &ScriptClassifier::default())
}

/// Segment `text` into maximal runs according to `classifier`.
///
/// Concatenating the returned runs reproduces `text` exactly, no run is
/// empty, and adjacent runs never share a kind.
pub fn segment_with(text: &str, classifier: &ScriptClassifier) -> Vec<Run> {
    let _span = debug_span!("segment", len = text.len()).entered();
    let mut runs = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;

    for (i, c) in text.char_indices() {
        let ideograph = classifier.is_ideograph(c);
        match current {
            Some(kind) if kind == ideograph => {}
            Some(kind) => {
                runs.push(make_run(&text[start..i], kind));
                start = i;
                current = Some(ideograph);
            }
            None => current = Some(ideograph),
        }
    }
    if let Some(kind) = current {
        runs.push(make_run(&text[start..], kind));
    }

    debug!(run_count = runs.len());
    runs
}

fn make_run(slice: &str, ideograph: bool) -> Run {
    if ideograph {
        Run::candidate(slice)
    } else {
        Run::literal(slice)
    }
}

/// Whether `text` contains at least one candidate run under `classifier`.
pub fn has_candidates(text: &str, classifier: &ScriptClassifier) -> bool {
    text.chars().any(|c| classifier.is_ideograph(c))
}
