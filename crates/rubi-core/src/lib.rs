//! Text-side building blocks for reading annotations: script classification,
//! kana normalization, segmentation into annotatable runs, and the
//! dictionary-backed morphological analyzer.

pub mod analyzer;
pub mod dict;
pub mod segment;
pub mod settings;
pub mod unicode;
