//! Global settings loaded from TOML.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`

use std::sync::OnceLock;
use std::time::Duration;

use serde::Deserialize;

use crate::unicode::ScriptClassifier;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str).expect("settings TOML must be valid")
    })
}

/// Returns the embedded default settings TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub mount: MountSettings,
    pub markup: MarkupSettings,
    pub classifier: ClassifierSettings,
    pub analyzer: AnalyzerSettings,
    pub events: EventSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MountSettings {
    pub selector: String,
    pub poll_interval_ms: u64,
    pub max_attempts: u32,
}

impl MountSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Tag, class and attribute names stamped on the elements the engine creates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarkupSettings {
    pub candidate_tag: String,
    pub candidate_class: String,
    pub surface_attr: String,
    pub annotation_tag: String,
    pub gloss_tag: String,
    #[serde(default)]
    pub skip_tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierSettings {
    /// Inclusive `[start, end]` code-point pairs.
    pub ideograph_ranges: Vec<[u32; 2]>,
}

impl ClassifierSettings {
    /// Build the classifier for the configured ranges.
    pub fn classifier(&self) -> ScriptClassifier {
        ScriptClassifier::new(self.ideograph_ranges.iter().filter_map(|&[lo, hi]| {
            Some(char::from_u32(lo)?..=char::from_u32(hi)?)
        }))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerSettings {
    pub dict_file: String,
    pub unknown_word_cost: i16,
    pub segment_penalty: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventSettings {
    pub coalesce_window_ms: u64,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn invalid(field: &str, reason: &str) -> SettingsError {
    SettingsError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_non_empty {
        ($section:ident . $field:ident) => {
            if s.$section.$field.trim().is_empty() {
                return Err(invalid(
                    concat!(stringify!($section), ".", stringify!($field)),
                    "must not be empty",
                ));
            }
        };
    }
    macro_rules! check_positive {
        ($section:ident . $field:ident) => {
            if s.$section.$field == 0 {
                return Err(invalid(
                    concat!(stringify!($section), ".", stringify!($field)),
                    "must be positive",
                ));
            }
        };
    }

    check_non_empty!(mount.selector);
    check_positive!(mount.poll_interval_ms);
    check_positive!(mount.max_attempts);

    check_non_empty!(markup.candidate_tag);
    check_non_empty!(markup.candidate_class);
    check_non_empty!(markup.surface_attr);
    check_non_empty!(markup.annotation_tag);
    check_non_empty!(markup.gloss_tag);
    if s.markup.annotation_tag == s.markup.gloss_tag {
        return Err(invalid(
            "markup.gloss_tag",
            "must differ from markup.annotation_tag",
        ));
    }

    if s.classifier.ideograph_ranges.is_empty() {
        return Err(invalid("classifier.ideograph_ranges", "must not be empty"));
    }
    for &[lo, hi] in &s.classifier.ideograph_ranges {
        if char::from_u32(lo).is_none() || char::from_u32(hi).is_none() {
            return Err(SettingsError::InvalidValue {
                field: "classifier.ideograph_ranges".to_string(),
                reason: format!("[{lo:#X}, {hi:#X}] is not a range of Unicode scalar values"),
            });
        }
        if lo > hi {
            return Err(SettingsError::InvalidValue {
                field: "classifier.ideograph_ranges".to_string(),
                reason: format!("[{lo:#X}, {hi:#X}] has start after end"),
            });
        }
    }

    check_non_empty!(analyzer.dict_file);
    if s.analyzer.unknown_word_cost < 0 {
        return Err(invalid("analyzer.unknown_word_cost", "must be non-negative"));
    }
    if s.analyzer.segment_penalty < 0 {
        return Err(invalid("analyzer.segment_penalty", "must be non-negative"));
    }

    // coalesce_window_ms = 0 disables coalescing

    Ok(())
}
