use std::fs;

use rubi_core::settings::{default_toml, parse_settings_toml, Settings, SettingsError};
use rubi_session::dom::{Selector, SelectorError};

#[derive(Debug, thiserror::Error)]
pub enum ValidateError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("mount.selector: {0}")]
    Selector(#[from] SelectorError),
}

pub fn settings_export() {
    print!("{}", default_toml());
}

/// Parse settings TOML and check everything the engine checks at startup,
/// including the mount selector grammar.
pub fn check_settings(content: &str) -> Result<Settings, ValidateError> {
    let s = parse_settings_toml(content)?;
    Selector::parse(&s.mount.selector)?;
    Ok(s)
}

pub fn settings_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let s = die!(check_settings(&content), "Error: {}");
    println!(
        "OK: mount.selector={}, mount.max_attempts={}, classifier.ranges={}, events.coalesce_window_ms={}",
        s.mount.selector,
        s.mount.max_attempts,
        s.classifier.ideograph_ranges.len(),
        s.events.coalesce_window_ms
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_settings_accepts_defaults() {
        let s = check_settings(default_toml()).unwrap();
        assert_eq!(s.mount.selector, "div.p-novel__body");
    }

    #[test]
    fn test_check_settings_rejects_combinator() {
        let toml = default_toml().replace(
            "selector = \"div.p-novel__body\"",
            "selector = \"div > p\"",
        );
        assert!(matches!(
            check_settings(&toml),
            Err(ValidateError::Selector(SelectorError::Unsupported { ch: ' ', .. }))
        ));
    }

    #[test]
    fn test_check_settings_reports_parse_errors() {
        assert!(matches!(
            check_settings("[mount]\nselector = 3\n"),
            Err(ValidateError::Settings(_))
        ));
    }
}
