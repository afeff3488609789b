// src/config.rs

//! Configuration loading utilities.
//!
//! Convenience functions for loading the dashboard configuration and the
//! display locale from files.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::{Config, LocaleConfig};

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> Config {
    Config::load_or_default(path)
}

/// Load the locale for `language`, optionally overridden from a TOML file.
pub fn load_locale(path: Option<&Path>, language: &str) -> LocaleConfig {
    match path {
        Some(path) => LocaleConfig::load_or_default(path, language),
        None => LocaleConfig::for_language(language),
    }
}

/// Load and validate both the configuration and its locale.
///
/// Unlike [`load_config`], a missing or malformed configuration file is an
/// error here.
pub fn load_all(config_path: &Path, locale_path: Option<&Path>) -> Result<(Config, LocaleConfig)> {
    let config = Config::load(config_path).map_err(|e| {
        AppError::config(format!("Failed to load {}: {e}", config_path.display()))
    })?;
    config
        .validate()
        .map_err(|e| AppError::config(format!("Invalid configuration: {e}")))?;

    let locale = load_locale(locale_path, &config.display.language);
    Ok((config, locale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_config_falls_back() {
        let config = load_config(Path::new("/nonexistent/dashboard.toml"));
        assert_eq!(config.view.primary, "records");
    }

    #[test]
    fn test_load_all_uses_display_language() {
        let file = write(
            r#"
            [display]
            language = "fr"

            [view]
            primary = "courses"
            sources = [{ name = "courses", path = "/api/cours" }]
            "#,
        );
        let (config, locale) = load_all(file.path(), None).unwrap();
        assert_eq!(config.view.primary, "courses");
        assert_eq!(locale.language, "fr");
    }

    #[test]
    fn test_locale_override_follows_display_language() {
        let config = write(
            r#"
            [display]
            language = "fr"

            [view]
            primary = "courses"
            sources = [{ name = "courses", path = "/api/cours" }]
            "#,
        );
        let locale_file = write(r#"not_specified = "N/A""#);

        let (_, locale) = load_all(config.path(), Some(locale_file.path())).unwrap();
        assert_eq!(locale.language, "fr");
        assert_eq!(locale.not_specified, "N/A");
        assert_eq!(locale.month_name(1), Some("janvier"));
    }

    #[test]
    fn test_load_all_rejects_invalid_view() {
        let file = write(
            r#"
            [view]
            primary = "missing"
            sources = [{ name = "courses", path = "/api/cours" }]
            "#,
        );
        assert!(matches!(load_all(file.path(), None), Err(AppError::Config(_))));
    }

    #[test]
    fn test_load_all_missing_file() {
        assert!(load_all(Path::new("/nonexistent/dashboard.toml"), None).is_err());
    }
}
