// src/models/locale.rs

//! Display strings for dates, relative times and statuses.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Locale configuration used by the date resolver and status labels.
///
/// A locale file overrides the built-in strings of a base language key by
/// key; missing keys keep the base value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Language tag (`ar`, `fr`, `en`)
    pub language: String,

    /// Sentinel shown when no valid date is available
    pub not_specified: String,

    /// Month names, January first
    pub months: Vec<String>,

    /// Absolute date template with `{day}`, `{month}` and `{year}` placeholders
    pub date_pattern: String,

    /// Relative "time ago" templates
    pub relative: RelativeLabels,

    /// Status badge labels
    pub statuses: StatusLabels,
}

/// Relative time templates. `{n}` is replaced by the bucket count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelativeLabels {
    pub moments: String,
    pub minutes: String,
    pub hours: String,
    pub days: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusLabels {
    pub pending: String,
    pub approved: String,
    pub rejected: String,
    pub unknown: String,
}

impl LocaleConfig {
    /// Load a locale file over the built-in Arabic strings.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_over(path, &Self::default())
    }

    /// Load a locale file over the built-in strings for `language`.
    pub fn load_for(path: impl AsRef<Path>, language: &str) -> Result<Self> {
        Self::load_over(path, &Self::for_language(language))
    }

    fn load_over(path: impl AsRef<Path>, base: &Self) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let overrides: toml::Table = toml::from_str(&content)?;

        let encoded = toml::Value::try_from(base)
            .map_err(|e| AppError::config(format!("Cannot encode base locale: {e}")))?;
        let toml::Value::Table(mut merged) = encoded else {
            return Err(AppError::config("Base locale is not a table"));
        };
        merge_tables(&mut merged, overrides);
        Ok(toml::Value::Table(merged).try_into()?)
    }

    /// Load a locale over the built-in strings for `language`, falling back
    /// to those strings when the file cannot be used.
    pub fn load_or_default(path: impl AsRef<Path>, language: &str) -> Self {
        Self::load_for(&path, language).unwrap_or_else(|e| {
            log::warn!(
                "Locale load failed from {:?}: {}. Using built-in '{}' strings.",
                path.as_ref(),
                e,
                language
            );
            Self::for_language(language)
        })
    }

    /// Built-in strings for a language tag. Unknown tags get Arabic.
    pub fn for_language(language: &str) -> Self {
        match language.trim().to_lowercase().as_str() {
            "fr" | "fr-fr" | "fr-dz" => defaults::french(),
            "en" | "en-us" | "en-gb" => defaults::english(),
            _ => defaults::arabic(),
        }
    }

    /// Name of a 1-based month, if the locale defines it.
    pub fn month_name(&self, month: u32) -> Option<&str> {
        let idx = usize::try_from(month).ok()?.checked_sub(1)?;
        self.months.get(idx).map(String::as_str)
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        defaults::arabic()
    }
}

impl Default for RelativeLabels {
    fn default() -> Self {
        defaults::arabic().relative
    }
}

impl Default for StatusLabels {
    fn default() -> Self {
        defaults::arabic().statuses
    }
}

/// Overlay `overrides` onto `base`, recursing into nested tables.
fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match value {
            toml::Value::Table(inner) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, inner),
                _ => {
                    base.insert(key, toml::Value::Table(inner));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

mod defaults {
    use super::{LocaleConfig, RelativeLabels, StatusLabels};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    pub fn arabic() -> LocaleConfig {
        LocaleConfig {
            language: "ar".into(),
            not_specified: "غير محدد".into(),
            months: strings(&[
                "يناير", "فبراير", "مارس", "أبريل", "مايو", "يونيو", "يوليو", "أغسطس", "سبتمبر",
                "أكتوبر", "نوفمبر", "ديسمبر",
            ]),
            date_pattern: "{day} {month} {year}".into(),
            relative: RelativeLabels {
                moments: "منذ لحظات".into(),
                minutes: "منذ {n} دقيقة".into(),
                hours: "منذ {n} ساعة".into(),
                days: "منذ {n} يوم".into(),
            },
            statuses: StatusLabels {
                pending: "قيد الانتظار".into(),
                approved: "مقبول".into(),
                rejected: "مرفوض".into(),
                unknown: "غير معروف".into(),
            },
        }
    }

    pub fn french() -> LocaleConfig {
        LocaleConfig {
            language: "fr".into(),
            not_specified: "Non spécifié".into(),
            months: strings(&[
                "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août",
                "septembre", "octobre", "novembre", "décembre",
            ]),
            date_pattern: "{day} {month} {year}".into(),
            relative: RelativeLabels {
                moments: "à l'instant".into(),
                minutes: "il y a {n} min".into(),
                hours: "il y a {n} h".into(),
                days: "il y a {n} j".into(),
            },
            statuses: StatusLabels {
                pending: "En attente".into(),
                approved: "Approuvé".into(),
                rejected: "Rejeté".into(),
                unknown: "Inconnu".into(),
            },
        }
    }

    pub fn english() -> LocaleConfig {
        LocaleConfig {
            language: "en".into(),
            not_specified: "Not specified".into(),
            months: strings(&[
                "January", "February", "March", "April", "May", "June", "July", "August",
                "September", "October", "November", "December",
            ]),
            date_pattern: "{month} {day}, {year}".into(),
            relative: RelativeLabels {
                moments: "moments ago".into(),
                minutes: "{n} minutes ago".into(),
                hours: "{n} hours ago".into(),
                days: "{n} days ago".into(),
            },
            statuses: StatusLabels {
                pending: "Pending".into(),
                approved: "Approved".into(),
                rejected: "Rejected".into(),
                unknown: "Unknown".into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_for_language_fallback() {
        assert_eq!(LocaleConfig::for_language("FR").language, "fr");
        assert_eq!(LocaleConfig::for_language("de").language, "ar");
    }

    #[test]
    fn test_month_name_bounds() {
        let locale = LocaleConfig::for_language("en");
        assert_eq!(locale.month_name(5), Some("May"));
        assert_eq!(locale.month_name(0), None);
        assert_eq!(locale.month_name(13), None);
    }

    #[test]
    fn test_partial_locale_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not_specified = \"—\"").unwrap();

        let locale = LocaleConfig::load(file.path()).unwrap();
        assert_eq!(locale.not_specified, "—");
        assert_eq!(locale.months.len(), 12);
    }

    #[test]
    fn test_partial_file_keeps_requested_language() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not_specified = \"N/A\"").unwrap();

        let locale = LocaleConfig::load_or_default(file.path(), "fr");
        assert_eq!(locale.language, "fr");
        assert_eq!(locale.not_specified, "N/A");
        assert_eq!(locale.month_name(5), Some("mai"));
        assert_eq!(locale.date_pattern, "{day} {month} {year}");
        assert_eq!(locale.statuses.approved, "Approuvé");
    }

    #[test]
    fn test_partial_nested_table_merges() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[relative]\nmoments = \"just now\"").unwrap();

        let locale = LocaleConfig::load_for(file.path(), "en").unwrap();
        assert_eq!(locale.relative.moments, "just now");
        assert_eq!(locale.relative.minutes, "{n} minutes ago");
        assert_eq!(locale.month_name(1), Some("January"));
    }

    #[test]
    fn test_partial_nested_table_parses_alone() {
        let relative: RelativeLabels = toml::from_str(r#"moments = "الآن""#).unwrap();
        assert_eq!(relative.moments, "الآن");
        assert_eq!(relative.days, "منذ {n} يوم");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let locale = LocaleConfig::load_or_default("/nonexistent/locale.toml", "en");
        assert_eq!(locale.language, "en");
    }
}
