//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP fetch behavior
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Date and label rendering
    #[serde(default)]
    pub display: DisplayConfig,

    /// Dashboard tab definition
    #[serde(default)]
    pub view: ViewConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetch.user_agent is empty"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(AppError::validation("fetch.timeout_secs must be > 0"));
        }
        if self.fetch.max_concurrent == 0 {
            return Err(AppError::validation("fetch.max_concurrent must be > 0"));
        }
        self.view.validate()
    }
}

/// HTTP client settings for the fetch collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Backend base URL that source paths are joined onto
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum concurrent source fetches
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Bearer token sent with every request
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Template for stored file URLs (`{category}`, `{path}`)
    #[serde(default = "defaults::files_path")]
    pub files_path: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
            auth_token: None,
            files_path: defaults::files_path(),
        }
    }
}

/// Rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Language tag for built-in locale strings
    #[serde(default = "defaults::language")]
    pub language: String,

    /// Offset applied to timestamps before formatting
    #[serde(default)]
    pub utc_offset_minutes: i32,

    /// Render Arabic-Indic digits when the language is Arabic
    #[serde(default)]
    pub native_digits: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            language: defaults::language(),
            utc_offset_minutes: 0,
            native_digits: false,
        }
    }
}

/// One dashboard tab: its sources and how they are normalized, grouped,
/// counted and filtered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Source whose records form the visible list
    #[serde(default = "defaults::primary")]
    pub primary: String,

    /// Named sources, each fetched independently
    #[serde(default = "defaults::sources")]
    pub sources: Vec<SourceSpec>,

    /// Alias groups, preferred name first
    #[serde(default = "defaults::alias_groups")]
    pub alias_groups: Vec<Vec<String>>,

    /// Candidate date fields in priority order
    #[serde(default = "defaults::date_fields")]
    pub date_fields: Vec<String>,

    /// Field holding the record status
    #[serde(default = "defaults::status_field")]
    pub status_field: String,

    /// Fields the search term is matched against
    #[serde(default = "defaults::search_fields")]
    pub search_fields: Vec<String>,

    /// Categorical filter fields offered by the tab
    #[serde(default)]
    pub filters: Vec<String>,

    /// Cross-collection groupings
    #[serde(default)]
    pub groupings: Vec<GroupingSpec>,

    /// Aggregate statistics
    #[serde(default)]
    pub stats: Vec<StatSpec>,
}

impl ViewConfig {
    /// Check that every reference points at a declared source or grouping.
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(AppError::validation("view.sources is empty"));
        }

        let mut names = HashSet::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(AppError::validation("source with empty name"));
            }
            if !names.insert(source.name.as_str()) {
                return Err(AppError::validation(format!(
                    "duplicate source '{}'",
                    source.name
                )));
            }
        }

        if !names.contains(self.primary.as_str()) {
            return Err(AppError::validation(format!(
                "primary source '{}' is not declared",
                self.primary
            )));
        }

        for group in &self.alias_groups {
            if group.is_empty() {
                return Err(AppError::validation("empty alias group"));
            }
        }

        let mut grouping_names = HashSet::new();
        for grouping in &self.groupings {
            if !names.contains(grouping.source.as_str()) {
                return Err(AppError::validation(format!(
                    "grouping '{}' references unknown source '{}'",
                    grouping.name, grouping.source
                )));
            }
            if let Some(parent) = &grouping.parent {
                if !names.contains(parent.as_str()) {
                    return Err(AppError::validation(format!(
                        "grouping '{}' references unknown parent '{}'",
                        grouping.name, parent
                    )));
                }
            }
            grouping_names.insert(grouping.name.as_str());
        }

        for stat in &self.stats {
            if let Some(source) = stat.kind.source() {
                if !names.contains(source) {
                    return Err(AppError::validation(format!(
                        "stat '{}' references unknown source '{}'",
                        stat.name, source
                    )));
                }
            }
            if let StatKind::Groups { grouping } = &stat.kind {
                if !grouping_names.contains(grouping.as_str()) {
                    return Err(AppError::validation(format!(
                        "stat '{}' references unknown grouping '{}'",
                        stat.name, grouping
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn source(&self, name: &str) -> Option<&SourceSpec> {
        self.sources.iter().find(|s| s.name == name)
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            primary: defaults::primary(),
            sources: defaults::sources(),
            alias_groups: defaults::alias_groups(),
            date_fields: defaults::date_fields(),
            status_field: defaults::status_field(),
            search_fields: defaults::search_fields(),
            filters: Vec::new(),
            groupings: Vec::new(),
            stats: Vec::new(),
        }
    }
}

/// A named backend collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSpec {
    pub name: String,

    /// Endpoint path relative to `fetch.base_url`
    pub path: String,
}

/// Group the records of `source` by `key_field`.
///
/// With a `parent`, every parent record seeds a (possibly empty) group keyed
/// by its `parent_key` (defaults to `key_field`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupingSpec {
    pub name: String,
    pub source: String,
    pub key_field: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub parent_key: Option<String>,
}

impl GroupingSpec {
    pub fn parent_key(&self) -> &str {
        self.parent_key.as_deref().unwrap_or(&self.key_field)
    }
}

/// A named aggregate statistic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: StatKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatKind {
    /// Number of records in a source
    Total { source: String },
    /// Records whose status field parses to `status`
    Status {
        source: String,
        status: crate::models::Status,
    },
    /// Records whose `field` text equals `value`
    Equals {
        source: String,
        field: String,
        value: String,
    },
    /// Distinct non-empty values of `fields` joined by a space
    Distinct { source: String, fields: Vec<String> },
    /// Non-empty groups in a grouping
    Groups { grouping: String },
}

impl StatKind {
    pub fn source(&self) -> Option<&str> {
        match self {
            StatKind::Total { source }
            | StatKind::Status { source, .. }
            | StatKind::Equals { source, .. }
            | StatKind::Distinct { source, .. } => Some(source.as_str()),
            StatKind::Groups { .. } => None,
        }
    }
}

mod defaults {
    use super::SourceSpec;

    pub fn base_url() -> String {
        "http://localhost:8000".into()
    }
    pub fn user_agent() -> String {
        "dashview/0.1".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        4
    }
    pub fn files_path() -> String {
        "/storage/{category}/{path}".into()
    }
    pub fn language() -> String {
        "ar".into()
    }

    pub fn primary() -> String {
        "records".into()
    }
    pub fn sources() -> Vec<SourceSpec> {
        vec![SourceSpec {
            name: "records".into(),
            path: "/api/records".into(),
        }]
    }
    pub fn alias_groups() -> Vec<Vec<String>> {
        vec![
            vec!["created_at".into(), "createdAt".into()],
            vec!["updated_at".into(), "updatedAt".into()],
        ]
    }
    pub fn date_fields() -> Vec<String> {
        vec!["created_at".into(), "createdAt".into()]
    }
    pub fn status_field() -> String {
        "status".into()
    }
    pub fn search_fields() -> Vec<String> {
        vec!["titre_fr".into(), "titre_ar".into()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;

    fn sample_view() -> ViewConfig {
        toml::from_str(
            r#"
            primary = "courses"
            sources = [
                { name = "courses", path = "/api/cours" },
                { name = "modules", path = "/api/modules" },
            ]

            [[groupings]]
            name = "courses_by_module"
            source = "courses"
            key_field = "id_module"
            parent = "modules"

            [[stats]]
            name = "approved"
            kind = "status"
            source = "courses"
            status = "approved"

            [[stats]]
            name = "modules_in_use"
            kind = "groups"
            grouping = "courses_by_module"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.fetch.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_view_config() {
        let view = sample_view();
        assert!(view.validate().is_ok());
        assert_eq!(view.groupings[0].parent_key(), "id_module");
        assert!(matches!(
            view.stats[0].kind,
            StatKind::Status {
                status: Status::Approved,
                ..
            }
        ));
        // Defaults still apply to omitted keys
        assert_eq!(view.status_field, "status");
    }

    #[test]
    fn validate_rejects_unknown_primary() {
        let mut view = sample_view();
        view.primary = "programmes".into();
        assert!(view.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_grouping_parent() {
        let mut view = sample_view();
        view.groupings[0].parent = Some("specialites".into());
        assert!(view.validate().is_err());
    }

    #[test]
    fn validate_rejects_stat_on_unknown_grouping() {
        let mut view = sample_view();
        view.stats.push(StatSpec {
            name: "x".into(),
            kind: StatKind::Groups {
                grouping: "nope".into(),
            },
        });
        assert!(view.validate().is_err());
    }

    #[test]
    fn validate_rejects_duplicate_sources() {
        let mut view = sample_view();
        view.sources.push(SourceSpec {
            name: "courses".into(),
            path: "/api/other".into(),
        });
        assert!(view.validate().is_err());
    }
}
