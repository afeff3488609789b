// src/models/record.rs

//! Entity records and the closed status set.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::LocaleConfig;

/// One domain object (course, module, programme, memoire) as a field mapping.
pub type Record = Map<String, Value>;

/// Text form of a field value, as used for searching, filtering and grouping.
///
/// Strings are returned as-is, numbers and booleans in their JSON text form.
/// `null` and missing fields yield `None`; nested values are serialized.
pub fn field_text(record: &Record, field: &str) -> Option<String> {
    value_text(record.get(field)?)
}

/// Text form of a single JSON value. See [`field_text`].
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Whether a value counts as "present" for alias reconciliation.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// Review status of a record.
///
/// Backends in this application spell statuses in English, French or Arabic.
/// Anything outside the recognized spellings is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Approved,
    Rejected,
    Unknown,
}

/// Visual tone a renderer uses for a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTone {
    Warning,
    Success,
    Danger,
    Neutral,
}

impl Status {
    /// Parse a status from its raw (possibly localized) spelling.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "pending" | "en attente" | "en_attente" | "waiting" | "submitted"
            | "قيد الانتظار" | "قيد المراجعة" | "في الانتظار" => Status::Pending,
            "approved" | "accepted" | "validated" | "accepté" | "approuvé" | "validé"
            | "مقبول" | "موافق عليه" | "مصادق عليه" => Status::Approved,
            "rejected" | "refused" | "refusé" | "rejeté" | "مرفوض" => Status::Rejected,
            _ => Status::Unknown,
        }
    }

    /// Parse the status held by `field` of a record; missing fields are `Unknown`.
    pub fn of(record: &Record, field: &str) -> Self {
        field_text(record, field)
            .map(|raw| Self::parse(&raw))
            .unwrap_or(Status::Unknown)
    }

    pub fn tone(&self) -> BadgeTone {
        match self {
            Status::Pending => BadgeTone::Warning,
            Status::Approved => BadgeTone::Success,
            Status::Rejected => BadgeTone::Danger,
            Status::Unknown => BadgeTone::Neutral,
        }
    }

    /// Localized label for display.
    pub fn label<'a>(&self, locale: &'a LocaleConfig) -> &'a str {
        let labels = &locale.statuses;
        match self {
            Status::Pending => labels.pending.as_str(),
            Status::Approved => labels.approved.as_str(),
            Status::Rejected => labels.rejected.as_str(),
            Status::Unknown => labels.unknown.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_field_text_forms() {
        let r = record(json!({"id": 5, "t": "Intro", "ok": true, "n": null}));
        assert_eq!(field_text(&r, "id").as_deref(), Some("5"));
        assert_eq!(field_text(&r, "t").as_deref(), Some("Intro"));
        assert_eq!(field_text(&r, "ok").as_deref(), Some("true"));
        assert_eq!(field_text(&r, "n"), None);
        assert_eq!(field_text(&r, "missing"), None);
    }

    #[test]
    fn test_status_parse_multilingual() {
        assert_eq!(Status::parse("مقبول"), Status::Approved);
        assert_eq!(Status::parse("Approved"), Status::Approved);
        assert_eq!(Status::parse("en attente"), Status::Pending);
        assert_eq!(Status::parse(" REFUSÉ "), Status::Rejected);
        assert_eq!(Status::parse("archived"), Status::Unknown);
        assert_eq!(Status::parse(""), Status::Unknown);
    }

    #[test]
    fn test_status_of_missing_field() {
        let r = record(json!({"status": 3}));
        assert_eq!(Status::of(&r, "status"), Status::Unknown);
        assert_eq!(Status::of(&r, "etat"), Status::Unknown);
    }

    #[test]
    fn test_status_labels() {
        let locale = LocaleConfig::for_language("fr");
        assert_eq!(Status::Approved.label(&locale), "Approuvé");
        assert_eq!(Status::Unknown.tone(), BadgeTone::Neutral);
    }
}
