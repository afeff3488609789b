//! Date resolution and localized formatting.
//!
//! Records carry their timestamps under varying names, sometimes empty or
//! malformed. [`DateResolver`] picks the first candidate field that parses,
//! in caller-supplied priority order, and always produces a display string.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::{DisplayConfig, LocaleConfig, Record, RelativeLabels, value_text};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;

/// Naive timestamp layouts accepted after RFC 3339. Interpreted as UTC.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// The locale formatter failed to render a timestamp.
#[derive(Error, Debug)]
#[error("date formatting failed: {0}")]
pub struct FormatError(pub String);

/// Host formatting facility. Receives the calendar date already shifted to
/// the display offset. Implementations may fail; the resolver absorbs
/// failures into the "not specified" sentinel.
pub trait DateFormatter: Send + Sync {
    fn format(&self, date: NaiveDate) -> std::result::Result<String, FormatError>;
}

/// Formats dates with a [`LocaleConfig`] month table and date pattern.
#[derive(Debug, Clone)]
pub struct LocaleFormatter {
    locale: LocaleConfig,
    native_digits: bool,
}

impl LocaleFormatter {
    pub fn new(locale: LocaleConfig, display: &DisplayConfig) -> Self {
        Self {
            native_digits: display.native_digits && locale.language == "ar",
            locale,
        }
    }
}

impl DateFormatter for LocaleFormatter {
    fn format(&self, date: NaiveDate) -> std::result::Result<String, FormatError> {
        use chrono::Datelike;

        let month = self
            .locale
            .month_name(date.month())
            .ok_or_else(|| FormatError(format!("no month name for {}", date.month())))?;

        let text = self
            .locale
            .date_pattern
            .replace("{day}", &date.day().to_string())
            .replace("{month}", month)
            .replace("{year}", &date.year().to_string());

        Ok(if self.native_digits {
            arabic_indic_digits(&text)
        } else {
            text
        })
    }
}

/// A resolved record date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedDate {
    /// Raw text of the field that was selected
    pub raw: Option<String>,
    /// Localized display text, or the "not specified" sentinel
    pub display: String,
    /// Selected instant; plain dates are midnight UTC
    pub at: Option<DateTime<Utc>>,
}

/// A parsed candidate value.
#[derive(Debug, Clone, Copy)]
struct Parsed {
    at: DateTime<Utc>,
    /// The value had no time of day and names a calendar date as-is
    date_only: bool,
}

fn display_offset(display: &DisplayConfig) -> FixedOffset {
    FixedOffset::east_opt(display.utc_offset_minutes.saturating_mul(60)).unwrap_or_else(|| {
        log::warn!(
            "utc_offset_minutes {} out of range, using UTC",
            display.utc_offset_minutes
        );
        Utc.fix()
    })
}

/// Picks and formats the first valid date among candidate fields.
pub struct DateResolver {
    formatter: Box<dyn DateFormatter>,
    offset: FixedOffset,
    not_specified: String,
    relative: RelativeLabels,
    native_digits: bool,
}

impl DateResolver {
    /// Create a resolver using the built-in locale formatter.
    pub fn new(locale: LocaleConfig, display: &DisplayConfig) -> Self {
        let formatter = LocaleFormatter::new(locale.clone(), display);
        let mut resolver = Self::with_formatter(&locale, Box::new(formatter));
        resolver.offset = display_offset(display);
        resolver.native_digits = display.native_digits && locale.language == "ar";
        resolver
    }

    /// Create a resolver with a custom formatter. Dates are shown in UTC.
    pub fn with_formatter(locale: &LocaleConfig, formatter: Box<dyn DateFormatter>) -> Self {
        Self {
            formatter,
            offset: Utc.fix(),
            not_specified: locale.not_specified.clone(),
            relative: locale.relative.clone(),
            native_digits: false,
        }
    }

    pub fn not_specified(&self) -> &str {
        &self.not_specified
    }

    /// Resolve the first valid candidate into raw and display forms.
    pub fn resolve(&self, record: &Record, candidates: &[String]) -> ResolvedDate {
        match select(record, candidates) {
            Some((raw, parsed)) => ResolvedDate {
                raw,
                display: self.display(parsed),
                at: Some(parsed.at),
            },
            None => ResolvedDate {
                raw: None,
                display: self.not_specified.clone(),
                at: None,
            },
        }
    }

    /// Relative "time ago" text, falling back to the absolute date after a week.
    ///
    /// Buckets include their lower bound. Future timestamps fall into the
    /// "moments ago" bucket.
    pub fn time_ago(&self, record: &Record, candidates: &[String], now: DateTime<Utc>) -> String {
        let Some((_, parsed)) = select(record, candidates) else {
            return self.not_specified.clone();
        };

        let (template, n) = match (now - parsed.at).num_seconds() {
            delta if delta < MINUTE => return self.relative.moments.clone(),
            delta if delta < HOUR => (&self.relative.minutes, delta / MINUTE),
            delta if delta < DAY => (&self.relative.hours, delta / HOUR),
            delta if delta < WEEK => (&self.relative.days, delta / DAY),
            _ => return self.display(parsed),
        };

        let text = template.replace("{n}", &n.to_string());
        if self.native_digits {
            arabic_indic_digits(&text)
        } else {
            text
        }
    }

    /// Calendar date shown for a parsed value. Plain dates are not shifted.
    fn calendar_date(&self, parsed: Parsed) -> NaiveDate {
        if parsed.date_only {
            parsed.at.date_naive()
        } else {
            parsed.at.with_timezone(&self.offset).date_naive()
        }
    }

    fn display(&self, parsed: Parsed) -> String {
        self.formatter.format(self.calendar_date(parsed)).unwrap_or_else(|e| {
            log::debug!("{}; showing sentinel", e);
            self.not_specified.clone()
        })
    }
}

fn select(record: &Record, candidates: &[String]) -> Option<(Option<String>, Parsed)> {
    candidates.iter().find_map(|name| {
        let value = record.get(name)?;
        parse_value(value).map(|parsed| (value_text(value), parsed))
    })
}

/// Parse a JSON value as a timestamp.
///
/// Strings are tried as RFC 3339, then as naive date-times and plain dates
/// in UTC. Numbers are epoch milliseconds. Anything else is invalid.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    parse_value(value).map(|parsed| parsed.at)
}

fn parse_value(value: &Value) -> Option<Parsed> {
    match value {
        Value::String(s) => parse_text(s.trim()),
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })?;
            DateTime::from_timestamp_millis(millis).map(|at| Parsed {
                at,
                date_only: false,
            })
        }
        _ => None,
    }
}

fn parse_text(text: &str) -> Option<Parsed> {
    if text.is_empty() {
        return None;
    }
    let instant = |at| Parsed {
        at,
        date_only: false,
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(instant(dt.with_timezone(&Utc)));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(instant(naive.and_utc()));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| Parsed {
                at: naive.and_utc(),
                date_only: true,
            });
        }
    }
    None
}

fn arabic_indic_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c.to_digit(10) {
            Some(d) if c.is_ascii_digit() => char::from_u32(0x0660 + d).unwrap_or(c),
            _ => c,
        })
        .collect()
}

/// Resolve a date with the built-in Arabic locale in UTC.
pub fn resolve_date(record: &Record, candidates: &[String]) -> ResolvedDate {
    DateResolver::new(LocaleConfig::default(), &DisplayConfig::default()).resolve(record, candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn english() -> DateResolver {
        DateResolver::new(LocaleConfig::for_language("en"), &DisplayConfig::default())
    }

    struct FailingFormatter;

    impl DateFormatter for FailingFormatter {
        fn format(&self, _date: NaiveDate) -> std::result::Result<String, FormatError> {
            Err(FormatError("formatter unavailable".into()))
        }
    }

    #[test]
    fn test_empty_record_gives_sentinel() {
        let resolved = resolve_date(&Record::new(), &fields(&["created_at", "createdAt"]));
        assert_eq!(resolved.raw, None);
        assert_eq!(resolved.display, "غير محدد");
    }

    #[test]
    fn test_first_valid_candidate_wins() {
        let r = record(json!({"created_at": "bad", "createdAt": "2024-03-01T00:00:00Z"}));
        let resolved = english().resolve(&r, &fields(&["created_at", "createdAt"]));

        assert_eq!(resolved.raw.as_deref(), Some("2024-03-01T00:00:00Z"));
        assert_eq!(resolved.display, "March 1, 2024");
    }

    #[test]
    fn test_priority_order_is_caller_supplied() {
        let r = record(json!({"created_at": "2024-01-10", "updated_at": "2024-02-20"}));
        let resolver = english();

        let updated_first = resolver.resolve(&r, &fields(&["updated_at", "created_at"]));
        assert_eq!(updated_first.display, "February 20, 2024");

        let created_first = resolver.resolve(&r, &fields(&["created_at", "updated_at"]));
        assert_eq!(created_first.display, "January 10, 2024");
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let r = record(json!({"createdAt": "2024-05-01"}));
        let resolver = english();
        let first = resolver.resolve(&r, &fields(&["created_at", "createdAt"]));
        let second = resolver.resolve(&r, &fields(&["created_at", "createdAt"]));
        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_inputs_never_panic() {
        let resolver = english();
        let candidates = fields(&["d"]);
        for value in [json!(null), json!(""), json!("31/31/2024"), json!([1]), json!({})] {
            let r = record(json!({ "d": value }));
            assert_eq!(resolver.resolve(&r, &candidates).display, "Not specified");
        }
    }

    #[test]
    fn test_locale_display_forms() {
        let r = record(json!({"createdAt": "2024-05-01"}));
        let candidates = fields(&["createdAt"]);
        let display = DisplayConfig::default();

        let ar = DateResolver::new(LocaleConfig::for_language("ar"), &display);
        assert_eq!(ar.resolve(&r, &candidates).display, "1 مايو 2024");

        let fr = DateResolver::new(LocaleConfig::for_language("fr"), &display);
        assert_eq!(fr.resolve(&r, &candidates).display, "1 mai 2024");
    }

    #[test]
    fn test_native_digits() {
        let display = DisplayConfig {
            native_digits: true,
            ..DisplayConfig::default()
        };
        let resolver = DateResolver::new(LocaleConfig::for_language("ar"), &display);
        let r = record(json!({"createdAt": "2024-05-01"}));
        assert_eq!(
            resolver.resolve(&r, &fields(&["createdAt"])).display,
            "١ مايو ٢٠٢٤"
        );
    }

    #[test]
    fn test_utc_offset_shifts_day() {
        let display = DisplayConfig {
            language: "en".into(),
            utc_offset_minutes: 60,
            native_digits: false,
        };
        let resolver = DateResolver::new(LocaleConfig::for_language("en"), &display);
        let r = record(json!({"at": "2024-05-01T23:30:00Z"}));
        assert_eq!(resolver.resolve(&r, &fields(&["at"])).display, "May 2, 2024");
    }

    #[test]
    fn test_plain_date_ignores_offset() {
        let r = record(json!({"createdAt": "2024-05-01"}));
        let candidates = fields(&["createdAt"]);
        for minutes in [-300, 0, 330] {
            let display = DisplayConfig {
                language: "en".into(),
                utc_offset_minutes: minutes,
                native_digits: false,
            };
            let resolver = DateResolver::new(LocaleConfig::for_language("en"), &display);
            assert_eq!(resolver.resolve(&r, &candidates).display, "May 1, 2024");
        }
    }

    #[test]
    fn test_negative_offset_shifts_instant_back() {
        let display = DisplayConfig {
            language: "en".into(),
            utc_offset_minutes: -300,
            native_digits: false,
        };
        let resolver = DateResolver::new(LocaleConfig::for_language("en"), &display);
        let r = record(json!({"at": "2024-05-01T02:00:00Z"}));
        assert_eq!(resolver.resolve(&r, &fields(&["at"])).display, "April 30, 2024");
    }

    #[test]
    fn test_resolved_date_serializes_instant() {
        let r = record(json!({"createdAt": "2024-05-01"}));
        let resolved = english().resolve(&r, &fields(&["createdAt"]));
        let value = serde_json::to_value(&resolved).unwrap();
        assert_eq!(value["at"], json!("2024-05-01T00:00:00Z"));
        assert_eq!(value["display"], json!("May 1, 2024"));
    }

    #[test]
    fn test_formatter_failure_gives_sentinel() {
        let locale = LocaleConfig::for_language("en");
        let resolver = DateResolver::with_formatter(&locale, Box::new(FailingFormatter));
        let r = record(json!({"createdAt": "2024-05-01"}));

        let resolved = resolver.resolve(&r, &fields(&["createdAt"]));
        assert_eq!(resolved.raw.as_deref(), Some("2024-05-01"));
        assert_eq!(resolved.display, resolver.not_specified());
        assert_eq!(resolver.not_specified(), "Not specified");
    }

    #[test]
    fn test_incomplete_month_table_gives_sentinel() {
        let mut locale = LocaleConfig::for_language("en");
        locale.months.truncate(3);
        let resolver = DateResolver::new(locale, &DisplayConfig::default());
        let r = record(json!({"createdAt": "2024-05-01"}));
        assert_eq!(
            resolver.resolve(&r, &fields(&["createdAt"])).display,
            "Not specified"
        );
    }

    #[test]
    fn test_parse_timestamp_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap();
        assert_eq!(parse_timestamp(&json!("2024-05-01T10:30:00Z")), Some(expected));
        assert_eq!(parse_timestamp(&json!("2024-05-01T12:30:00+02:00")), Some(expected));
        assert_eq!(parse_timestamp(&json!("2024-05-01 10:30:00")), Some(expected));
        assert_eq!(parse_timestamp(&json!("2024-05-01T10:30:00.000000Z")), Some(expected));
        assert_eq!(
            parse_timestamp(&json!(expected.timestamp_millis())),
            Some(expected)
        );
        assert_eq!(parse_timestamp(&json!(true)), None);
        assert_eq!(parse_timestamp(&json!("  ")), None);
    }

    #[test]
    fn test_time_ago_buckets() {
        let resolver = english();
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let candidates = fields(&["at"]);
        let ago = |secs: i64| {
            let at = now - chrono::Duration::seconds(secs);
            let r = record(json!({ "at": at.to_rfc3339() }));
            resolver.time_ago(&r, &candidates, now)
        };

        assert_eq!(ago(0), "moments ago");
        assert_eq!(ago(59), "moments ago");
        assert_eq!(ago(60), "1 minutes ago");
        assert_eq!(ago(HOUR - 1), "59 minutes ago");
        assert_eq!(ago(HOUR), "1 hours ago");
        assert_eq!(ago(DAY - 1), "23 hours ago");
        assert_eq!(ago(DAY), "1 days ago");
        assert_eq!(ago(WEEK - 1), "6 days ago");
        assert_eq!(ago(WEEK), "May 3, 2024");
        assert_eq!(ago(-30), "moments ago");
    }

    #[test]
    fn test_time_ago_without_date() {
        let resolver = english();
        let r = record(json!({"at": "never"}));
        assert_eq!(
            resolver.time_ago(&r, &fields(&["at"]), Utc::now()),
            "Not specified"
        );
    }
}
