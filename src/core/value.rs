use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// A typed scalar produced by [`type_value`].
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(NaiveDateTime),
    Null,
    Text(String),
}

/// Options steering scalar type inference.
#[derive(Debug, Clone, Default)]
pub struct TypeOptions {
    /// Exact chrono format string for date parsing. When set, only this
    /// format is attempted; the general format list is skipped.
    pub date_format: Option<String>,
    /// Treat empty/whitespace-only values as null instead of an empty
    /// string.
    pub empty_as_null: bool,
}

/// General formats tried when no explicit date format is configured.
/// None of these can match an all-digit string, so integers are never
/// misread as dates; serial dates are only honored through an explicit
/// [`TypeOptions::date_format`].
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Infers the type of one raw cell value.
///
/// Precedence is strict and identical across every type-converting
/// emitter (JSON, YAML, typed XML):
///
/// 1. empty/whitespace-only: empty text, or null with
///    [`TypeOptions::empty_as_null`];
/// 2. date (explicit format when configured, else the general list);
/// 3. integer;
/// 4. float (finite only);
/// 5. boolean (`true`/`false`, case-insensitive);
/// 6. the literal `null`, case-insensitive;
/// 7. text, original and unmodified.
///
/// # Examples
///
/// ```
/// use datamorph_rs::core::value::{type_value, TypeOptions, TypedValue};
///
/// let options = TypeOptions::default();
/// assert_eq!(type_value("30", &options), TypedValue::Integer(30));
/// assert_eq!(type_value("3.14", &options), TypedValue::Float(3.14));
/// assert_eq!(type_value("TRUE", &options), TypedValue::Boolean(true));
/// assert!(matches!(type_value("2024-01-01", &options), TypedValue::DateTime(_)));
/// assert_eq!(type_value("hello", &options), TypedValue::Text("hello".to_string()));
/// ```
pub fn type_value(raw: &str, options: &TypeOptions) -> TypedValue {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return if options.empty_as_null {
            TypedValue::Null
        } else {
            TypedValue::Text(String::new())
        };
    }

    if let Some(date) = parse_date(trimmed, options.date_format.as_deref()) {
        return TypedValue::DateTime(date);
    }

    if let Ok(integer) = trimmed.parse::<i64>() {
        return TypedValue::Integer(integer);
    }

    if let Ok(float) = trimmed.parse::<f64>() {
        // serde_json cannot represent non-finite numbers
        if float.is_finite() {
            return TypedValue::Float(float);
        }
    }

    if trimmed.eq_ignore_ascii_case("true") {
        return TypedValue::Boolean(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return TypedValue::Boolean(false);
    }

    if trimmed.eq_ignore_ascii_case("null") {
        return TypedValue::Null;
    }

    TypedValue::Text(raw.to_string())
}

fn parse_date(value: &str, format: Option<&str>) -> Option<NaiveDateTime> {
    if let Some(format) = format {
        return parse_with_format(value, format);
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(date) = NaiveDateTime::parse_from_str(value, format) {
            return Some(date);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

fn parse_with_format(value: &str, format: &str) -> Option<NaiveDateTime> {
    if let Ok(date) = NaiveDateTime::parse_from_str(value, format) {
        return Some(date);
    }
    NaiveDate::parse_from_str(value, format)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Renders a typed date with the configured format, defaulting to
/// ISO 8601 without an offset.
pub fn format_datetime(date: &NaiveDateTime, format: Option<&str>) -> String {
    date.format(format.unwrap_or("%Y-%m-%dT%H:%M:%S")).to_string()
}

impl TypedValue {
    /// The `type` annotation emitted for typed XML leaves. Plain text has
    /// no annotation.
    pub fn xml_type_name(&self) -> Option<&'static str> {
        match self {
            TypedValue::Integer(_) => Some("int"),
            TypedValue::Float(_) => Some("double"),
            TypedValue::Boolean(_) => Some("boolean"),
            TypedValue::DateTime(_) => Some("datetime"),
            TypedValue::Null | TypedValue::Text(_) => None,
        }
    }
}
