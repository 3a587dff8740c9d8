use crate::models::Amount;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

/// Generic string-keyed representation of a record
pub type FieldMap = Map<String, Value>;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Same as `TIMESTAMP_FORMAT` with the sub-second part kept when present
const TIMESTAMP_OUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Timestamp layouts the host is known to return, tried in order
const HOST_TIMESTAMP_FORMATS: &[&str] = &[
    TIMESTAMP_FORMAT,
    "%Y-%m-%d-%H.%M.%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Conversion between a flat record and its field map
///
/// `from_fields` never fails: missing, null or unparsable entries take the
/// record's default for that field.
pub trait Record: Sized {
    fn to_fields(&self) -> FieldMap;
    fn from_fields(fields: &FieldMap) -> Self;
}

pub fn get_string(fields: &FieldMap, key: &str) -> String {
    match fields.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

pub fn get_int(fields: &FieldMap, key: &str) -> i64 {
    match fields.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => parse_int(s).unwrap_or(0),
        _ => 0,
    }
}

pub fn get_amount(fields: &FieldMap, key: &str) -> Amount {
    match fields.get(key) {
        Some(Value::String(s)) => s.parse().unwrap_or_default(),
        Some(Value::Number(n)) => n
            .to_string()
            .parse()
            .unwrap_or_default(),
        _ => Amount::ZERO,
    }
}

pub fn get_date(fields: &FieldMap, key: &str) -> Option<NaiveDate> {
    match fields.get(key) {
        Some(Value::String(s)) => parse_date(s),
        _ => None,
    }
}

pub fn get_timestamp(fields: &FieldMap, key: &str) -> Option<NaiveDateTime> {
    match fields.get(key) {
        Some(Value::String(s)) => parse_timestamp(s),
        _ => None,
    }
}

/// Parse a whole number that may be written as `"42"`, `" 42 "` or `"42.00"`
pub fn parse_int(s: &str) -> Option<i64> {
    let trimmed = s.trim();
    trimmed.parse::<i64>().ok().or_else(|| {
        trimmed
            .parse::<Amount>()
            .ok()
            .filter(|a| a.cents() % 100 == 0)
            .map(|a| a.cents() / 100)
    })
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).ok()
}

pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    HOST_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
}

pub fn date_value(date: Option<NaiveDate>) -> Value {
    date.map(|d| Value::String(d.format(DATE_FORMAT).to_string()))
        .unwrap_or(Value::Null)
}

pub fn timestamp_value(ts: Option<NaiveDateTime>) -> Value {
    ts.map(|t| Value::String(t.format(TIMESTAMP_OUT_FORMAT).to_string()))
        .unwrap_or(Value::Null)
}

/// Format an optional date the way the host expects it in a 10A field
pub fn date_param(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lenient_getters() {
        let fields = json!({
            "a": "12",
            "b": 7,
            "c": "junk",
            "d": "19.99",
            "e": null,
        });
        let fields = fields.as_object().unwrap();

        assert_eq!(get_int(fields, "a"), 12);
        assert_eq!(get_int(fields, "b"), 7);
        assert_eq!(get_int(fields, "c"), 0);
        assert_eq!(get_int(fields, "missing"), 0);
        assert_eq!(get_amount(fields, "d").cents(), 1999);
        assert_eq!(get_amount(fields, "b").cents(), 700);
        assert_eq!(get_string(fields, "e"), "");
        assert_eq!(get_string(fields, "b"), "7");
    }

    #[test]
    fn test_host_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap();

        assert_eq!(parse_timestamp("2024-03-09 14:05:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-09-14.05.00.000000"), Some(expected));
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_timestamp_value_keeps_microseconds() {
        let ts = parse_timestamp("2024-01-15-10.30.00.123456");
        assert_eq!(timestamp_value(ts), json!("2024-01-15 10:30:00.123456"));
        assert_eq!(get_timestamp(&Map::from_iter([("t".to_string(), timestamp_value(ts))]), "t"), ts);

        let whole = parse_timestamp("2024-01-15 10:30:00");
        assert_eq!(timestamp_value(whole), json!("2024-01-15 10:30:00"));
    }

    #[test]
    fn test_parse_int_accepts_packed_rendering() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int(" 42.00 "), Some(42));
        assert_eq!(parse_int("42.50"), None);
    }
}
