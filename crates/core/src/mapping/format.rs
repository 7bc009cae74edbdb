//! Date and number formatters

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use super::transform::Formatter;
use crate::value::FieldValue;

#[derive(Debug, Clone, PartialEq, Eq)]
enum DateStyle {
    Rfc3339,
    DateTime(String),
    Date(String),
}

/// Parses and prints dates with a fixed pattern
///
/// Date-time patterns are interpreted in UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormatter {
    style: DateStyle,
}

impl DateFormatter {
    /// RFC 3339 timestamps; any offset is accepted on input, output is UTC with `Z`
    pub fn rfc3339() -> Self {
        Self {
            style: DateStyle::Rfc3339,
        }
    }

    /// Date-time in a `chrono` strftime pattern
    pub fn with_pattern(pattern: impl Into<String>) -> Self {
        Self {
            style: DateStyle::DateTime(pattern.into()),
        }
    }

    /// Calendar date in a `chrono` strftime pattern
    pub fn date_only(pattern: impl Into<String>) -> Self {
        Self {
            style: DateStyle::Date(pattern.into()),
        }
    }
}

impl Formatter for DateFormatter {
    fn value_for_string(&self, input: &str) -> Result<FieldValue, String> {
        match &self.style {
            DateStyle::Rfc3339 => DateTime::parse_from_rfc3339(input)
                .map(|dt| FieldValue::DateTime(dt.with_timezone(&Utc)))
                .map_err(|e| format!("'{}' is not an RFC 3339 timestamp: {}", input, e)),
            DateStyle::DateTime(pattern) => NaiveDateTime::parse_from_str(input, pattern)
                .map(|naive| FieldValue::DateTime(naive.and_utc()))
                .map_err(|e| format!("'{}' does not match '{}': {}", input, pattern, e)),
            DateStyle::Date(pattern) => NaiveDate::parse_from_str(input, pattern)
                .map(FieldValue::Date)
                .map_err(|e| format!("'{}' does not match '{}': {}", input, pattern, e)),
        }
    }

    fn string_for_value(&self, value: &FieldValue) -> Result<String, String> {
        match (&self.style, value) {
            (DateStyle::Rfc3339, FieldValue::DateTime(dt)) => {
                Ok(dt.to_rfc3339_opts(SecondsFormat::Secs, true))
            }
            (DateStyle::DateTime(pattern), FieldValue::DateTime(dt)) => {
                Ok(dt.format(pattern).to_string())
            }
            (DateStyle::Date(pattern), FieldValue::Date(d)) => Ok(d.format(pattern).to_string()),
            (DateStyle::Date(pattern), FieldValue::DateTime(dt)) => {
                Ok(dt.date_naive().format(pattern).to_string())
            }
            (_, other) => Err(format!("cannot format {} as a date", other.type_name())),
        }
    }
}

/// Parses numeric strings, optionally with a grouping separator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormatter {
    grouping: Option<char>,
    decimal: char,
}

impl Default for NumberFormatter {
    fn default() -> Self {
        Self {
            grouping: None,
            decimal: '.',
        }
    }
}

impl NumberFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grouping(mut self, separator: char) -> Self {
        self.grouping = Some(separator);
        self
    }

    pub fn with_decimal(mut self, separator: char) -> Self {
        self.decimal = separator;
        self
    }
}

impl Formatter for NumberFormatter {
    fn value_for_string(&self, input: &str) -> Result<FieldValue, String> {
        let cleaned: String = input
            .trim()
            .chars()
            .filter(|c| Some(*c) != self.grouping)
            .map(|c| if c == self.decimal { '.' } else { c })
            .collect();

        if let Ok(i) = cleaned.parse::<i64>() {
            return Ok(FieldValue::Integer(i));
        }
        match cleaned.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(FieldValue::Float(f)),
            _ => Err(format!("'{}' is not a number", input)),
        }
    }

    fn string_for_value(&self, value: &FieldValue) -> Result<String, String> {
        let text = match value {
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Float(f) => f.to_string(),
            other => return Err(format!("cannot format {} as a number", other.type_name())),
        };
        if self.decimal == '.' {
            Ok(text)
        } else {
            Ok(text.replace('.', &self.decimal.to_string()))
        }
    }
}
