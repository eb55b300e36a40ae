//! Time-series points
//!
//! A point is one time-stamped record: measurement, tags, fields and a
//! timestamp. Tags and fields are kept in `BTreeMap`s so a point has a
//! single canonical ordering regardless of how it was built.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::{StrandError, StrandResult};

/// Value of a point field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// UTF-8 string
    String(String),
    /// Signed integer
    Integer(i64),
    /// Float
    Float(f64),
    /// Boolean
    Boolean(bool),
}

impl FieldValue {
    /// String payload, if this is a string field
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

/// One time-stamped record
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    measurement: String,
    tags: BTreeMap<String, String>,
    fields: BTreeMap<String, FieldValue>,
    time: DateTime<Utc>,
}

impl Point {
    /// Build a point
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the measurement is empty, there are no fields, or a
    /// tag key or value is empty.
    pub fn new(
        measurement: impl Into<String>,
        tags: BTreeMap<String, String>,
        fields: BTreeMap<String, FieldValue>,
        time: DateTime<Utc>,
    ) -> StrandResult<Self> {
        let measurement = measurement.into();
        if measurement.is_empty() {
            return Err(StrandError::invalid_input("point measurement is empty"));
        }
        if fields.is_empty() {
            return Err(StrandError::invalid_input(format!(
                "point in measurement '{}' has no fields",
                measurement
            )));
        }
        if let Some((k, _)) = tags.iter().find(|(k, v)| k.is_empty() || v.is_empty()) {
            return Err(StrandError::invalid_input(format!(
                "point in measurement '{}' has an empty tag '{}'",
                measurement, k
            )));
        }
        Ok(Point {
            measurement,
            tags,
            fields,
            time,
        })
    }

    /// Measurement name
    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    /// Tag set
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Field set
    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    /// Timestamp
    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.measurement)?;
        for (k, v) in &self.tags {
            write!(f, ",{}={}", k, v)?;
        }
        let mut sep = ' ';
        for (k, v) in &self.fields {
            match v {
                FieldValue::String(s) => write!(f, "{}{}={:?}", sep, k, s)?,
                FieldValue::Integer(i) => write!(f, "{}{}={}i", sep, k, i)?,
                FieldValue::Float(x) => write!(f, "{}{}={}", sep, k, x)?,
                FieldValue::Boolean(b) => write!(f, "{}{}={}", sep, k, b)?,
            }
            sep = ',';
        }
        let nanos = self.time.timestamp_nanos_opt().unwrap_or_default();
        write!(f, " {}", nanos)
    }
}
