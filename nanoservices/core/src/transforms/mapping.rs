//! Declarative field mapping and generic type coercion.
//!
//! Every stream owns one [`FieldMapping`]: an ordered list of
//! [`MappingEntry`] values saying where a source field lands in the cleaned
//! record, which [`Converter`] it goes through and whether empty values
//! collapse to `null`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Number, Value};
use wpsf_utils::error::Error;
use wpsf_utils::{CleanedRecord, TapResult};

/// Type conversion applied to a non-empty source value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    Text,
    Integer,
    Number,
    Boolean,
    /// RFC 3339 or RFC 2822 input, normalized to RFC 3339 in UTC.
    DateTime,
}

impl Converter {
    /// Name of the target type, as reported in conversion errors.
    pub fn target_type(&self) -> &'static str {
        match self {
            Converter::Text => "string",
            Converter::Integer => "integer",
            Converter::Number => "number",
            Converter::Boolean => "boolean",
            Converter::DateTime => "date-time",
        }
    }

    pub fn convert(&self, value: &Value) -> TapResult<Value> {
        self.try_convert(value).map_err(|reason| Error::Conversion {
            value: value.clone(),
            target: self.target_type(),
            reason,
        })
    }

    fn try_convert(&self, value: &Value) -> Result<Value, String> {
        match self {
            Converter::Text => Ok(match value {
                Value::String(s) => Value::String(s.clone()),
                other => Value::String(other.to_string()),
            }),
            Converter::Integer => match value {
                Value::Number(n) => n
                    .as_i64()
                    .or_else(|| n.as_f64().and_then(truncate_to_i64))
                    .map(Value::from)
                    .ok_or_else(|| format!("{n} is out of range")),
                Value::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::from)
                    .map_err(|e| e.to_string()),
                Value::Bool(b) => Ok(Value::from(*b as i64)),
                other => Err(format!("unsupported input {}", kind_of(other))),
            },
            Converter::Number => {
                let parsed = match value {
                    Value::Number(n) => n.as_f64().ok_or_else(|| format!("{n} is out of range"))?,
                    Value::String(s) => s.trim().parse::<f64>().map_err(|e| e.to_string())?,
                    Value::Bool(b) => *b as i64 as f64,
                    other => return Err(format!("unsupported input {}", kind_of(other))),
                };
                Number::from_f64(parsed)
                    .map(Value::Number)
                    .ok_or_else(|| "not a finite number".to_string())
            }
            Converter::Boolean => match value {
                Value::Bool(b) => Ok(Value::Bool(*b)),
                Value::Number(n) => Ok(Value::Bool(n.as_f64().map_or(false, |f| f != 0.0))),
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" | "yes" => Ok(Value::Bool(true)),
                    "false" | "0" | "no" => Ok(Value::Bool(false)),
                    _ => Err("expected true/false".to_string()),
                },
                other => Err(format!("unsupported input {}", kind_of(other))),
            },
            Converter::DateTime => {
                let Value::String(s) = value else {
                    return Err(format!("unsupported input {}", kind_of(value)));
                };
                let s = s.trim();
                DateTime::parse_from_rfc3339(s)
                    .or_else(|_| DateTime::parse_from_rfc2822(s))
                    .map(|dt| {
                        Value::String(
                            dt.with_timezone(&Utc)
                                .to_rfc3339_opts(SecondsFormat::Secs, true),
                        )
                    })
                    .map_err(|e| e.to_string())
            }
        }
    }
}

// `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
fn truncate_to_i64(f: f64) -> Option<i64> {
    let t = f.trunc();
    (t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64).then_some(t as i64)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Values treated as absent: null, `false`, zero and empty strings/collections.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Coerce one value according to an optional converter and nullability.
///
/// A non-empty value goes through the converter when one is declared. An
/// empty value becomes `null` when `nullable`, otherwise it is kept as is.
pub fn to_type_or_null(
    value: &Value,
    converter: Option<Converter>,
    nullable: bool,
) -> TapResult<Value> {
    let empty = is_empty_value(value);
    match converter {
        Some(converter) if !empty => converter.convert(value),
        _ if empty && nullable => Ok(Value::Null),
        _ => Ok(value.clone()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappingEntry {
    pub source_key: String,
    pub target_key: String,
    pub converter: Option<Converter>,
    pub nullable: bool,
}

impl MappingEntry {
    pub fn new(source_key: impl Into<String>) -> Self {
        let source_key = source_key.into();
        Self {
            target_key: source_key.clone(),
            source_key,
            converter: None,
            nullable: true,
        }
    }

    pub fn rename(mut self, target_key: impl Into<String>) -> Self {
        self.target_key = target_key.into();
        self
    }

    pub fn converter(mut self, converter: Converter) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// Ordered mapping table for one stream.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
    stream: String,
    entries: Vec<MappingEntry>,
}

impl FieldMapping {
    pub fn new(stream: impl Into<String>, entries: Vec<MappingEntry>) -> Self {
        Self {
            stream: stream.into(),
            entries,
        }
    }

    pub fn stream(&self) -> &str {
        &self.stream
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    /// Check that every target key is a property of `schema`.
    pub fn validate(&self, schema: &Value) -> TapResult<()> {
        let properties = schema.get("properties").and_then(Value::as_object);
        for entry in &self.entries {
            let declared = properties.map_or(false, |p| p.contains_key(&entry.target_key));
            if !declared {
                return Err(Error::SchemaMismatch {
                    stream: self.stream.clone(),
                    field: entry.target_key.clone(),
                });
            }
        }
        Ok(())
    }

    /// Build a cleaned record from `row`, in mapping order.
    ///
    /// Fails on the first missing source field or rejected conversion, so a
    /// record is either complete or not produced at all.
    pub fn coerce(&self, row: &serde_json::Map<String, Value>) -> TapResult<CleanedRecord> {
        let mut cleaned = CleanedRecord::new();
        for entry in &self.entries {
            let value = row.get(&entry.source_key).ok_or_else(|| Error::MissingField {
                stream: self.stream.clone(),
                field: entry.source_key.clone(),
            })?;
            cleaned.insert(
                entry.target_key.clone(),
                to_type_or_null(value, entry.converter, entry.nullable)?,
            );
        }
        Ok(cleaned)
    }
}
