use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde_json::{Map as JsonMap, Number, Value as JsonValue};

use super::{QueryDataType, Value};
use crate::error::UpsertError;

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

impl Value {
    /// Converts the value to the runtime representation of `target`.
    ///
    /// Null converts to null for every type. Integer narrowing is range checked,
    /// fractional values are truncated towards zero.
    pub fn convert_to(&self, target: &QueryDataType) -> Result<Value, UpsertError> {
        if self.is_null() {
            return Ok(Value::Null);
        }
        let converted = match target {
            QueryDataType::Varchar => Some(Value::Varchar(self.to_string())),
            QueryDataType::Boolean => self.to_bool().map(Value::Boolean),
            QueryDataType::TinyInt => self
                .to_i64()
                .and_then(|v| i8::try_from(v).ok())
                .map(Value::TinyInt),
            QueryDataType::SmallInt => self
                .to_i64()
                .and_then(|v| i16::try_from(v).ok())
                .map(Value::SmallInt),
            QueryDataType::Int => self
                .to_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(Value::Int),
            QueryDataType::BigInt => self.to_i64().map(Value::BigInt),
            QueryDataType::Decimal => self.to_decimal().map(Value::Decimal),
            QueryDataType::Real => self.to_f64().map(|v| Value::Real(v as f32)),
            QueryDataType::Double => self.to_f64().map(Value::Double),
            QueryDataType::Date => self.to_date().map(Value::Date),
            QueryDataType::Time => self.to_time().map(Value::Time),
            QueryDataType::Timestamp => self.to_timestamp().map(Value::Timestamp),
            QueryDataType::TimestampTz => self.to_timestamp_tz().map(Value::TimestampTz),
            QueryDataType::Object => Some(self.clone()),
            QueryDataType::Json => match self {
                Value::Json(_) => Some(self.clone()),
                Value::Varchar(text) => serde_json::from_str(text).ok().map(Value::Json),
                _ => Some(Value::Json(self.to_json())),
            },
            QueryDataType::Null => None,
            QueryDataType::Custom(_) => match self {
                Value::Row(_) | Value::Record(_) | Value::Object(_) => Some(self.clone()),
                _ => None,
            },
        };
        converted.ok_or_else(|| UpsertError::conversion(self.kind_name(), target))
    }

    /// Builds the JSON tree of the value. Non-finite floats become JSON null.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Boolean(v) => JsonValue::Bool(*v),
            Value::TinyInt(v) => JsonValue::from(*v),
            Value::SmallInt(v) => JsonValue::from(*v),
            Value::Int(v) => JsonValue::from(*v),
            Value::BigInt(v) => JsonValue::from(*v),
            Value::Real(v) => {
                Number::from_f64(f64::from(*v)).map_or(JsonValue::Null, JsonValue::Number)
            }
            Value::Double(v) => Number::from_f64(*v).map_or(JsonValue::Null, JsonValue::Number),
            Value::Json(tree) => tree.clone(),
            Value::Map(map) => JsonValue::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect::<JsonMap<_, _>>(),
            ),
            Value::Row(row) => JsonValue::Array(row.values().iter().map(Value::to_json).collect()),
            Value::Record(record) => JsonValue::Object(
                record
                    .fields()
                    .map(|(name, value)| (name.to_string(), value.to_json()))
                    .collect(),
            ),
            Value::Object(object) => JsonValue::Object(
                object
                    .fields()
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect(),
            ),
            Value::Decimal(_)
            | Value::Varchar(_)
            | Value::Date(_)
            | Value::Time(_)
            | Value::Timestamp(_)
            | Value::TimestampTz(_)
            | Value::Bytes(_) => JsonValue::String(self.to_string()),
        }
    }

    fn to_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            Value::Varchar(text) => {
                if text.eq_ignore_ascii_case("true") {
                    Some(true)
                } else if text.eq_ignore_ascii_case("false") {
                    Some(false)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn to_i64(&self) -> Option<i64> {
        match self {
            Value::TinyInt(v) => Some(*v as i64),
            Value::SmallInt(v) => Some(*v as i64),
            Value::Int(v) => Some(*v as i64),
            Value::BigInt(v) => Some(*v),
            Value::Decimal(v) => v.trunc().to_i64(),
            Value::Real(v) => float_to_i64(*v as f64),
            Value::Double(v) => float_to_i64(*v),
            Value::Varchar(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    fn to_f64(&self) -> Option<f64> {
        match self {
            Value::TinyInt(v) => Some(*v as f64),
            Value::SmallInt(v) => Some(*v as f64),
            Value::Int(v) => Some(*v as f64),
            Value::BigInt(v) => Some(*v as f64),
            Value::Decimal(v) => v.to_f64(),
            Value::Real(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            Value::Varchar(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Value::TinyInt(v) => Some(Decimal::from(*v)),
            Value::SmallInt(v) => Some(Decimal::from(*v)),
            Value::Int(v) => Some(Decimal::from(*v)),
            Value::BigInt(v) => Some(Decimal::from(*v)),
            Value::Decimal(v) => Some(*v),
            Value::Real(v) => Decimal::try_from(*v).ok(),
            Value::Double(v) => Decimal::try_from(*v).ok(),
            Value::Varchar(text) => Decimal::from_str(text.trim()).ok(),
            _ => None,
        }
    }

    fn to_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(v) => Some(*v),
            Value::Timestamp(v) => Some(v.date()),
            Value::TimestampTz(v) => Some(v.date_naive()),
            Value::Varchar(text) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok(),
            _ => None,
        }
    }

    fn to_time(&self) -> Option<NaiveTime> {
        match self {
            Value::Time(v) => Some(*v),
            Value::Timestamp(v) => Some(v.time()),
            Value::TimestampTz(v) => Some(v.time()),
            Value::Varchar(text) => NaiveTime::parse_from_str(text.trim(), "%H:%M:%S%.f").ok(),
            _ => None,
        }
    }

    fn to_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(v) => Some(*v),
            Value::Date(v) => Some(v.and_time(NaiveTime::MIN)),
            Value::TimestampTz(v) => Some(v.naive_local()),
            Value::Varchar(text) => TIMESTAMP_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text.trim(), format).ok()),
            _ => None,
        }
    }

    fn to_timestamp_tz(&self) -> Option<DateTime<FixedOffset>> {
        let utc = FixedOffset::east_opt(0)?;
        match self {
            Value::TimestampTz(v) => Some(*v),
            Value::Timestamp(v) => v.and_local_timezone(utc).single(),
            Value::Date(v) => v.and_time(NaiveTime::MIN).and_local_timezone(utc).single(),
            Value::Varchar(text) => DateTime::parse_from_rfc3339(text.trim()).ok(),
            _ => None,
        }
    }
}

fn float_to_i64(value: f64) -> Option<i64> {
    let truncated = value.trunc();
    if truncated.is_finite() && truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
        Some(truncated as i64)
    } else {
        None
    }
}
