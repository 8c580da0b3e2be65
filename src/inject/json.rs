use bytes::Bytes;
use serde::Serialize;

use super::{
    foreign_injector, top_level_not_supported, InjectOp, Lifecycle, UpsertInjector, UpsertTarget,
};
use crate::{
    error::UpsertError,
    observability::log_debug,
    option::ProjectionOptions,
    types::{QueryDataType, TypeFamily, Value},
};

/// How a JSON field of a given type family is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonWrite {
    Boolean,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Real,
    Double,
    /// Decimal, temporal and string families, written as JSON strings.
    Text,
    /// Trees and maps are written as they are, boolean and numeric scalars as
    /// native tokens, anything else as its string form.
    Object,
}

impl JsonWrite {
    fn for_type(data_type: &QueryDataType) -> Result<Self, UpsertError> {
        let write = match data_type.type_family() {
            TypeFamily::Boolean => JsonWrite::Boolean,
            TypeFamily::TinyInt => JsonWrite::TinyInt,
            TypeFamily::SmallInt => JsonWrite::SmallInt,
            TypeFamily::Integer => JsonWrite::Int,
            TypeFamily::BigInt => JsonWrite::BigInt,
            TypeFamily::Real => JsonWrite::Real,
            TypeFamily::Double => JsonWrite::Double,
            TypeFamily::Decimal
            | TypeFamily::Time
            | TypeFamily::Date
            | TypeFamily::Timestamp
            | TypeFamily::TimestampWithTimeZone
            | TypeFamily::Varchar => JsonWrite::Text,
            TypeFamily::Object => JsonWrite::Object,
            TypeFamily::Json | TypeFamily::Null => {
                return Err(UpsertError::UnsupportedType(data_type.clone()))
            }
        };
        Ok(write)
    }
}

/// Builds one JSON object per row into a reused byte buffer.
///
/// Fields appear in the order they are written. `conclude` returns a copy of
/// the buffer as [`Value::Bytes`].
#[derive(Debug)]
pub struct JsonTarget {
    lifecycle: Lifecycle,
    buf: Vec<u8>,
    has_fields: bool,
}

impl JsonTarget {
    pub fn new(option: &ProjectionOptions) -> Self {
        Self {
            lifecycle: Lifecycle::default(),
            buf: Vec::with_capacity(option.json_buffer_capacity),
            has_fields: false,
        }
    }

    fn write_field_name(&mut self, name: &str) -> Result<(), UpsertError> {
        if self.has_fields {
            self.buf.push(b',');
        }
        self.has_fields = true;
        serde_json::to_writer(&mut self.buf, name)?;
        self.buf.push(b':');
        Ok(())
    }

    fn write_token<T: Serialize + ?Sized>(&mut self, token: &T) -> Result<(), UpsertError> {
        serde_json::to_writer(&mut self.buf, token)?;
        Ok(())
    }

    fn write_value(&mut self, write: JsonWrite, value: &Value) -> Result<(), UpsertError> {
        match (write, value) {
            (_, Value::Null) => self.buf.extend_from_slice(b"null"),
            (JsonWrite::Text, value) => self.write_token(&value.to_string())?,
            (JsonWrite::Object, value) => match value {
                Value::Json(tree) => self.write_token(tree)?,
                Value::Map(_) => self.write_token(&value.to_json())?,
                Value::Boolean(v) => self.write_token(v)?,
                Value::TinyInt(v) => self.write_token(v)?,
                Value::SmallInt(v) => self.write_token(v)?,
                Value::Int(v) => self.write_token(v)?,
                Value::BigInt(v) => self.write_token(v)?,
                Value::Real(v) => self.write_token(v)?,
                Value::Double(v) => self.write_token(v)?,
                // lossy: the value keeps only its VARCHAR form
                value => self.write_token(&value.to_string())?,
            },
            (write, value) => {
                let data_type = match write {
                    JsonWrite::Boolean => QueryDataType::Boolean,
                    JsonWrite::TinyInt => QueryDataType::TinyInt,
                    JsonWrite::SmallInt => QueryDataType::SmallInt,
                    JsonWrite::Int => QueryDataType::Int,
                    JsonWrite::BigInt => QueryDataType::BigInt,
                    JsonWrite::Real => QueryDataType::Real,
                    _ => QueryDataType::Double,
                };
                match value.convert_to(&data_type)? {
                    Value::Boolean(v) => self.write_token(&v)?,
                    Value::TinyInt(v) => self.write_token(&v)?,
                    Value::SmallInt(v) => self.write_token(&v)?,
                    Value::Int(v) => self.write_token(&v)?,
                    Value::BigInt(v) => self.write_token(&v)?,
                    // shortest f32 form, not widened to f64
                    Value::Real(v) => self.write_token(&v)?,
                    Value::Double(v) => self.write_token(&v)?,
                    converted => self.write_token(&converted.to_json())?,
                }
            }
        }
        Ok(())
    }
}

impl UpsertTarget for JsonTarget {
    fn format(&self) -> &'static str {
        "JSON"
    }

    fn create_injector(
        &self,
        path: Option<&str>,
        data_type: &QueryDataType,
    ) -> Result<UpsertInjector, UpsertError> {
        let Some(path) = path else {
            return Err(top_level_not_supported(self.format()));
        };
        let write = JsonWrite::for_type(data_type)?;
        if write == JsonWrite::Object {
            log_debug!(
                component = "json",
                event = "object_string_fallback",
                path = path,
                data_type = %data_type,
            );
        }
        Ok(UpsertInjector::new(Some(path), InjectOp::Json(write)))
    }

    fn init(&mut self) {
        self.lifecycle.init();
        self.buf.clear();
        self.buf.push(b'{');
        self.has_fields = false;
    }

    fn set(&mut self, injector: &UpsertInjector, value: &Value) -> Result<(), UpsertError> {
        self.lifecycle.check_accumulating(self.format());
        let (InjectOp::Json(write), Some(path)) = (injector.op(), injector.path()) else {
            foreign_injector(self.format(), injector)
        };
        self.write_field_name(path)?;
        self.write_value(*write, value)
    }

    fn conclude(&mut self) -> Result<Value, UpsertError> {
        self.lifecycle.conclude(self.format());
        self.buf.push(b'}');
        Ok(Value::Bytes(Bytes::copy_from_slice(&self.buf)))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::{DateTime, NaiveDate, NaiveTime};
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{JsonTarget, JsonWrite};
    use crate::{
        error::UpsertError,
        inject::{InjectOp, UpsertTarget},
        option::ProjectionOptions,
        types::{QueryDataType, TypeKind, Value},
    };

    fn concluded(target: &mut JsonTarget) -> serde_json::Value {
        let Value::Bytes(bytes) = target.conclude().unwrap() else {
            panic!("JSON target concludes to bytes");
        };
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_injector_per_family() {
        let target = JsonTarget::new(&ProjectionOptions::default());
        for (data_type, write) in [
            (QueryDataType::Boolean, JsonWrite::Boolean),
            (QueryDataType::SmallInt, JsonWrite::SmallInt),
            (QueryDataType::Real, JsonWrite::Real),
            (QueryDataType::Decimal, JsonWrite::Text),
            (QueryDataType::TimestampTz, JsonWrite::Text),
            (QueryDataType::Object, JsonWrite::Object),
            (QueryDataType::custom("T", TypeKind::Native), JsonWrite::Object),
        ] {
            let injector = target.create_injector(Some("f"), &data_type).unwrap();
            assert_eq!(injector.op(), &InjectOp::Json(write));
        }
    }

    #[test]
    fn test_rejected_injectors() {
        let target = JsonTarget::new(&ProjectionOptions::default());
        let err = target
            .create_injector(None, &QueryDataType::Int)
            .unwrap_err();
        assert!(matches!(err, UpsertError::TopLevel(_)));

        let err = target
            .create_injector(Some("f"), &QueryDataType::Json)
            .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported type: JSON");
    }

    #[test]
    fn test_typed_fields() {
        let mut target = JsonTarget::new(&ProjectionOptions::default());
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let time = NaiveTime::from_hms_opt(12, 23, 34).unwrap();
        let fields = [
            ("boolean", QueryDataType::Boolean, Value::from("true")),
            ("tinyint", QueryDataType::TinyInt, Value::Int(-3)),
            ("smallint", QueryDataType::SmallInt, Value::SmallInt(300)),
            ("int", QueryDataType::Int, Value::BigInt(7)),
            ("bigint", QueryDataType::BigInt, Value::from("9000000000")),
            ("real", QueryDataType::Real, Value::Real(0.1)),
            ("double", QueryDataType::Double, Value::Int(2)),
            (
                "decimal",
                QueryDataType::Decimal,
                Value::Decimal(Decimal::from_str("1.50").unwrap()),
            ),
            ("date", QueryDataType::Date, Value::Date(date)),
            ("time", QueryDataType::Time, Value::Time(time)),
            (
                "timestamp",
                QueryDataType::Timestamp,
                Value::Timestamp(date.and_time(time)),
            ),
            (
                "timestampTz",
                QueryDataType::TimestampTz,
                Value::TimestampTz(
                    DateTime::parse_from_rfc3339("2020-01-01T12:23:34+01:00").unwrap(),
                ),
            ),
            ("string", QueryDataType::Varchar, Value::from("a\"b")),
        ];
        let injectors = fields
            .iter()
            .map(|(name, data_type, _)| target.create_injector(Some(*name), data_type).unwrap())
            .collect::<Vec<_>>();

        target.init();
        for (injector, (_, _, value)) in injectors.iter().zip(&fields) {
            target.set(injector, value).unwrap();
        }
        let Value::Bytes(bytes) = target.conclude().unwrap() else {
            panic!("JSON target concludes to bytes");
        };
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.contains(r#""real":0.1,"#), "{text}");
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&bytes).unwrap(),
            json!({
                "boolean": true,
                "tinyint": -3,
                "smallint": 300,
                "int": 7,
                "bigint": 9_000_000_000i64,
                "real": 0.1,
                "double": 2.0,
                "decimal": "1.50",
                "date": "2020-01-01",
                "time": "12:23:34",
                "timestamp": "2020-01-01T12:23:34",
                "timestampTz": "2020-01-01T12:23:34+01:00",
                "string": "a\"b",
            })
        );
    }

    #[test]
    fn test_real_matches_object_family_rendering() {
        let mut target = JsonTarget::new(&ProjectionOptions::default());
        let real = target
            .create_injector(Some("r"), &QueryDataType::Real)
            .unwrap();
        let object = target
            .create_injector(Some("o"), &QueryDataType::Object)
            .unwrap();

        target.init();
        target.set(&real, &Value::Real(0.1)).unwrap();
        target.set(&object, &Value::Real(0.1)).unwrap();
        assert_eq!(
            target.conclude().unwrap(),
            Value::Bytes(r#"{"r":0.1,"o":0.1}"#.into())
        );
    }

    #[test]
    fn test_null_written_for_every_family() {
        let mut target = JsonTarget::new(&ProjectionOptions::default());
        let types = [
            QueryDataType::Boolean,
            QueryDataType::BigInt,
            QueryDataType::Double,
            QueryDataType::Timestamp,
            QueryDataType::Varchar,
            QueryDataType::Object,
        ];
        let injectors = types
            .iter()
            .enumerate()
            .map(|(i, data_type)| {
                target
                    .create_injector(Some(format!("f{i}").as_str()), data_type)
                    .unwrap()
            })
            .collect::<Vec<_>>();

        target.init();
        for injector in &injectors {
            target.set(injector, &Value::Null).unwrap();
        }
        assert_eq!(
            concluded(&mut target),
            json!({"f0": null, "f1": null, "f2": null, "f3": null, "f4": null, "f5": null})
        );
    }

    #[test]
    fn test_object_family_is_lossy_for_unknown_values() {
        let mut target = JsonTarget::new(&ProjectionOptions::default());
        let injector = target
            .create_injector(Some("object"), &QueryDataType::Object)
            .unwrap();
        let cases = [
            (Value::Json(json!({"nested": [1, 2]})), json!({"nested": [1, 2]})),
            (Value::Boolean(false), json!(false)),
            (Value::SmallInt(3), json!(3)),
            (Value::Double(0.5), json!(0.5)),
            // no native form: written as the string rendering
            (Value::Decimal(Decimal::new(15, 1)), json!("1.5")),
            (
                Value::Date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()),
                json!("2020-01-01"),
            ),
        ];
        for (value, expected) in cases {
            target.init();
            target.set(&injector, &value).unwrap();
            assert_eq!(concluded(&mut target), json!({ "object": expected }));
        }
    }

    #[test]
    fn test_empty_row_and_buffer_reuse() {
        let mut target = JsonTarget::new(&ProjectionOptions::default().json_buffer_capacity(8));
        let injector = target
            .create_injector(Some("id"), &QueryDataType::BigInt)
            .unwrap();

        target.init();
        assert_eq!(target.conclude().unwrap(), Value::Bytes("{}".into()));

        target.init();
        target.set(&injector, &Value::BigInt(1)).unwrap();
        let first = target.conclude().unwrap();

        target.init();
        target.set(&injector, &Value::BigInt(2)).unwrap();
        assert_eq!(concluded(&mut target), json!({"id": 2}));
        // earlier results do not alias the buffer
        assert_eq!(first, Value::Bytes(r#"{"id":1}"#.into()));
    }

    #[test]
    fn test_failed_conversion() {
        let mut target = JsonTarget::new(&ProjectionOptions::default());
        let injector = target
            .create_injector(Some("tiny"), &QueryDataType::TinyInt)
            .unwrap();
        target.init();
        assert!(matches!(
            target.set(&injector, &Value::BigInt(1000)),
            Err(UpsertError::DataConversion { .. })
        ));
    }
}
