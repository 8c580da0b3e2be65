mod catalog;
mod path;
mod type_schema;

use std::fmt;

pub use catalog::*;
pub use path::*;
use serde::{Deserialize, Serialize};
pub use type_schema::*;

use crate::{
    error::UpsertError,
    types::{CustomType, QueryDataType, TypeKind},
};

/// Kind of a field in a [`TypeSchema`].
///
/// Only the nullable scalar kinds, the temporal kinds, strings, decimals and
/// [`FieldKind::Compact`] have a SQL representation; the remaining kinds can be
/// declared by other writers of the same record but are rejected when a
/// projector binds to them.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    String,
    NullableBoolean,
    NullableInt8,
    NullableInt16,
    NullableInt32,
    NullableInt64,
    Decimal,
    NullableFloat32,
    NullableFloat64,
    Date,
    Time,
    Timestamp,
    TimestampWithTimezone,
    /// Nested record of another named schema.
    Compact,
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    ArrayOfString,
    ArrayOfInt64,
    ArrayOfCompact,
}

impl FieldKind {
    /// Returns the field kind used to store a column of `data_type`, together
    /// with the referenced schema name for composite columns.
    pub fn for_query_type(
        data_type: &QueryDataType,
    ) -> Result<(FieldKind, Option<String>), UpsertError> {
        let kind = match data_type {
            QueryDataType::Varchar => FieldKind::String,
            QueryDataType::Boolean => FieldKind::NullableBoolean,
            QueryDataType::TinyInt => FieldKind::NullableInt8,
            QueryDataType::SmallInt => FieldKind::NullableInt16,
            QueryDataType::Int => FieldKind::NullableInt32,
            QueryDataType::BigInt => FieldKind::NullableInt64,
            QueryDataType::Decimal => FieldKind::Decimal,
            QueryDataType::Real => FieldKind::NullableFloat32,
            QueryDataType::Double => FieldKind::NullableFloat64,
            QueryDataType::Date => FieldKind::Date,
            QueryDataType::Time => FieldKind::Time,
            QueryDataType::Timestamp => FieldKind::Timestamp,
            QueryDataType::TimestampTz => FieldKind::TimestampWithTimezone,
            QueryDataType::Custom(custom) => {
                return Ok((FieldKind::Compact, Some(custom.name.clone())))
            }
            QueryDataType::Object | QueryDataType::Json | QueryDataType::Null => {
                return Err(UpsertError::UnsupportedType(data_type.clone()))
            }
        };
        Ok((kind, None))
    }

    /// Logical type of a value read from a field of this kind. Composite fields
    /// map to a custom type named by `type_ref` and owned by `owner`.
    pub fn query_type(&self, type_ref: Option<&str>, owner: TypeKind) -> Option<QueryDataType> {
        let data_type = match self {
            FieldKind::String => QueryDataType::Varchar,
            FieldKind::NullableBoolean | FieldKind::Boolean => QueryDataType::Boolean,
            FieldKind::NullableInt8 | FieldKind::Int8 => QueryDataType::TinyInt,
            FieldKind::NullableInt16 | FieldKind::Int16 => QueryDataType::SmallInt,
            FieldKind::NullableInt32 | FieldKind::Int32 => QueryDataType::Int,
            FieldKind::NullableInt64 | FieldKind::Int64 => QueryDataType::BigInt,
            FieldKind::Decimal => QueryDataType::Decimal,
            FieldKind::NullableFloat32 | FieldKind::Float32 => QueryDataType::Real,
            FieldKind::NullableFloat64 | FieldKind::Float64 => QueryDataType::Double,
            FieldKind::Date => QueryDataType::Date,
            FieldKind::Time => QueryDataType::Time,
            FieldKind::Timestamp => QueryDataType::Timestamp,
            FieldKind::TimestampWithTimezone => QueryDataType::TimestampTz,
            FieldKind::Compact => QueryDataType::Custom(CustomType::new(type_ref?, owner)),
            FieldKind::ArrayOfString | FieldKind::ArrayOfInt64 | FieldKind::ArrayOfCompact => {
                return None
            }
        };
        Some(data_type)
    }

    pub(crate) fn tag(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::String => "STRING",
            FieldKind::NullableBoolean => "NULLABLE_BOOLEAN",
            FieldKind::NullableInt8 => "NULLABLE_INT8",
            FieldKind::NullableInt16 => "NULLABLE_INT16",
            FieldKind::NullableInt32 => "NULLABLE_INT32",
            FieldKind::NullableInt64 => "NULLABLE_INT64",
            FieldKind::Decimal => "DECIMAL",
            FieldKind::NullableFloat32 => "NULLABLE_FLOAT32",
            FieldKind::NullableFloat64 => "NULLABLE_FLOAT64",
            FieldKind::Date => "DATE",
            FieldKind::Time => "TIME",
            FieldKind::Timestamp => "TIMESTAMP",
            FieldKind::TimestampWithTimezone => "TIMESTAMP_WITH_TIMEZONE",
            FieldKind::Compact => "COMPACT",
            FieldKind::Boolean => "BOOLEAN",
            FieldKind::Int8 => "INT8",
            FieldKind::Int16 => "INT16",
            FieldKind::Int32 => "INT32",
            FieldKind::Int64 => "INT64",
            FieldKind::Float32 => "FLOAT32",
            FieldKind::Float64 => "FLOAT64",
            FieldKind::ArrayOfString => "ARRAY_OF_STRING",
            FieldKind::ArrayOfInt64 => "ARRAY_OF_INT64",
            FieldKind::ArrayOfCompact => "ARRAY_OF_COMPACT",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::FieldKind;
    use crate::types::{QueryDataType, TypeKind};

    #[test]
    fn test_for_query_type() {
        assert_eq!(
            FieldKind::for_query_type(&QueryDataType::BigInt).unwrap(),
            (FieldKind::NullableInt64, None)
        );
        assert_eq!(
            FieldKind::for_query_type(&QueryDataType::custom("Office", TypeKind::Compact)).unwrap(),
            (FieldKind::Compact, Some("Office".to_string()))
        );
        assert!(FieldKind::for_query_type(&QueryDataType::Json).is_err());
    }

    #[test]
    fn test_query_type() {
        assert_eq!(
            FieldKind::NullableInt32.query_type(None, TypeKind::Compact),
            Some(QueryDataType::Int)
        );
        assert_eq!(
            FieldKind::Compact.query_type(Some("A"), TypeKind::Native),
            Some(QueryDataType::custom("A", TypeKind::Native))
        );
        assert_eq!(FieldKind::Compact.query_type(None, TypeKind::Compact), None);
        assert_eq!(FieldKind::ArrayOfString.query_type(None, TypeKind::Compact), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldKind::TimestampWithTimezone.to_string(), "TIMESTAMP_WITH_TIMEZONE");
        assert_eq!(FieldKind::ArrayOfCompact.to_string(), "ARRAY_OF_COMPACT");
    }
}
