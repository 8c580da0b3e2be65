mod convert;
mod field;
mod value;

use std::fmt;

pub use field::*;
use serde::{Deserialize, Serialize};
pub use value::*;

/// Origin of a user-declared custom type, deciding which formats can store it.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeKind {
    /// Materialized as a native object through an
    /// [`ObjectConverter`](crate::inject::ObjectConverter).
    Native,
    /// Materialized as a compact [`GenericRecord`](crate::record::GenericRecord).
    Compact,
    /// Declared for portable storage, which this crate does not write.
    Portable,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Native => write!(f, "NATIVE"),
            TypeKind::Compact => write!(f, "COMPACT"),
            TypeKind::Portable => write!(f, "PORTABLE"),
        }
    }
}

/// Reference to a user-declared composite type. Only the name is carried; the
/// field layout lives in the [`TypeCatalog`](crate::schema::TypeCatalog).
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomType {
    pub name: String,
    pub kind: TypeKind,
}

impl CustomType {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Logical SQL type of a column as seen by the query layer.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryDataType {
    Varchar,
    Boolean,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Decimal,
    Real,
    Double,
    Time,
    Date,
    Timestamp,
    TimestampTz,
    /// Untyped object column.
    Object,
    Json,
    Null,
    Custom(CustomType),
}

/// Coarse grouping of [`QueryDataType`]s that share an encoding strategy.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum TypeFamily {
    Varchar,
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Decimal,
    Real,
    Double,
    Time,
    Date,
    Timestamp,
    TimestampWithTimeZone,
    Object,
    Json,
    Null,
}

impl QueryDataType {
    pub fn custom(name: impl Into<String>, kind: TypeKind) -> Self {
        QueryDataType::Custom(CustomType::new(name, kind))
    }

    pub fn type_family(&self) -> TypeFamily {
        match self {
            QueryDataType::Varchar => TypeFamily::Varchar,
            QueryDataType::Boolean => TypeFamily::Boolean,
            QueryDataType::TinyInt => TypeFamily::TinyInt,
            QueryDataType::SmallInt => TypeFamily::SmallInt,
            QueryDataType::Int => TypeFamily::Integer,
            QueryDataType::BigInt => TypeFamily::BigInt,
            QueryDataType::Decimal => TypeFamily::Decimal,
            QueryDataType::Real => TypeFamily::Real,
            QueryDataType::Double => TypeFamily::Double,
            QueryDataType::Time => TypeFamily::Time,
            QueryDataType::Date => TypeFamily::Date,
            QueryDataType::Timestamp => TypeFamily::Timestamp,
            QueryDataType::TimestampTz => TypeFamily::TimestampWithTimeZone,
            QueryDataType::Object | QueryDataType::Custom(_) => TypeFamily::Object,
            QueryDataType::Json => TypeFamily::Json,
            QueryDataType::Null => TypeFamily::Null,
        }
    }

    /// Returns the custom type reference, if this is a user-declared type.
    pub fn custom_type(&self) -> Option<&CustomType> {
        match self {
            QueryDataType::Custom(custom) => Some(custom),
            _ => None,
        }
    }
}

impl fmt::Display for QueryDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryDataType::Varchar => write!(f, "VARCHAR"),
            QueryDataType::Boolean => write!(f, "BOOLEAN"),
            QueryDataType::TinyInt => write!(f, "TINYINT"),
            QueryDataType::SmallInt => write!(f, "SMALLINT"),
            QueryDataType::Int => write!(f, "INTEGER"),
            QueryDataType::BigInt => write!(f, "BIGINT"),
            QueryDataType::Decimal => write!(f, "DECIMAL"),
            QueryDataType::Real => write!(f, "REAL"),
            QueryDataType::Double => write!(f, "DOUBLE"),
            QueryDataType::Time => write!(f, "TIME"),
            QueryDataType::Date => write!(f, "DATE"),
            QueryDataType::Timestamp => write!(f, "TIMESTAMP"),
            QueryDataType::TimestampTz => write!(f, "TIMESTAMP WITH TIME ZONE"),
            QueryDataType::Object => write!(f, "OBJECT"),
            QueryDataType::Json => write!(f, "JSON"),
            QueryDataType::Null => write!(f, "NULL"),
            QueryDataType::Custom(custom) => write!(f, "{}", custom.name),
        }
    }
}
