use std::io;

use thiserror::Error;

use crate::{
    schema::FieldKind,
    types::{QueryDataType, TypeKind},
};

/// Error raised while resolving injectors, declaring types or projecting a row.
///
/// Construction-time variants fail the whole projector build. Row-time variants
/// ([`UpsertError::NullNotAllowed`], [`UpsertError::DataConversion`],
/// [`UpsertError::Encoding`]) fail a single row and leave the decision to skip
/// or abort with the caller.
#[derive(Debug, Error)]
pub enum UpsertError {
    /// Column path is not declared by the bound compact schema.
    #[error("Field \"{path}\" doesn't exist in Compact schema \"{type_name}\"")]
    SchemaMismatch { path: String, type_name: String },
    /// The compact format has no SQL encoding for this field kind.
    #[error("{0} kind is not supported in SQL with Compact format!")]
    UnsupportedKind(FieldKind),
    /// The target format has no encoding for this logical type.
    #[error("Unsupported type: {0}")]
    UnsupportedType(QueryDataType),
    /// A target that forbids (or requires) whole-value writes was used the other way.
    #[error("{0}")]
    TopLevel(String),
    /// Whole-object custom types of this kind cannot be written.
    #[error("TypeKind {0} does not support top-level custom types")]
    CustomTypeNotTopLevel(TypeKind),
    /// The concluded key or value is null and nulls are rejected.
    #[error("Cannot write NULL to '{alias}' field")]
    NullNotAllowed { alias: &'static str },
    /// A composite type references a type that was never declared.
    #[error("Encountered type '{0}', which doesn't exist")]
    MissingType(String),
    /// A type with the same name is already declared.
    #[error("Type '{0}' already exists")]
    DuplicateType(String),
    /// A column or field path could not be parsed.
    #[error("Invalid field path \"{0}\"")]
    InvalidPath(String),
    /// A runtime value cannot be represented as the requested type.
    #[error("Cannot convert {from} to {to}")]
    DataConversion { from: String, to: String },
    /// The binary writer failed.
    #[error("encoding error: {0}")]
    Encoding(#[from] io::Error),
    /// The JSON generator failed.
    #[error("json encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UpsertError {
    pub(crate) fn conversion(from: impl ToString, to: impl ToString) -> Self {
        UpsertError::DataConversion {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}
