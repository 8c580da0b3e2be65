use super::{FieldKind, TypeCatalog};
use crate::{
    error::UpsertError,
    types::{CustomType, QueryDataType, Value},
};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    name: String,
    index: usize,
}

/// A dot-separated field path compiled against a (possibly cyclic) schema graph.
///
/// Compilation checks each segment against the schema reached so far, so the
/// work done is proportional to the path length and never to the size of the
/// reference cycle. Extraction walks the same finite chain of segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    path: String,
    segments: Vec<Segment>,
    data_type: QueryDataType,
}

impl FieldPath {
    /// Resolves `path` (for example `organization.office.name`) starting at the
    /// schema of `root`.
    pub fn compile(
        catalog: &TypeCatalog,
        root: &CustomType,
        path: &str,
    ) -> Result<Self, UpsertError> {
        if path.is_empty() {
            return Err(UpsertError::InvalidPath(path.to_string()));
        }
        let mut schema = catalog.resolve(&root.name)?;
        let mut segments = Vec::new();
        let mut data_type = None;
        for name in path.split('.') {
            if name.is_empty() {
                return Err(UpsertError::InvalidPath(path.to_string()));
            }
            if data_type.is_some() {
                // previous segment was a leaf
                return Err(UpsertError::InvalidPath(path.to_string()));
            }
            let (index, field) =
                schema
                    .field(name)
                    .ok_or_else(|| UpsertError::SchemaMismatch {
                        path: name.to_string(),
                        type_name: schema.name().to_string(),
                    })?;
            segments.push(Segment {
                name: name.to_string(),
                index,
            });
            match (field.kind(), field.type_ref()) {
                (FieldKind::Compact, Some(type_ref)) => {
                    let next = catalog.resolve(type_ref)?;
                    schema = next;
                }
                (kind, type_ref) => {
                    data_type = Some(
                        kind.query_type(type_ref, root.kind)
                            .ok_or(UpsertError::UnsupportedKind(kind))?,
                    );
                }
            }
        }
        let data_type = data_type.unwrap_or_else(|| {
            QueryDataType::Custom(CustomType::new(schema.name(), root.kind))
        });
        Ok(Self {
            path: path.to_string(),
            segments,
            data_type,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Type of the value the path points at.
    pub fn data_type(&self) -> &QueryDataType {
        &self.data_type
    }

    /// Walks `value` along the compiled segments. A null anywhere on the way
    /// yields null.
    pub fn extract(&self, value: &Value) -> Result<Value, UpsertError> {
        let mut current = value;
        for segment in &self.segments {
            current = match current {
                Value::Null => return Ok(Value::Null),
                Value::Record(record) => record.get(&segment.name).unwrap_or(&Value::Null),
                Value::Object(object) => object.get(&segment.name).unwrap_or(&Value::Null),
                Value::Row(row) => row.get(segment.index),
                _ => return Err(UpsertError::InvalidPath(self.path.clone())),
            };
        }
        Ok(current.clone())
    }
}
