use serde::{Deserialize, Serialize};

use super::FieldKind;
use crate::{error::UpsertError, types::QueryDataType};

/// One field of a [`TypeSchema`].
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    name: String,
    kind: FieldKind,
    /// Name of the referenced schema, set for composite kinds.
    type_ref: Option<String>,
}

impl SchemaField {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            type_ref: None,
        }
    }

    pub fn composite(name: impl Into<String>, type_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Compact,
            type_ref: Some(type_ref.into()),
        }
    }

    /// Builds a field from a SQL column declaration such as `id BIGINT` or
    /// `office OfficeType`.
    pub fn from_query_type(
        name: impl Into<String>,
        data_type: &QueryDataType,
    ) -> Result<Self, UpsertError> {
        let (kind, type_ref) = FieldKind::for_query_type(data_type)?;
        Ok(Self {
            name: name.into(),
            kind,
            type_ref,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn type_ref(&self) -> Option<&str> {
        self.type_ref.as_deref()
    }
}

/// A named composite type: an ordered field list whose composite fields
/// reference other schemas by name.
///
/// References are never inlined, so self references and cycles between
/// schemas are ordinary declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSchema {
    name: String,
    fields: Vec<SchemaField>,
    fingerprint: u32,
}

impl TypeSchema {
    pub fn new(name: impl Into<String>, fields: Vec<SchemaField>) -> Self {
        let name = name.into();
        let fingerprint = fingerprint(&name, &fields);
        Self {
            name,
            fields,
            fingerprint,
        }
    }

    pub fn builder(name: impl Into<String>) -> TypeSchemaBuilder {
        TypeSchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Looks up a field and its position.
    pub fn field(&self, name: &str) -> Option<(usize, &SchemaField)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, field)| field.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Names of the schemas referenced by composite fields, in field order.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().filter_map(SchemaField::type_ref)
    }

    /// CRC32 over the name and field layout, identifying this schema in
    /// encoded records.
    pub fn fingerprint(&self) -> u32 {
        self.fingerprint
    }
}

fn fingerprint(name: &str, fields: &[SchemaField]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(name.as_bytes());
    for field in fields {
        hasher.update(&[0]);
        hasher.update(field.name.as_bytes());
        hasher.update(&[field.kind.tag()]);
        if let Some(type_ref) = &field.type_ref {
            hasher.update(type_ref.as_bytes());
        }
    }
    hasher.finalize()
}

pub struct TypeSchemaBuilder {
    name: String,
    fields: Vec<SchemaField>,
}

impl TypeSchemaBuilder {
    /// Appends a field. A field redeclared under the same name replaces the
    /// earlier one in place.
    pub fn push(mut self, field: SchemaField) -> Self {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }

    pub fn field(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.push(SchemaField::new(name, kind))
    }

    pub fn composite(self, name: impl Into<String>, type_ref: impl Into<String>) -> Self {
        self.push(SchemaField::composite(name, type_ref))
    }

    pub fn column(
        self,
        name: impl Into<String>,
        data_type: &QueryDataType,
    ) -> Result<Self, UpsertError> {
        Ok(self.push(SchemaField::from_query_type(name, data_type)?))
    }

    pub fn build(self) -> TypeSchema {
        TypeSchema::new(self.name, self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::{SchemaField, TypeSchema};
    use crate::{
        schema::FieldKind,
        types::{QueryDataType, TypeKind},
    };

    #[test]
    fn test_builder_keeps_declaration_order() {
        let schema = TypeSchema::builder("UserType")
            .field("id", FieldKind::NullableInt64)
            .field("name", FieldKind::String)
            .composite("organization", "OrganizationType")
            .build();

        let names = schema
            .fields()
            .iter()
            .map(SchemaField::name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["id", "name", "organization"]);
        assert_eq!(schema.field("name").unwrap().0, 1);
        assert!(!schema.has_field("office"));
        assert_eq!(
            schema.references().collect::<Vec<_>>(),
            vec!["OrganizationType"]
        );
    }

    #[test]
    fn test_redeclared_field_replaces() {
        let schema = TypeSchema::builder("T")
            .field("a", FieldKind::String)
            .field("b", FieldKind::String)
            .field("a", FieldKind::NullableInt32)
            .build();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.field("a").unwrap().1.kind(), FieldKind::NullableInt32);
    }

    #[test]
    fn test_column_declaration() {
        let schema = TypeSchema::builder("SelfRefType")
            .column("id", &QueryDataType::BigInt)
            .unwrap()
            .column("other", &QueryDataType::custom("SelfRefType", TypeKind::Compact))
            .unwrap()
            .build();
        let (_, other) = schema.field("other").unwrap();
        assert_eq!(other.kind(), FieldKind::Compact);
        assert_eq!(other.type_ref(), Some("SelfRefType"));

        assert!(TypeSchema::builder("Bad")
            .column("payload", &QueryDataType::Json)
            .is_err());
    }

    #[test]
    fn test_fingerprint_tracks_layout() {
        let a = TypeSchema::builder("T").field("x", FieldKind::String).build();
        let b = TypeSchema::builder("T").field("x", FieldKind::String).build();
        let c = TypeSchema::builder("T")
            .field("x", FieldKind::NullableInt32)
            .build();
        let d = TypeSchema::builder("U").field("x", FieldKind::String).build();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_ne!(a.fingerprint(), d.fingerprint());
    }
}
