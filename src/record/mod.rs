mod encoding;

use std::{fmt, sync::Arc};

use crate::{
    error::UpsertError,
    schema::{FieldKind, TypeCatalog, TypeSchema},
    types::{TypeKind, Value},
};

/// An immutable record bound to a [`TypeSchema`]: one value per schema field,
/// in schema order. Absent fields hold [`Value::Null`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenericRecord {
    schema: Arc<TypeSchema>,
    values: Vec<Value>,
}

impl GenericRecord {
    /// A record whose fields are all absent.
    pub fn empty(schema: Arc<TypeSchema>) -> Self {
        let values = vec![Value::Null; schema.len()];
        Self { schema, values }
    }

    pub fn builder(schema: Arc<TypeSchema>) -> GenericRecordBuilder {
        GenericRecordBuilder::new(schema)
    }

    /// Converts a structured value into a record of `schema`.
    ///
    /// Rows are matched by position, objects and records by field name. Nested
    /// composite fields are converted against their own referenced schema, so
    /// the recursion depth is the depth of `value` itself.
    pub fn from_value(
        value: &Value,
        schema: &Arc<TypeSchema>,
        catalog: &TypeCatalog,
    ) -> Result<Self, UpsertError> {
        let mut builder = GenericRecordBuilder::new(schema.clone());
        match value {
            Value::Record(record) if record.schema.name() == schema.name() => {
                return Ok(record.clone())
            }
            Value::Row(row) => {
                for (index, value) in row.values().iter().enumerate().take(schema.len()) {
                    builder.set_converted(index, value, catalog)?;
                }
            }
            Value::Record(record) => {
                for (name, value) in record.fields() {
                    if let Some((index, _)) = schema.field(name) {
                        builder.set_converted(index, value, catalog)?;
                    }
                }
            }
            Value::Object(object) => {
                for (name, value) in object.fields() {
                    if let Some((index, _)) = schema.field(name) {
                        builder.set_converted(index, value, catalog)?;
                    }
                }
            }
            _ => return Err(UpsertError::conversion(value.kind_name(), schema.name())),
        }
        Ok(builder.finish())
    }

    pub fn schema(&self) -> &Arc<TypeSchema> {
        &self.schema
    }

    pub fn type_name(&self) -> &str {
        self.schema.name()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema
            .field(name)
            .and_then(|(index, _)| self.values.get(index))
    }

    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Field names paired with their values, in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .fields()
            .iter()
            .map(|field| field.name())
            .zip(self.values.iter())
    }
}

impl fmt::Display for GenericRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.schema.name())?;
        for (i, (name, value)) in self.fields().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        write!(f, "}}")
    }
}

/// Accumulates field values for one [`GenericRecord`] at a time.
///
/// The slot vector is kept across records; [`GenericRecordBuilder::reset`]
/// clears it without giving up its allocation.
#[derive(Debug)]
pub struct GenericRecordBuilder {
    schema: Arc<TypeSchema>,
    values: Vec<Value>,
}

impl GenericRecordBuilder {
    pub fn new(schema: Arc<TypeSchema>) -> Self {
        Self::with_capacity(schema, 0)
    }

    pub fn with_capacity(schema: Arc<TypeSchema>, capacity: usize) -> Self {
        let mut values = Vec::with_capacity(capacity.max(schema.len()));
        values.resize(schema.len(), Value::Null);
        Self { schema, values }
    }

    pub fn schema(&self) -> &Arc<TypeSchema> {
        &self.schema
    }

    /// Marks every field absent.
    pub fn reset(&mut self) {
        self.values.clear();
        self.values.resize(self.schema.len(), Value::Null);
    }

    /// Stores `value` in slot `index`.
    ///
    /// # Panics
    /// If `index` is outside the schema.
    pub fn set(&mut self, index: usize, value: Value) {
        self.values[index] = value;
    }

    pub fn set_by_name(&mut self, name: &str, value: Value) -> Result<(), UpsertError> {
        let (index, _) = self
            .schema
            .field(name)
            .ok_or_else(|| UpsertError::SchemaMismatch {
                path: name.to_string(),
                type_name: self.schema.name().to_string(),
            })?;
        self.values[index] = value;
        Ok(())
    }

    /// Converts `value` to the kind declared for slot `index` and stores it.
    pub(crate) fn set_converted(
        &mut self,
        index: usize,
        value: &Value,
        catalog: &TypeCatalog,
    ) -> Result<(), UpsertError> {
        let field = &self.schema.fields()[index];
        let converted = convert_field(value, field.kind(), field.type_ref(), catalog)?;
        self.values[index] = converted;
        Ok(())
    }

    /// Builds a record from the current slots. The builder keeps its slots
    /// and must be reset before the next record.
    pub fn build(&self) -> GenericRecord {
        GenericRecord {
            schema: self.schema.clone(),
            values: self.values.clone(),
        }
    }

    fn finish(self) -> GenericRecord {
        GenericRecord {
            schema: self.schema,
            values: self.values,
        }
    }
}

/// Converts `value` into the representation stored for a field of `kind`.
pub(crate) fn convert_field(
    value: &Value,
    kind: FieldKind,
    type_ref: Option<&str>,
    catalog: &TypeCatalog,
) -> Result<Value, UpsertError> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    match (kind, type_ref) {
        (FieldKind::Compact, Some(type_ref)) => {
            let schema = catalog
                .get(type_ref)
                .ok_or_else(|| UpsertError::MissingType(type_ref.to_string()))?;
            GenericRecord::from_value(value, schema, catalog).map(Value::Record)
        }
        (kind, type_ref) => {
            let data_type = kind
                .query_type(type_ref, TypeKind::Compact)
                .ok_or(UpsertError::UnsupportedKind(kind))?;
            value.convert_to(&data_type)
        }
    }
}
