use std::sync::Arc;

use super::{
    foreign_injector, top_level_not_supported, InjectOp, Lifecycle, UpsertInjector, UpsertTarget,
};
use crate::{
    error::UpsertError,
    option::ProjectionOptions,
    record::{convert_field, GenericRecordBuilder},
    schema::{FieldKind, TypeCatalog, TypeSchema},
    types::{QueryDataType, Value},
};

/// Builds one [`GenericRecord`](crate::record::GenericRecord) of a fixed
/// schema per row.
#[derive(Debug)]
pub struct CompactTarget {
    lifecycle: Lifecycle,
    catalog: Arc<TypeCatalog>,
    builder: GenericRecordBuilder,
}

impl CompactTarget {
    /// Binds a target to the declared type `type_name`, checking that every
    /// type it references is declared as well.
    pub fn new(
        type_name: &str,
        catalog: Arc<TypeCatalog>,
        option: &ProjectionOptions,
    ) -> Result<Self, UpsertError> {
        let schema = catalog.resolve(type_name)?;
        Ok(Self::with_schema(schema, catalog, option))
    }

    pub fn with_schema(
        schema: Arc<TypeSchema>,
        catalog: Arc<TypeCatalog>,
        option: &ProjectionOptions,
    ) -> Self {
        Self {
            lifecycle: Lifecycle::default(),
            catalog,
            builder: GenericRecordBuilder::with_capacity(schema, option.compact_slot_capacity),
        }
    }

    pub fn schema(&self) -> &Arc<TypeSchema> {
        self.builder.schema()
    }
}

impl UpsertTarget for CompactTarget {
    fn format(&self) -> &'static str {
        "COMPACT"
    }

    fn create_injector(
        &self,
        path: Option<&str>,
        data_type: &QueryDataType,
    ) -> Result<UpsertInjector, UpsertError> {
        let Some(path) = path else {
            return Err(top_level_not_supported(self.format()));
        };
        let schema = self.schema();
        let (index, field) = schema
            .field(path)
            .ok_or_else(|| UpsertError::SchemaMismatch {
                path: path.to_string(),
                type_name: schema.name().to_string(),
            })?;
        // a custom column only lands in a nested record field
        if data_type.custom_type().is_some() && field.kind() != FieldKind::Compact {
            return Err(UpsertError::conversion(data_type, field.kind()));
        }
        match field.kind() {
            FieldKind::String
            | FieldKind::NullableBoolean
            | FieldKind::NullableInt8
            | FieldKind::NullableInt16
            | FieldKind::NullableInt32
            | FieldKind::NullableInt64
            | FieldKind::Decimal
            | FieldKind::NullableFloat32
            | FieldKind::NullableFloat64
            | FieldKind::Time
            | FieldKind::Date
            | FieldKind::Timestamp
            | FieldKind::TimestampWithTimezone => {}
            FieldKind::Compact => {
                let type_ref = field
                    .type_ref()
                    .ok_or(UpsertError::UnsupportedKind(FieldKind::Compact))?;
                // nested writes convert against the referenced schema chain
                self.catalog.resolve(type_ref)?;
            }
            kind @ (FieldKind::Boolean
            | FieldKind::Int8
            | FieldKind::Int16
            | FieldKind::Int32
            | FieldKind::Int64
            | FieldKind::Float32
            | FieldKind::Float64
            | FieldKind::ArrayOfString
            | FieldKind::ArrayOfInt64
            | FieldKind::ArrayOfCompact) => return Err(UpsertError::UnsupportedKind(kind)),
        }
        Ok(UpsertInjector::new(
            Some(path),
            InjectOp::Compact {
                index,
                kind: field.kind(),
                type_ref: field.type_ref().map(str::to_string),
            },
        ))
    }

    fn init(&mut self) {
        self.lifecycle.init();
        self.builder.reset();
    }

    fn set(&mut self, injector: &UpsertInjector, value: &Value) -> Result<(), UpsertError> {
        self.lifecycle.check_accumulating(self.format());
        let InjectOp::Compact {
            index,
            kind,
            type_ref,
        } = injector.op()
        else {
            foreign_injector(self.format(), injector)
        };
        let value = convert_field(value, *kind, type_ref.as_deref(), &self.catalog)?;
        self.builder.set(*index, value);
        Ok(())
    }

    fn conclude(&mut self) -> Result<Value, UpsertError> {
        self.lifecycle.conclude(self.format());
        Ok(Value::Record(self.builder.build()))
    }
}
