use serde::{Deserialize, Serialize};

use super::KvProjector;
use crate::{
    context::ProjectionContext,
    error::UpsertError,
    inject::UpsertTargetDescriptor,
    types::MapTableField,
};

/// Everything needed to rebuild an equivalent [`KvProjector`] on another
/// worker. Serializable with any serde format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvProjectorSupplier {
    fields: Vec<MapTableField>,
    key_descriptor: UpsertTargetDescriptor,
    value_descriptor: UpsertTargetDescriptor,
    fail_on_nulls: bool,
}

impl KvProjectorSupplier {
    pub fn new(
        fields: Vec<MapTableField>,
        key_descriptor: UpsertTargetDescriptor,
        value_descriptor: UpsertTargetDescriptor,
        fail_on_nulls: bool,
    ) -> Self {
        Self {
            fields,
            key_descriptor,
            value_descriptor,
            fail_on_nulls,
        }
    }

    pub fn fields(&self) -> &[MapTableField] {
        &self.fields
    }

    pub fn key_descriptor(&self) -> &UpsertTargetDescriptor {
        &self.key_descriptor
    }

    pub fn value_descriptor(&self) -> &UpsertTargetDescriptor {
        &self.value_descriptor
    }

    pub fn fail_on_nulls(&self) -> bool {
        self.fail_on_nulls
    }

    /// Builds a fresh projector with its own targets.
    pub fn get(&self, context: &ProjectionContext) -> Result<KvProjector, UpsertError> {
        KvProjector::new(
            &self.fields,
            self.key_descriptor.create(context)?,
            self.value_descriptor.create(context)?,
            self.fail_on_nulls,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::KvProjectorSupplier;
    use crate::{
        context::ProjectionContext,
        inject::UpsertTargetDescriptor,
        types::{MapTableField, QueryDataType, QueryPath, Row, Value},
    };

    #[test]
    fn test_each_get_builds_independent_projector() {
        let supplier = KvProjectorSupplier::new(
            vec![
                MapTableField::new("id", QueryDataType::BigInt, false, QueryPath::key()),
                MapTableField::new(
                    "name",
                    QueryDataType::Varchar,
                    false,
                    QueryPath::value_field("name"),
                ),
            ],
            UpsertTargetDescriptor::Primitive,
            UpsertTargetDescriptor::Json,
            false,
        );
        let context = ProjectionContext::default();
        let mut first = supplier.get(&context).unwrap();
        let mut second = supplier.get(&context).unwrap();

        let row = Row::new(vec![Value::BigInt(1), "Alice".into()]);
        let (key, value) = first.project(&row).unwrap();
        assert_eq!(key, Value::BigInt(1));
        assert_eq!(value, Value::Bytes(r#"{"name":"Alice"}"#.into()));
        assert_eq!(second.project(&row).unwrap(), (key, value));
    }
}
