use std::{collections::HashMap, fmt, mem, sync::Arc};

use super::{foreign_injector, InjectOp, Lifecycle, UpsertInjector, UpsertTarget};
use crate::{
    error::UpsertError,
    schema::{FieldKind, TypeCatalog, TypeSchema},
    types::{NativeObject, QueryDataType, TypeKind, Value},
};

/// Turns a row value into the object stored for a native custom type.
pub trait ObjectConverter: fmt::Debug + Send + Sync {
    fn convert(&self, value: &Value, catalog: &TypeCatalog) -> Result<Value, UpsertError>;
}

/// Object converters keyed by custom type name.
#[derive(Debug, Clone, Default)]
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<dyn ObjectConverter>>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        mut self,
        type_name: impl Into<String>,
        converter: impl ObjectConverter + 'static,
    ) -> Self {
        self.converters.insert(type_name.into(), Arc::new(converter));
        self
    }

    pub fn get(&self, type_name: &str) -> Option<&Arc<dyn ObjectConverter>> {
        self.converters.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.converters.contains_key(type_name)
    }
}

/// Builds a [`NativeObject`] following the declared schema of a type.
///
/// Composite fields are converted against their referenced schema; a null
/// field ends the descent, so cyclic schemas are walked only as deep as the
/// value itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowObjectConverter {
    type_name: String,
}

impl RowObjectConverter {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }
}

impl ObjectConverter for RowObjectConverter {
    fn convert(&self, value: &Value, catalog: &TypeCatalog) -> Result<Value, UpsertError> {
        convert_named(&self.type_name, value, catalog)
    }
}

fn convert_named(
    type_name: &str,
    value: &Value,
    catalog: &TypeCatalog,
) -> Result<Value, UpsertError> {
    let schema = catalog
        .get(type_name)
        .ok_or_else(|| UpsertError::MissingType(type_name.to_string()))?;
    to_object(value, schema, catalog)
}

fn field_of<'a>(value: &'a Value, index: usize, name: &str) -> &'a Value {
    let field = match value {
        Value::Row(row) => Some(row.get(index)),
        Value::Record(record) => record.get(name),
        Value::Object(object) => object.get(name),
        _ => None,
    };
    field.unwrap_or(&Value::Null)
}

fn to_object(
    value: &Value,
    schema: &TypeSchema,
    catalog: &TypeCatalog,
) -> Result<Value, UpsertError> {
    match value {
        Value::Null => return Ok(Value::Null),
        Value::Object(object) if object.type_name() == schema.name() => return Ok(value.clone()),
        Value::Row(_) | Value::Record(_) | Value::Object(_) => {}
        _ => return Err(UpsertError::conversion(value.kind_name(), schema.name())),
    }
    let mut fields = Vec::with_capacity(schema.len());
    for (index, field) in schema.fields().iter().enumerate() {
        let raw = field_of(value, index, field.name());
        let converted = match (field.kind(), field.type_ref()) {
            _ if raw.is_null() => Value::Null,
            (FieldKind::Compact, Some(type_ref)) => convert_named(type_ref, raw, catalog)?,
            (kind, type_ref) => {
                let data_type = kind
                    .query_type(type_ref, TypeKind::Native)
                    .ok_or(UpsertError::UnsupportedKind(kind))?;
                raw.convert_to(&data_type)?
            }
        };
        fields.push((field.name().to_string(), converted));
    }
    Ok(Value::Object(NativeObject::new(schema.name(), fields)))
}

/// Stores the single object produced for a native custom type as the whole
/// key or value.
#[derive(Debug)]
pub struct ObjectTarget {
    lifecycle: Lifecycle,
    catalog: Arc<TypeCatalog>,
    converters: ConverterRegistry,
    object: Value,
}

impl ObjectTarget {
    pub fn new(catalog: Arc<TypeCatalog>, converters: ConverterRegistry) -> Self {
        Self {
            lifecycle: Lifecycle::default(),
            catalog,
            converters,
            object: Value::Null,
        }
    }
}

impl UpsertTarget for ObjectTarget {
    fn format(&self) -> &'static str {
        "OBJECT"
    }

    fn create_injector(
        &self,
        path: Option<&str>,
        data_type: &QueryDataType,
    ) -> Result<UpsertInjector, UpsertError> {
        let custom = data_type
            .custom_type()
            .ok_or_else(|| UpsertError::UnsupportedType(data_type.clone()))?;
        if custom.kind != TypeKind::Native {
            return Err(UpsertError::CustomTypeNotTopLevel(custom.kind));
        }
        if let Some(path) = path {
            return Err(UpsertError::TopLevel(format!(
                "Field \"{path}\" cannot be written, custom type {} is only \
                 supported at the top level",
                custom.name
            )));
        }
        if !self.converters.contains(&custom.name) {
            self.catalog.resolve(&custom.name)?;
        }
        Ok(UpsertInjector::new(None, InjectOp::Object(custom.clone())))
    }

    fn init(&mut self) {
        self.lifecycle.init();
        self.object = Value::Null;
    }

    fn set(&mut self, injector: &UpsertInjector, value: &Value) -> Result<(), UpsertError> {
        self.lifecycle.check_accumulating(self.format());
        let InjectOp::Object(custom) = injector.op() else {
            foreign_injector(self.format(), injector)
        };
        self.object = match self.converters.get(&custom.name) {
            Some(converter) => converter.convert(value, &self.catalog)?,
            None => convert_named(&custom.name, value, &self.catalog)?,
        };
        Ok(())
    }

    fn conclude(&mut self) -> Result<Value, UpsertError> {
        self.lifecycle.conclude(self.format());
        Ok(mem::take(&mut self.object))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{ConverterRegistry, ObjectConverter, ObjectTarget};
    use crate::{
        error::UpsertError,
        inject::UpsertTarget,
        schema::{FieldKind, TypeCatalog, TypeSchema},
        types::{QueryDataType, RowValue, TypeKind, Value},
    };

    #[derive(Debug)]
    struct Doubling;

    impl ObjectConverter for Doubling {
        fn convert(&self, value: &Value, _: &TypeCatalog) -> Result<Value, UpsertError> {
            match value {
                Value::Int(v) => Ok(Value::Int(v * 2)),
                other => Ok(other.clone()),
            }
        }
    }

    fn catalog() -> Arc<TypeCatalog> {
        let mut catalog = TypeCatalog::new();
        catalog
            .create_type(
                TypeSchema::builder("SelfRefType")
                    .field("id", FieldKind::NullableInt64)
                    .field("name", FieldKind::String)
                    .composite("other", "SelfRefType")
                    .build(),
            )
            .unwrap();
        Arc::new(catalog)
    }

    fn self_ref() -> QueryDataType {
        QueryDataType::custom("SelfRefType", TypeKind::Native)
    }

    #[test]
    fn test_default_converter_follows_schema() {
        let mut target = ObjectTarget::new(catalog(), ConverterRegistry::new());
        let injector = target.create_injector(None, &self_ref()).unwrap();

        target.init();
        target
            .set(
                &injector,
                &Value::Row(RowValue::new(vec![
                    Value::Int(1),
                    "first".into(),
                    Value::Row(RowValue::new(vec![Value::Int(2), "second".into()])),
                ])),
            )
            .unwrap();
        let Value::Object(object) = target.conclude().unwrap() else {
            panic!("object expected");
        };
        assert_eq!(object.type_name(), "SelfRefType");
        assert_eq!(object.get("id"), Some(&Value::BigInt(1)));
        assert_eq!(
            object.to_string(),
            "SelfRefType{id=1, name=first, other=SelfRefType{id=2, name=second, other=NULL}}"
        );
    }

    #[test]
    fn test_registered_converter() {
        let converters = ConverterRegistry::new().register("Doubled", Doubling);
        let mut target = ObjectTarget::new(Arc::new(TypeCatalog::new()), converters);
        let injector = target
            .create_injector(None, &QueryDataType::custom("Doubled", TypeKind::Native))
            .unwrap();

        target.init();
        target.set(&injector, &Value::Int(21)).unwrap();
        assert_eq!(target.conclude().unwrap(), Value::Int(42));
    }

    #[test]
    fn test_empty_row_is_null() {
        let mut target = ObjectTarget::new(catalog(), ConverterRegistry::new());
        target.init();
        assert_eq!(target.conclude().unwrap(), Value::Null);
    }

    #[test]
    fn test_rejected_injectors() {
        let target = ObjectTarget::new(catalog(), ConverterRegistry::new());

        let err = target
            .create_injector(
                None,
                &QueryDataType::custom("SelfRefType", TypeKind::Compact),
            )
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "TypeKind COMPACT does not support top-level custom types"
        );

        let err = target
            .create_injector(Some("other"), &self_ref())
            .unwrap_err();
        assert!(matches!(err, UpsertError::TopLevel(_)));
        assert_eq!(
            err.to_string(),
            "Field \"other\" cannot be written, custom type SelfRefType is only supported at \
             the top level"
        );
        assert!(matches!(
            target.create_injector(None, &QueryDataType::Int),
            Err(UpsertError::UnsupportedType(_))
        ));
        assert!(matches!(
            target.create_injector(None, &QueryDataType::custom("Nope", TypeKind::Native)),
            Err(UpsertError::MissingType(_))
        ));
    }
}
