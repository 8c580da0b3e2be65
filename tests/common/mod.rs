//! Common test utilities for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use kvproj::{
    inject::{InjectOp, Lifecycle, UpsertInjector, UpsertTarget},
    schema::{FieldKind, TypeCatalog, TypeSchema},
    types::{MapTableField, QueryDataType, QueryPath, RowValue, Value},
    UpsertError,
};

/// Whole-value target that stores integers doubled.
#[derive(Debug, Default)]
pub struct MultiplyingTarget {
    lifecycle: Lifecycle,
    value: Value,
}

impl UpsertTarget for MultiplyingTarget {
    fn format(&self) -> &'static str {
        "MULTIPLYING"
    }

    fn create_injector(
        &self,
        path: Option<&str>,
        _data_type: &QueryDataType,
    ) -> Result<UpsertInjector, UpsertError> {
        Ok(UpsertInjector::new(path, InjectOp::Identity))
    }

    fn init(&mut self) {
        self.lifecycle.init();
        self.value = Value::Null;
    }

    fn set(&mut self, _injector: &UpsertInjector, value: &Value) -> Result<(), UpsertError> {
        self.lifecycle.check_accumulating(self.format());
        self.value = match value {
            Value::Int(v) => Value::Int(v * 2),
            other => other.clone(),
        };
        Ok(())
    }

    fn conclude(&mut self) -> Result<Value, UpsertError> {
        self.lifecycle.conclude(self.format());
        Ok(std::mem::take(&mut self.value))
    }
}

/// Target that ignores every write and concludes to null.
#[derive(Debug, Default)]
pub struct NullTarget {
    lifecycle: Lifecycle,
}

impl UpsertTarget for NullTarget {
    fn format(&self) -> &'static str {
        "NULL"
    }

    fn create_injector(
        &self,
        path: Option<&str>,
        _data_type: &QueryDataType,
    ) -> Result<UpsertInjector, UpsertError> {
        Ok(UpsertInjector::new(path, InjectOp::Identity))
    }

    fn init(&mut self) {
        self.lifecycle.init();
    }

    fn set(&mut self, _injector: &UpsertInjector, _value: &Value) -> Result<(), UpsertError> {
        self.lifecycle.check_accumulating(self.format());
        Ok(())
    }

    fn conclude(&mut self) -> Result<Value, UpsertError> {
        self.lifecycle.conclude(self.format());
        Ok(Value::Null)
    }
}

/// `[(key INT), (value INT)]`, both whole-object columns.
pub fn int_key_value_fields() -> Vec<MapTableField> {
    vec![
        MapTableField::new("key", QueryDataType::Int, false, QueryPath::key()),
        MapTableField::new("value", QueryDataType::Int, false, QueryPath::value()),
    ]
}

/// `UserType -> OrganizationType -> OfficeType`, declared one by one.
pub fn user_catalog() -> Arc<TypeCatalog> {
    let mut catalog = TypeCatalog::new();
    for schema in [
        TypeSchema::builder("UserType")
            .field("id", FieldKind::NullableInt64)
            .field("name", FieldKind::String)
            .composite("organization", "OrganizationType")
            .build(),
        TypeSchema::builder("OrganizationType")
            .field("id", FieldKind::NullableInt64)
            .field("name", FieldKind::String)
            .composite("office", "OfficeType")
            .build(),
        TypeSchema::builder("OfficeType")
            .field("id", FieldKind::NullableInt64)
            .field("name", FieldKind::String)
            .build(),
    ] {
        catalog.create_type(schema).expect("declare type");
    }
    Arc::new(catalog)
}

/// `SelfRefType(id, name, other SelfRefType)` plus the three-cycle
/// `AType -> BType -> CType -> AType`.
pub fn cyclic_catalog() -> Arc<TypeCatalog> {
    let mut catalog = TypeCatalog::new();
    catalog
        .create_type(
            TypeSchema::builder("SelfRefType")
                .field("id", FieldKind::NullableInt64)
                .field("name", FieldKind::String)
                .composite("other", "SelfRefType")
                .build(),
        )
        .expect("declare self reference");
    catalog
        .declare_batch([
            TypeSchema::builder("AType")
                .field("name", FieldKind::String)
                .composite("b", "BType")
                .build(),
            TypeSchema::builder("BType")
                .field("name", FieldKind::String)
                .composite("c", "CType")
                .build(),
            TypeSchema::builder("CType")
                .field("name", FieldKind::String)
                .composite("a", "AType")
                .build(),
        ])
        .expect("declare cycle");
    Arc::new(catalog)
}

/// A chain of `SelfRefType` rows named after `names`, linked through `other`.
/// The last row has no successor.
pub fn self_ref_chain(names: &[&str]) -> Value {
    names
        .iter()
        .enumerate()
        .rev()
        .fold(Value::Null, |next, (i, name)| {
            Value::Row(RowValue::new(vec![
                Value::BigInt(i as i64 + 1),
                Value::from(*name),
                next,
            ]))
        })
}

/// A chain of rows around a cycle of two-field types (`name`, next).
pub fn name_chain(names: &[&str]) -> Value {
    names.iter().rev().fold(Value::Null, |next, name| {
        Value::Row(RowValue::new(vec![Value::from(*name), next]))
    })
}
