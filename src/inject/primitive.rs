use std::mem;

use super::{foreign_injector, InjectOp, Lifecycle, UpsertInjector, UpsertTarget};
use crate::{
    error::UpsertError,
    types::{QueryDataType, Value},
};

/// The whole key or value is a single scalar.
#[derive(Debug, Default)]
pub struct PrimitiveTarget {
    lifecycle: Lifecycle,
    value: Value,
}

impl PrimitiveTarget {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UpsertTarget for PrimitiveTarget {
    fn format(&self) -> &'static str {
        "PRIMITIVE"
    }

    fn create_injector(
        &self,
        path: Option<&str>,
        _data_type: &QueryDataType,
    ) -> Result<UpsertInjector, UpsertError> {
        match path {
            None => Ok(UpsertInjector::new(None, InjectOp::Identity)),
            Some(path) => Err(UpsertError::TopLevel(format!(
                "Field \"{path}\" cannot be written, a primitive target only accepts \
                 the whole value"
            ))),
        }
    }

    fn init(&mut self) {
        self.lifecycle.init();
        self.value = Value::Null;
    }

    fn set(&mut self, injector: &UpsertInjector, value: &Value) -> Result<(), UpsertError> {
        self.lifecycle.check_accumulating(self.format());
        match injector.op() {
            InjectOp::Identity => self.value = value.clone(),
            _ => foreign_injector(self.format(), injector),
        }
        Ok(())
    }

    fn conclude(&mut self) -> Result<Value, UpsertError> {
        self.lifecycle.conclude(self.format());
        Ok(mem::take(&mut self.value))
    }
}
