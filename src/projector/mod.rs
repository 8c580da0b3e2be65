mod resolver;
mod supplier;

use std::fmt;

pub use resolver::resolve_injectors;
pub use supplier::KvProjectorSupplier;

use crate::{
    error::UpsertError,
    inject::{UpsertInjector, UpsertTarget, UpsertTargetDescriptor},
    observability::log_debug,
    types::{MapTableField, QueryPath, Row, Value},
};

/// Projects rows into `(key, value)` entries.
///
/// Both targets and both injector lists are built once; every call to
/// [`KvProjector::project`] runs `init`, one write per column and `conclude`
/// on each side.
pub struct KvProjector {
    key_target: Box<dyn UpsertTarget>,
    value_target: Box<dyn UpsertTarget>,
    key_injectors: Vec<Option<UpsertInjector>>,
    value_injectors: Vec<Option<UpsertInjector>>,
    fail_on_nulls: bool,
}

impl KvProjector {
    /// Resolves the injectors of every column against both targets.
    ///
    /// `fields` lists the columns in row ordinal order.
    pub fn new(
        fields: &[MapTableField],
        key_target: Box<dyn UpsertTarget>,
        value_target: Box<dyn UpsertTarget>,
        fail_on_nulls: bool,
    ) -> Result<Self, UpsertError> {
        let key_injectors = resolve_injectors(fields, key_target.as_ref(), true)?;
        let value_injectors = resolve_injectors(fields, value_target.as_ref(), false)?;
        log_debug!(
            component = "projector",
            event = "projector_built",
            fields = fields.len(),
            key_format = key_target.format(),
            value_format = value_target.format(),
            fail_on_nulls = fail_on_nulls,
        );
        Ok(Self {
            key_target,
            value_target,
            key_injectors,
            value_injectors,
            fail_on_nulls,
        })
    }

    /// Describes a projector that can be rebuilt on any worker.
    pub fn supplier(
        fields: Vec<MapTableField>,
        key_descriptor: UpsertTargetDescriptor,
        value_descriptor: UpsertTargetDescriptor,
        fail_on_nulls: bool,
    ) -> KvProjectorSupplier {
        KvProjectorSupplier::new(fields, key_descriptor, value_descriptor, fail_on_nulls)
    }

    pub fn project(&mut self, row: &Row) -> Result<(Value, Value), UpsertError> {
        self.key_target.init();
        self.value_target.init();

        let injectors = self.key_injectors.iter().zip(&self.value_injectors);
        for (ordinal, (key_injector, value_injector)) in injectors.enumerate() {
            let value = row.get(ordinal);
            if let Some(injector) = key_injector {
                self.key_target.set(injector, value)?;
            }
            if let Some(injector) = value_injector {
                self.value_target.set(injector, value)?;
            }
        }

        let key = self.key_target.conclude()?;
        if self.fail_on_nulls && key.is_null() {
            return Err(UpsertError::NullNotAllowed {
                alias: QueryPath::KEY,
            });
        }
        let value = self.value_target.conclude()?;
        if self.fail_on_nulls && value.is_null() {
            return Err(UpsertError::NullNotAllowed {
                alias: QueryPath::VALUE,
            });
        }
        Ok((key, value))
    }
}

impl fmt::Debug for KvProjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KvProjector")
            .field("key_format", &self.key_target.format())
            .field("value_format", &self.value_target.format())
            .field("key_injectors", &self.key_injectors)
            .field("value_injectors", &self.value_injectors)
            .field("fail_on_nulls", &self.fail_on_nulls)
            .finish()
    }
}
