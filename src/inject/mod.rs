//! Targets: per-row builders of one wire format.
//!
//! A target hands out [`UpsertInjector`]s once, at projector construction, and
//! then cycles through `init`, any number of [`UpsertTarget::set`] calls and
//! `conclude` for every row. Injectors are plain data (a path plus an
//! operation); the target that created one interprets it.

mod compact;
mod descriptor;
mod json;
mod object;
mod primitive;

pub use compact::CompactTarget;
pub use descriptor::UpsertTargetDescriptor;
pub use json::{JsonTarget, JsonWrite};
pub use object::{ConverterRegistry, ObjectConverter, ObjectTarget, RowObjectConverter};
pub use primitive::PrimitiveTarget;

use crate::{
    error::UpsertError,
    schema::FieldKind,
    types::{CustomType, QueryDataType, Value},
};

/// A stateful builder of one key or value per row.
///
/// Not safe for use by more than one row at a time; parallel workers each own
/// their own target.
pub trait UpsertTarget: Send {
    /// Short name of the wire format, for diagnostics.
    fn format(&self) -> &'static str;

    /// Validates a write of `data_type` to `path` (`None` for the whole
    /// key/value) and returns the precompiled write. Has no effect on the
    /// target's row state.
    fn create_injector(
        &self,
        path: Option<&str>,
        data_type: &QueryDataType,
    ) -> Result<UpsertInjector, UpsertError>;

    /// Starts a new row, discarding whatever the previous row left behind.
    fn init(&mut self);

    /// Applies `injector` to the row in progress.
    ///
    /// # Panics
    /// Outside of `init`..`conclude`, or with an injector this target did not
    /// create.
    fn set(&mut self, injector: &UpsertInjector, value: &Value) -> Result<(), UpsertError>;

    /// Finishes the row and hands the result to the caller.
    ///
    /// # Panics
    /// If `init` was not called first.
    fn conclude(&mut self) -> Result<Value, UpsertError>;
}

/// A precompiled field write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertInjector {
    path: Option<String>,
    op: InjectOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectOp {
    /// Stores the value unchanged.
    Identity,
    /// Writes the named JSON field.
    Json(JsonWrite),
    /// Stores the value in a compact record slot.
    Compact {
        index: usize,
        kind: FieldKind,
        type_ref: Option<String>,
    },
    /// Runs the object converter registered for the type.
    Object(CustomType),
}

impl UpsertInjector {
    pub fn new(path: Option<&str>, op: InjectOp) -> Self {
        Self {
            path: path.map(str::to_string),
            op,
        }
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn op(&self) -> &InjectOp {
        &self.op
    }
}

/// Tracks the `Uninitialized -> Accumulating -> Uninitialized` cycle of a
/// target and fails fast when it is broken.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    Accumulating,
}

impl Lifecycle {
    pub fn init(&mut self) {
        *self = Lifecycle::Accumulating;
    }

    /// # Panics
    /// Unless a row is in progress.
    pub fn check_accumulating(&self, format: &str) {
        assert!(
            *self == Lifecycle::Accumulating,
            "{format} target written outside init/conclude"
        );
    }

    /// # Panics
    /// Unless a row is in progress.
    pub fn conclude(&mut self, format: &str) {
        assert!(
            *self == Lifecycle::Accumulating,
            "{format} target concluded before init"
        );
        *self = Lifecycle::Uninitialized;
    }
}

pub(crate) fn top_level_not_supported(format: &str) -> UpsertError {
    UpsertError::TopLevel(format!(
        "Writing to top-level fields of type {format} is not supported"
    ))
}

pub(crate) fn foreign_injector(format: &str, injector: &UpsertInjector) -> ! {
    panic!("{format} target cannot apply {:?}", injector.op())
}
