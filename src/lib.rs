//! Row-to-wire-format projection for SQL key-value mappings.
//!
//! A [`KvProjector`](projector::KvProjector) turns each row produced by the
//! query engine into a `(key, value)` entry. Each side is built by a target of
//! one wire format (compact record, JSON object, native object or a plain
//! scalar) through injectors that are resolved once, when the projector is
//! built, against the declared [`TypeSchema`](schema::TypeSchema)s. Declared
//! types may reference each other, including in cycles.

/// Runtime state handed to workers that rebuild projectors.
pub mod context;
/// Error type shared by every operation of the crate.
pub mod error;
/// Per-row wire-format targets and their injectors.
pub mod inject;
mod observability;
/// Options for the scratch state of targets.
pub mod option;
/// Key/value projection of rows.
pub mod projector;
/// Compact records bound to a declared schema.
pub mod record;
/// Declared composite types and their catalog.
pub mod schema;
/// Binary encoding primitives.
pub mod serdes;
/// Logical SQL types, runtime values and column descriptors.
pub mod types;

pub use crate::{
    context::ProjectionContext,
    error::UpsertError,
    projector::{KvProjector, KvProjectorSupplier},
};
