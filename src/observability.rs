//! Logging infrastructure for kvproj.
//!
//! kvproj uses `tracing` for structured logging. All events use target "kvproj"
//! and include an `event` field for filtering.
//!
//! ## Library Integration
//!
//! kvproj never initializes a global subscriber. Applications configure
//! tracing via `tracing_subscriber` or similar.
//!
//! ## Conventions
//!
//! - `event`: snake_case event name (required)
//! - `component`: module/subsystem (e.g., "projector", "catalog")
//! - Use `%` for Display, `?` for Debug formatting
//! - Nothing is logged per row

/// Target for all kvproj log events.
pub(crate) const KVPROJ_TARGET: &str = "kvproj";

/// Macro for debug-level log events.
///
/// # Example
/// ```ignore
/// log_debug!(
///     component = "projector",
///     event = "projector_built",
///     fields = fields.len(),
/// );
/// ```
macro_rules! log_debug {
    ($($field:tt)*) => {
        ::tracing::debug!(target: $crate::observability::KVPROJ_TARGET, $($field)*)
    };
}

/// Macro for warn-level log events.
macro_rules! log_warn {
    ($($field:tt)*) => {
        ::tracing::warn!(target: $crate::observability::KVPROJ_TARGET, $($field)*)
    };
}

pub(crate) use log_debug;
pub(crate) use log_warn;
