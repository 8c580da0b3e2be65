use crate::{
    error::UpsertError,
    inject::{UpsertInjector, UpsertTarget},
    observability::log_warn,
    types::MapTableField,
};

/// Precompiles one write per column for the key side (`key == true`) or the
/// value side of an entry.
///
/// Columns of the other side map to `None`. Any column the target cannot
/// accept fails the whole resolution, so a projector built from the result
/// never meets an unknown field while processing rows.
pub fn resolve_injectors(
    fields: &[MapTableField],
    target: &dyn UpsertTarget,
    key: bool,
) -> Result<Vec<Option<UpsertInjector>>, UpsertError> {
    fields
        .iter()
        .map(|field| {
            if field.path().is_key() != key {
                return Ok(None);
            }
            target
                .create_injector(field.path().path(), field.data_type())
                .map(Some)
                .inspect_err(|err| {
                    log_warn!(
                        component = "projector",
                        event = "injector_resolution_failed",
                        column = field.name(),
                        path = %field.path(),
                        format = target.format(),
                        error = %err,
                    );
                })
        })
        .collect()
}
