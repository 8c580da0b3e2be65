/// Sizing knobs for the per-row scratch state of targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionOptions {
    pub(crate) json_buffer_capacity: usize,
    pub(crate) compact_slot_capacity: usize,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        ProjectionOptions {
            json_buffer_capacity: 256,
            compact_slot_capacity: 0,
        }
    }
}

impl ProjectionOptions {
    /// Initial size of the byte buffer a JSON target reuses across rows.
    pub fn json_buffer_capacity(self, json_buffer_capacity: usize) -> Self {
        ProjectionOptions {
            json_buffer_capacity,
            ..self
        }
    }

    /// Minimum number of value slots a compact target allocates up front. The
    /// bound schema's field count is always honored.
    pub fn compact_slot_capacity(self, compact_slot_capacity: usize) -> Self {
        ProjectionOptions {
            compact_slot_capacity,
            ..self
        }
    }
}
