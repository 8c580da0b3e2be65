use serde::{Deserialize, Serialize};

use super::{CompactTarget, JsonTarget, ObjectTarget, PrimitiveTarget, UpsertTarget};
use crate::{context::ProjectionContext, error::UpsertError};

/// Serializable description of a target, turned into a live target on the
/// worker that projects rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpsertTargetDescriptor {
    Primitive,
    Json,
    Compact { type_name: String },
    Object,
}

impl UpsertTargetDescriptor {
    pub fn compact(type_name: impl Into<String>) -> Self {
        UpsertTargetDescriptor::Compact {
            type_name: type_name.into(),
        }
    }

    pub fn create(
        &self,
        context: &ProjectionContext,
    ) -> Result<Box<dyn UpsertTarget>, UpsertError> {
        let target: Box<dyn UpsertTarget> = match self {
            UpsertTargetDescriptor::Primitive => Box::new(PrimitiveTarget::new()),
            UpsertTargetDescriptor::Json => Box::new(JsonTarget::new(context.options())),
            UpsertTargetDescriptor::Compact { type_name } => Box::new(CompactTarget::new(
                type_name,
                context.catalog().clone(),
                context.options(),
            )?),
            UpsertTargetDescriptor::Object => Box::new(ObjectTarget::new(
                context.catalog().clone(),
                context.converters().clone(),
            )),
        };
        Ok(target)
    }
}
