use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::Arc,
};

use super::TypeSchema;
use crate::{error::UpsertError, observability::log_debug};

/// Resolves schemas referenced from encoded records.
pub trait SchemaLookup {
    fn schema_by_fingerprint(&self, fingerprint: u32) -> Option<Arc<TypeSchema>>;
}

/// Registry of declared [`TypeSchema`]s, keyed by name.
///
/// Schemas reference each other by name only, so the reference graph may
/// contain cycles. Every walk over it keeps a visited set and terminates after
/// touching each declared name once.
#[derive(Debug, Default, Clone)]
pub struct TypeCatalog {
    types: HashMap<String, Arc<TypeSchema>>,
    by_fingerprint: HashMap<u32, Arc<TypeSchema>>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a single type. Referenced types may be declared later; they are
    /// checked when the type is resolved.
    pub fn create_type(&mut self, schema: TypeSchema) -> Result<(), UpsertError> {
        if self.types.contains_key(schema.name()) {
            return Err(UpsertError::DuplicateType(schema.name().to_string()));
        }
        self.insert(schema);
        Ok(())
    }

    /// Declares or redefines a single type.
    pub fn create_or_replace_type(&mut self, schema: TypeSchema) {
        if let Some(previous) = self.types.get(schema.name()) {
            self.by_fingerprint.remove(&previous.fingerprint());
        }
        self.insert(schema);
    }

    /// Declares a batch of types at once.
    ///
    /// Types in the batch may reference themselves and each other in any order.
    /// A reference that is neither in the batch nor already declared fails the
    /// whole batch, and nothing is declared.
    pub fn declare_batch(
        &mut self,
        schemas: impl IntoIterator<Item = TypeSchema>,
    ) -> Result<(), UpsertError> {
        let schemas = schemas.into_iter().collect::<Vec<_>>();
        let mut batch_names = HashSet::with_capacity(schemas.len());
        for schema in &schemas {
            if self.types.contains_key(schema.name()) || !batch_names.insert(schema.name()) {
                return Err(UpsertError::DuplicateType(schema.name().to_string()));
            }
        }
        for schema in &schemas {
            if let Some(missing) = schema
                .references()
                .find(|name| !batch_names.contains(name) && !self.types.contains_key(*name))
            {
                return Err(UpsertError::MissingType(missing.to_string()));
            }
        }
        let count = schemas.len();
        for schema in schemas {
            self.insert(schema);
        }
        log_debug!(
            component = "catalog",
            event = "type_batch_declared",
            types = count,
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<TypeSchema>> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Returns the schema named `name` after checking that every type it
    /// reaches through composite fields is declared.
    pub fn resolve(&self, name: &str) -> Result<Arc<TypeSchema>, UpsertError> {
        self.closure(name)?;
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| UpsertError::MissingType(name.to_string()))
    }

    /// Every schema reachable from `name`, including itself, in breadth-first
    /// order. Each name is visited once, so cyclic graphs terminate.
    pub fn closure(&self, name: &str) -> Result<Vec<Arc<TypeSchema>>, UpsertError> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([name]);
        let mut reachable = Vec::new();
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            let schema = self
                .types
                .get(current)
                .ok_or_else(|| UpsertError::MissingType(current.to_string()))?;
            queue.extend(schema.references());
            reachable.push(schema.clone());
        }
        Ok(reachable)
    }

    fn insert(&mut self, schema: TypeSchema) {
        let schema = Arc::new(schema);
        self.by_fingerprint
            .insert(schema.fingerprint(), schema.clone());
        self.types.insert(schema.name().to_string(), schema);
    }
}

impl SchemaLookup for TypeCatalog {
    fn schema_by_fingerprint(&self, fingerprint: u32) -> Option<Arc<TypeSchema>> {
        self.by_fingerprint.get(&fingerprint).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::TypeCatalog;
    use crate::{
        error::UpsertError,
        schema::{FieldKind, TypeSchema},
    };

    fn cyclic(name: &str, next: &str) -> TypeSchema {
        TypeSchema::builder(name)
            .field("name", FieldKind::String)
            .composite(next.to_lowercase(), next)
            .build()
    }

    #[test]
    fn test_self_reference_resolves() {
        let mut catalog = TypeCatalog::new();
        catalog
            .create_type(
                TypeSchema::builder("SelfRefType")
                    .field("id", FieldKind::NullableInt64)
                    .composite("other", "SelfRefType")
                    .build(),
            )
            .unwrap();

        let schema = catalog.resolve("SelfRefType").unwrap();
        assert_eq!(schema.name(), "SelfRefType");
        assert_eq!(catalog.closure("SelfRefType").unwrap().len(), 1);
    }

    #[test]
    fn test_three_cycle_declared_in_one_batch() {
        let mut catalog = TypeCatalog::new();
        catalog
            .declare_batch([
                cyclic("AType", "BType"),
                cyclic("BType", "CType"),
                cyclic("CType", "AType"),
            ])
            .unwrap();

        for name in ["AType", "BType", "CType"] {
            assert_eq!(catalog.closure(name).unwrap().len(), 3);
        }
    }

    #[test]
    fn test_batch_rejects_undeclared_reference() {
        let mut catalog = TypeCatalog::new();
        let err = catalog
            .declare_batch([cyclic("AType", "BType"), cyclic("BType", "Nowhere")])
            .unwrap_err();
        assert!(matches!(err, UpsertError::MissingType(ref name) if name == "Nowhere"));
        // nothing from the failed batch is declared
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_lenient_declaration_fails_on_resolve() {
        let mut catalog = TypeCatalog::new();
        catalog
            .create_type(
                TypeSchema::builder("UserType")
                    .field("id", FieldKind::NullableInt64)
                    .composite("organization", "OrganizationType")
                    .build(),
            )
            .unwrap();

        let err = catalog.resolve("UserType").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Encountered type 'OrganizationType', which doesn't exist"
        );

        catalog
            .create_type(cyclic("OrganizationType", "OfficeType"))
            .unwrap();
        catalog
            .create_type(TypeSchema::builder("OfficeType").build())
            .unwrap();
        assert!(catalog.resolve("UserType").is_ok());
    }

    #[test]
    fn test_duplicate_declaration() {
        let mut catalog = TypeCatalog::new();
        catalog
            .create_type(TypeSchema::builder("T").build())
            .unwrap();
        assert!(matches!(
            catalog.create_type(TypeSchema::builder("T").build()),
            Err(UpsertError::DuplicateType(_))
        ));

        catalog.create_or_replace_type(
            TypeSchema::builder("T")
                .field("x", FieldKind::String)
                .build(),
        );
        assert_eq!(catalog.get("T").unwrap().len(), 1);
    }
}
