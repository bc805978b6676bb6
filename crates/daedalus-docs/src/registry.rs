//! Per-projection component registry.

use indexmap::IndexMap;

use crate::error::{DocsError, DocsResult};
use crate::model::{Components, RequestBody, Schema, SecurityScheme};

const SCHEMA_PREFIX: &str = "#/components/schemas/";
const REQUEST_BODY_PREFIX: &str = "#/components/requestBodies/";

/// Named schemas and request bodies collected while walking routes.
///
/// Registering the same definition twice under one name is a no-op, which
/// lets several routes share a labelled schema. A different definition under
/// an existing name is an error.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: IndexMap<String, Schema>,
    request_bodies: IndexMap<String, RequestBody>,
}

impl SchemaRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `schema` under `name` and returns a reference to it.
    pub fn register_schema(&mut self, name: &str, schema: Schema) -> DocsResult<Schema> {
        insert_unique(&mut self.schemas, name, schema)?;
        Ok(Schema::reference(format!("{SCHEMA_PREFIX}{name}")))
    }

    /// Registers a request body under `name` and returns its reference path.
    pub fn register_request_body(&mut self, name: &str, body: RequestBody) -> DocsResult<String> {
        insert_unique(&mut self.request_bodies, name, body)?;
        Ok(format!("{REQUEST_BODY_PREFIX}{name}"))
    }

    /// Number of registered schemas.
    #[must_use]
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Consumes the registry into the document's components.
    #[must_use]
    pub fn into_components(self, security_schemes: IndexMap<String, SecurityScheme>) -> Components {
        Components {
            schemas: self.schemas,
            request_bodies: self.request_bodies,
            security_schemes,
        }
    }
}

fn insert_unique<T: PartialEq>(map: &mut IndexMap<String, T>, name: &str, value: T) -> DocsResult<()> {
    match map.get(name) {
        Some(existing) if *existing == value => Ok(()),
        Some(_) => Err(DocsError::SchemaConflict {
            name: name.to_string(),
        }),
        None => {
            map.insert(name.to_string(), value);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SchemaType;

    #[test]
    fn test_register_returns_reference() {
        let mut registry = SchemaRegistry::new();
        let reference = registry
            .register_schema("PetId", Schema::of_type(SchemaType::Integer))
            .unwrap();
        assert_eq!(
            reference.reference.as_deref(),
            Some("#/components/schemas/PetId")
        );
        assert_eq!(registry.schema_count(), 1);
    }

    #[test]
    fn test_same_definition_is_shared() {
        let mut registry = SchemaRegistry::new();
        registry
            .register_schema("ApiKey", Schema::of_type(SchemaType::String))
            .unwrap();
        registry
            .register_schema("ApiKey", Schema::of_type(SchemaType::String))
            .unwrap();
        assert_eq!(registry.schema_count(), 1);
    }

    #[test]
    fn test_conflicting_definition() {
        let mut registry = SchemaRegistry::new();
        registry
            .register_schema("Id", Schema::of_type(SchemaType::String))
            .unwrap();
        let err = registry
            .register_schema("Id", Schema::of_type(SchemaType::Integer))
            .unwrap_err();
        assert!(matches!(err, DocsError::SchemaConflict { name } if name == "Id"));
    }

    #[test]
    fn test_into_components() {
        let mut registry = SchemaRegistry::new();
        let path = registry
            .register_request_body(
                "createPetPayload",
                RequestBody {
                    description: None,
                    required: true,
                    content: IndexMap::new(),
                },
            )
            .unwrap();
        assert_eq!(path, "#/components/requestBodies/createPetPayload");

        let components = registry.into_components(IndexMap::new());
        assert!(components.schemas.is_empty());
        assert!(components.request_bodies.contains_key("createPetPayload"));
    }
}
