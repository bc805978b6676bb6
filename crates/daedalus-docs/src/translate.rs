//! Schema descriptor to OpenAPI schema translation.
//!
//! A recursive visitor over [`SchemaKind`]. Nested schemas are inlined; only
//! the top-level parameter and payload schemas are registered as components
//! by the projector.

use daedalus_core::{Schema as Descriptor, SchemaKind};

use crate::model::{Schema, SchemaType};

/// Translates a schema descriptor into its OpenAPI form.
///
/// The descriptor's own presence flag is not part of the result; it is
/// expressed by the enclosing object's `required` list or by the
/// parameter's `required` field.
#[must_use]
pub fn translate(descriptor: &Descriptor) -> Schema {
    let mut schema = match descriptor.kind() {
        SchemaKind::Any => Schema::default(),
        SchemaKind::String(rules) => {
            let mut schema = Schema::of_type(SchemaType::String);
            schema.min_length = rules.min_length.and_then(to_u64);
            schema.max_length = rules.max_length.and_then(to_u64);
            schema.pattern = rules.pattern.as_ref().map(|p| p.as_str().to_string());
            schema
        }
        SchemaKind::Number(rules) => {
            let schema_type = if rules.integer {
                SchemaType::Integer
            } else {
                SchemaType::Number
            };
            let mut schema = Schema::of_type(schema_type);
            schema.minimum = rules.minimum;
            schema.maximum = rules.maximum;
            schema.exclusive_minimum = rules.minimum.is_some() && rules.exclusive_minimum;
            schema.exclusive_maximum = rules.maximum.is_some() && rules.exclusive_maximum;
            schema
        }
        SchemaKind::Boolean => Schema::of_type(SchemaType::Boolean),
        SchemaKind::Array(rules) => {
            let mut schema = Schema::of_type(SchemaType::Array);
            schema.items = Some(Box::new(
                rules.items.as_deref().map(translate).unwrap_or_default(),
            ));
            schema.min_items = rules.min_items.and_then(to_u64);
            schema.max_items = rules.max_items.and_then(to_u64);
            schema
        }
        SchemaKind::Object(rules) => {
            let mut schema = Schema::of_type(SchemaType::Object);
            for (name, child) in &rules.properties {
                if child.is_required() {
                    schema.required.push(name.clone());
                }
                schema.properties.insert(name.clone(), translate(child));
            }
            schema.additional_properties = Some(rules.allow_unknown);
            schema
        }
    };

    let meta = descriptor.meta();
    schema.description.clone_from(&meta.description);
    schema.example.clone_from(&meta.example);
    schema.default.clone_from(&meta.default);
    schema.enum_values = descriptor.allowed().to_vec();
    schema
}

fn to_u64(n: usize) -> Option<u64> {
    u64::try_from(n).ok()
}
