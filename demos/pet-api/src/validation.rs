//! Request schemas shared by the pet routes.

use daedalus::core::{RouteValidation, Schema};

/// `x-api-key` header.
pub fn api_key() -> Schema {
    Schema::string()
        .description("Api key to be passed in x-api-key request header")
        .example("secret")
        .label("ApiKey")
}

/// Page size.
pub fn limit() -> Schema {
    Schema::integer()
        .positive()
        .description("Number of items to return")
        .example(25)
        .label("QueryLimit")
}

/// Page start.
pub fn offset() -> Schema {
    Schema::integer()
        .min(0)
        .description("Starting offset for returning items")
        .example(0)
        .label("QueryOffset")
}

/// Pet id path parameter.
pub fn pet_id() -> Schema {
    Schema::integer()
        .description("Unique identifier for pet in database")
        .example(1)
        .label("PetId")
}

/// Pet name.
pub fn pet_name() -> Schema {
    Schema::string()
        .description("Name of the pet")
        .example("Garfield")
        .label("PetName")
}

/// Body of `POST /pets`.
pub fn create_pet_payload() -> Schema {
    Schema::object()
        .key("name", pet_name().required())
        .label("CreatePetPayload")
}

/// Every pet route requires the API key header.
pub fn authenticated() -> RouteValidation {
    RouteValidation::new().header("x-api-key", api_key().required())
}
