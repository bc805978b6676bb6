//! Test fixtures for Daedalus development and testing.
//!
//! Pre-built schemas and a pet-store route set whose handlers echo what they
//! receive, so tests can assert on exactly what reached the handler.
//!
//! # Example
//!
//! ```
//! use daedalus_core::fixtures;
//! use http::Method;
//!
//! let table = fixtures::pet_table().unwrap();
//! let (route, _) = table.find(&Method::GET, "/pets/1").unwrap();
//! assert_eq!(route.operation_id_str(), "getPetById");
//! ```

use serde_json::json;

use crate::context::{HandlerEvent, ResponseContext};
use crate::handler::{handler_fn, BoxFuture, HandlerResult};
use crate::route::{Route, RouteTable, RouteTableError};
use crate::schema::Schema;
use crate::validation::RouteValidation;

/// Handler that returns the request it received.
///
/// The result carries `method`, `path`, `pathParameters`,
/// `queryStringParameters`, `headers`, `payload` and `body`.
pub fn echo<'a>(event: HandlerEvent, _response: &'a mut ResponseContext) -> BoxFuture<'a, HandlerResult> {
    Box::pin(async move {
        Ok(json!({
            "method": event.method.as_str(),
            "path": event.path,
            "pathParameters": event.path_parameters,
            "queryStringParameters": event.query_string_parameters,
            "headers": event.headers,
            "payload": event.payload,
            "body": event.body,
        }))
    })
}

/// `x-api-key` header schema.
#[must_use]
pub fn api_key_schema() -> Schema {
    Schema::string()
        .description("Api key to be passed in x-api-key request header")
        .example("secret")
        .label("ApiKey")
}

/// Pet id path parameter schema.
#[must_use]
pub fn pet_id_schema() -> Schema {
    Schema::integer()
        .description("Unique identifier for pet in database")
        .example(1)
        .label("PetId")
}

/// Payload schema for creating a pet.
#[must_use]
pub fn create_pet_payload_schema() -> Schema {
    Schema::object()
        .key(
            "name",
            Schema::string()
                .description("Name of the pet")
                .example("Garfield")
                .label("PetName")
                .required(),
        )
        .label("CreatePetPayload")
}

/// The four pet routes, all guarded by a required `x-api-key` header.
///
/// - `getPets` - GET /pets
/// - `getPetById` - GET /pets/{id}
/// - `createPet` - POST /pets
/// - `deletePetById` - DELETE /pets/{id}
#[must_use]
pub fn pet_routes() -> Vec<Route> {
    let auth = || RouteValidation::new().header("x-api-key", api_key_schema().required());

    vec![
        Route::get("/pets", handler_fn(echo))
            .operation_id("getPets")
            .summary("List pets")
            .description("Returns all pets in database")
            .tag("pets")
            .validation(
                auth()
                    .query("limit", Schema::integer().positive().label("QueryLimit"))
                    .query("offset", Schema::integer().min(0).label("QueryOffset")),
            ),
        Route::get("/pets/{id}", handler_fn(echo))
            .operation_id("getPetById")
            .summary("Get a pet by its id")
            .tag("pets")
            .validation(auth().path_param("id", pet_id_schema())),
        Route::post("/pets", handler_fn(echo))
            .operation_id("createPet")
            .summary("Create pet")
            .tag("pets")
            .validation(auth().payload(create_pet_payload_schema())),
        Route::delete("/pets/{id}", handler_fn(echo))
            .operation_id("deletePetById")
            .summary("Delete a pet by its id")
            .tag("pets")
            .validation(auth().path_param("id", pet_id_schema())),
    ]
}

/// [`pet_routes`] as a route table.
///
/// # Errors
///
/// Only if the fixture routes themselves are malformed.
pub fn pet_table() -> Result<RouteTable, RouteTableError> {
    RouteTable::builder().routes(pet_routes()).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_pet_routes() {
        let routes = pet_routes();
        assert_eq!(routes.len(), 4);
        assert!(routes.iter().all(|r| r.validation_rules().is_some()));
        assert_eq!(pet_table().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_echo_handler() {
        let mut response = ResponseContext::new();
        let event = HandlerEvent::new(Method::POST, "/pets")
            .with_query_param("dry", "1")
            .with_body(Some(r#"{"name":"Rex"}"#.into()));

        let result = echo(event, &mut response).await.unwrap();
        assert_eq!(result["method"], "POST");
        assert_eq!(result["payload"]["name"], "Rex");
        assert_eq!(result["queryStringParameters"]["dry"], "1");
    }
}
