//! Pet route handlers.
//!
//! Each handler is a struct holding the store, so its type name doubles as
//! the route's operation id (`GetPetById` becomes `getPetById`).

use std::sync::Arc;

use daedalus::core::{
    ApiError, BoxFuture, HandlerEvent, HandlerResult, ResponseContext, RouteHandler,
};
use http::StatusCode;
use serde_json::json;

use crate::store::{ListOptions, NewPet, PetStore, DEFAULT_LIMIT};

fn pet_not_found(id: i64) -> ApiError {
    ApiError::not_found(format!("Pet id:{id} not found"))
}

/// `GET /pets`
pub struct GetPets {
    store: Arc<dyn PetStore>,
}

impl GetPets {
    /// Creates the handler.
    pub fn new(store: Arc<dyn PetStore>) -> Self {
        Self { store }
    }
}

impl RouteHandler for GetPets {
    fn call<'a>(
        &'a self,
        event: HandlerEvent,
        _response: &'a mut ResponseContext,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let options = ListOptions {
                limit: event.query_param_as("limit")?.unwrap_or(DEFAULT_LIMIT),
                offset: event.query_param_as("offset")?.unwrap_or(0),
            };
            let pets = self.store.list(options)?;
            Ok(json!({ "result": pets }))
        })
    }
}

/// `GET /pets/{id}`
pub struct GetPetById {
    store: Arc<dyn PetStore>,
}

impl GetPetById {
    /// Creates the handler.
    pub fn new(store: Arc<dyn PetStore>) -> Self {
        Self { store }
    }
}

impl RouteHandler for GetPetById {
    fn call<'a>(
        &'a self,
        event: HandlerEvent,
        _response: &'a mut ResponseContext,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let id: i64 = event.path_param_as("id")?;
            let pet = self.store.get(id)?.ok_or_else(|| pet_not_found(id))?;
            Ok(json!({ "result": pet }))
        })
    }
}

/// `POST /pets`
pub struct CreatePet {
    store: Arc<dyn PetStore>,
}

impl CreatePet {
    /// Creates the handler.
    pub fn new(store: Arc<dyn PetStore>) -> Self {
        Self { store }
    }
}

impl RouteHandler for CreatePet {
    fn call<'a>(
        &'a self,
        event: HandlerEvent,
        response: &'a mut ResponseContext,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let new_pet: NewPet = event.payload_as()?;
            let pet = self.store.insert(new_pet)?;
            tracing::info!(pet_id = pet.id, request_id = %event.request_id, "pet created");

            response.set_status(StatusCode::CREATED);
            response.set_header("location", format!("/pets/{}", pet.id));
            Ok(json!({ "result": pet }))
        })
    }
}

/// `DELETE /pets/{id}`
pub struct DeletePetById {
    store: Arc<dyn PetStore>,
}

impl DeletePetById {
    /// Creates the handler.
    pub fn new(store: Arc<dyn PetStore>) -> Self {
        Self { store }
    }
}

impl RouteHandler for DeletePetById {
    fn call<'a>(
        &'a self,
        event: HandlerEvent,
        _response: &'a mut ResponseContext,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let id: i64 = event.path_param_as("id")?;
            let pet = self.store.delete(id)?.ok_or_else(|| pet_not_found(id))?;
            Ok(json!({ "result": pet }))
        })
    }
}
