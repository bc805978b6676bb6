//! The pet route table.

use std::sync::Arc;

use daedalus::core::Route;
use http::StatusCode;

use crate::handlers::{CreatePet, DeletePetById, GetPetById, GetPets};
use crate::store::PetStore;
use crate::validation;

/// Tag shared by every pet route.
pub const PETS_TAG: (&str, &str) = ("pets", "Pet store operations");

/// All pet routes over `store`.
///
/// Operation ids come from the handler types: `getPets`, `getPetById`,
/// `createPet` and `deletePetById`.
pub fn routes(store: Arc<dyn PetStore>) -> Vec<Route> {
    vec![
        Route::get("/pets", GetPets::new(Arc::clone(&store)))
            .summary("List pets")
            .description("Returns all pets in database")
            .tag(PETS_TAG)
            .validation(
                validation::authenticated()
                    .query("limit", validation::limit())
                    .query("offset", validation::offset()),
            )
            .response(StatusCode::OK, "A page of pets"),
        Route::get("/pets/{id}", GetPetById::new(Arc::clone(&store)))
            .summary("Get a pet by its id")
            .description("Returns a pet by its id in database")
            .tag(PETS_TAG)
            .validation(validation::authenticated().path_param("id", validation::pet_id()))
            .response(StatusCode::OK, "The pet")
            .response(StatusCode::NOT_FOUND, "No pet with that id"),
        Route::post("/pets", CreatePet::new(Arc::clone(&store)))
            .summary("Create pet")
            .description("Creates a new pet in database")
            .tag(PETS_TAG)
            .validation(validation::authenticated().payload(validation::create_pet_payload()))
            .response(StatusCode::CREATED, "The created pet"),
        Route::delete("/pets/{id}", DeletePetById::new(store))
            .summary("Delete a pet by its id")
            .description("Deletes a pet by its id in database")
            .tag(PETS_TAG)
            .validation(validation::authenticated().path_param("id", validation::pet_id()))
            .response(StatusCode::OK, "The deleted pet")
            .response(StatusCode::NOT_FOUND, "No pet with that id"),
    ]
}
