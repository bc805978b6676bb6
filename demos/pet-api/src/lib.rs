//! Pet store demo for Daedalus.
//!
//! Four routes over a [`PetStore`]:
//!
//! | Method | Path | Operation |
//! |---|---|---|
//! | GET | `/pets` | `getPets` |
//! | GET | `/pets/{id}` | `getPetById` |
//! | POST | `/pets` | `createPet` |
//! | DELETE | `/pets/{id}` | `deletePetById` |
//!
//! Every route requires an `x-api-key` header. Results are wrapped as
//! `{"result": ...}`.

#![forbid(unsafe_code)]

use std::sync::Arc;

use daedalus::config::DaedalusConfig;
use daedalus::{BuildError, Dispatcher};

pub mod handlers;
pub mod routes;
pub mod store;
pub mod validation;

pub use store::{ListOptions, MemoryPetStore, NewPet, Pet, PetStore};

/// Builds the pet dispatcher over `store`.
///
/// # Errors
///
/// Returns [`BuildError`] for an invalid configuration.
pub fn dispatcher(store: Arc<dyn PetStore>, config: &DaedalusConfig) -> Result<Dispatcher, BuildError> {
    Dispatcher::from_config(routes::routes(store), config)
}
