//! Pet API behaviour through the full dispatch pipeline.

use std::io::Write;
use std::sync::Arc;

use daedalus::config::{ConfigLoader, DaedalusConfig};
use daedalus_test::TestClient;
use http::StatusCode;
use pet_api::{MemoryPetStore, PetStore};
use serde_json::json;

fn client_with(store: Arc<MemoryPetStore>) -> TestClient {
    let store: Arc<dyn PetStore> = store;
    let dispatcher = pet_api::dispatcher(store, &DaedalusConfig::default()).unwrap();
    TestClient::new(dispatcher).with_default_header("x-api-key", "secret")
}

fn client() -> TestClient {
    client_with(Arc::new(MemoryPetStore::seeded()))
}

#[tokio::test]
async fn test_list_pets() {
    client()
        .get("/pets")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_eq(&json!({ "result": [{ "id": 1, "name": "Onni" }] }));
}

#[tokio::test]
async fn test_list_pets_paging() {
    let store = Arc::new(MemoryPetStore::new());
    for name in ["a", "b", "c", "d"] {
        store.insert(pet_api::NewPet { name: name.to_string() }).unwrap();
    }
    let client = client_with(store);

    client
        .get("/pets?limit=2&offset=1")
        .send()
        .await
        .assert_json_field("result.0.name", &json!("b"))
        .assert_json_field("result.1.name", &json!("c"));

    client
        .get("/pets")
        .query("limit", 0)
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_pet() {
    let client = client();

    client
        .get("/pets/1")
        .send()
        .await
        .assert_json_eq(&json!({ "result": { "id": 1, "name": "Onni" } }));

    client
        .get("/pets/42")
        .send()
        .await
        .assert_error(StatusCode::NOT_FOUND, "Pet id:42 not found");
}

#[tokio::test]
async fn test_whole_float_parameters_reach_handlers_as_integers() {
    let client = client();

    client
        .get("/pets/1.0")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_field("result.id", &json!(1));

    client
        .get("/pets?limit=2.0&offset=0.0")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_field("result.0.name", &json!("Onni"));
}

#[tokio::test]
async fn test_get_pet_rejects_non_integer_id() {
    client()
        .get("/pets/one")
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_api_key_required() {
    let store: Arc<dyn PetStore> = Arc::new(MemoryPetStore::seeded());
    let dispatcher = pet_api::dispatcher(store, &DaedalusConfig::default()).unwrap();
    let client = TestClient::new(dispatcher);

    client
        .get("/pets")
        .send()
        .await
        .assert_error(StatusCode::BAD_REQUEST, "\"ApiKey\" is required");
}

#[tokio::test]
async fn test_create_then_delete() {
    let store = Arc::new(MemoryPetStore::seeded());
    let client = client_with(Arc::clone(&store));

    client
        .post("/pets")
        .json(&json!({ "name": "Garfield" }))
        .send()
        .await
        .assert_status(StatusCode::CREATED)
        .assert_header("location", "/pets/2")
        .assert_header("access-control-allow-origin", "*")
        .assert_json_field("result.name", &json!("Garfield"));
    assert_eq!(store.len(), 2);

    client
        .delete("/pets/2")
        .send()
        .await
        .assert_json_field("result.id", &json!(2));
    assert_eq!(store.len(), 1);

    client
        .delete("/pets/2")
        .send()
        .await
        .assert_error(StatusCode::NOT_FOUND, "Pet id:2 not found");
}

#[tokio::test]
async fn test_create_requires_name() {
    let store = Arc::new(MemoryPetStore::seeded());
    let client = client_with(Arc::clone(&store));

    client
        .post("/pets")
        .json(&json!({}))
        .send()
        .await
        .assert_error(StatusCode::BAD_REQUEST, "\"PetName\" is required");

    client
        .post("/pets")
        .json(&json!({ "name": "Rex", "owner": "Jon" }))
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_openapi_document() {
    let response = client().get("/swagger.json").send().await;
    let doc = response.json_value().unwrap();

    assert_eq!(doc["paths"]["/pets"]["get"]["operationId"], "getPets");
    assert_eq!(doc["paths"]["/pets"]["post"]["operationId"], "createPet");
    assert_eq!(doc["paths"]["/pets/{id}"]["get"]["operationId"], "getPetById");
    assert_eq!(doc["paths"]["/pets/{id}"]["delete"]["operationId"], "deletePetById");
    assert_eq!(
        doc["paths"]["/pets"]["post"]["requestBody"]["$ref"],
        "#/components/requestBodies/createPetPayload"
    );
    assert!(doc["components"]["schemas"]["PetId"].is_object());
    assert!(doc["components"]["schemas"]["QueryLimit"].is_object());
    assert_eq!(doc["tags"][0]["name"], "pets");
}

#[tokio::test]
async fn test_config_file_drives_dispatcher() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(
        file,
        r#"
[api]
title = "Pet API"
base_url = "https://pets.example.com"

[docs]
path = "/openapi.json"

[docs.security.api_key]
header = "x-api-key"
"#
    )
    .unwrap();

    let config = ConfigLoader::new()
        .with_defaults()
        .with_file(file.path())
        .unwrap()
        .load()
        .unwrap();
    let store: Arc<dyn PetStore> = Arc::new(MemoryPetStore::seeded());
    let client = TestClient::new(pet_api::dispatcher(store, &config).unwrap());

    let response = client.get("/openapi.json").send().await;
    let doc = response.json_value().unwrap();

    assert_eq!(doc["info"]["title"], "Pet API");
    assert_eq!(doc["servers"][0]["url"], "https://pets.example.com");
    assert!(doc["components"]["securitySchemes"]["ApiKeyAuth"].is_object());
}
