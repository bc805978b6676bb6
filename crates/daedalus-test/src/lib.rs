//! # Daedalus Test
//!
//! Test utilities for Daedalus: drive a [`Dispatcher`](daedalus::Dispatcher)
//! with gateway events built fluently, then assert on the response.
//!
//! ## Key Features
//!
//! - **In-Memory Testing**: No gateway, no process boundary
//! - **Request Builder**: Query strings in the target are split and decoded
//! - **Response Assertions**: Status, headers, JSON fields and error envelopes
//! - **Full Pipeline**: Requests go through matching, validation and framing
//!
//! ## Example
//!
//! ```
//! use daedalus::Dispatcher;
//! use daedalus_core::fixtures;
//! use daedalus_test::TestClient;
//! use http::StatusCode;
//! use serde_json::json;
//!
//! let client = TestClient::new(Dispatcher::new(fixtures::pet_table().unwrap()));
//!
//! tokio_test::block_on(async {
//!     client
//!         .post("/pets")
//!         .header("x-api-key", "secret")
//!         .json(&json!({ "name": "Rex" }))
//!         .send()
//!         .await
//!         .assert_status(StatusCode::OK)
//!         .assert_json_field("payload.name", &json!("Rex"));
//! });
//! ```

#![doc(html_root_url = "https://docs.rs/daedalus-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::TestRequestBuilder;
pub use response::TestResponse;
