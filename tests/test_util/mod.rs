#![allow(dead_code)]

use axum::Router;
use axum::body::{self, Body};
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{Method, Request, StatusCode};
use carshop_rest::config::{DatabaseConfig, DatabaseEngine};
use carshop_rest::{SharedData, build_router, db, persistence};
use serde_json::Value;
use sqlx::AnyPool;
use tower::ServiceExt;

#[cfg(feature = "integration_test")]
pub mod postgres;

/// What a test needs to know about a response
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Value,
}

/// Builds the full application router over the given pool
pub fn router_for(sqlx_pool: AnyPool) -> Router {
    build_router(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(sqlx_pool),
    })
}

/// Opens a fresh, migrated in-memory SQLite database. Every call gets its own database.
pub async fn memory_pool() -> AnyPool {
    let db_config = DatabaseConfig {
        engine: DatabaseEngine::SqliteMemory,
        data_source: "sqlite::memory:".to_owned(),
        max_connections: 1,
    };
    let sqlx_pool = db::connect_sqlx(&db_config)
        .await
        .expect("could not open in-memory database");
    db::run_migrations(&sqlx_pool)
        .await
        .expect("could not migrate in-memory database");

    sqlx_pool
}

/// Builds the full application router over [memory_pool]
pub async fn memory_router() -> Router {
    router_for(memory_pool().await)
}

/// Sends a single request through the router. An empty response body is reported as [Value::Null]
/// and a body that isn't JSON as a [Value::String].
pub async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
    let request_builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request_builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => request_builder.body(Body::empty()),
    }
    .expect("could not build request");

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router failed to answer");

    let status = response.status();
    let location = response
        .headers()
        .get(LOCATION)
        .map(|value| value.to_str().expect("Location was not text").to_owned());
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("could not read response body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    TestResponse {
        status,
        location,
        body,
    }
}

/// Reads a string field out of a JSON body, failing the test if it is missing
pub fn text_field<'body>(body: &'body Value, field: &str) -> &'body str {
    body[field]
        .as_str()
        .unwrap_or_else(|| panic!("body has no text field {field}: {body}"))
}
