use axum::Router;
use axum::routing::get;
use serde::Serialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::SharedData;
use crate::routing_utils::Json;

#[derive(OpenApi)]
#[openapi(paths(health))]
pub struct HealthApi;

/// Liveness report of the server
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize, Debug))]
pub struct HealthStatus {
    #[schema(example = "ok")]
    pub status: String,
    #[schema(example = "1.0.0")]
    pub version: String,
}

pub fn health_routes() -> Router<Arc<SharedData>> {
    Router::new().route("/", get(health))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "The server is up", body = HealthStatus)),
)]
async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
    })
}
