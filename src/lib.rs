#![allow(async_fn_in_trait)]

use axum::Router;
use axum::extract::State;
use std::sync::Arc;

pub mod api;
pub mod app_env;
pub mod config;
pub mod db;
pub mod domain;
pub mod dto;
pub mod external_connections;
pub mod logging;
pub mod persistence;
pub mod routing_utils;

/// Data shared by every request handler
pub struct SharedData {
    pub ext_cxn: persistence::ExternalConnectivity,
}

pub type AppState = State<Arc<SharedData>>;

/// Mounts every API under its path, adds the documentation routes and the HTTP tracing layer
pub fn build_router(shared_data: SharedData) -> Router {
    let router = Router::new()
        .nest("/rest/tasks", api::task_item::task_item_routes())
        .nest("/carshop/owners", api::owner::owner_routes())
        .nest("/health", api::health::health_routes())
        .merge(api::swagger_main::build_documentation())
        .with_state(Arc::new(shared_data));

    logging::attach_tracing_http(router)
}
