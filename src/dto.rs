use crate::routing_utils::{BasicErrorResponse, ExtraInfo};
use utoipa::OpenApi;

pub mod owner;
pub mod task_item;

pub use owner::*;
pub use task_item::*;

/// Collects the schemas shared by the API into one OpenAPI document
#[derive(OpenApi)]
#[openapi(components(
    schemas(
        TaskItem,
        TaskItemContent,
        Owner,
        OwnerContent,
        Address,
        ExtraInfo,
        crate::api::health::HealthStatus,
    ),
    responses(BasicErrorResponse),
))]
pub struct OpenApiSchemas;
