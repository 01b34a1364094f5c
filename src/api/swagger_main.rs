use crate::dto;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(info(
    title = "Car Shop API",
    description = "Task items and car shop owners, stored in PostgreSQL or SQLite"
))]
struct CarShopApi;

/// Assembles the OpenAPI document from the [dto] schemas and the path definitions of every
/// [api][crate::api] submodule
pub fn openapi_document() -> utoipa::openapi::OpenApi {
    let mut api_docs = CarShopApi::openapi();
    api_docs.merge(dto::OpenApiSchemas::openapi());
    api_docs.merge(super::task_item::TaskItemApi::openapi());
    api_docs.merge(super::owner::OwnerApi::openapi());
    api_docs.merge(super::health::HealthApi::openapi());

    api_docs
}

/// Constructs the route on the API that renders the swagger UI and returns the OpenAPI schema
pub fn build_documentation() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi_document())
}
