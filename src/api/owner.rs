use crate::domain::owner::driving_ports::{OwnerError, OwnerPort, SavedOwner};
use crate::external_connections::{ExternalConnectivity, Transactable};
use crate::routing_utils::{
    BasicErrorResponse, DomainErrorResponse, GenericErrorResponse, Json, ValidationErrorResponse,
};
use crate::{AppState, SharedData, domain, dto, persistence};
use axum::Router;
use axum::extract::{OriginalUri, Path, State};
use axum::http::StatusCode;
use axum::http::header::LOCATION;
use axum::response::{ErrorResponse, IntoResponse, Response};
use axum::routing::get;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;
use uuid::Uuid;
use validator::Validate;

#[derive(OpenApi)]
#[openapi(paths(get_owner, get_owners, create_owner, save_owner, delete_owner))]
/// Defines the OpenAPI documentation for the car shop owner API
pub struct OwnerApi;
/// Constant used to group owner endpoints in OpenAPI documentation
pub const OWNER_API_GROUP: &str = "Owners";

/// Builds a router for all the owner routes
pub fn owner_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/",
            get(|State(app_state): AppState| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let owner_service = domain::owner::OwnerService;

                get_owners(&mut ext_cxn, &owner_service).await
            })
            .post(
                |State(app_state): AppState,
                 OriginalUri(uri): OriginalUri,
                 Json(new_owner): Json<dto::OwnerContent>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let owner_service = domain::owner::OwnerService;

                    create_owner(uri.path(), new_owner, &mut ext_cxn, &owner_service).await
                },
            ),
        )
        .route(
            "/:id",
            get(
                |State(app_state): AppState, Path(id): Path<Uuid>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let owner_service = domain::owner::OwnerService;

                    get_owner(id, &mut ext_cxn, &owner_service).await
                },
            )
            .put(
                |State(app_state): AppState,
                 OriginalUri(uri): OriginalUri,
                 Path(id): Path<Uuid>,
                 Json(owner_data): Json<dto::OwnerContent>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let owner_service = domain::owner::OwnerService;

                    save_owner(id, uri.path(), owner_data, &mut ext_cxn, &owner_service).await
                },
            )
            .delete(
                |State(app_state): AppState, Path(id): Path<Uuid>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let owner_service = domain::owner::OwnerService;

                    delete_owner(id, &mut ext_cxn, &owner_service).await
                },
            ),
        )
}

fn log_unexpected(err: OwnerError) -> DomainErrorResponse {
    if let OwnerError::PortError(ref cause) = err {
        error!("Owner operation failed: {cause:#}");
    }

    DomainErrorResponse::from(err)
}

#[utoipa::path(
    get,
    path = "/carshop/owners/{id}",
    tag = OWNER_API_GROUP,
    params(("id" = Uuid, Path, description = "The id of the owner")),
    responses(
        (status = 200, description = "The requested owner", body = dto::Owner),
        (status = 400, description = "The id is not a valid UUID"),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Retrieves a single owner with its address
async fn get_owner(
    id: Uuid,
    ext_cxn: &mut impl ExternalConnectivity,
    owner_service: &impl OwnerPort,
) -> Result<Json<dto::Owner>, ErrorResponse> {
    info!(%id, "Requested owner");
    let owner_read = persistence::db_owner_driven_ports::DbReadOwners;

    let owner = owner_service
        .owner_by_id(id, &mut *ext_cxn, &owner_read)
        .await
        .map_err(|err| {
            error!("Could not retrieve owner {id}: {err:#}");
            GenericErrorResponse(err)
        })?;

    owner
        .map(|owner| Json(dto::Owner::from(owner)))
        .ok_or_else(|| DomainErrorResponse::NotFound.into())
}

#[utoipa::path(
    get,
    path = "/carshop/owners",
    tag = OWNER_API_GROUP,
    responses(
        (status = 200, description = "All stored owners", body = Vec<dto::Owner>),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Retrieves every owner
async fn get_owners(
    ext_cxn: &mut impl ExternalConnectivity,
    owner_service: &impl OwnerPort,
) -> Result<Json<Vec<dto::Owner>>, ErrorResponse> {
    info!("Requested owners");
    let owner_read = persistence::db_owner_driven_ports::DbReadOwners;

    let owners = owner_service
        .all_owners(&mut *ext_cxn, &owner_read)
        .await
        .map_err(|err| {
            error!("Could not retrieve owners: {err:#}");
            GenericErrorResponse(err)
        })?;

    Ok(Json(owners.into_iter().map(dto::Owner::from).collect()))
}

#[utoipa::path(
    post,
    path = "/carshop/owners",
    tag = OWNER_API_GROUP,
    request_body = dto::OwnerContent,
    responses(
        (status = 201, description = "Owner created", body = dto::Owner,
            headers(("Location" = String, description = "Path of the created owner"))),
        (status = 400, response = BasicErrorResponse),
        (status = 409, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Creates an owner
async fn create_owner(
    request_path: &str,
    new_owner: dto::OwnerContent,
    ext_cxn: &mut impl Transactable,
    owner_service: &impl OwnerPort,
) -> Result<Response, ErrorResponse> {
    info!("Attempt to create owner: {}", new_owner);
    new_owner
        .validate()
        .map_err(ValidationErrorResponse::from)?;

    let owner_read = persistence::db_owner_driven_ports::DbReadOwners;
    let owner_write = persistence::db_owner_driven_ports::DbWriteOwners;
    let created = owner_service
        .create_owner(
            &domain::owner::OwnerData::from(new_owner),
            &mut *ext_cxn,
            &owner_read,
            &owner_write,
        )
        .await
        .map_err(log_unexpected)?;

    let location = format!("{}/{}", request_path.trim_end_matches('/'), created.id);
    Ok((
        StatusCode::CREATED,
        [(LOCATION, location)],
        Json(dto::Owner::from(created)),
    )
        .into_response())
}

#[utoipa::path(
    put,
    path = "/carshop/owners/{id}",
    tag = OWNER_API_GROUP,
    params(("id" = Uuid, Path, description = "The id of the owner")),
    request_body = dto::OwnerContent,
    responses(
        (status = 200, description = "Owner replaced", body = dto::Owner),
        (status = 201, description = "Owner did not exist and was created", body = dto::Owner,
            headers(("Location" = String, description = "Path of the created owner"))),
        (status = 400, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Replaces the content of an owner, creating it under the route id if it doesn't exist yet
async fn save_owner(
    id: Uuid,
    request_path: &str,
    owner_data: dto::OwnerContent,
    ext_cxn: &mut impl Transactable,
    owner_service: &impl OwnerPort,
) -> Result<Response, ErrorResponse> {
    info!(%id, "Saving owner {}", owner_data);
    owner_data
        .validate()
        .map_err(ValidationErrorResponse::from)?;

    let owner_read = persistence::db_owner_driven_ports::DbReadOwners;
    let owner_write = persistence::db_owner_driven_ports::DbWriteOwners;
    let saved = owner_service
        .save_owner(
            id,
            &domain::owner::OwnerData::from(owner_data),
            &mut *ext_cxn,
            &owner_read,
            &owner_write,
        )
        .await
        .map_err(log_unexpected)?;

    let response = match saved {
        SavedOwner::Updated(owner) => Json(dto::Owner::from(owner)).into_response(),
        SavedOwner::Created(owner) => (
            StatusCode::CREATED,
            [(LOCATION, request_path.to_owned())],
            Json(dto::Owner::from(owner)),
        )
            .into_response(),
    };

    Ok(response)
}

#[utoipa::path(
    delete,
    path = "/carshop/owners/{id}",
    tag = OWNER_API_GROUP,
    params(("id" = Uuid, Path, description = "The id of the owner")),
    responses(
        (status = 204, description = "Owner and address deleted"),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Deletes an owner together with its address
async fn delete_owner(
    id: Uuid,
    ext_cxn: &mut impl Transactable,
    owner_service: &impl OwnerPort,
) -> Result<StatusCode, ErrorResponse> {
    info!(%id, "Deleting owner");
    let owner_read = persistence::db_owner_driven_ports::DbReadOwners;
    let owner_write = persistence::db_owner_driven_ports::DbWriteOwners;

    owner_service
        .delete_owner(id, &mut *ext_cxn, &owner_read, &owner_write)
        .await
        .map_err(log_unexpected)?;

    Ok(StatusCode::NO_CONTENT)
}
