use crate::domain::task_item::driving_ports::{TaskItemError, TaskItemPort};
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
#[openapi(paths(
    get_task_item,
    get_task_items,
    create_task_item,
    update_task_item,
    delete_task_item
))]
/// Defines the OpenAPI documentation for the task item API
pub struct TaskItemApi;
/// Constant used to group task item endpoints in OpenAPI documentation
pub const TASK_ITEM_API_GROUP: &str = "Task Items";

/// Builds a router for all the task item routes
pub fn task_item_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/",
            get(|State(app_state): AppState| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let task_service = domain::task_item::TaskItemService;

                get_task_items(&mut ext_cxn, &task_service).await
            })
            .post(
                |State(app_state): AppState,
                 OriginalUri(uri): OriginalUri,
                 Json(new_task_item): Json<dto::TaskItemContent>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task_item::TaskItemService;

                    create_task_item(uri.path(), new_task_item, &mut ext_cxn, &task_service).await
                },
            ),
        )
        .route(
            "/:id",
            get(
                |State(app_state): AppState, Path(id): Path<Uuid>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task_item::TaskItemService;

                    get_task_item(id, &mut ext_cxn, &task_service).await
                },
            )
            .put(
                |State(app_state): AppState,
                 Path(id): Path<Uuid>,
                 Json(update): Json<dto::TaskItemContent>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task_item::TaskItemService;

                    update_task_item(id, update, &mut ext_cxn, &task_service).await
                },
            )
            .delete(
                |State(app_state): AppState, Path(id): Path<Uuid>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task_item::TaskItemService;

                    delete_task_item(id, &mut ext_cxn, &task_service).await
                },
            ),
        )
}

/// Logs failures that aren't an expected outcome of the operation before turning them into a response
fn log_unexpected(err: TaskItemError) -> DomainErrorResponse {
    if let TaskItemError::PortError(ref cause) = err {
        error!("Task item operation failed: {cause:#}");
    }

    DomainErrorResponse::from(err)
}

#[utoipa::path(
    get,
    path = "/rest/tasks/{id}",
    tag = TASK_ITEM_API_GROUP,
    params(("id" = Uuid, Path, description = "The id of the task item")),
    responses(
        (status = 200, description = "The requested task item", body = dto::TaskItem),
        (status = 400, description = "The id is not a valid UUID"),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Retrieves a single task item
async fn get_task_item(
    id: Uuid,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskItemPort,
) -> Result<Json<dto::TaskItem>, ErrorResponse> {
    info!(%id, "Requested task item");
    let task_read = persistence::db_task_item_driven_ports::DbReadTaskItems;

    let task_item = task_service
        .task_item_by_id(id, &mut *ext_cxn, &task_read)
        .await
        .map_err(|err| {
            error!("Could not retrieve task item {id}: {err:#}");
            GenericErrorResponse(err)
        })?;

    match task_item {
        Some(task_item) => Ok(Json(dto::TaskItem::from(task_item))),
        None => Err(DomainErrorResponse::NotFound.into()),
    }
}

#[utoipa::path(
    get,
    path = "/rest/tasks",
    tag = TASK_ITEM_API_GROUP,
    responses(
        (status = 200, description = "All stored task items", body = Vec<dto::TaskItem>),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Retrieves every task item
async fn get_task_items(
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskItemPort,
) -> Result<Json<Vec<dto::TaskItem>>, ErrorResponse> {
    info!("Requested task items");
    let task_read = persistence::db_task_item_driven_ports::DbReadTaskItems;

    let task_items = task_service
        .all_task_items(&mut *ext_cxn, &task_read)
        .await
        .map_err(|err| {
            error!("Could not retrieve task items: {err:#}");
            GenericErrorResponse(err)
        })?;

    Ok(Json(
        task_items.into_iter().map(dto::TaskItem::from).collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/rest/tasks",
    tag = TASK_ITEM_API_GROUP,
    request_body = dto::TaskItemContent,
    responses(
        (status = 201, description = "Task item created", body = dto::TaskItem,
            headers(("Location" = String, description = "Path of the created task item"))),
        (status = 400, response = BasicErrorResponse),
        (status = 409, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Creates a task item. An id is generated unless the body carries a non-nil one.
async fn create_task_item(
    request_path: &str,
    new_task_item: dto::TaskItemContent,
    ext_cxn: &mut impl Transactable,
    task_service: &impl TaskItemPort,
) -> Result<Response, ErrorResponse> {
    info!("Creating task item \"{}\"", new_task_item.title);
    new_task_item
        .validate()
        .map_err(ValidationErrorResponse::from)?;

    let task_read = persistence::db_task_item_driven_ports::DbReadTaskItems;
    let task_write = persistence::db_task_item_driven_ports::DbWriteTaskItems;
    let created = task_service
        .create_task_item(
            &domain::task_item::NewTaskItem::from(new_task_item),
            &mut *ext_cxn,
            &task_read,
            &task_write,
        )
        .await
        .map_err(log_unexpected)?;

    let location = format!("{}/{}", request_path.trim_end_matches('/'), created.id);
    Ok((
        StatusCode::CREATED,
        [(LOCATION, location)],
        Json(dto::TaskItem::from(created)),
    )
        .into_response())
}

#[utoipa::path(
    put,
    path = "/rest/tasks/{id}",
    tag = TASK_ITEM_API_GROUP,
    params(("id" = Uuid, Path, description = "The id of the task item")),
    request_body = dto::TaskItemContent,
    responses(
        (status = 200, description = "Task item replaced", body = dto::TaskItem),
        (status = 400, response = BasicErrorResponse),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Replaces the content of an existing task item
async fn update_task_item(
    id: Uuid,
    update: dto::TaskItemContent,
    ext_cxn: &mut impl Transactable,
    task_service: &impl TaskItemPort,
) -> Result<Json<dto::TaskItem>, ErrorResponse> {
    info!(%id, "Updating task item");
    update.validate().map_err(ValidationErrorResponse::from)?;

    let task_read = persistence::db_task_item_driven_ports::DbReadTaskItems;
    let task_write = persistence::db_task_item_driven_ports::DbWriteTaskItems;
    let updated = task_service
        .update_task_item(
            id,
            &domain::task_item::UpdateTaskItem::from(update),
            &mut *ext_cxn,
            &task_read,
            &task_write,
        )
        .await
        .map_err(log_unexpected)?;

    Ok(Json(dto::TaskItem::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/rest/tasks/{id}",
    tag = TASK_ITEM_API_GROUP,
    params(("id" = Uuid, Path, description = "The id of the task item")),
    responses(
        (status = 204, description = "Task item deleted"),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Deletes a task item
async fn delete_task_item(
    id: Uuid,
    ext_cxn: &mut impl Transactable,
    task_service: &impl TaskItemPort,
) -> Result<StatusCode, ErrorResponse> {
    info!(%id, "Deleting task item");
    let task_read = persistence::db_task_item_driven_ports::DbReadTaskItems;
    let task_write = persistence::db_task_item_driven_ports::DbWriteTaskItems;

    task_service
        .delete_task_item(id, &mut *ext_cxn, &task_read, &task_write)
        .await
        .map_err(log_unexpected)?;

    Ok(StatusCode::NO_CONTENT)
}
