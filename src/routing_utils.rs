use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_macros::FromRequest;

use serde::Serialize;
use utoipa::openapi::{RefOr, Schema};
use utoipa::{ToResponse, ToSchema, openapi};

use validator::ValidationErrors;

use crate::domain::owner::driving_ports::OwnerError;
use crate::domain::task_item::driving_ports::TaskItemError;

/// Contains diagnostic information about an API failure
#[derive(Serialize, Debug, ToResponse)]
#[response(examples(
    ("Not Found" = (
        summary = "Entity could not be found (404)",
        value = json!({
            "error_code": "not_found",
            "error_description": "The requested entity could not be found.",
            "extra_info": null
        })
    )),

    ("Conflict" = (
        summary = "An entity with the same id already exists (409)",
        value = json!({
            "error_code": "conflict",
            "error_description": "An entity with the given id already exists.",
            "extra_info": null
        })
    )),

    ("Id Mismatch" = (
        summary = "The id in the body differs from the id in the route (400)",
        value = json!({
            "error_code": "id_mismatch",
            "error_description": "The id in the request body does not match the id in the route.",
            "extra_info": "route id 5f2b7c1e-3a4d-4e8f-9b0a-1c2d3e4f5a6b does not match owner id 0b6a8d3e-8f5c-4c55-9d7e-2d2f0c8d1a11"
        })
    )),

    ("Internal Failure" = (
        summary = "Something unexpected went wrong inside the server (500)",
        value = json!({
            "error_code": "internal_error",
            "error_description": "Could not access data to complete your request",
            "extra_info": "fetching all task items: pool timed out while waiting for an open connection"
        })
    )),

    ("Invalid Input" = (
        summary = "Invalid request body was passed (400)",
        value = json!({
            "error_code": "invalid_input",
            "error_description": "Submitted data was invalid.",
            "extra_info": {
                "first_name": [
                    {
                        "code": "length",
                        "message": null,
                        "params": {
                            "value": "Nameeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee",
                            "max": 50
                        }
                    }
                ]
            }
        })
    )),

    ("Malformed JSON" = (
        summary = "Invalid JSON passed to server (400)",
        value = json!({
            "error_code": "invalid_json",
            "error_description": "The passed request body contained malformed or unreadable JSON.",
            "extra_info": "Failed to parse the request body as JSON: EOF while parsing an object at line 4 column 0"
        })
    ))
))]
pub struct BasicErrorResponse {
    error_code: String,
    error_description: String,
    extra_info: Option<ExtraInfo>,
}

impl BasicErrorResponse {
    fn new(error_code: &str, error_description: &str, extra_info: Option<ExtraInfo>) -> Self {
        BasicErrorResponse {
            error_code: error_code.to_owned(),
            error_description: error_description.to_owned(),
            extra_info,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(untagged)]
pub enum ExtraInfo {
    ValidationIssues(ValidationErrorSchema),
    Message(String),
}

/// Stand-in OpenAPI schema for [ValidationErrors] which just provides an empty object
#[derive(Serialize, Debug)]
#[serde(transparent)]
pub struct ValidationErrorSchema(ValidationErrors);

impl<'schem> ToSchema<'schem> for ValidationErrorSchema {
    fn schema() -> (&'schem str, RefOr<Schema>) {
        (
            "ValidationErrorSchema",
            openapi::ObjectBuilder::new().into(),
        )
    }
}

/// Response type that wraps unexpected errors and turns them into 500 [BasicErrorResponse]s.
/// The full error chain is passed along in the body.
pub struct GenericErrorResponse(pub anyhow::Error);

impl IntoResponse for GenericErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(BasicErrorResponse::new(
                "internal_error",
                "Could not access data to complete your request",
                Some(ExtraInfo::Message(format!("{:#}", self.0))),
            )),
        )
            .into_response()
    }
}

/// Response type that wraps the errors of the domain services and turns them into
/// [BasicErrorResponse]s
pub enum DomainErrorResponse {
    NotFound,
    Conflict,
    IdMismatch(String),
    Unexpected(anyhow::Error),
}

impl IntoResponse for DomainErrorResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                Json(BasicErrorResponse::new(
                    "not_found",
                    "The requested entity could not be found.",
                    None,
                )),
            )
                .into_response(),

            Self::Conflict => (
                StatusCode::CONFLICT,
                Json(BasicErrorResponse::new(
                    "conflict",
                    "An entity with the given id already exists.",
                    None,
                )),
            )
                .into_response(),

            Self::IdMismatch(message) => (
                StatusCode::BAD_REQUEST,
                Json(BasicErrorResponse::new(
                    "id_mismatch",
                    "The id in the request body does not match the id in the route.",
                    Some(ExtraInfo::Message(message)),
                )),
            )
                .into_response(),

            Self::Unexpected(err) => GenericErrorResponse(err).into_response(),
        }
    }
}

impl From<TaskItemError> for DomainErrorResponse {
    fn from(value: TaskItemError) -> Self {
        match value {
            TaskItemError::NotFound(_) => Self::NotFound,
            TaskItemError::AlreadyExists(_) => Self::Conflict,
            mismatch @ TaskItemError::IdMismatch { .. } => Self::IdMismatch(mismatch.to_string()),
            TaskItemError::PortError(err) => Self::Unexpected(err),
        }
    }
}

impl From<OwnerError> for DomainErrorResponse {
    fn from(value: OwnerError) -> Self {
        match value {
            OwnerError::NotFound(_) => Self::NotFound,
            OwnerError::AlreadyExists(_) => Self::Conflict,
            mismatch @ OwnerError::IdMismatch { .. } => Self::IdMismatch(mismatch.to_string()),
            OwnerError::PortError(err) => Self::Unexpected(err),
        }
    }
}

/// Response type that wraps validation errors and turns them into [BasicErrorResponse]s
pub struct ValidationErrorResponse(ValidationErrors);

impl IntoResponse for ValidationErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(BasicErrorResponse::new(
                "invalid_input",
                "Submitted data was invalid.",
                Some(ExtraInfo::ValidationIssues(ValidationErrorSchema(self.0))),
            )),
        )
            .into_response()
    }
}

impl From<ValidationErrors> for ValidationErrorResponse {
    fn from(value: ValidationErrors) -> Self {
        Self(value)
    }
}

/// Wrapper for [axum::Json] which customizes the error response to use our
/// data structure for API errors
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(JsonErrorResponse))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Response type representing JSON parse errors
pub struct JsonErrorResponse {
    parse_problem: String,
}

impl From<JsonRejection> for JsonErrorResponse {
    fn from(value: JsonRejection) -> Self {
        JsonErrorResponse {
            parse_problem: value.body_text(),
        }
    }
}

impl IntoResponse for JsonErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            axum::Json(BasicErrorResponse::new(
                "invalid_json",
                "The passed request body contained malformed or unreadable JSON.",
                Some(ExtraInfo::Message(self.parse_problem)),
            )),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_util::{ErrorBody, deserialize_body};
    use anyhow::anyhow;
    use uuid::Uuid;

    #[tokio::test]
    async fn generic_error_carries_error_chain() {
        let response =
            GenericErrorResponse(anyhow!("connection refused").context("fetching all owners"))
                .into_response();
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());

        let body: ErrorBody = deserialize_body(response.into_body()).await;
        assert_eq!("internal_error", body.error_code);
        assert_eq!(
            Some(serde_json::json!("fetching all owners: connection refused")),
            body.extra_info
        );
    }

    #[tokio::test]
    async fn conflicts_map_to_409() {
        let response =
            DomainErrorResponse::from(TaskItemError::AlreadyExists(Uuid::new_v4())).into_response();
        assert_eq!(StatusCode::CONFLICT, response.status());

        let body: ErrorBody = deserialize_body(response.into_body()).await;
        assert_eq!("conflict", body.error_code);
    }

    #[tokio::test]
    async fn id_mismatch_maps_to_400() {
        let response = DomainErrorResponse::from(OwnerError::IdMismatch {
            route_id: Uuid::new_v4(),
            body_id: Uuid::new_v4(),
        })
        .into_response();
        assert_eq!(StatusCode::BAD_REQUEST, response.status());

        let body: ErrorBody = deserialize_body(response.into_body()).await;
        assert_eq!("id_mismatch", body.error_code);
    }
}
