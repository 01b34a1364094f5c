use crate::domain;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// DTO for a task item returned by the API
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, PartialEq, Eq, Debug))]
pub struct TaskItem {
    #[schema(example = "0b6a8d3e-8f5c-4c55-9d7e-2d2f0c8d1a11")]
    pub id: Uuid,
    #[schema(example = "Aufgabe 1")]
    pub title: String,
    #[schema(example = "Details 1")]
    pub description: String,
}

impl From<domain::task_item::TaskItem> for TaskItem {
    fn from(value: domain::task_item::TaskItem) -> Self {
        TaskItem {
            id: value.id,
            title: value.title,
            description: value.description,
        }
    }
}

/// DTO for the content of a task item sent to the API. Missing fields are left empty and a
/// missing id is treated like the nil id.
#[derive(Deserialize, Validate, ToSchema, Default)]
#[cfg_attr(test, derive(Serialize, Clone))]
#[serde(default)]
pub struct TaskItemContent {
    pub id: Option<Uuid>,
    #[validate(length(max = 200))]
    #[schema(example = "Aufgabe 1")]
    pub title: String,
    #[validate(length(max = 2000))]
    #[schema(example = "Details 1")]
    pub description: String,
}

impl From<TaskItemContent> for domain::task_item::NewTaskItem {
    fn from(value: TaskItemContent) -> Self {
        domain::task_item::NewTaskItem {
            id: value.id,
            title: value.title,
            description: value.description,
        }
    }
}

impl From<TaskItemContent> for domain::task_item::UpdateTaskItem {
    fn from(value: TaskItemContent) -> Self {
        domain::task_item::UpdateTaskItem {
            id: value.id,
            title: value.title,
            description: value.description,
        }
    }
}
