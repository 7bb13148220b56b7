use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::NOT_BLANK;

/// Represents a task as stored in the database.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    /// The list this task belongs to, if any.
    pub task_list_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a task. New tasks always start with `completed = false`.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub task_list_id: Option<i64>,
}

/// Body of `POST /api/tasks`.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    /// Must contain a non-whitespace character and be at most 255 characters.
    #[serde(default)]
    #[validate(
        length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"),
        regex(path = "NOT_BLANK", message = "Title is required")
    )]
    pub title: String,

    #[validate(length(max = 2000, message = "Description cannot exceed 2000 characters"))]
    pub description: Option<String>,

    /// Optional list to file the task under. Must be owned by the caller.
    pub task_list_id: Option<i64>,
}

/// Body of `PUT /api/tasks/{id}`. Absent fields are left untouched.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[validate(
        length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"),
        regex(path = "NOT_BLANK", message = "Title cannot be blank")
    )]
    pub title: Option<String>,

    #[validate(length(max = 2000, message = "Description cannot exceed 2000 characters"))]
    pub description: Option<String>,

    pub completed: Option<bool>,

    pub task_list_id: Option<i64>,
}

/// Task projection returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub task_list_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            completed: task.completed,
            task_list_id: task.task_list_id,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

impl UpdateTaskRequest {
    /// Copies every provided field onto `task`. The list reference is handled
    /// by the caller since it needs an ownership check first.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone());
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}
