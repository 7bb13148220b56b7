use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::NOT_BLANK;

/// A named container of tasks owned by exactly one user.
/// `(name, user_id)` is unique.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct TaskList {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Number of tasks referencing this list, computed at read time.
    pub task_count: i64,
}

/// Body of `POST /api/tasklists` and `PUT /api/tasklists/{id}`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskListRequest {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 100, message = "Task list name must be between 1 and 100 characters"),
        regex(path = "NOT_BLANK", message = "Task list name is required")
    )]
    pub name: String,
}

/// Task list projection returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListResponse {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub task_count: i64,
}

impl From<TaskList> for TaskListResponse {
    fn from(list: TaskList) -> Self {
        Self {
            id: list.id,
            name: list.name,
            created_at: list.created_at,
            updated_at: list.updated_at,
            task_count: list.task_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_list_request_validation() {
        assert!(TaskListRequest {
            name: "Work".to_string()
        }
        .validate()
        .is_ok());

        assert!(TaskListRequest {
            name: "".to_string()
        }
        .validate()
        .is_err());

        assert!(TaskListRequest {
            name: "\t ".to_string()
        }
        .validate()
        .is_err());

        assert!(TaskListRequest {
            name: "x".repeat(101)
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_projection_serializes_task_count() {
        let now = Utc::now();
        let list = TaskList {
            id: 1,
            name: "Work".to_string(),
            user_id: 9,
            created_at: now,
            updated_at: now,
            task_count: 0,
        };
        let json = serde_json::to_value(TaskListResponse::from(list)).unwrap();
        assert_eq!(json["taskCount"], 0);
        assert_eq!(json["name"], "Work");
        assert!(json.get("userId").is_none());
    }
}
