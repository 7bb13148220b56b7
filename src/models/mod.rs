pub mod task;
pub mod task_list;
pub mod user;

use lazy_static::lazy_static;
use regex::Regex;

pub use task::{CreateTaskRequest, NewTask, Task, TaskResponse, UpdateTaskRequest};
pub use task_list::{TaskList, TaskListRequest, TaskListResponse};
pub use user::{NewUser, User};

lazy_static! {
    // Matches any string holding at least one non-whitespace character.
    pub(crate) static ref NOT_BLANK: Regex = Regex::new(r"\S").unwrap();
}

/// Returns `true` for `None`, empty, or whitespace-only strings.
pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}
