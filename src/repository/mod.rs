//! Storage contracts for users, task lists and tasks.
//!
//! Services only talk to these traits. Two implementations exist:
//! [`postgres::PgRepository`] for production and [`memory::MemoryRepository`]
//! for tests and database-less local runs. Both enforce the same storage rules:
//!
//! - user emails are unique,
//! - `(name, owner)` is unique for task lists and a violation surfaces as
//!   [`AppError::Conflict`], even when the service-level pre-check raced,
//! - deleting a task list deletes its tasks,
//! - a task pointing at a list that no longer exists is reported as that
//!   list being [`AppError::NotFound`].

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskList, User};

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

pub type RepoResult<T> = Result<T, AppError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the email is taken.
    async fn create(&self, user: NewUser) -> RepoResult<User>;
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    async fn exists_by_email(&self, email: &str) -> RepoResult<bool>;
}

#[async_trait]
pub trait TaskListRepository: Send + Sync {
    /// Fails with `Conflict` when the owner already has a list with this name.
    async fn create(&self, name: &str, owner_id: i64) -> RepoResult<TaskList>;
    async fn find_by_owner(&self, owner_id: i64) -> RepoResult<Vec<TaskList>>;
    async fn find_by_id_and_owner(&self, id: i64, owner_id: i64) -> RepoResult<Option<TaskList>>;
    async fn exists_by_name_and_owner(&self, name: &str, owner_id: i64) -> RepoResult<bool>;
    /// Fails with `Conflict` on a duplicate name and `NotFound` if the list is gone.
    async fn rename(&self, id: i64, name: &str) -> RepoResult<TaskList>;
    /// Deletes the list and every task in it. Missing ids are ignored.
    async fn delete(&self, id: i64) -> RepoResult<()>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, task: NewTask) -> RepoResult<Task>;
    /// Like `create`, but first confirms in the same transaction that
    /// `task.task_list_id` names a list owned by `owner_id`.
    /// Fails with `NotFound` for a missing or foreign list.
    async fn create_in_owned_list(&self, task: NewTask, owner_id: i64) -> RepoResult<Task>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Task>>;
    async fn find_by_task_list_id(&self, task_list_id: i64) -> RepoResult<Vec<Task>>;
    /// Writes every mutable column of `task` and bumps `updated_at`.
    async fn save(&self, task: &Task) -> RepoResult<Task>;
    /// Like `save`, but first confirms in the same transaction that
    /// `task.task_list_id` names a list owned by `owner_id`.
    async fn save_to_owned_list(&self, task: &Task, owner_id: i64) -> RepoResult<Task>;
    /// Returns `false` when no task had this id.
    async fn delete(&self, id: i64) -> RepoResult<bool>;
}

pub(crate) fn duplicate_list_name(name: &str) -> AppError {
    AppError::Conflict(format!("A task list named '{}' already exists", name))
}

pub(crate) fn task_list_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Task list not found with id: {}", id))
}

pub(crate) fn task_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Task not found with id: {}", id))
}

pub(crate) fn duplicate_email(email: &str) -> AppError {
    AppError::Conflict(format!("Email already in use: {}", email))
}
