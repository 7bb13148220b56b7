use std::sync::Arc;

use super::task_not_found;
use crate::error::AppError;
use crate::models::{
    is_blank, CreateTaskRequest, NewTask, Task, TaskResponse, UpdateTaskRequest, User,
};
use crate::repository::TaskRepository;

/// Task CRUD. Only the list a task is filed under is checked against the
/// caller; the task operations themselves are not owner-scoped.
///
/// The list check and the write happen in one storage transaction, so a list
/// deleted in between is reported as `NotFound` rather than a storage failure.
#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskRepository>) -> Self {
        Self { tasks }
    }

    async fn find(&self, id: i64) -> Result<Task, AppError> {
        self.tasks
            .find_by_id(id)
            .await?
            .ok_or_else(|| task_not_found(id))
    }

    pub async fn create(
        &self,
        owner: &User,
        request: CreateTaskRequest,
    ) -> Result<TaskResponse, AppError> {
        if is_blank(Some(request.title.as_str())) {
            return Err(AppError::BadRequest("Task title is required".into()));
        }
        let new_task = NewTask {
            title: request.title,
            description: request.description,
            task_list_id: request.task_list_id,
        };
        let task = match new_task.task_list_id {
            Some(_) => self.tasks.create_in_owned_list(new_task, owner.id).await?,
            None => self.tasks.create(new_task).await?,
        };
        log::info!("User {} created task {}", owner.id, task.id);
        Ok(task.into())
    }

    pub async fn get_by_id(&self, id: i64) -> Result<TaskResponse, AppError> {
        Ok(self.find(id).await?.into())
    }

    pub async fn list_by_list_id(&self, list_id: i64) -> Result<Vec<TaskResponse>, AppError> {
        let tasks = self.tasks.find_by_task_list_id(list_id).await?;
        Ok(tasks.into_iter().map(TaskResponse::from).collect())
    }

    /// Sets the completion flag. Repeating the call with the same value is harmless.
    pub async fn toggle(&self, id: i64, completed: bool) -> Result<TaskResponse, AppError> {
        let mut task = self.find(id).await?;
        task.completed = completed;
        Ok(self.tasks.save(&task).await?.into())
    }

    /// Applies the provided fields only. A new list reference is ownership-checked.
    pub async fn update(
        &self,
        id: i64,
        owner: &User,
        request: UpdateTaskRequest,
    ) -> Result<TaskResponse, AppError> {
        let mut task = self.find(id).await?;
        if let Some(title) = &request.title {
            if is_blank(Some(title.as_str())) {
                return Err(AppError::BadRequest("Task title cannot be blank".into()));
            }
        }
        request.apply_to(&mut task);

        let saved = match request.task_list_id {
            Some(list_id) => {
                task.task_list_id = Some(list_id);
                self.tasks.save_to_owned_list(&task, owner.id).await?
            }
            None => self.tasks.save(&task).await?,
        };
        log::info!("User {} updated task {}", owner.id, id);
        Ok(saved.into())
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.tasks.delete(id).await? {
            return Err(task_not_found(id));
        }
        log::info!("Deleted task {}", id);
        Ok(())
    }
}
