use std::sync::Arc;

use super::{task_list_not_found, task_not_found};
use crate::error::AppError;
use crate::models::{is_blank, TaskListResponse, User};
use crate::repository::{TaskListRepository, TaskRepository};

/// Task list CRUD scoped to the owning user, plus moving tasks between lists.
#[derive(Clone)]
pub struct TaskListService {
    lists: Arc<dyn TaskListRepository>,
    tasks: Arc<dyn TaskRepository>,
}

fn require_name(name: &str) -> Result<(), AppError> {
    if is_blank(Some(name)) {
        return Err(AppError::BadRequest("Task list name is required".into()));
    }
    Ok(())
}

fn name_taken(name: &str) -> AppError {
    AppError::Conflict(format!("A task list named '{}' already exists", name))
}

impl TaskListService {
    pub fn new(lists: Arc<dyn TaskListRepository>, tasks: Arc<dyn TaskRepository>) -> Self {
        Self { lists, tasks }
    }

    /// Creates a list for `owner`. Names are unique per owner.
    ///
    /// The existence check only short-circuits the common case; the storage
    /// constraint is what rejects a concurrent duplicate, also as `Conflict`.
    pub async fn create(&self, owner: &User, name: &str) -> Result<TaskListResponse, AppError> {
        require_name(name)?;
        if self.lists.exists_by_name_and_owner(name, owner.id).await? {
            return Err(name_taken(name));
        }

        let list = self.lists.create(name, owner.id).await?;
        log::info!("User {} created task list {}", owner.id, list.id);
        Ok(list.into())
    }

    pub async fn list_for_owner(&self, owner: &User) -> Result<Vec<TaskListResponse>, AppError> {
        let lists = self.lists.find_by_owner(owner.id).await?;
        Ok(lists.into_iter().map(TaskListResponse::from).collect())
    }

    /// Lists owned by someone else are reported as missing.
    pub async fn get_by_id(&self, id: i64, owner: &User) -> Result<TaskListResponse, AppError> {
        self.lists
            .find_by_id_and_owner(id, owner.id)
            .await?
            .map(TaskListResponse::from)
            .ok_or_else(|| task_list_not_found(id))
    }

    pub async fn rename(
        &self,
        id: i64,
        owner: &User,
        new_name: &str,
    ) -> Result<TaskListResponse, AppError> {
        let list = self
            .lists
            .find_by_id_and_owner(id, owner.id)
            .await?
            .ok_or_else(|| task_list_not_found(id))?;
        require_name(new_name)?;

        if list.name != new_name && self.lists.exists_by_name_and_owner(new_name, owner.id).await? {
            return Err(name_taken(new_name));
        }

        let renamed = self.lists.rename(id, new_name).await?;
        log::info!("User {} renamed task list {}", owner.id, id);
        Ok(renamed.into())
    }

    /// Deletes a list and, through the storage cascade, its tasks.
    // Not scoped to the owner: any authenticated caller can delete any list id.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.lists.delete(id).await?;
        log::info!("Deleted task list {}", id);
        Ok(())
    }

    /// Points `task_id` at `list_id`. The list must belong to `owner`; the task
    /// itself is not ownership-checked.
    pub async fn move_task(&self, task_id: i64, list_id: i64, owner: &User) -> Result<(), AppError> {
        let mut task = self
            .tasks
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| task_not_found(task_id))?;

        task.task_list_id = Some(list_id);
        self.tasks.save_to_owned_list(&task, owner.id).await?;
        log::info!("Moved task {} to task list {}", task_id, list_id);
        Ok(())
    }

    /// Re-saves the task without touching its list reference, so the task
    /// stays in its list. Kept as the endpoint has always behaved.
    pub async fn unassign_task(&self, task_id: i64) -> Result<(), AppError> {
        let task = self
            .tasks
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| task_not_found(task_id))?;

        self.tasks.save(&task).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewTask, NewUser};
    use crate::repository::{MemoryRepository, UserRepository};

    struct Fixture {
        repo: Arc<MemoryRepository>,
        service: TaskListService,
    }

    impl Fixture {
        fn new() -> Self {
            let repo = Arc::new(MemoryRepository::new());
            let service = TaskListService::new(repo.clone(), repo.clone());
            Self { repo, service }
        }

        async fn user(&self, email: &str) -> User {
            UserRepository::create(
                &*self.repo,
                NewUser {
                    name: "Owner".to_string(),
                    email: email.to_string(),
                    password_hash: "hash".to_string(),
                },
            )
            .await
            .unwrap()
        }

        async fn task(&self, title: &str, list_id: Option<i64>) -> i64 {
            TaskRepository::create(
                &*self.repo,
                NewTask {
                    title: title.to_string(),
                    description: None,
                    task_list_id: list_id,
                },
            )
            .await
            .unwrap()
            .id
        }
    }

    #[actix_rt::test]
    async fn test_create_enforces_per_owner_uniqueness() {
        let fx = Fixture::new();
        let a = fx.user("a@x.com").await;
        let b = fx.user("b@x.com").await;

        let work = fx.service.create(&a, "Work").await.unwrap();
        assert_eq!(work.task_count, 0);

        let err = fx.service.create(&a, "Work").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        assert!(fx.service.create(&b, "Work").await.is_ok());
    }

    #[actix_rt::test]
    async fn test_blank_name_is_rejected_and_nothing_persisted() {
        let fx = Fixture::new();
        let a = fx.user("a@x.com").await;

        let err = fx.service.create(&a, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(fx.service.list_for_owner(&a).await.unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn test_get_by_id_hides_foreign_lists() {
        let fx = Fixture::new();
        let a = fx.user("a@x.com").await;
        let b = fx.user("b@x.com").await;
        let work = fx.service.create(&a, "Work").await.unwrap();

        assert_eq!(fx.service.get_by_id(work.id, &a).await.unwrap().name, "Work");
        assert!(matches!(
            fx.service.get_by_id(work.id, &b).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            fx.service.get_by_id(9_999, &a).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[actix_rt::test]
    async fn test_rename_rules() {
        let fx = Fixture::new();
        let a = fx.user("a@x.com").await;
        let work = fx.service.create(&a, "Work").await.unwrap();
        fx.service.create(&a, "Home").await.unwrap();

        assert!(matches!(
            fx.service.rename(work.id, &a, "Home").await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            fx.service.rename(work.id, &a, "").await,
            Err(AppError::BadRequest(_))
        ));

        let unchanged = fx.service.rename(work.id, &a, "Work").await.unwrap();
        assert_eq!(unchanged.name, "Work");

        let renamed = fx.service.rename(work.id, &a, "Office").await.unwrap();
        assert_eq!(renamed.name, "Office");
    }

    #[actix_rt::test]
    async fn test_move_task_requires_owned_list() {
        let fx = Fixture::new();
        let a = fx.user("a@x.com").await;
        let b = fx.user("b@x.com").await;
        let a_list = fx.service.create(&a, "Work").await.unwrap();
        let b_list = fx.service.create(&b, "Private").await.unwrap();
        let task_id = fx.task("Buy milk", None).await;

        for _ in 0..2 {
            assert!(matches!(
                fx.service.move_task(task_id, b_list.id, &a).await,
                Err(AppError::NotFound(_))
            ));
        }
        assert!(matches!(
            fx.service.move_task(9_999, a_list.id, &a).await,
            Err(AppError::NotFound(_))
        ));

        fx.service.move_task(task_id, a_list.id, &a).await.unwrap();
        let moved = fx.repo.find_by_id(task_id).await.unwrap().unwrap();
        assert_eq!(moved.task_list_id, Some(a_list.id));
        assert_eq!(
            fx.service.get_by_id(a_list.id, &a).await.unwrap().task_count,
            1
        );
    }

    #[actix_rt::test]
    async fn test_unassign_keeps_list_reference() {
        let fx = Fixture::new();
        let a = fx.user("a@x.com").await;
        let list = fx.service.create(&a, "Work").await.unwrap();
        let task_id = fx.task("Buy milk", Some(list.id)).await;

        fx.service.unassign_task(task_id).await.unwrap();
        let task = fx.repo.find_by_id(task_id).await.unwrap().unwrap();
        assert_eq!(task.task_list_id, Some(list.id));

        assert!(matches!(
            fx.service.unassign_task(9_999).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[actix_rt::test]
    async fn test_delete_cascades() {
        let fx = Fixture::new();
        let a = fx.user("a@x.com").await;
        let list = fx.service.create(&a, "Work").await.unwrap();
        let task_id = fx.task("Buy milk", Some(list.id)).await;

        fx.service.delete(list.id).await.unwrap();

        assert!(fx.repo.find_by_id(task_id).await.unwrap().is_none());
        assert!(fx.service.list_for_owner(&a).await.unwrap().is_empty());
        // Deleting again is not an error.
        fx.service.delete(list.id).await.unwrap();
    }
}
