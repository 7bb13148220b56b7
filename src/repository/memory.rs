use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::{
    duplicate_email, duplicate_list_name, task_list_not_found, task_not_found, RepoResult,
    TaskListRepository, TaskRepository, UserRepository,
};
use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskList, User};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    lists: BTreeMap<i64, TaskList>,
    tasks: BTreeMap<i64, Task>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn task_count(&self, list_id: i64) -> i64 {
        self.tasks
            .values()
            .filter(|t| t.task_list_id == Some(list_id))
            .count() as i64
    }

    /// Returns a copy of `list` with its live task count.
    fn project(&self, list: &TaskList) -> TaskList {
        TaskList {
            task_count: self.task_count(list.id),
            ..list.clone()
        }
    }

    fn name_taken(&self, name: &str, owner_id: i64, except: Option<i64>) -> bool {
        self.lists
            .values()
            .any(|l| l.user_id == owner_id && l.name == name && Some(l.id) != except)
    }

    /// Mirrors the `tasks.task_list_id` foreign key.
    fn check_list_reference(&self, list_id: Option<i64>) -> RepoResult<()> {
        match list_id {
            Some(id) if !self.lists.contains_key(&id) => Err(task_list_not_found(id)),
            _ => Ok(()),
        }
    }

    fn check_owned_list(&self, list_id: Option<i64>, owner_id: i64) -> RepoResult<()> {
        match list_id {
            Some(id) if self.lists.get(&id).map(|l| l.user_id) != Some(owner_id) => {
                Err(task_list_not_found(id))
            }
            _ => Ok(()),
        }
    }

    fn insert_task(&mut self, task: NewTask) -> RepoResult<Task> {
        self.check_list_reference(task.task_list_id)?;
        let id = self.next_id();
        let now = Utc::now();
        let created = Task {
            id,
            title: task.title,
            description: task.description,
            completed: false,
            task_list_id: task.task_list_id,
            created_at: now,
            updated_at: now,
        };
        self.tasks.insert(id, created.clone());
        Ok(created)
    }

    fn update_task(&mut self, task: &Task) -> RepoResult<Task> {
        self.check_list_reference(task.task_list_id)?;
        let stored = self
            .tasks
            .get_mut(&task.id)
            .ok_or_else(|| task_not_found(task.id))?;
        stored.title = task.title.clone();
        stored.description = task.description.clone();
        stored.completed = task.completed;
        stored.task_list_id = task.task_list_id;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }
}

/// Process-local storage with the same constraints as the PostgreSQL schema.
///
/// All three tables sit behind one mutex, so every operation is atomic.
/// The lock is never held across an `.await`.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> RepoResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::InternalServerError("In-memory store lock poisoned".into()))
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn create(&self, user: NewUser) -> RepoResult<User> {
        let mut tables = self.tables()?;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(duplicate_email(&user.email));
        }
        let id = tables.next_id();
        let created = User {
            id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.insert(id, created.clone());
        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let tables = self.tables()?;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn exists_by_email(&self, email: &str) -> RepoResult<bool> {
        let tables = self.tables()?;
        Ok(tables.users.values().any(|u| u.email == email))
    }
}

#[async_trait]
impl TaskListRepository for MemoryRepository {
    async fn create(&self, name: &str, owner_id: i64) -> RepoResult<TaskList> {
        let mut tables = self.tables()?;
        if !tables.users.contains_key(&owner_id) {
            return Err(AppError::DatabaseError(format!(
                "task_lists.user_id references missing user {}",
                owner_id
            )));
        }
        if tables.name_taken(name, owner_id, None) {
            return Err(duplicate_list_name(name));
        }
        let id = tables.next_id();
        let now = Utc::now();
        let list = TaskList {
            id,
            name: name.to_string(),
            user_id: owner_id,
            created_at: now,
            updated_at: now,
            task_count: 0,
        };
        tables.lists.insert(id, list.clone());
        Ok(list)
    }

    async fn find_by_owner(&self, owner_id: i64) -> RepoResult<Vec<TaskList>> {
        let tables = self.tables()?;
        Ok(tables
            .lists
            .values()
            .filter(|l| l.user_id == owner_id)
            .map(|l| tables.project(l))
            .collect())
    }

    async fn find_by_id_and_owner(&self, id: i64, owner_id: i64) -> RepoResult<Option<TaskList>> {
        let tables = self.tables()?;
        Ok(tables
            .lists
            .get(&id)
            .filter(|l| l.user_id == owner_id)
            .map(|l| tables.project(l)))
    }

    async fn exists_by_name_and_owner(&self, name: &str, owner_id: i64) -> RepoResult<bool> {
        let tables = self.tables()?;
        Ok(tables.name_taken(name, owner_id, None))
    }

    async fn rename(&self, id: i64, name: &str) -> RepoResult<TaskList> {
        let mut tables = self.tables()?;
        let mut list = tables
            .lists
            .get(&id)
            .cloned()
            .ok_or_else(|| task_list_not_found(id))?;
        if tables.name_taken(name, list.user_id, Some(id)) {
            return Err(duplicate_list_name(name));
        }
        list.name = name.to_string();
        list.updated_at = Utc::now();
        tables.lists.insert(id, list.clone());
        Ok(tables.project(&list))
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        let mut tables = self.tables()?;
        if tables.lists.remove(&id).is_some() {
            tables.tasks.retain(|_, t| t.task_list_id != Some(id));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for MemoryRepository {
    async fn create(&self, task: NewTask) -> RepoResult<Task> {
        self.tables()?.insert_task(task)
    }

    async fn create_in_owned_list(&self, task: NewTask, owner_id: i64) -> RepoResult<Task> {
        let mut tables = self.tables()?;
        tables.check_owned_list(task.task_list_id, owner_id)?;
        tables.insert_task(task)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Task>> {
        let tables = self.tables()?;
        Ok(tables.tasks.get(&id).cloned())
    }

    async fn find_by_task_list_id(&self, task_list_id: i64) -> RepoResult<Vec<Task>> {
        let tables = self.tables()?;
        Ok(tables
            .tasks
            .values()
            .filter(|t| t.task_list_id == Some(task_list_id))
            .cloned()
            .collect())
    }

    async fn save(&self, task: &Task) -> RepoResult<Task> {
        self.tables()?.update_task(task)
    }

    async fn save_to_owned_list(&self, task: &Task, owner_id: i64) -> RepoResult<Task> {
        let mut tables = self.tables()?;
        tables.check_owned_list(task.task_list_id, owner_id)?;
        tables.update_task(task)
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let mut tables = self.tables()?;
        Ok(tables.tasks.remove(&id).is_some())
    }
}
