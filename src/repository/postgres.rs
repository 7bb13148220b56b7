use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use super::{
    duplicate_email, duplicate_list_name, task_list_not_found, task_not_found, RepoResult,
    TaskListRepository, TaskRepository, UserRepository,
};
use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskList, User};

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at";
const TASK_COLUMNS: &str =
    "id, title, description, completed, task_list_id, created_at, updated_at";

// Every list read carries its live task count.
const LIST_SELECT: &str = "SELECT l.id, l.name, l.user_id, l.created_at, l.updated_at, \
     (SELECT COUNT(*) FROM tasks t WHERE t.task_list_id = l.id) AS task_count \
     FROM task_lists l";

/// PostgreSQL-backed storage for every repository trait.
#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and applies the bundled migrations.
    pub async fn connect(database_url: &str) -> RepoResult<Self> {
        let pool = PgPool::connect(database_url).await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {}", e)))?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps a unique-constraint violation to `conflict`, everything else through `From`.
fn on_unique_violation(error: sqlx::Error, conflict: AppError) -> AppError {
    if let sqlx::Error::Database(db_err) = &error {
        if db_err.is_unique_violation() {
            return conflict;
        }
    }
    AppError::from(error)
}

/// A write whose `task_list_id` lost its list to a concurrent delete.
fn on_missing_list(error: sqlx::Error, list_id: Option<i64>) -> AppError {
    if let (sqlx::Error::Database(db_err), Some(id)) = (&error, list_id) {
        if db_err.is_foreign_key_violation() {
            return task_list_not_found(id);
        }
    }
    AppError::from(error)
}

/// Takes a share lock on the list so it cannot be deleted before the
/// surrounding transaction commits.
async fn lock_owned_list(conn: &mut PgConnection, list_id: i64, owner_id: i64) -> RepoResult<()> {
    sqlx::query_scalar::<_, i64>(
        "SELECT id FROM task_lists WHERE id = $1 AND user_id = $2 FOR SHARE",
    )
    .bind(list_id)
    .bind(owner_id)
    .fetch_optional(conn)
    .await?
    .map(|_| ())
    .ok_or_else(|| task_list_not_found(list_id))
}

async fn insert_task(conn: &mut PgConnection, task: &NewTask) -> RepoResult<Task> {
    sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (title, description, completed, task_list_id) \
         VALUES ($1, $2, FALSE, $3) RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.task_list_id)
    .fetch_one(conn)
    .await
    .map_err(|e| on_missing_list(e, task.task_list_id))
}

async fn update_task(conn: &mut PgConnection, task: &Task) -> RepoResult<Task> {
    sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks \
         SET title = $1, description = $2, completed = $3, task_list_id = $4, updated_at = NOW() \
         WHERE id = $5 RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.completed)
    .bind(task.task_list_id)
    .bind(task.id)
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::RowNotFound => task_not_found(task.id),
        other => on_missing_list(other, task.task_list_id),
    })
}

#[async_trait]
impl UserRepository for PgRepository {
    async fn create(&self, user: NewUser) -> RepoResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| on_unique_violation(e, duplicate_email(&user.email)))
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn exists_by_email(&self, email: &str) -> RepoResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

#[async_trait]
impl TaskListRepository for PgRepository {
    async fn create(&self, name: &str, owner_id: i64) -> RepoResult<TaskList> {
        sqlx::query_as::<_, TaskList>(
            "INSERT INTO task_lists (name, user_id) VALUES ($1, $2) \
             RETURNING id, name, user_id, created_at, updated_at, 0::BIGINT AS task_count",
        )
        .bind(name)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| on_unique_violation(e, duplicate_list_name(name)))
    }

    async fn find_by_owner(&self, owner_id: i64) -> RepoResult<Vec<TaskList>> {
        let lists = sqlx::query_as::<_, TaskList>(&format!(
            "{} WHERE l.user_id = $1 ORDER BY l.created_at, l.id",
            LIST_SELECT
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lists)
    }

    async fn find_by_id_and_owner(&self, id: i64, owner_id: i64) -> RepoResult<Option<TaskList>> {
        let list = sqlx::query_as::<_, TaskList>(&format!(
            "{} WHERE l.id = $1 AND l.user_id = $2",
            LIST_SELECT
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(list)
    }

    async fn exists_by_name_and_owner(&self, name: &str, owner_id: i64) -> RepoResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM task_lists WHERE name = $1 AND user_id = $2)",
        )
        .bind(name)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn rename(&self, id: i64, name: &str) -> RepoResult<TaskList> {
        sqlx::query_as::<_, TaskList>(
            "WITH updated AS ( \
                 UPDATE task_lists SET name = $1, updated_at = NOW() WHERE id = $2 \
                 RETURNING id, name, user_id, created_at, updated_at \
             ) \
             SELECT u.id, u.name, u.user_id, u.created_at, u.updated_at, \
                 (SELECT COUNT(*) FROM tasks t WHERE t.task_list_id = u.id) AS task_count \
             FROM updated u",
        )
        .bind(name)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| on_unique_violation(e, duplicate_list_name(name)))
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        // tasks.task_list_id is ON DELETE CASCADE.
        sqlx::query("DELETE FROM task_lists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for PgRepository {
    async fn create(&self, task: NewTask) -> RepoResult<Task> {
        let mut conn = self.pool.acquire().await?;
        insert_task(&mut conn, &task).await
    }

    async fn create_in_owned_list(&self, task: NewTask, owner_id: i64) -> RepoResult<Task> {
        let mut tx = self.pool.begin().await?;
        if let Some(list_id) = task.task_list_id {
            lock_owned_list(&mut tx, list_id, owner_id).await?;
        }
        let created = insert_task(&mut tx, &task).await?;
        tx.commit().await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE id = $1",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn find_by_task_list_id(&self, task_list_id: i64) -> RepoResult<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE task_list_id = $1 ORDER BY created_at, id",
            TASK_COLUMNS
        ))
        .bind(task_list_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn save(&self, task: &Task) -> RepoResult<Task> {
        let mut conn = self.pool.acquire().await?;
        update_task(&mut conn, task).await
    }

    async fn save_to_owned_list(&self, task: &Task, owner_id: i64) -> RepoResult<Task> {
        let mut tx = self.pool.begin().await?;
        if let Some(list_id) = task.task_list_id {
            lock_owned_list(&mut tx, list_id, owner_id).await?;
        }
        let saved = update_task(&mut tx, task).await?;
        tx.commit().await?;
        Ok(saved)
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
