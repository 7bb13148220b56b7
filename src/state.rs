use std::sync::Arc;

use crate::auth::{AuthGate, AuthService, TokenService};
use crate::config::Config;
use crate::error::AppError;
use crate::repository::{
    MemoryRepository, PgRepository, TaskListRepository, TaskRepository, UserRepository,
};
use crate::services::{TaskListService, TaskService};

/// Everything a handler needs, shared across workers as `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// `"postgres"` or `"memory"`, reported by `/health`.
    pub storage: &'static str,
    pub tokens: TokenService,
    pub auth: AuthService,
    pub gate: AuthGate,
    pub task_lists: TaskListService,
    pub tasks: TaskService,
}

impl AppState {
    /// Wires every service to one store implementing all repository traits.
    pub fn new<S>(store: Arc<S>, config: &Config, storage: &'static str) -> Self
    where
        S: UserRepository + TaskListRepository + TaskRepository + 'static,
    {
        let users: Arc<dyn UserRepository> = store.clone();
        let lists: Arc<dyn TaskListRepository> = store.clone();
        let tasks: Arc<dyn TaskRepository> = store;
        let tokens = TokenService::new(&config.jwt_secret, config.jwt_expiration_ms);

        Self {
            storage,
            auth: AuthService::new(users.clone(), tokens.clone(), config.bcrypt_cost),
            gate: AuthGate::new(users),
            task_lists: TaskListService::new(lists, tasks.clone()),
            tasks: TaskService::new(tasks),
            tokens,
        }
    }

    /// Connects to PostgreSQL when `DATABASE_URL` is set, otherwise falls back
    /// to the in-memory store.
    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        match &config.database_url {
            Some(url) => {
                let repo = PgRepository::connect(url).await?;
                log::info!("Connected to PostgreSQL, migrations applied");
                Ok(Self::new(Arc::new(repo), config, "postgres"))
            }
            None => {
                log::warn!("DATABASE_URL not set; data is kept in memory and lost on restart");
                Ok(Self::new(Arc::new(MemoryRepository::new()), config, "memory"))
            }
        }
    }
}
