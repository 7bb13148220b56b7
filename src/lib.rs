#![doc = "The `tasklist_api` library crate."]
#![doc = ""]
#![doc = "This crate contains the domain models, storage backends, services, authentication,"]
#![doc = "routing configuration and error handling of the task list API. It is used by the"]
#![doc = "main binary (`main.rs`) and by the integration tests to build the application."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;

pub use crate::error::AppError;
pub use crate::state::AppState;
