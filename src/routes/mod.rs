pub mod auth;
pub mod health;
pub mod task_lists;
pub mod tasks;

use actix_web::{error::JsonPayloadError, error::PathError, web, HttpRequest};

use crate::error::AppError;

/// Registers every `/api` route. Mounted under a scope wrapped by `AuthMiddleware`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::register)
            .service(auth::login),
    )
    .service(
        web::scope("/tasks")
            .service(tasks::create_task)
            .service(tasks::get_tasks_by_list)
            .service(tasks::get_task)
            .service(tasks::toggle_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    )
    .service(
        web::scope("/tasklists")
            .service(task_lists::create_task_list)
            .service(task_lists::get_task_lists)
            .service(task_lists::move_task)
            .service(task_lists::unassign_task)
            .service(task_lists::get_task_list)
            .service(task_lists::update_task_list)
            .service(task_lists::delete_task_list),
    );
}

/// Rejects unreadable JSON bodies with a 400 in the common error shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        log::debug!("Rejected request body: {}", err);
        AppError::BadRequest(format!("Malformed request body: {}", err)).into()
    })
}

/// Rejects path segments that do not parse, e.g. `/api/tasks/abc`.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err: PathError, _req: &HttpRequest| {
        AppError::BadRequest(format!("Invalid path parameter: {}", err)).into()
    })
}
