use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{CreateTaskRequest, UpdateTaskRequest},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use validator::Validate;

/// Creates a task, optionally filed under one of the caller's lists.
///
/// ## Request Body:
/// - `title`: required, not blank, at most 255 characters.
/// - `description` (optional): at most 2000 characters.
/// - `taskListId` (optional): must name a list owned by the caller.
///
/// ## Responses:
/// - `201 Created`: the new task.
/// - `400 Bad Request`: validation failed.
/// - `404 Not Found`: `taskListId` is unknown or not owned by the caller.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    task_data: web::Json<CreateTaskRequest>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = state.tasks.create(&user, task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a specific task by its ID.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.get_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Lists every task filed under the given task list.
#[get("/tasklist/{list_id}")]
pub async fn get_tasks_by_list(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let tasks = state.tasks.list_by_list_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Updates the provided fields of a task. Omitted fields are left as they are.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    path: web::Path<i64>,
    task_data: web::Json<UpdateTaskRequest>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = state
        .tasks
        .update(path.into_inner(), &user, task_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Sets a task's completion flag: `PUT /api/tasks/{id}/true` or `/false`.
#[put("/{id}/{status}")]
pub async fn toggle_task(
    state: web::Data<AppState>,
    path: web::Path<(i64, bool)>,
) -> Result<impl Responder, AppError> {
    let (id, completed) = path.into_inner();
    let task = state.tasks.toggle(id, completed).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task.
///
/// ## Responses:
/// - `204 No Content`: the task was deleted.
/// - `404 Not Found`: no task with this ID.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    state.tasks.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
