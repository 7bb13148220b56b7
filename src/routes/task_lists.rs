use crate::{
    auth::CurrentUser, error::AppError, models::TaskListRequest, state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use validator::Validate;

/// Creates a task list for the caller.
///
/// ## Responses:
/// - `201 Created`: `{id, name, createdAt, updatedAt, taskCount}`.
/// - `400 Bad Request`: blank or over-long name.
/// - `409 Conflict`: the caller already owns a list with this name.
#[post("")]
pub async fn create_task_list(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    list_data: web::Json<TaskListRequest>,
) -> Result<impl Responder, AppError> {
    list_data.validate()?;

    let list = state.task_lists.create(&user, &list_data.name).await?;
    Ok(HttpResponse::Created().json(list))
}

/// Lists the caller's task lists.
#[get("")]
pub async fn get_task_lists(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl Responder, AppError> {
    let lists = state.task_lists.list_for_owner(&user).await?;
    Ok(HttpResponse::Ok().json(lists))
}

#[get("/{id}")]
pub async fn get_task_list(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let list = state.task_lists.get_by_id(path.into_inner(), &user).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// Renames one of the caller's task lists.
#[put("/{id}")]
pub async fn update_task_list(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    path: web::Path<i64>,
    list_data: web::Json<TaskListRequest>,
) -> Result<impl Responder, AppError> {
    list_data.validate()?;

    let list = state
        .task_lists
        .rename(path.into_inner(), &user, &list_data.name)
        .await?;
    Ok(HttpResponse::Ok().json(list))
}

/// Deletes a task list together with its tasks.
#[delete("/{id}")]
pub async fn delete_task_list(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    state.task_lists.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Files a task under one of the caller's lists.
#[put("/{list_id}/tasks/{task_id}")]
pub async fn move_task(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    path: web::Path<(i64, i64)>,
) -> Result<impl Responder, AppError> {
    let (list_id, task_id) = path.into_inner();
    state.task_lists.move_task(task_id, list_id, &user).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Removes a task from a list. The task currently keeps its list reference.
#[delete("/{list_id}/tasks/{task_id}")]
pub async fn unassign_task(
    state: web::Data<AppState>,
    path: web::Path<(i64, i64)>,
) -> Result<impl Responder, AppError> {
    let (_list_id, task_id) = path.into_inner();
    state.task_lists.unassign_task(task_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
