//! Todo handlers.
//!
//! Every handler receives the caller as `AuthenticatedUserId` and passes it to the
//! store as a filter. A todo that does not exist and a todo owned by someone else
//! produce the same 404 body.

use crate::{
    auth::AuthenticatedUserId,
    error::AppError,
    models::{CreateTodoRequest, UpdateTodoRequest},
    state::AppState,
};
use actix_web::{delete, get, patch, web, HttpResponse, Responder};
use validator::Validate;

pub const TODO_NOT_FOUND: &str = "Todo not found";

fn not_found() -> AppError {
    AppError::NotFound(TODO_NOT_FOUND.into())
}

/// Lists the caller's todos, newest first.
pub async fn list_todos(
    state: web::Data<AppState>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let todos = state.store.list_todos(user.0).await?;
    Ok(HttpResponse::Ok().json(todos))
}

/// Creates a todo owned by the caller.
///
/// `completed` defaults to `false` when omitted. Responds 400 if the caller's
/// account no longer exists.
pub async fn create_todo(
    state: web::Data<AppState>,
    user: AuthenticatedUserId,
    todo_data: web::Json<CreateTodoRequest>,
) -> Result<impl Responder, AppError> {
    todo_data.validate()?;

    let todo = state
        .store
        .insert_todo(user.0, &todo_data)
        .await?
        .ok_or_else(|| AppError::Validation("Invalid user id".into()))?;

    Ok(HttpResponse::Created().json(todo))
}

#[get("/{id}")]
pub async fn get_todo(
    state: web::Data<AppState>,
    user: AuthenticatedUserId,
    todo_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let todo = state
        .store
        .find_todo(todo_id.into_inner(), user.0)
        .await?
        .ok_or_else(not_found)?;

    Ok(HttpResponse::Ok().json(todo))
}

/// Partially updates a todo.
///
/// An absent or empty `item` leaves the item as is; a present `completed`,
/// `false` included, overwrites it.
#[patch("/{id}")]
pub async fn update_todo(
    state: web::Data<AppState>,
    user: AuthenticatedUserId,
    todo_id: web::Path<i64>,
    todo_data: web::Json<UpdateTodoRequest>,
) -> Result<impl Responder, AppError> {
    todo_data.validate()?;

    let todo = state
        .store
        .update_todo(todo_id.into_inner(), user.0, &todo_data)
        .await?
        .ok_or_else(not_found)?;

    Ok(HttpResponse::Ok().json(todo))
}

/// Soft-deletes a todo. Responds 204.
#[delete("/{id}")]
pub async fn delete_todo(
    state: web::Data<AppState>,
    user: AuthenticatedUserId,
    todo_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    if !state
        .store
        .soft_delete_todo(todo_id.into_inner(), user.0)
        .await?
    {
        return Err(not_found());
    }

    Ok(HttpResponse::NoContent().finish())
}
