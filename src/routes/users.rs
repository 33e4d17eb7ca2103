use crate::{
    auth::{normalize_email, AuthenticatedUserId},
    error::AppError,
    models::{UpdateProfileRequest, UserProfile},
    state::AppState,
};
use actix_web::{delete, get, patch, web, HttpResponse, Responder};
use log::info;
use validator::Validate;

pub const USER_NOT_FOUND: &str = "User not found";

/// The caller's account with its live todos.
#[get("/me")]
pub async fn get_me(
    state: web::Data<AppState>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let account = state
        .store
        .find_user(user.0)
        .await?
        .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.into()))?;
    let todos = state.store.list_todos(user.0).await?;

    Ok(HttpResponse::Ok().json(UserProfile {
        user: account,
        todos,
    }))
}

/// Changes the caller's username and/or email.
#[patch("/me")]
pub async fn update_me(
    state: web::Data<AppState>,
    user: AuthenticatedUserId,
    profile_data: web::Json<UpdateProfileRequest>,
) -> Result<impl Responder, AppError> {
    profile_data.validate()?;

    let email = profile_data.email.as_deref().map(normalize_email);
    let account = state
        .store
        .update_user(user.0, profile_data.username.as_deref(), email.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.into()))?;

    Ok(HttpResponse::Ok().json(account))
}

/// Soft-deletes the caller's account together with its todos. Responds 204.
///
/// Tokens already issued for the account are not revoked; they simply find
/// nothing left to act on.
#[delete("/me")]
pub async fn delete_me(
    state: web::Data<AppState>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    if !state.store.soft_delete_user(user.0).await? {
        return Err(AppError::NotFound(USER_NOT_FOUND.into()));
    }

    info!("user {} deleted their account", user.0);
    Ok(HttpResponse::NoContent().finish())
}
