use crate::{
    auth::{
        hash_password, normalize_email, verify_password, AuthResponse, LoginRequest,
        RegisterRequest, RegisterResponse,
    },
    error::AppError,
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use log::info;
use validator::Validate;

/// Shared by the unknown-email and wrong-password paths so they cannot be told apart.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Register a new user
///
/// Hashes the password and creates the account. Responds 201 with the new id and
/// username; a live account with the same username or email yields 400.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let RegisterRequest {
        username,
        email,
        password,
    } = register_data.into_inner();

    let cost = state.password_cost;
    let password_hash = web::block(move || hash_password(&password, cost)).await??;

    let user = state
        .store
        .insert_user(&username, &normalize_email(&email), &password_hash)
        .await?;

    info!("registered user {} ({})", user.id, user.username);
    Ok(HttpResponse::Created().json(RegisterResponse {
        user_id: user.id,
        username: user.username,
    }))
}

/// Login user
///
/// Authenticates a user by email and password and returns a fresh 24h token.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;
    let LoginRequest { email, password } = login_data.into_inner();

    // An unknown email is checked against a stand-in digest so both failures cost one bcrypt verify.
    let (user_id, password_hash) = match state
        .store
        .find_credentials_by_email(&normalize_email(&email))
        .await?
    {
        Some(credentials) => (Some(credentials.id), credentials.password_hash),
        None => (None, state.dummy_hash.clone()),
    };

    let password_matches =
        web::block(move || verify_password(&password, &password_hash)).await??;
    let user_id = match user_id {
        Some(user_id) if password_matches => user_id,
        _ => return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into())),
    };

    let token = state.tokens.issue(user_id)?;
    info!("user {} logged in", user_id);
    Ok(HttpResponse::Ok().json(AuthResponse { token, user_id }))
}
