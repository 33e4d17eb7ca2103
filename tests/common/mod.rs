#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header;
use actix_web::{test, web};
use serde_json::{json, Value};
use tickbox::auth::{AuthResponse, TokenService};
use tickbox::store::Store;
use tickbox::AppState;

pub const TEST_SECRET: &str = "integration_test_secret";
/// Lowest cost bcrypt accepts; keeps the suite fast.
pub const TEST_BCRYPT_COST: u32 = 4;

/// Fresh state over a private in-memory database.
pub async fn test_state() -> web::Data<AppState> {
    let store = Store::in_memory()
        .await
        .expect("Failed to open in-memory store");
    let tokens = TokenService::new(TEST_SECRET).expect("Failed to build token service");
    let state = AppState::new(store, tokens, TEST_BCRYPT_COST).expect("Failed to build app state");
    web::Data::new(state)
}

// Helper struct to hold auth details
pub struct TestUser {
    pub id: i64,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", self.token))
    }
}

pub async fn register_and_login_user(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    username: &str,
    password: &str,
) -> Result<TestUser, String> {
    let req_register = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({
            "username": username,
            "email": email,
            "password": password
        }))
        .to_request();
    let resp_register = test::call_service(app, req_register).await;
    let status = resp_register.status();
    let body = test::read_body(resp_register).await;
    if !status.is_success() {
        return Err(format!(
            "Failed to register user. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }

    let req_login = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp_login = test::call_service(app, req_login).await;
    let status = resp_login.status();
    let body = test::read_body(resp_login).await;
    if !status.is_success() {
        return Err(format!(
            "Failed to log in. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }

    let auth: AuthResponse = serde_json::from_slice(&body)
        .map_err(|e| format!("Failed to parse login response: {}", e))?;
    Ok(TestUser {
        id: auth.user_id,
        token: auth.token,
    })
}

/// Parses a response body, panicking with the raw text if it is not JSON.
pub fn json_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap_or_else(|e| {
        panic!(
            "Response body is not JSON ({}): {:?}",
            e,
            String::from_utf8_lossy(bytes)
        )
    })
}
