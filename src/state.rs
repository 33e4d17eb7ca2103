use crate::auth::{hash_password, TokenService};
use crate::error::AppError;
use crate::store::Store;

/// Password hashed once at startup; login verifies against it when the email is unknown.
const DUMMY_PASSWORD: &str = "tickbox-no-such-account";

/// Everything a request handler may touch, built once in `main` and shared
/// read-only through `web::Data<AppState>`.
pub struct AppState {
    pub store: Store,
    pub tokens: TokenService,
    /// bcrypt cost used for new password hashes.
    pub password_cost: u32,
    /// Digest of `DUMMY_PASSWORD` at `password_cost`.
    pub dummy_hash: String,
}

impl AppState {
    pub fn new(store: Store, tokens: TokenService, password_cost: u32) -> Result<Self, AppError> {
        let dummy_hash = hash_password(DUMMY_PASSWORD, password_cost)?;
        Ok(Self {
            store,
            tokens,
            password_cost,
            dummy_hash,
        })
    }
}
