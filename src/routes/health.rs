use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use log::warn;
use serde_json::json;

use crate::state::AppState;

/// Liveness and database reachability.
///
/// 200 with `"database": "ok"` when the store answers, 503 otherwise.
#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    match state.store.ping().await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "ok",
            "database": "ok",
            "timestamp": Utc::now()
        })),
        Err(e) => {
            warn!("health check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "degraded",
                "database": "unavailable",
                "timestamp": Utc::now()
            }))
        }
    }
}
