pub mod auth;
pub mod health;
pub mod todos;
pub mod users;

use actix_web::{error, web};

use crate::auth::AuthMiddleware;
use crate::error::AppError;

/// Registers every route. Handlers expect `web::Data<AppState>` in app data.
///
/// `/todos` and `/users` run behind `AuthMiddleware`; everything else is public.
/// The todo collection answers on both `/todos` and `/todos/`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .service(health::health)
        .service(auth::register)
        .service(auth::login)
        .service(
            web::scope("/todos")
                .wrap(AuthMiddleware)
                .service(
                    web::resource(["", "/"])
                        .route(web::get().to(todos::list_todos))
                        .route(web::post().to(todos::create_todo)),
                )
                .service(todos::get_todo)
                .service(todos::update_todo)
                .service(todos::delete_todo),
        )
        .service(
            web::scope("/users")
                .wrap(AuthMiddleware)
                .service(users::get_me)
                .service(users::update_me)
                .service(users::delete_me),
        );
}

/// Body parse failures become `AppError::Validation` so they carry a JSON body.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err, _req| {
            let message = match &err {
                error::JsonPayloadError::Deserialize(e) => e.to_string(),
                other => other.to_string(),
            };
            AppError::Validation(message).into()
        })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|_err, _req| AppError::Validation("Invalid path parameter".into()).into())
}
