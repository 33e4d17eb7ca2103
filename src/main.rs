use std::io;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info};
use tickbox::{auth::TokenService, config::Config, routes, store::Store, AppState};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    let tokens = TokenService::new(&config.jwt_secret).map_err(|e| {
        error!("Failed to initialise token signing: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    let store = Store::connect(&config.database_url, config.database_max_connections)
        .await
        .map_err(|e| {
            error!("Failed to open database {}: {}", config.database_url, e);
            io::Error::new(io::ErrorKind::Other, e)
        })?;

    let state = AppState::new(store, tokens, config.bcrypt_cost).map_err(|e| {
        error!("Failed to prepare application state: {}", e);
        io::Error::new(io::ErrorKind::Other, e)
    })?;
    let state = web::Data::new(state);

    info!("Starting tickbox server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
