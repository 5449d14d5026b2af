mod auth;
mod diagnose;
mod error;
mod pets;

use crate::application::{DiagnoseUseCase, PetsUseCase, ProfileUseCase};
use crate::domain::error::AppError;
use crate::infrastructure::config::AppConfig;
use actix_cors::Cors;
use actix_web::{dev::Server, get, web, App, HttpResponse, HttpServer, Responder};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

pub struct HttpState {
    pub diagnose_use_case: Arc<DiagnoseUseCase>,
    pub pets_use_case: Arc<PetsUseCase>,
    pub profile_use_case: Arc<ProfileUseCase>,
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "ok": true }))
}

/// Routes plus JSON/path extractor error handling, shared with tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| {
        AppError::ValidationError(format!("Invalid request body: {}", err)).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _| {
        AppError::ValidationError(format!("Invalid query: {}", err)).into()
    }))
    .service(health)
    .service(
        web::scope("/api")
            .configure(diagnose::configure)
            .configure(pets::configure)
            .configure(auth::configure),
    );
}

fn cors_for(config: &AppConfig) -> Cors {
    if config.allows_any_origin() {
        return Cors::permissive();
    }
    config
        .cors_origins
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}

pub fn start_server(state: HttpState, config: &AppConfig) -> std::io::Result<Server> {
    let state = web::Data::new(state);
    let cors_config = config.clone();
    let (host, port) = config.bind_addr();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(cors_for(&cors_config))
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((host.as_str(), port))?
    .run();

    info!(host = %host, port, "HTTP server listening");
    Ok(server)
}
