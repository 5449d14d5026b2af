use super::HttpState;
use crate::domain::error::AppError;
use crate::domain::profile::ProfileUpdate;
use crate::infrastructure::identity::bearer_token;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{get, put, web, HttpRequest, HttpResponse};

fn request_token(req: &HttpRequest) -> Option<&str> {
    bearer_token(
        req.headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok()),
    )
}

#[get("/user")]
async fn current_user(
    data: web::Data<HttpState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let current = data
        .profile_use_case
        .current_user(request_token(&req))
        .await?;
    Ok(HttpResponse::Ok().json(current))
}

#[put("/profile")]
async fn update_profile(
    data: web::Data<HttpState>,
    req: HttpRequest,
    body: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, AppError> {
    let view = data
        .profile_use_case
        .update_profile(request_token(&req), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(view))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/auth").service(current_user).service(update_profile));
}
