use super::HttpState;
use crate::domain::error::AppError;
use crate::domain::pet::{NewAssessment, NewPet};
use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetsQuery {
    pub owner_id: Option<String>,
}

#[get("/pets")]
async fn list_pets(
    data: web::Data<HttpState>,
    query: web::Query<PetsQuery>,
) -> Result<HttpResponse, AppError> {
    let pets = data
        .pets_use_case
        .list_pets(query.owner_id.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(pets))
}

#[post("/pets")]
async fn create_pet(
    data: web::Data<HttpState>,
    req: web::Json<NewPet>,
) -> Result<HttpResponse, AppError> {
    let pet = data.pets_use_case.create_pet(req.into_inner()).await?;
    Ok(HttpResponse::Created().json(pet))
}

#[get("/pets/{pet_id}")]
async fn get_pet(
    data: web::Data<HttpState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let pet = data.pets_use_case.get_pet(&path).await?;
    Ok(HttpResponse::Ok().json(pet))
}

#[post("/assessments")]
async fn create_assessment(
    data: web::Data<HttpState>,
    req: web::Json<NewAssessment>,
) -> Result<HttpResponse, AppError> {
    let assessment = data
        .pets_use_case
        .create_assessment(req.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(assessment))
}

#[get("/assessments/{pet_id}")]
async fn list_assessments(
    data: web::Data<HttpState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let assessments = data.pets_use_case.list_assessments(&path).await?;
    Ok(HttpResponse::Ok().json(assessments))
}

#[get("/vet-clinics")]
async fn list_vet_clinics(data: web::Data<HttpState>) -> Result<HttpResponse, AppError> {
    let clinics = data.pets_use_case.list_vet_clinics().await?;
    Ok(HttpResponse::Ok().json(clinics))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_pets)
        .service(create_pet)
        .service(get_pet)
        .service(create_assessment)
        .service(list_assessments)
        .service(list_vet_clinics);
}
