use super::HttpState;
use crate::domain::case::{NewCase, ResultCards};
use crate::domain::error::AppError;
use crate::domain::question::Question;
use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaseResponse {
    pub case_id: String,
}

#[derive(Serialize)]
pub struct QuestionsResponse {
    pub questions: Vec<Question>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResultsRequest {
    pub case_id: String,
    #[serde(default)]
    pub answers: Option<Map<String, Value>>,
}

#[derive(Serialize)]
pub struct CardsResponse {
    pub cards: ResultCards,
}

#[post("/cases")]
async fn create_case(
    data: web::Data<HttpState>,
    req: web::Json<NewCase>,
) -> Result<HttpResponse, AppError> {
    let case_id = data.diagnose_use_case.create_case(&req).await?;
    Ok(HttpResponse::Ok().json(CreateCaseResponse { case_id }))
}

#[get("/cases")]
async fn list_cases(data: web::Data<HttpState>) -> Result<HttpResponse, AppError> {
    let cases = data.diagnose_use_case.list_cases().await?;
    Ok(HttpResponse::Ok().json(cases))
}

#[get("/cases/{case_id}")]
async fn get_case(
    data: web::Data<HttpState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let case = data.diagnose_use_case.get_case(&path).await?;
    Ok(HttpResponse::Ok().json(case))
}

#[get("/questions/{case_id}")]
async fn get_questions(
    data: web::Data<HttpState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let questions = data.diagnose_use_case.get_questions(&path).await?;
    Ok(HttpResponse::Ok().json(QuestionsResponse { questions }))
}

#[post("/results")]
async fn submit_results(
    data: web::Data<HttpState>,
    req: web::Json<SubmitResultsRequest>,
) -> Result<HttpResponse, AppError> {
    let SubmitResultsRequest { case_id, answers } = req.into_inner();
    if case_id.trim().is_empty() {
        return Err(AppError::ValidationError("caseId: is required".to_string()));
    }
    let cards = data
        .diagnose_use_case
        .submit_results(case_id.trim(), answers)
        .await?;
    Ok(HttpResponse::Ok().json(CardsResponse { cards }))
}

#[get("/results/{case_id}")]
async fn get_results(
    data: web::Data<HttpState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let cards = data.diagnose_use_case.get_results(&path).await?;
    Ok(HttpResponse::Ok().json(CardsResponse { cards }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/diagnose")
            .service(create_case)
            .service(list_cases)
            .service(get_case)
            .service(get_questions)
            .service(submit_results)
            .service(get_results),
    );
}
