use crate::application::use_cases::extraction::ExtractionPath;
use crate::application::use_cases::test_case_generation::{
    GenerationRequest, TestCaseGenerationUseCase,
};
use crate::domain::error::AppError;
use crate::domain::test_case::TestCaseBatch;
use actix_cors::Cors;
use actix_web::{dev::Server, get, post, web, App, HttpResponse, HttpServer, Responder};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

pub struct HttpState {
    pub use_case: Arc<TestCaseGenerationUseCase>,
}

#[derive(Serialize)]
struct ExtractResponse {
    #[serde(flatten)]
    batch: TestCaseBatch,
    #[serde(rename = "ExtractionPath")]
    path: ExtractionPath,
    #[serde(rename = "Skipped")]
    skipped: usize,
}

#[post("/generate_test_cases")]
async fn generate_test_cases(
    data: web::Data<HttpState>,
    req: web::Json<GenerationRequest>,
) -> impl Responder {
    tracing::info!(
        batch_number = ?req.batch_number,
        user_id = ?req.user_id,
        "HTTP generate_test_cases"
    );

    match data.use_case.generate(req.into_inner()).await {
        Ok(outcome) => {
            tracing::info!(
                run_id = %outcome.run.run_id,
                test_cases = outcome.batch.test_cases.len(),
                "HTTP generate_test_cases succeeded"
            );
            HttpResponse::Ok().json(outcome.batch)
        }
        Err(e) => {
            tracing::error!(error = %e, "HTTP generate_test_cases failed");
            error_response(&e)
        }
    }
}

/// Runs extraction over a raw model response sent as the request body.
#[post("/extract")]
async fn extract_response(data: web::Data<HttpState>, body: web::Bytes) -> impl Responder {
    let raw = String::from_utf8_lossy(&body);
    let extraction = data.use_case.extract_response(&raw);

    if extraction.is_empty() {
        return HttpResponse::UnprocessableEntity().json(json!({
            "detail": "No test cases could be extracted from response"
        }));
    }

    let path = extraction.path;
    let skipped = extraction.skipped;
    HttpResponse::Ok().json(ExtractResponse {
        batch: extraction.into_batch(),
        path,
        skipped,
    })
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "healthy" }))
}

#[get("/")]
async fn root() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "FHIR test case generation service",
        "endpoints": ["POST /generate_test_cases", "POST /extract", "GET /health"]
    }))
}

fn error_response(err: &AppError) -> HttpResponse {
    let body = json!({ "detail": err.to_string() });
    match err {
        AppError::ValidationError(_) | AppError::ParseError(_) => {
            HttpResponse::BadRequest().json(body)
        }
        _ => HttpResponse::InternalServerError().json(body),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(generate_test_cases)
        .service(extract_response)
        .service(health)
        .service(root);
}

pub fn start_server(
    use_case: Arc<TestCaseGenerationUseCase>,
    host: &str,
    port: u16,
) -> std::io::Result<Server> {
    let state = web::Data::new(HttpState { use_case });

    let server = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((host, port))?
    .run();

    tracing::info!(host, port, "HTTP server listening");
    Ok(server)
}
