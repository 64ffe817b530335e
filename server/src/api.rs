use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{get, http::StatusCode, post, web, HttpResponse, Responder, ResponseError};
use hmmtag::{
    corpus,
    evaluation::{self, viterbi_decode},
    hmm,
    speaking::{self, ConversationScore, Message},
    ModelState, ScoreError, Snapshot, StringTable,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

pub struct AppState {
    pub model: ModelState,
    pub workers: usize,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Service not initialized")]
    NotInitialized,
    #[error("{0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotInitialized => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "detail": self.to_string() }))
    }
}

impl AppState {
    fn snapshot(&self) -> Result<Arc<Snapshot>, ApiError> {
        self.model.snapshot().filter(|s| !s.vocab.is_empty()).ok_or(ApiError::NotInitialized)
    }
}

#[derive(Debug, Deserialize)]
pub struct SentenceInput {
    pub words: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TagOutput {
    pub words: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SpeakingInput {
    pub user_answer: String,
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct ConversationInput {
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct ConversationOutput {
    success: bool,
    #[serde(flatten)]
    score: ConversationScore,
}

#[get("/")]
async fn home() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "OK" }))
}

#[get("/health")]
async fn health(state: web::Data<AppState>) -> impl Responder {
    let snapshot = state.model.snapshot();
    let tags = snapshot.as_ref().map_or(0, |s| s.vocab.len());
    HttpResponse::Ok().json(json!({
        "status": if tags > 0 { "ok" } else { "degraded" },
        "details": {
            "corpus_loaded": snapshot.is_some(),
            "tags_available": tags,
        }
    }))
}

#[post("/tag")]
async fn tag(state: web::Data<AppState>, input: web::Json<SentenceInput>) -> Result<impl Responder, ApiError> {
    let snapshot = state.snapshot()?;
    let SentenceInput { words } = input.into_inner();
    let (words, tags) = web::block(move || {
        let tags = hmm::decode(&words, &snapshot.vocab, &snapshot.stats);
        (words, tags)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(web::Json(TagOutput { words, tags }))
}

#[get("/accuracy")]
async fn accuracy(state: web::Data<AppState>) -> Result<impl Responder, ApiError> {
    let snapshot = state.snapshot()?;
    let path = state.model.corpus_path().to_path_buf();
    let workers = state.workers;
    let accuracy = web::block(move || -> Result<f64, ApiError> {
        let sentences = corpus::read_corpus(&path).map_err(|e| ApiError::Internal(e.to_string()))?;
        Ok(evaluation::evaluate(viterbi_decode, &sentences, &snapshot.stats, &snapshot.vocab, workers))
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?
    .map_err(|e| {
        log::error!("accuracy calculation failed: {e}");
        e
    })?;
    Ok(HttpResponse::Ok().json(json!({ "accuracy": accuracy })))
}

#[post("/evaluate-speaking")]
async fn evaluate_speaking(state: web::Data<AppState>, input: web::Json<SpeakingInput>) -> Result<impl Responder, ApiError> {
    let snapshot = state.snapshot()?;
    let SpeakingInput { user_answer, question } = input.into_inner();
    let body = web::block(move || match speaking::score_answer(&question, &user_answer, &snapshot.stats, &snapshot.vocab) {
        Ok(score) => serde_json::to_value(score).map_err(|e| ApiError::Internal(e.to_string())),
        Err(e) => {
            log::info!("answer not scored: {e}");
            Ok(score_error_body(&e))
        }
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(body))
}

fn score_error_body(e: &ScoreError) -> serde_json::Value {
    let mut body = json!({ "error": e.to_string(), "final_score": 0.0 });
    match e {
        ScoreError::NotAQuestion(_) => {
            body["suggestion"] = json!("Make sure the first parameter is a question (e.g., 'Where are you from?')");
        }
        ScoreError::UnknownKeyword(_) => {
            body["available_keywords"] = json!(speaking::available_keywords());
        }
        _ => {}
    }
    body
}

#[post("/evaluate-conversation")]
async fn evaluate_conversation(state: web::Data<AppState>, input: web::Json<ConversationInput>) -> Result<impl Responder, ApiError> {
    let snapshot = state.snapshot()?;
    let ConversationInput { messages } = input.into_inner();
    let body = web::block(move || match speaking::score_conversation(&messages, &snapshot.stats, &snapshot.vocab) {
        Ok(score) => serde_json::to_value(ConversationOutput { success: true, score }).map_err(|e| ApiError::Internal(e.to_string())),
        Err(e) => {
            log::error!("conversation evaluation error: {e}");
            Ok(json!({
                "success": false,
                "error": e.to_string(),
                "average_similarity": 0,
                "average_grammar": 0,
                "final_score": 0,
            }))
        }
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(body))
}

#[post("/reload")]
async fn reload(state: web::Data<AppState>) -> Result<impl Responder, ApiError> {
    let snapshot = state.model.reload().map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "ok",
        "tags_available": snapshot.vocab.len(),
        "total_words": snapshot.stats.total_words,
    })))
}

/// Browser front-ends call the service from any origin.
pub fn cors() -> Cors {
    Cors::permissive()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(home)
        .service(health)
        .service(tag)
        .service(accuracy)
        .service(evaluate_speaking)
        .service(evaluate_conversation)
        .service(reload);
}
