use super::types::{Base64ImageIn, ErrorResponse, HealthResponse, ImageUrlIn};
use crate::{
    Error, Result,
    classify::{self, Classification, ClassificationRequest},
    grading::{self, GradingRequest, GradingResult, Script},
    llm::VisionClient,
};
use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request, State, rejection::JsonRejection},
    http::{StatusCode, header::CONTENT_TYPE},
    response::Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

type ApiResult<T> = std::result::Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

const MISSING_CLASSIFY_IMAGE: &str = "Provide either an uploaded file or JSON with image_base64";

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<dyn VisionClient>,
}

impl AppState {
    pub fn new(client: Arc<dyn VisionClient>) -> Self {
        Self { client }
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn grade_kanji(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GradingRequest>, JsonRejection>,
) -> ApiResult<GradingResult> {
    grade_script(state, Script::Kanji, payload).await
}

pub async fn grade_katakana(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GradingRequest>, JsonRejection>,
) -> ApiResult<GradingResult> {
    grade_script(state, Script::Katakana, payload).await
}

pub async fn grade_hiragana(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GradingRequest>, JsonRejection>,
) -> ApiResult<GradingResult> {
    grade_script(state, Script::Hiragana, payload).await
}

async fn grade_script(
    state: AppState,
    script: Script,
    payload: std::result::Result<Json<GradingRequest>, JsonRejection>,
) -> ApiResult<GradingResult> {
    let request_id = Uuid::new_v4();
    let Json(request) = payload.map_err(|e| error_response(request_id, from_json_rejection(e)))?;
    info!(
        "[{}] Received {} grading request for: {}",
        request_id,
        script,
        request.target_word.as_deref().unwrap_or("<missing>")
    );

    match grading::grade(state.client.as_ref(), script, &request).await {
        Ok(result) => {
            info!(
                "[{}] {} graded, correct: {}",
                request_id, script, result.correct
            );
            Ok(Json(result))
        }
        Err(e) => Err(error_response(request_id, e)),
    }
}

/// Accepts a multipart upload (field `file`) or a JSON body `{image_base64}`.
pub async fn classify_image(State(state): State<AppState>, request: Request) -> ApiResult<Classification> {
    let request_id = Uuid::new_v4();
    info!("[{}] Received classification request", request_id);

    let outcome = async {
        let request = read_classification_request(request).await?;
        classify::classify(state.client.as_ref(), request).await
    }
    .await;

    respond_classification(request_id, outcome)
}

pub async fn classify_url(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ImageUrlIn>, JsonRejection>,
) -> ApiResult<Classification> {
    let request_id = Uuid::new_v4();
    info!("[{}] Received URL classification request", request_id);

    let Json(body) = payload.map_err(|e| error_response(request_id, from_json_rejection(e)))?;

    let url = body.image_url.unwrap_or_default();
    let outcome = classify::classify(state.client.as_ref(), ClassificationRequest::Url(url)).await;

    respond_classification(request_id, outcome)
}

fn respond_classification(
    request_id: Uuid,
    outcome: Result<Classification>,
) -> ApiResult<Classification> {
    match outcome {
        Ok(classification) => {
            info!(
                "[{}] Classified image, label: {:?}",
                request_id, classification.label
            );
            Ok(Json(classification))
        }
        Err(e) => Err(error_response(request_id, e)),
    }
}

async fn read_classification_request(request: Request) -> Result<ClassificationRequest> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));

    if is_multipart {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| Error::rejected(e.status().as_u16(), e.body_text()))?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| Error::rejected(e.status().as_u16(), e.body_text()))?
        {
            if field.name() != Some("file") && field.file_name().is_none() {
                continue;
            }
            let filename = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| Error::rejected(e.status().as_u16(), e.body_text()))?;
            return Ok(ClassificationRequest::Upload {
                bytes: bytes.to_vec(),
                filename,
            });
        }

        return Err(Error::invalid_input(MISSING_CLASSIFY_IMAGE));
    }

    let body = Bytes::from_request(request, &())
        .await
        .map_err(|e| Error::rejected(e.status().as_u16(), e.body_text()))?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::invalid_input(MISSING_CLASSIFY_IMAGE));
    }

    let payload: Base64ImageIn = serde_json::from_slice(&body)
        .map_err(|e| Error::invalid_input(format!("Invalid JSON body: {}", e)))?;

    match payload.image_base64 {
        Some(encoded) if !encoded.trim().is_empty() => Ok(ClassificationRequest::Base64(encoded)),
        _ => Err(Error::invalid_input(MISSING_CLASSIFY_IMAGE)),
    }
}

fn from_json_rejection(rejection: JsonRejection) -> Error {
    Error::rejected(rejection.status().as_u16(), rejection.body_text())
}

fn error_response(request_id: Uuid, e: Error) -> (StatusCode, Json<ErrorResponse>) {
    let (status, detail) = match &e {
        Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, None),
        Error::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, None),
        Error::Upstream { status, body } => (
            StatusCode::BAD_GATEWAY,
            Some(json!({ "status_code": status, "body": body })),
        ),
        Error::Network(err) if err.is_timeout() => (StatusCode::GATEWAY_TIMEOUT, None),
        Error::Network(_) | Error::OpenAi(_) => (StatusCode::BAD_GATEWAY, None),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, None),
    };

    if status.is_client_error() {
        warn!("[{}] Rejected request: {}", request_id, e);
    } else {
        error!("[{}] Failed to process request: {}", request_id, e);
    }

    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
            detail,
        }),
    )
}
