use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::models::{
    error_codes, AnalyzeRequest, ApiError, DocumentParams, HealthResponse, RegisterResponse,
};
use super::AppState;
use crate::analysis::Assessment;
use crate::auth::{AuthError, LoginRequest, LoginResponse, RegisterRequest, UserProfile};
use crate::error::AnalysisError;
use crate::metrics::METRICS;
use crate::report::report_file_name;

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

fn analysis_failure(err: AnalysisError) -> (StatusCode, Json<ApiError>) {
    let status = match &err {
        AnalysisError::NoContent => StatusCode::BAD_REQUEST,
        AnalysisError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AnalysisError::Labeler(_) => StatusCode::BAD_GATEWAY,
    };
    if status.is_server_error() {
        error!("Analysis failed: {}", err);
    } else {
        warn!("Analysis rejected: {}", err);
    }
    (status, Json(ApiError::new(err.code(), err.to_string())))
}

/// Reject a supplied contract value that is negative or not finite
fn validate_contract_value(value: Option<f64>) -> ApiResult<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => {
            warn!("Rejected contract value {}", v);
            Err((
                StatusCode::BAD_REQUEST,
                Json(ApiError::new(
                    error_codes::VALIDATION_ERROR,
                    "contractValue must be a non-negative number",
                )),
            ))
        }
        _ => Ok(()),
    }
}

fn auth_failure(err: AuthError) -> (StatusCode, Json<ApiError>) {
    let status = match &err {
        AuthError::UserExists | AuthError::Validation(_) => StatusCode::BAD_REQUEST,
        AuthError::InvalidCredentials | AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
    };
    (status, Json(ApiError::new(err.code(), err.to_string())))
}

fn report_failure(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    METRICS.record_report(false);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::new(error_codes::REPORT_FAILED, message)),
    )
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /metrics
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        METRICS.gather_text(),
    )
}

/// Analyze contract text
///
/// POST /api/v1/analyze
pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<Json<Assessment>> {
    validate_contract_value(request.contract_value)?;

    let assessment = state
        .analyzer
        .analyze(&request.text, request.contract_value)
        .await
        .map_err(analysis_failure)?;

    Ok(Json(assessment))
}

/// Extract text from an uploaded document and analyze it
///
/// POST /api/v1/analyze/document
pub async fn analyze_document(
    State(state): State<AppState>,
    Query(params): Query<DocumentParams>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Assessment>> {
    validate_contract_value(params.contract_value)?;

    let start = Instant::now();
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    info!("Document upload: {} bytes ({})", body.len(), content_type);

    let text = state
        .extractor
        .extract(body, &content_type)
        .await
        .map_err(|e| {
            METRICS.record_analysis("extraction_failed", start.elapsed().as_secs_f64(), 0, None);
            analysis_failure(AnalysisError::from(e))
        })?;

    let assessment = state
        .analyzer
        .analyze(&text, params.contract_value)
        .await
        .map_err(analysis_failure)?;

    Ok(Json(assessment))
}

/// Render an assessment and return the document as an attachment
///
/// POST /api/v1/reports
pub async fn render_report(
    State(state): State<AppState>,
    Json(assessment): Json<Assessment>,
) -> ApiResult<Response> {
    let renderer = state.renderer.clone();
    let file_name = report_file_name(&Utc::now(), renderer.extension());
    // File names only have second resolution.
    let path = state
        .report_dir
        .join(Uuid::new_v4().to_string())
        .join(&file_name);

    let render_path = path.clone();
    tokio::task::spawn_blocking(move || renderer.render(&assessment, &render_path))
        .await
        .map_err(|e| {
            error!("Report task failed: {}", e);
            report_failure("Report rendering was interrupted")
        })?
        .map_err(|e| {
            error!("Report rendering failed: {}", e);
            report_failure(e.to_string())
        })?;

    let document = tokio::fs::read(&path).await.map_err(|e| {
        error!("Failed to read rendered report {}: {}", path.display(), e);
        report_failure(e.to_string())
    })?;

    METRICS.record_report(true);
    info!("Rendered report {}", file_name);

    Ok((
        [
            (header::CONTENT_TYPE, state.renderer.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        document,
    )
        .into_response())
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    match state.auth.register(request).await {
        Ok(user) => {
            METRICS.record_auth("register", true);
            Ok((
                StatusCode::CREATED,
                Json(RegisterResponse {
                    message: "User registered successfully".to_string(),
                    user,
                }),
            ))
        }
        Err(e) => {
            METRICS.record_auth("register", false);
            Err(auth_failure(e))
        }
    }
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    match state.auth.login(request).await {
        Ok(response) => {
            METRICS.record_auth("login", true);
            Ok(Json(response))
        }
        Err(e) => {
            METRICS.record_auth("login", false);
            Err(auth_failure(e))
        }
    }
}

/// Resolve the bearer token of the request to its user
///
/// GET /api/v1/auth/me
pub async fn current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<UserProfile>> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| auth_failure(AuthError::InvalidToken("missing bearer token".to_string())))?;

    match state.auth.verify(token.trim()).await {
        Ok(user) => {
            METRICS.record_auth("verify", true);
            Ok(Json(user))
        }
        Err(e) => {
            METRICS.record_auth("verify", false);
            Err(auth_failure(e))
        }
    }
}
