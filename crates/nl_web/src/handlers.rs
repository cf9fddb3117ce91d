use crate::poll::{poll_until_terminal, PollOutcome};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use nl_core::{NewsletterParams, RunStatus};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};
use url::Url;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
}

fn validate(request: &GenerateRequest) -> Result<(), String> {
    if request.interests.is_empty() {
        return Err("Please provide at least one interest".to_string());
    }
    if request.sources.is_empty() {
        return Err("Please provide at least one source".to_string());
    }
    for source in &request.sources {
        if Url::parse(source).is_err() {
            return Err(format!("Invalid URL {}", source));
        }
    }
    Ok(())
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Submission endpoint: validate, create a run, then poll it on the
/// client's behalf until it finishes or the budget runs out.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    if let Err(message) = validate(&request) {
        return error_response(StatusCode::BAD_REQUEST, &message);
    }

    info!(
        "creating run for interests: {}",
        request.interests.join(", ")
    );
    let params = NewsletterParams {
        interests: request.interests,
        sources: request.sources,
    };
    let run = match state.service.create_instance(params).await {
        Ok(run) => run,
        Err(e) => {
            error!("failed to create run: {}", e);
            return error_response(
                StatusCode::GATEWAY_TIMEOUT,
                "Failed to generate newsletter. Please try again.",
            );
        }
    };

    match poll_until_terminal(&state.service, &run.id, &state.poll).await {
        PollOutcome::Complete(newsletter) => (
            StatusCode::OK,
            [(header::CACHE_CONTROL, "no-cache")],
            Json(newsletter),
        )
            .into_response(),
        PollOutcome::Failed => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Newsletter generation failed. Please try again.",
        ),
        PollOutcome::TimedOut => (
            StatusCode::GATEWAY_TIMEOUT,
            Json(json!({
                "error": "Newsletter generation is taking longer than expected. Please try again with fewer sources.",
                "id": run.id,
            })),
        )
            .into_response(),
    }
}

/// Create a run without waiting on it; callers poll out-of-band.
pub async fn create_run(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    if let Err(message) = validate(&request) {
        return error_response(StatusCode::BAD_REQUEST, &message);
    }
    let params = NewsletterParams {
        interests: request.interests,
        sources: request.sources,
    };
    match state.service.create_instance(params).await {
        Ok(run) => Json(run).into_response(),
        Err(e) => {
            error!("failed to create run: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate newsletter. Please try again.",
            )
        }
    }
}

pub async fn run_status(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.service.get_instance(&id).await {
        Ok(run) => Json(run).into_response(),
        Err(_) => error_response(StatusCode::NOT_FOUND, "run not found"),
    }
}

pub async fn run_result(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let run = match state.service.get_instance(&id).await {
        Ok(run) => run,
        Err(_) => return error_response(StatusCode::NOT_FOUND, "run not found"),
    };
    if run.status != RunStatus::Complete {
        return error_response(
            StatusCode::CONFLICT,
            &format!("run {} is not complete, status: {}", id, run.status),
        );
    }
    match state.service.get_result(&id).await {
        Ok(newsletter) => (
            StatusCode::OK,
            [(header::CACHE_CONTROL, "no-cache")],
            Json(newsletter),
        )
            .into_response(),
        Err(e) => {
            error!("result lookup failed for run {}: {}", id, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "run completed but result not found in storage",
            )
        }
    }
}
