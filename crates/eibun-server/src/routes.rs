//! HTTP routes and error mapping.
//!
//! One POST endpoint runs the correction pipeline; every `CheckError`
//! variant maps onto an HTTP status in [`ApiError`]. Recoverable parse
//! failures never reach this layer — the normalizer resolves them to a
//! defaulted 200 first.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use eibun_core::error::{truncate_detail, CheckError};
use eibun_core::service::{self, GenerationPolicy};
use eibun_core::traits::TextGenerator;
use eibun_core::{CorrectionRequest, CorrectionResult};

/// Shared per-request context: the upstream backend and generation policy.
/// Nothing here is mutable between requests.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn TextGenerator>,
    pub policy: GenerationPolicy,
}

/// Build the router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/check", post(check).fallback(method_not_allowed))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorBody {
            error: "method not allowed".into(),
            details: None,
        }),
    )
        .into_response()
}

async fn check(
    State(state): State<AppState>,
    payload: Result<Json<CorrectionRequest>, JsonRejection>,
) -> Result<Json<CorrectionResult>, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError(CheckError::InvalidRequest(e.body_text())))?;
    let result = service::check(state.model.as_ref(), &request, &state.policy).await?;
    Ok(Json(result))
}

/// Error body returned for every non-200 response.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// Wrapper mapping [`CheckError`] onto HTTP responses.
pub struct ApiError(pub CheckError);

impl From<CheckError> for ApiError {
    fn from(err: CheckError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self.0 {
            CheckError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            CheckError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "server misconfigured".into(),
                Some(msg.clone()),
            ),
            CheckError::Upstream(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "upstream request failed".into(),
                Some(truncate_detail(&e.to_string())),
            ),
            CheckError::NormalizationFailed { raw } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                self.0.to_string(),
                (!raw.is_empty()).then(|| truncate_detail(raw)),
            ),
        };

        if status.is_server_error() {
            tracing::error!(%status, error = %self.0, "request failed");
        } else {
            tracing::warn!(%status, error = %self.0, "request rejected");
        }

        (status, Json(ErrorBody { error, details })).into_response()
    }
}
