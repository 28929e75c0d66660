//! # REST Adapter
//!
//! | Method | Path | Success | Empty | Errors |
//! |--------|------|---------|-------|--------|
//! | POST | `/rest/words` | `200 {"msgCount": n}` | - | `400` bad input, `500`/`503` broker |
//! | GET | `/rest/wordsuppercase` | `200 {"word", "backend"}` | `204` | `500`/`503` |
//! | GET | `/health` | `200 {"status": "ok"}` | - | - |

use crate::ports::WorkFrontendApi;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use shared_types::{OffloadError, SubmitRequest, SubmitResponse};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    api: Arc<dyn WorkFrontendApi>,
}

/// Build the REST router for a front-end.
pub fn router(api: Arc<dyn WorkFrontendApi>) -> Router {
    Router::new()
        .route("/rest/words", post(submit_words))
        .route("/rest/wordsuppercase", get(check_for_results))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { api })
}

/// Serve the REST surface on `listener` until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    api: Arc<dyn WorkFrontendApi>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(addr = %listener.local_addr()?, "Starting HTTP server");
    axum::serve(listener, router(api))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn submit_words(State(state): State<AppState>, body: String) -> Response {
    let request: SubmitRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            return error_response(&OffloadError::InvalidInput(format!(
                "Parse error: {e}"
            )))
        }
    };

    match state.api.submit(request.words.as_deref()).await {
        Ok(receipt) => Json(SubmitResponse {
            msg_count: receipt.item_count,
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

async fn check_for_results(State(state): State<AppState>) -> Response {
    match state.api.poll().await {
        Ok(Some(result)) => Json(result).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// HTTP status for a protocol error.
pub fn status_for(error: &OffloadError) -> StatusCode {
    match error {
        OffloadError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        OffloadError::BrokerUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        OffloadError::MalformedMessage(_)
        | OffloadError::PublishFailed { .. }
        | OffloadError::SubscriptionInitFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: &OffloadError) -> Response {
    let status = status_for(error);
    warn!(status = status.as_u16(), error = %error, "Request failed");
    (
        status,
        Json(serde_json::json!({ "error": error.to_string() })),
    )
        .into_response()
}
