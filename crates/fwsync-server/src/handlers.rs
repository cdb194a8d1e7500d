use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::json;

use fwsync_engine::EngineError;

use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
}

pub async fn root() -> impl IntoResponse {
    let body = json!({
        "service": "fwsync",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

pub async fn readyz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ready" }))
}

/// The HTTP trigger: runs one reconciliation invocation.
///
/// 200 with a summary when everything applied; 500 with detail otherwise. A
/// partial mutation failure is still a 500 - a converged target or two must
/// never read as overall success - but by then the succeeding operations have
/// been applied and the next invocation picks up the remainder.
pub async fn update_firewall_rules(State(state): State<AppState>) -> impl IntoResponse {
    match state.reconciler.run().await {
        Ok(summary) => (
            StatusCode::OK,
            Json(json!({"status": "ok", "summary": summary})),
        ),
        Err(err) => {
            if let EngineError::Apply { failures, .. } = &err {
                for failure in failures {
                    tracing::error!(
                        target = %failure.target,
                        operation = %failure.operation,
                        error = %failure.error,
                        "operation failed"
                    );
                }
            }
            tracing::error!(error = %err, "reconciliation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"status": "error", "message": err.to_string()})),
            )
        }
    }
}
