/**
 * Health Routes
 * Liveness and readiness of the backend
 */
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::state::AppState;

// Track server start time for uptime calculation
lazy_static::lazy_static! {
    static ref SERVER_START: Instant = Instant::now();
}

/// Initialize the server start time
pub fn init_start_time() {
    lazy_static::initialize(&SERVER_START);
}

/// Simple health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Single service check result
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCheck {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Ready check response
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uptime: u64,
    pub database: ServiceCheck,
}

/// GET /api/health - liveness only, never touches the store
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Server is running".to_string(),
    })
}

/// GET /api/health/ready - 503 until the store answers
pub async fn health_ready(State(state): State<AppState>) -> impl IntoResponse {
    let database = match state.store.health_check().await {
        Ok(duration) => ServiceCheck {
            status: "healthy".to_string(),
            response_time: Some(duration.as_millis() as u64),
            error: None,
        },
        Err(e) => {
            tracing::warn!("Readiness check failed: {}", e);
            ServiceCheck {
                status: "unhealthy".to_string(),
                response_time: None,
                error: Some("database unavailable".to_string()),
            }
        }
    };

    let ready = database.status == "healthy";
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadyResponse {
            status: if ready { "ready" } else { "not ready" }.to_string(),
            timestamp: Utc::now(),
            uptime: SERVER_START.elapsed().as_secs(),
            database,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{send, test_app};
    use axum::{body::Body, http::Request};

    #[tokio::test]
    async fn test_health_returns_ok() {
        let t = test_app().await;
        let (status, body) = send(&t.app, Request::get("/api/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
        assert_eq!(body["message"], "Server is running");
    }

    #[tokio::test]
    async fn test_ready_with_open_store() {
        init_start_time();
        let t = test_app().await;
        let (status, body) = send(&t.app, Request::get("/api/health/ready").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
        assert_eq!(body["database"]["status"], "healthy");
    }

    #[tokio::test]
    async fn test_not_ready_after_store_closed() {
        let t = test_app().await;
        t.state.store.close().await;
        let (status, body) = send(&t.app, Request::get("/api/health/ready").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "not ready");
    }

    #[test]
    fn test_service_check_skips_empty_fields() {
        let check = ServiceCheck {
            status: "healthy".to_string(),
            response_time: None,
            error: None,
        };
        assert_eq!(serde_json::to_string(&check).unwrap(), r#"{"status":"healthy"}"#);
    }
}
