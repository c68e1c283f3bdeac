//! HTTP inference server
//!
//! Serves a loaded model read-only over Axum: `/ping` for liveness,
//! `/invocations` for predictions and `/metrics` for Prometheus scraping.

use crate::error::ForecastError;
use crate::metrics::collector::MetricsCollector;
use crate::rating::model::EloModel;
use crate::service::inference::{
    decode_request, encode_response, predict_request, JSON_CONTENT_TYPE,
};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Inference server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Host to bind to (typically "0.0.0.0" for all interfaces)
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
        }
    }
}

/// Shared state for request handlers
#[derive(Clone)]
pub struct ServerState {
    pub model: Arc<EloModel>,
    pub model_id: String,
    pub metrics_collector: Arc<MetricsCollector>,
}

pub struct InferenceServer {
    config: ServerConfig,
    state: ServerState,
    shutdown_tx: broadcast::Sender<()>,
}

impl InferenceServer {
    pub fn new(
        config: ServerConfig,
        model: Arc<EloModel>,
        model_id: impl Into<String>,
        metrics_collector: Arc<MetricsCollector>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            state: ServerState {
                model,
                model_id: model_id.into(),
                metrics_collector,
            },
            shutdown_tx,
        }
    }

    /// Bind and serve until `stop` is called
    pub async fn start(&self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .context("Invalid server address")?;

        let app = self.create_router();
        let listener = TcpListener::bind(addr).await?;

        info!(
            "Serving model {} on http://{}",
            self.state.model_id, addr
        );

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("Inference server shutdown signal received");
            })
            .await?;

        info!("Inference server stopped");
        Ok(())
    }

    fn create_router(&self) -> Router {
        Router::new()
            .route("/ping", get(ping_handler))
            .route("/invocations", post(invocations_handler))
            .route("/metrics", get(metrics_handler))
            .with_state(self.state.clone())
    }

    pub fn stop(&self) {
        if let Err(e) = self.shutdown_tx.send(()) {
            warn!("Failed to send shutdown signal to inference server: {}", e);
        }
    }
}

async fn ping_handler(State(state): State<ServerState>) -> impl IntoResponse {
    debug!("Ping requested");

    Json(json!({
        "status": "healthy",
        "model_id": state.model_id,
        "teams": state.model.store().entries().len(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn invocations_handler(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let timer = state.metrics_collector.start_timer();
    let content_type = header_str(&headers, header::CONTENT_TYPE).unwrap_or("");
    let accept = header_str(&headers, header::ACCEPT);

    let encoded = decode_request(&body, content_type).and_then(|request| {
        let response = predict_request(&state.model, &request);
        let body = encode_response(&response, accept)?;
        Ok((response, body))
    });

    match encoded {
        Ok((response, body)) => {
            let home_win: Vec<f64> = response
                .predictions()
                .iter()
                .map(|p| p.p_home_win)
                .collect();
            state
                .metrics_collector
                .record_predictions(&home_win, timer.stop());
            debug!("Served {} predictions", home_win.len());

            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)],
                body,
            )
                .into_response()
        }
        Err(e) => {
            let (status, reason) = classify_error(&e);
            state.metrics_collector.record_error(reason);
            if status.is_server_error() {
                error!("Invocation failed: {:#}", e);
            } else {
                warn!("Rejected invocation: {}", e);
            }

            (status, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// HTTP status and metric label for a failed invocation
fn classify_error(err: &anyhow::Error) -> (StatusCode, &'static str) {
    match err.downcast_ref::<ForecastError>() {
        Some(ForecastError::UnsupportedContentType { .. }) => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "unsupported_content_type",
        ),
        Some(ForecastError::UnsupportedAccept { .. }) => {
            (StatusCode::NOT_ACCEPTABLE, "unsupported_accept")
        }
        Some(ForecastError::InvalidRequest { .. }) => (StatusCode::BAD_REQUEST, "invalid_request"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
    }
}

async fn metrics_handler(State(state): State<ServerState>) -> Response {
    let metric_families = state.metrics_collector.registry().gather();
    let encoder = TextEncoder::new();

    match encoder.encode_to_string(&metric_families) {
        Ok(metrics_output) => {
            debug!("Serving {} metric families", metric_families.len());
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, encoder.format_type().to_string())],
                metrics_output,
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics".to_string(),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt; // for oneshot

    fn server() -> InferenceServer {
        let mut model = EloModel::new(ModelConfig::default()).unwrap();
        model.update("Arsenal", "Chelsea", 2, 0);
        let collector = Arc::new(MetricsCollector::new().expect("Failed to create collector"));
        InferenceServer::new(
            ServerConfig::default(),
            Arc::new(model),
            "test-model",
            collector,
        )
    }

    fn invocation(content_type: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/invocations")
            .header("content-type", content_type)
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ping_reports_model_id() {
        let app = server().create_router();

        let response = app
            .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["model_id"], "test-model");
        assert_eq!(json["teams"], 2);
    }

    #[tokio::test]
    async fn test_single_invocation() {
        let server = server();
        let app = server.create_router();

        let response = app
            .oneshot(invocation(
                "application/json",
                r#"{"home_team": "Arsenal", "away_team": "Chelsea"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let expected = server.state.model.predict("Arsenal", "Chelsea");
        assert_eq!(json["p_home_win"].as_f64().unwrap(), expected.p_home_win);
        assert_eq!(server.state.metrics_collector.predictions_total.get(), 1);
    }

    #[tokio::test]
    async fn test_batch_invocation() {
        let app = server().create_router();

        let response = app
            .oneshot(invocation(
                "application/json; charset=utf-8",
                r#"[{"home_team": "Arsenal", "away_team": "Chelsea"},
                    {"home_team": "Promoted FC", "away_team": "Arsenal"}]"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let predictions = json.as_array().unwrap();
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[1]["r_home"].as_f64().unwrap(), 1500.0);
    }

    #[tokio::test]
    async fn test_unsupported_content_type() {
        let server = server();
        let app = server.create_router();

        let response = app
            .oneshot(invocation("text/csv", "Arsenal,Chelsea"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(
            server
                .state
                .metrics_collector
                .invocation_errors_total
                .with_label_values(&["unsupported_content_type"])
                .get(),
            1
        );
    }

    #[tokio::test]
    async fn test_unsupported_accept() {
        let app = server().create_router();

        let request = Request::builder()
            .method("POST")
            .uri("/invocations")
            .header("content-type", "application/json")
            .header("accept", "text/csv")
            .body(Body::from(r#"{"home_team": "A", "away_team": "B"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let app = server().create_router();

        let response = app
            .oneshot(invocation("application/json", r#"{"home_team": "A""#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let server = server();
        server
            .state
            .metrics_collector
            .record_predictions(&[0.55], std::time::Duration::from_millis(1));
        let app = server.create_router();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get("content-type").unwrap();
        assert!(content_type.to_str().unwrap().contains("text/plain"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("wsl_forecast_predictions_generated_total 1"));
    }

    #[tokio::test]
    async fn test_404_handling() {
        let app = server().create_router();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
