//! HTTP status endpoints.
//!
//! - `GET /health`: 200 while the intent source is connected, 503 otherwise
//! - `GET /status`: listener and quote generation counters as JSON

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde::Serialize;
use solver_core::{QuoteGenerator, QuoteStats};
use solver_discovery::{IntentListener, ListenerStatus};
use solver_types::{now_ms, TimestampMs};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Combined status served on `/status`.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
	pub name: String,
	pub listener: ListenerStatus,
	pub quotes: QuoteStats,
	pub timestamp: TimestampMs,
}

#[derive(Clone)]
pub struct AppState {
	pub name: String,
	pub generator: Arc<QuoteGenerator>,
	pub listener: Arc<IntentListener>,
}

impl AppState {
	pub fn status(&self) -> ServiceStatus {
		ServiceStatus {
			name: self.name.clone(),
			listener: self.listener.get_status(),
			quotes: self.generator.get_stats(),
			timestamp: now_ms(),
		}
	}
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health_check))
		.route("/status", get(get_status))
		.with_state(state)
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
}

/// Serves the status endpoints on `listener` until the task is aborted.
pub async fn serve_on(listener: tokio::net::TcpListener, state: AppState) -> anyhow::Result<()> {
	axum::serve(listener, router(state)).await?;
	Ok(())
}

pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
	let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
	info!("Status server listening on port {}", port);
	serve_on(listener, state).await
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
	let connection = state.listener.state();
	let (code, status) = if state.listener.is_connected() {
		(StatusCode::OK, "healthy")
	} else {
		(StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
	};

	(
		code,
		Json(serde_json::json!({
			"status": status,
			"connection": connection,
		})),
	)
}

async fn get_status(State(state): State<AppState>) -> Json<ServiceStatus> {
	Json(state.status())
}
