use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use ctxlog_core::{LoggerConfig, PartialConfig};
use ctxlog_logger::Logger;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::middleware::request_context;

#[derive(Clone)]
pub struct HttpState {
    pub logger: Arc<Logger>,
}

pub fn router(logger: Arc<Logger>) -> Router {
    let state = HttpState { logger };
    Router::new()
        .route("/health", get(health))
        .route("/context", get(current_context))
        .route("/logger/config", get(get_config).put(put_config))
        .route("/logger/reset", post(reset))
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(request_context))
        .with_state(state)
}

async fn health(State(state): State<HttpState>) -> Json<Value> {
    state.logger.debug("health check");
    Json(json!({"status": "ok"}))
}

async fn current_context() -> Json<Value> {
    let ctx = ctxlog_context::current().unwrap_or_default();
    Json(Value::Object(ctx.fields().as_map().clone()))
}

async fn get_config(State(state): State<HttpState>) -> Json<LoggerConfig> {
    Json(state.logger.config())
}

#[derive(Debug, Default, Deserialize)]
struct ConfigureParams {
    #[serde(default)]
    replace: bool,
}

async fn put_config(
    State(state): State<HttpState>,
    Query(params): Query<ConfigureParams>,
    body: Bytes,
) -> Json<LoggerConfig> {
    let raw = serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null);
    let partial = PartialConfig::from_value_lossy(&raw);
    let next = state.logger.configure(partial, params.replace);
    state.logger.info_with(
        "logger reconfigured",
        json!({"replace": params.replace, "config": next}),
    );
    Json(next)
}

async fn reset(State(state): State<HttpState>) -> Json<LoggerConfig> {
    state.logger.reset();
    Json(state.logger.config())
}
