use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use ctxlog_core::Level;
use ctxlog_http::{X_REQUEST_ID, router};
use ctxlog_logger::ContextLayer;
use serde_json::{Value, json};
use testkit::capture_logger;
use tower::ServiceExt;
use tracing_subscriber::layer::SubscriberExt;

async fn body_json(response: axum::response::Response) -> anyhow::Result<Value> {
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn health_returns_ok_and_generates_request_id() -> anyhow::Result<()> {
    let (logger, sink) = capture_logger(Level::Debug);
    let app = router(logger);

    let response = app
        .oneshot(Request::get("/health").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let request_id = response
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_default();
    assert_eq!(request_id.len(), 36);
    assert_eq!(body_json(response).await?, json!({"status": "ok"}));

    let lines = sink.json_lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["msg"], "health check");
    assert_eq!(lines[0]["requestId"], request_id.as_str());
    Ok(())
}

#[tokio::test]
async fn inbound_request_id_is_reused() -> anyhow::Result<()> {
    let (logger, _sink) = capture_logger(Level::Info);
    let response = router(logger)
        .oneshot(
            Request::get("/context")
                .header("x-request-id", "my-request-id")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(
        response.headers().get(&X_REQUEST_ID).map(|v| v.as_bytes()),
        Some(&b"my-request-id"[..])
    );
    assert_eq!(body_json(response).await?, json!({"requestId": "my-request-id"}));
    Ok(())
}

#[tokio::test]
async fn invalid_request_id_is_replaced() -> anyhow::Result<()> {
    let (logger, _sink) = capture_logger(Level::Info);
    let too_long = "a".repeat(200);
    let response = router(logger)
        .oneshot(
            Request::get("/context")
                .header("x-request-id", too_long.as_str())
                .body(Body::empty())?,
        )
        .await?;
    let body = body_json(response).await?;
    let id = body["requestId"].as_str().unwrap_or_default();
    assert_ne!(id, too_long);
    assert_eq!(id.len(), 36);
    Ok(())
}

#[tokio::test]
async fn put_config_merges_by_default() -> anyhow::Result<()> {
    let (logger, sink) = capture_logger(Level::Info);
    let app = router(logger.clone());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::PUT)
                .uri("/logger/config")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"prettyPrint":false,"level":"warn"}"#))?,
        )
        .await?;
    assert_eq!(
        body_json(response).await?,
        json!({"level": "warn", "prettyPrint": false})
    );
    // Reconfigured to warn before the info notice was emitted.
    assert!(sink.is_empty());

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::PUT)
                .uri("/logger/config")
                .body(Body::from(r#"{"prettyPrint":true}"#))?,
        )
        .await?;
    assert_eq!(
        body_json(response).await?,
        json!({"level": "warn", "prettyPrint": true})
    );
    assert_eq!(logger.config().level, Level::Warn);
    Ok(())
}

#[tokio::test]
async fn put_config_replace_resets_unspecified_fields() -> anyhow::Result<()> {
    let (logger, sink) = capture_logger(Level::Error);
    let response = router(logger)
        .oneshot(
            Request::builder()
                .method(Method::PUT)
                .uri("/logger/config?replace=true")
                .body(Body::from(r#"{"prettyPrint":false}"#))?,
        )
        .await?;
    assert_eq!(
        body_json(response).await?,
        json!({"level": "info", "prettyPrint": false})
    );
    let lines = sink.json_lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["msg"], "logger reconfigured");
    assert_eq!(lines[0]["replace"], true);
    assert!(lines[0]["requestId"].is_string());
    Ok(())
}

#[tokio::test]
async fn malformed_config_body_changes_nothing() -> anyhow::Result<()> {
    let (logger, _sink) = capture_logger(Level::Warn);
    let response = router(logger.clone())
        .oneshot(
            Request::builder()
                .method(Method::PUT)
                .uri("/logger/config")
                .body(Body::from("not json"))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(logger.config().level, Level::Warn);
    Ok(())
}

#[tokio::test]
async fn reset_restores_defaults() -> anyhow::Result<()> {
    let (logger, _sink) = capture_logger(Level::Fatal);
    let response = router(logger)
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/logger/reset")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(
        body_json(response).await?,
        json!({"level": "info", "prettyPrint": false})
    );
    Ok(())
}

#[tokio::test]
async fn reset_route_events_keep_request_id() -> anyhow::Result<()> {
    let (logger, sink) = capture_logger(Level::Warn);
    let subscriber = tracing_subscriber::registry().with(ContextLayer::new(logger.clone()));
    let _default = tracing::subscriber::set_default(subscriber);
    let app = router(logger);

    for request in [
        Request::get("/health")
            .header("x-request-id", "reset-id")
            .body(Body::empty())?,
        Request::builder()
            .method(Method::POST)
            .uri("/logger/reset")
            .header("x-request-id", "reset-id")
            .body(Body::empty())?,
    ] {
        let response = app.clone().oneshot(request).await?;
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Only the reset request's trace events pass the warn level it lowers to info.
    let lines = sink.json_lines();
    assert!(
        lines
            .iter()
            .any(|l| l["msg"] == "finished processing request")
    );
    let missing: Vec<_> = lines.iter().filter(|l| l["requestId"] != "reset-id").collect();
    assert!(missing.is_empty(), "records without requestId: {missing:?}");
    Ok(())
}
