use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use ctxlog_context::Context;
use ctxlog_core::ids::RequestId;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Context key under which the request id is installed.
pub const REQUEST_ID_KEY: &str = "requestId";

/// Runs the rest of the stack with `{requestId}` installed as ambient context.
///
/// A valid inbound `x-request-id` is reused, anything else is replaced with a
/// generated id. The id is also stored in the request extensions and echoed on
/// the response.
pub async fn request_context(mut req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| RequestId::parse(v).ok())
        .unwrap_or_else(RequestId::generate);
    req.extensions_mut().insert(request_id.clone());

    let ctx = Context::new().with(REQUEST_ID_KEY, request_id.as_str());
    let mut response = ctxlog_context::run(ctx, next.run(req)).await;

    match HeaderValue::from_str(request_id.as_str()) {
        Ok(value) => {
            response.headers_mut().insert(X_REQUEST_ID, value);
        }
        Err(e) => tracing::warn!(error = %e, "request id is not a valid header value"),
    }
    response
}
