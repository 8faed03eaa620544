use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use ctxlog_core::error::{CtxlogError, Result};
use tokio::net::TcpListener;

pub async fn serve<F>(addr: SocketAddr, router: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| CtxlogError::Io(format!("failed to bind {addr}: {e}")))?;
    serve_listener(listener, router, shutdown).await
}

pub async fn serve_listener<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::debug!(%addr, "http server accepting connections");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| CtxlogError::Internal(format!("HTTP server failed: {e}")))
}
