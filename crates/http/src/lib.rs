pub mod middleware;
pub mod routes;
pub mod server;

pub use middleware::{REQUEST_ID_KEY, X_REQUEST_ID, request_context};
pub use routes::{HttpState, router};
pub use server::{serve, serve_listener};
