pub mod redirect;
pub mod shorten;

use axum::http::StatusCode;

/// Fallback for any method a route does not handle.
pub async fn method_not_allowed() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}
