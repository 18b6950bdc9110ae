use crate::{directory::has_scheme, error::DirectoryError, AppState};
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// GET /:key
///
/// 1. Resolve the key (404 when unknown).
/// 2. Refuse targets that are not plain http(s) URLs or that cannot be
///    carried in a header.
/// 3. Return a 307 redirect to the stored target.
pub async fn redirect(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response, DirectoryError> {
    let target = state.directory.resolve(&key).await?;

    if !has_scheme(&target) {
        tracing::warn!("Refusing to redirect '{}' to '{}': no http(s) scheme", key, target);
        return Ok((StatusCode::BAD_REQUEST, "Stored URL has no http(s) scheme").into_response());
    }

    let location = match HeaderValue::from_str(&target) {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!("Refusing to redirect '{}': target is not a valid header value", key);
            return Ok((
                StatusCode::BAD_REQUEST,
                "Stored URL cannot be sent as a redirect Location header",
            )
                .into_response());
        }
    };

    Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response())
}
