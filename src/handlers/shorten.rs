use crate::{directory::KEY_LEN, error::DirectoryError, AppState};
use askama::Template;
use async_trait::async_trait;
use axum::{
    extract::{Form, FromRequest, Query, Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

// ── Template structs ───────────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    key_len: usize,
}

// ── Request extraction ─────────────────────────────────────────────────────

#[derive(Deserialize)]
struct UrlParams {
    url: Option<String>,
}

/// The URL a client asked to shorten.
///
/// Taken from the `url` query parameter if present, then from the `url`
/// field of a urlencoded form body, and finally from the raw body text.
/// Surrounding whitespace (a trailing newline from a form or `curl`) is
/// trimmed here, before the directory sees the URL.
pub struct SubmittedUrl(pub String);

#[async_trait]
impl<S> FromRequest<S> for SubmittedUrl
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if let Ok(Query(UrlParams { url: Some(url) })) = Query::<UrlParams>::try_from_uri(req.uri())
        {
            return Ok(Self::trimmed(url));
        }

        if is_form(req.headers()) {
            let Form(params) = Form::<UrlParams>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            return Ok(Self::trimmed(params.url.unwrap_or_default()));
        }

        let body = String::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        Ok(Self::trimmed(body))
    }
}

impl SubmittedUrl {
    fn trimmed(url: String) -> Self {
        Self(url.trim().to_owned())
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"))
}

// ── Handlers ───────────────────────────────────────────────────────────────

/// GET /
/// Small HTML form that posts a `url` field back to `/`.
pub async fn index() -> Response {
    IndexTemplate { key_len: KEY_LEN }.into_response()
}

/// POST /
/// Store the submitted URL and answer `201 Created` with the short URL as
/// plain text. URLs that could never be sent back in a `Location` header
/// (control or non-ASCII characters) are refused with 400.
pub async fn create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    SubmittedUrl(url): SubmittedUrl,
) -> Result<Response, DirectoryError> {
    if HeaderValue::from_str(&url).is_err() {
        return Ok((
            StatusCode::BAD_REQUEST,
            "URL must not contain control or non-ASCII characters",
        )
            .into_response());
    }

    let key = state.directory.store(&url).await?;

    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok());
    let short_url = format!("{}/{}", state.config.short_url_base(host), key);
    tracing::info!("Created short link {}", short_url);

    Ok((StatusCode::CREATED, short_url).into_response())
}
