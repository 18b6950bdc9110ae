use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Everything that can go wrong while storing or resolving a short link.
///
/// Each error is terminal for the request that produced it and never leaves
/// the directory in a partially updated state.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The submitted URL or the requested key was empty.
    #[error("input must not be empty")]
    EmptyInput,

    /// The operating system's secure random source failed.
    #[error("secure random source unavailable: {0}")]
    RandomnessFailure(#[from] rand::Error),

    /// No mapping exists for the requested key.
    #[error("short link not found")]
    NotFound,

    /// Every freshly drawn key was already taken.
    #[error("could not find a free key after {0} attempts")]
    KeyCollision(usize),
}

impl DirectoryError {
    pub fn status(&self) -> StatusCode {
        match self {
            DirectoryError::EmptyInput => StatusCode::BAD_REQUEST,
            DirectoryError::NotFound => StatusCode::NOT_FOUND,
            DirectoryError::RandomnessFailure(_) | DirectoryError::KeyCollision(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for DirectoryError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            DirectoryError::EmptyInput => "URL is required",
            DirectoryError::NotFound => "Short URL does not exist",
            DirectoryError::RandomnessFailure(ref e) => {
                tracing::error!("Key generation failed: {:?}", e);
                "Error generating short URL"
            }
            DirectoryError::KeyCollision(attempts) => {
                tracing::error!("No free key after {} attempts", attempts);
                "Error generating short URL"
            }
        };

        (status, message).into_response()
    }
}
