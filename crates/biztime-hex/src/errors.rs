use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use biztime_types::api::{ErrorBody, ErrorDetail};
use biztime_types::ports::RepoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        AppError::Internal(e.into())
    }
}

/// Only unparseable JSON is a client error. A body of the wrong shape or
/// content type is treated like a body with missing fields.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonSyntaxError(e) => AppError::BadRequest(e.body_text()),
            other => AppError::Internal(anyhow::anyhow!(other.body_text())),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.status();
        let message = match &self {
            AppError::BadRequest(m) | AppError::NotFound(m) => m.clone(),
            AppError::Internal(e) => {
                tracing::error!(error = %format!("{e:#}"), "request failed");
                "internal error".into()
            }
        };

        let body = serde_json::to_string(&ErrorBody {
            error: ErrorDetail {
                message,
                status: code.as_u16(),
            },
        })
        .unwrap_or_else(|_| {
            "{\"error\":{\"message\":\"internal serialization\",\"status\":500}}".into()
        });
        (code, [("content-type", "application/json")], body).into_response()
    }
}
