use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;
use uuid::Uuid;

use crate::presentation::render;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("post not found: {0}")]
    PostNotFound(String),
    #[error("tag not found: {0}")]
    TagNotFound(String),
    #[error("mail delivery failed: {0}")]
    Mail(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn post_id(id: Uuid) -> Self {
        DomainError::PostNotFound(id.to_string())
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::Internal(format!("database error: {}", err))
    }
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        match self {
            DomainError::PostNotFound(_) | DomainError::TagNotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Mail(_) => StatusCode::SERVICE_UNAVAILABLE,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (title, message) = match self {
            DomainError::PostNotFound(_) => (
                "Not Found",
                "The post you are looking for does not exist or is not published.",
            ),
            DomainError::TagNotFound(_) => ("Not Found", "No posts are tagged with this label."),
            DomainError::Mail(err) => {
                tracing::error!(error = %err, "mail delivery failed");
                (
                    "Service Unavailable",
                    "The message could not be delivered. Please try again later.",
                )
            }
            DomainError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    "Internal Error",
                    "An internal error occurred. Please try again later.",
                )
            }
        };

        HttpResponse::build(self.status_code())
            .content_type("text/html; charset=utf-8")
            .body(render::error_page(title, message).into_string())
    }
}
