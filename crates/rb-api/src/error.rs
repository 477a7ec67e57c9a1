//! HTTP error responses.
//!
//! Errors are rendered as HTML pages through `error.html`, since every
//! route of the site serves browsers.

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use rb_core::error::AppError;
use rb_ui::{ErrorTemplate, Layout};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error("template rendering failed: {0}")]
    Render(#[from] askama::Error),
}

impl ApiError {
    pub fn forbidden() -> Self {
        Self::App(AppError::Forbidden("admin only".to_string()))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::App(AppError::NotFound(..)) => StatusCode::NOT_FOUND,
            Self::App(AppError::Forbidden(_) | AppError::Unauthorized(_)) => StatusCode::FORBIDDEN,
            Self::App(AppError::ValidationError(_)) => StatusCode::BAD_REQUEST,
            Self::App(AppError::Conflict(_)) => StatusCode::CONFLICT,
            Self::App(AppError::Mail(_) | AppError::Internal(_)) | Self::Render(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (title, message) = match status {
            StatusCode::NOT_FOUND => (
                "Not Found",
                "The page you were looking for does not exist.".to_string(),
            ),
            StatusCode::FORBIDDEN => (
                "Forbidden",
                "You don't have permission to do that.".to_string(),
            ),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT => ("Bad Request", self.to_string()),
            _ => {
                tracing::error!(error = %self, "request failed");
                (
                    "Internal Server Error",
                    "Something went wrong on our side. Please try again later.".to_string(),
                )
            }
        };

        let page = ErrorTemplate {
            layout: Layout::anonymous(),
            status: status.as_u16(),
            title: title.to_string(),
            message,
        };
        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "error page failed to render");
                (status, title).into_response()
            }
        }
    }
}
