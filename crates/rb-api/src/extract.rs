//! Path extractors that answer with the HTML 404 page instead of axum's
//! plain-text rejection.

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use rb_core::error::AppError;

use crate::error::ApiError;

/// The numeric `{id}` segment of `/post/{id}`, `/edit-post/{id}` and
/// `/delete/{id}`. Anything that is not an integer is an unknown page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostId(pub i64);

impl<S> FromRequestParts<S> for PostId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<i64>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(PostId(id)),
            Err(rejection) => {
                tracing::debug!(path = %parts.uri.path(), %rejection, "non-numeric post id");
                Err(ApiError::App(AppError::not_found("Page", parts.uri.path())))
            }
        }
    }
}
