//! rusty-blog/crates/rb-api/src/middleware.rs Middleware
//!
//! Request tracing and the admin-only guard.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use rb_core::models::{Flash, User};
use tower_http::trace::{HttpMakeClassifier, TraceLayer};
use tracing::Span;

use crate::error::ApiError;
use crate::session::Session;
use crate::state::AppState;

/// The admin who passed [`require_admin`], available to guarded handlers
/// as `Extension<Principal>`.
#[derive(Debug, Clone)]
pub struct Principal(pub User);

/// One span per request carrying method and path.
pub fn trace_layer() -> TraceLayer<HttpMakeClassifier, fn(&Request) -> Span> {
    TraceLayer::new_for_http().make_span_with(request_span as fn(&Request) -> Span)
}

fn request_span(request: &Request) -> Span {
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
    )
}

/// Lets the request through only for the configured admin account.
///
/// Anonymous visitors are sent to the login page with a flash message;
/// any other logged-in user gets 403.
pub async fn require_admin(
    State(state): State<AppState>,
    mut session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = state.service.current_user(session.user_id()).await?;

    match user {
        None => {
            session.flash(Flash::error("You need to login/register to manage posts."));
            Ok((session, Redirect::to("/login")).into_response())
        }
        Some(user) if user.id == state.admin_user_id => {
            request.extensions_mut().insert(Principal(user));
            Ok(next.run(request).await)
        }
        Some(user) => {
            tracing::warn!(user_id = user.id, path = %request.uri().path(), "non-admin blocked");
            Err(ApiError::forbidden())
        }
    }
}
