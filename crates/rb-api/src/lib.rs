//! # rb-api
//!
//! The web routing and orchestration layer for Rusty-Blog.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod session;
pub mod state;

pub use error::ApiError;
pub use extract::PostId;
pub use session::{Session, SessionData, SessionSigner, SESSION_COOKIE};
pub use state::AppState;

use axum::routing::get;
use axum::Router;

/// Builds the route table for the blog.
///
/// ## Public
/// - `GET  /`                       - All posts
/// - `GET|POST /register`, `/login` - Account forms
/// - `GET  /logout`                 - Clear the session
/// - `GET|POST /post/{id}`          - Read a post / leave a comment
/// - `GET  /about`
/// - `GET|POST /contact`            - Contact form, relayed by mail
///
/// ## Admin only
/// - `GET|POST /new-post`
/// - `GET|POST /edit-post/{id}`
/// - `GET  /delete/{id}`
pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/new-post", get(handlers::new_post_page).post(handlers::create_post))
        .route(
            "/edit-post/{id}",
            get(handlers::edit_post_page).post(handlers::update_post),
        )
        .route("/delete/{id}", get(handlers::delete_post))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_admin,
        ));

    Router::new()
        .route("/", get(handlers::index))
        .route("/register", get(handlers::register_page).post(handlers::register))
        .route("/login", get(handlers::login_page).post(handlers::login))
        .route("/logout", get(handlers::logout))
        .route("/post/{id}", get(handlers::show_post).post(handlers::add_comment))
        .route("/about", get(handlers::about))
        .route("/contact", get(handlers::contact_page).post(handlers::contact))
        .merge(admin)
        .fallback(handlers::not_found)
        .layer(middleware::trace_layer())
        .with_state(state)
}
