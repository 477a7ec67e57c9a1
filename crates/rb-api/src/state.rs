//! The application context handed to every handler.

use rb_core::services::BlogService;

use crate::session::SessionSigner;

/// Built once at startup; cloning is cheap (the service holds `Arc`s).
#[derive(Clone)]
pub struct AppState {
    pub service: BlogService,
    pub sessions: SessionSigner,
    /// The one account allowed past [`require_admin`](crate::middleware::require_admin)
    pub admin_user_id: i64,
}

impl AppState {
    pub fn new(service: BlogService, sessions: SessionSigner, admin_user_id: i64) -> Self {
        Self { service, sessions, admin_user_id }
    }
}
