//! Shared harness for the HTTP-level tests.
//!
//! [`TestApp`] wires the real router to an in-memory SQLite repository,
//! the argon2 provider and a mock mailer. [`TestClient`] drives it with
//! `oneshot` and carries the session cookie between requests like a browser.

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use rb_api::{AppState, SessionSigner, SESSION_COOKIE};
use rb_auth_simple::SimpleAuthProvider;
use rb_core::services::BlogService;
use rb_core::traits::MockMailer;
use rb_db_sqlite::SqliteBlogRepo;
use secrecy::SecretString;
use sqlx::SqlitePool;
use tower::ServiceExt;

pub const ADMIN_ID: i64 = 1;
pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub router: Router,
    pub repo: Arc<SqliteBlogRepo>,
}

impl TestApp {
    /// An app whose mailer must never be called.
    pub async fn spawn() -> Self {
        let mut mailer = MockMailer::new();
        mailer.expect_send_contact().never();
        Self::spawn_with_mailer(mailer).await
    }

    pub async fn spawn_with_mailer(mailer: MockMailer) -> Self {
        let repo = Arc::new(
            SqliteBlogRepo::new("sqlite::memory:")
                .await
                .expect("in-memory database should open"),
        );
        let service = BlogService::new(
            repo.clone(),
            Arc::new(SimpleAuthProvider::new()),
            Arc::new(mailer),
        );
        let sessions = SessionSigner::new(&SecretString::from(TEST_SECRET.to_string()))
            .expect("test secret is a valid key");
        let router = rb_api::router(AppState::new(service, sessions, ADMIN_ID));
        Self { router, repo }
    }

    pub fn client(&self) -> TestClient {
        TestClient {
            router: self.router.clone(),
            session: None,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        self.repo.pool()
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(self.pool())
            .await
            .expect("count query")
    }

    /// Registers a fresh account and returns a client logged in as it.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> TestClient {
        let mut client = self.client();
        let res = client
            .post_form(
                "/register",
                &[("username", username), ("email", email), ("password", password)],
            )
            .await;
        assert_eq!(res.location(), Some("/"), "registration of {email} should succeed");
        client
    }

    /// Registers the admin account, which must be the first user.
    pub async fn admin(&self) -> TestClient {
        self.register("admin", "admin@example.com", "admin-pass").await
    }

    /// Creates a post as the admin and returns its id.
    pub async fn seed_post(&self, admin: &mut TestClient, title: &str) -> i64 {
        let res = admin.post_form("/new-post", &post_fields(title)).await;
        assert_eq!(res.location(), Some("/"), "post {title:?} should be created");
        sqlx::query_scalar("SELECT id FROM posts WHERE title = ?")
            .bind(title)
            .fetch_one(self.pool())
            .await
            .expect("seeded post exists")
    }
}

pub fn post_fields(title: &str) -> Vec<(&str, &str)> {
    vec![
        ("title", title),
        ("subtitle", "A subtitle"),
        ("img_url", "https://example.com/cover.jpg"),
        ("body", "<p>Hello from the blog</p>"),
    ]
}

pub struct TestClient {
    router: Router,
    session: Option<String>,
}

impl TestClient {
    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = self.request(Method::GET, path).body(Body::empty()).expect("valid request");
        self.send(request).await
    }

    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = serde_urlencoded::to_string(fields).expect("form fields encode");
        let request = self
            .request(Method::POST, path)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("valid request");
        self.send(request).await
    }

    /// Replaces the stored session cookie verbatim.
    pub fn set_session_cookie(&mut self, value: impl Into<String>) {
        self.session = Some(value.into());
    }

    pub fn session_cookie(&self) -> Option<&str> {
        self.session.as_deref()
    }

    fn request(&self, method: Method, path: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(path);
        match &self.session {
            Some(value) => builder.header(COOKIE, format!("{SESSION_COOKIE}={value}")),
            None => builder,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.expect("router is infallible");

        for header in response.headers().get_all(SET_COOKIE) {
            let Ok(raw) = header.to_str() else { continue };
            let pair = raw.split(';').next().unwrap_or_default();
            if let Some((name, value)) = pair.split_once('=') {
                if name.trim() == SESSION_COOKIE {
                    self.session = (!value.is_empty()).then(|| value.to_string());
                }
            }
        }

        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.into_body().collect().await.expect("body collects").to_bytes();

        TestResponse {
            status,
            location,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    location: Option<String>,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn assert_redirect(&self, to: &str) {
        assert!(
            self.status.is_redirection(),
            "expected redirect, got {}: {}",
            self.status,
            self.body
        );
        assert_eq!(self.location(), Some(to));
    }
}
