//! # Rusty-Blog Binary
//!
//! The entry point that assembles the application from its plugins.

use std::sync::Arc;

use anyhow::Context;
use rb_api::{AppState, SessionSigner};
use rb_auth_simple::SimpleAuthProvider;
use rb_config::{LogFormat, Settings};
use rb_core::services::BlogService;
use rb_db_sqlite::SqliteBlogRepo;
use rb_mail_smtp::SmtpMailer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load settings")?;
    init_tracing(settings.log_format);

    // 1. Storage
    let repo = SqliteBlogRepo::new(&settings.database_url)
        .await
        .context("failed to open database")?;

    // 2. Password hashing
    let auth = SimpleAuthProvider::new();

    // 3. Outgoing mail
    let mailer = SmtpMailer::new(
        &settings.smtp_host,
        settings.smtp_port,
        &settings.mail_address,
        &settings.app_password,
    )
    .context("failed to configure mailer")?;

    // 4. Wire it together
    let service = BlogService::new(Arc::new(repo), Arc::new(auth), Arc::new(mailer));
    let sessions = SessionSigner::new(&settings.secret_key).context("invalid secret key")?;
    let app = rb_api::router(AppState::new(service, sessions, settings.admin_user_id));

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;
    tracing::info!(addr = %settings.bind_addr, "rusty-blog listening");

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}
