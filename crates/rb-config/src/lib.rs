//! # rb-config
//!
//! Runtime settings for Rusty-Blog, layered lowest to highest:
//! built-in defaults, an optional `rusty-blog.toml` (or the file named by
//! `RUSTY_BLOG_CONFIG`), then environment variables. A `.env` file in the
//! working directory is folded into the environment first.

use config::{Config, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_VAR: &str = "RUSTY_BLOG_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "rusty-blog";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting {0}: {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Socket address the HTTP server listens on
    pub bind_addr: String,
    pub database_url: String,
    /// Key for signing the session cookie
    pub secret_key: SecretString,
    /// Site owner's address: SMTP login, sender and recipient of contact mail
    #[serde(rename = "my_mail")]
    pub mail_address: String,
    /// SMTP app password for `mail_address`
    pub app_password: SecretString,
    pub smtp_host: String,
    pub smtp_port: u16,
    /// The one account allowed to create, edit and delete posts
    pub admin_user_id: i64,
    pub log_format: LogFormat,
}

impl Settings {
    /// Loads `.env`, the optional config file and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is normal outside development.
        let _ = dotenvy::dotenv();
        let file = std::env::var(CONFIG_PATH_VAR)
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::build(Some(&file), None)
    }

    /// Builds settings from an optional file and, when given, an explicit
    /// variable map used in place of the process environment.
    pub fn build(
        file: Option<&str>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("bind_addr", "127.0.0.1:5002")?
            .set_default("database_url", "sqlite:posts.db")?
            .set_default("smtp_host", "smtp.gmail.com")?
            .set_default("smtp_port", 587)?
            .set_default("admin_user_id", 1)?
            .set_default("log_format", "pretty")?;

        if let Some(file) = file {
            builder = builder.add_source(File::with_name(file).required(false));
        }

        // Values stay strings until deserialized, so secrets like "00123"
        // are not coerced to numbers on the way in.
        let settings: Settings = builder
            .add_source(Environment::default().source(env))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.secret_key.expose_secret().is_empty() {
            return Err(ConfigError::Invalid("SECRET_KEY", "must not be empty".to_string()));
        }
        if !self.mail_address.contains('@') {
            return Err(ConfigError::Invalid(
                "MY_MAIL",
                format!("{:?} is not an email address", self.mail_address),
            ));
        }
        Ok(())
    }
}
