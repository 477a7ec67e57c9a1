//! Signed-cookie sessions.
//!
//! Wire form: `base64url(json) "." hex(hmac_sha256(key, base64url(json)))`.
//! Anything that fails to verify or decode opens as an empty session.
//!
//! [`Session`] is both an extractor and a response part: handlers take it,
//! mutate it, and return it alongside the body so changes are written back.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderValue;
use axum::response::{IntoResponseParts, ResponseParts};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use cookie::{Cookie, SameSite};
use hmac::{Hmac, Mac};
use rb_core::error::{AppError, Result};
use rb_core::models::Flash;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::state::AppState;

pub const SESSION_COOKIE: &str = "rusty_blog_session";

type HmacSha256 = Hmac<Sha256>;

/// Everything the site keeps about a visitor between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flashes: Vec<Flash>,
}

#[derive(Clone)]
pub struct SessionSigner {
    mac: HmacSha256,
}

impl SessionSigner {
    pub fn new(secret_key: &SecretString) -> Result<Self> {
        let mac = HmacSha256::new_from_slice(secret_key.expose_secret().as_bytes())
            .map_err(|e| AppError::Internal(format!("invalid session key: {e}")))?;
        Ok(Self { mac })
    }

    pub fn seal(&self, data: &SessionData) -> Result<String> {
        let json = serde_json::to_vec(data)
            .map_err(|e| AppError::Internal(format!("session encode failed: {e}")))?;
        let payload = URL_SAFE_NO_PAD.encode(json);
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());
        Ok(format!("{payload}.{signature}"))
    }

    pub fn open(&self, value: &str) -> Option<SessionData> {
        let (payload, signature) = value.split_once('.')?;
        let signature = hex::decode(signature).ok()?;

        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        if mac.verify_slice(&signature).is_err() {
            tracing::debug!("session cookie signature mismatch");
            return None;
        }

        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        serde_json::from_slice(&json).ok()
    }
}

/// The visitor's session for the current request.
pub struct Session {
    data: SessionData,
    signer: SessionSigner,
    dirty: bool,
}

impl Session {
    pub fn user_id(&self) -> Option<i64> {
        self.data.user_id
    }

    pub fn login(&mut self, user_id: i64) {
        self.data.user_id = Some(user_id);
        self.dirty = true;
    }

    /// Forgets the user and any pending flashes.
    pub fn clear(&mut self) {
        self.data = SessionData::default();
        self.dirty = true;
    }

    pub fn flash(&mut self, flash: Flash) {
        self.data.flashes.push(flash);
        self.dirty = true;
    }

    /// Drains pending flashes for display.
    pub fn take_flashes(&mut self) -> Vec<Flash> {
        if self.data.flashes.is_empty() {
            return Vec::new();
        }
        self.dirty = true;
        std::mem::take(&mut self.data.flashes)
    }

    fn set_cookie(&self) -> Option<Cookie<'static>> {
        let builder = if self.data == SessionData::default() {
            Cookie::build((SESSION_COOKIE, "")).max_age(cookie::time::Duration::ZERO)
        } else {
            match self.signer.seal(&self.data) {
                Ok(value) => Cookie::build((SESSION_COOKIE, value)),
                Err(e) => {
                    tracing::error!(error = %e, "failed to seal session");
                    return None;
                }
            }
        };
        Some(builder.path("/").http_only(true).same_site(SameSite::Lax).build())
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let data = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(|cookie| cookie.ok())
            .find(|cookie| cookie.name() == SESSION_COOKIE)
            .and_then(|cookie| state.sessions.open(cookie.value()))
            .unwrap_or_default();

        Ok(Session {
            data,
            signer: state.sessions.clone(),
            dirty: false,
        })
    }
}

impl IntoResponseParts for Session {
    type Error = Infallible;

    fn into_response_parts(
        self,
        mut res: ResponseParts,
    ) -> std::result::Result<ResponseParts, Self::Error> {
        if !self.dirty {
            return Ok(res);
        }
        if let Some(cookie) = self.set_cookie() {
            match HeaderValue::from_str(&cookie.to_string()) {
                Ok(value) => {
                    res.headers_mut().append(SET_COOKIE, value);
                }
                Err(e) => tracing::error!(error = %e, "session cookie is not a valid header value"),
            }
        }
        Ok(res)
    }
}
