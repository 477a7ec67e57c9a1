//! # Domain Models
//!
//! These structs represent the core entities of Rusty-Blog.
//! Rows reference each other by numeric id only; associations are
//! resolved by explicit lookups in the service layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Display format for the post creation date (e.g. "October 18, 2026").
pub const POST_DATE_FORMAT: &str = "%B %d, %Y";

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string, never the plaintext password
    pub password_hash: String,
}

/// A user row that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// A blog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub subtitle: String,
    /// Formatted once at write time with [`POST_DATE_FORMAT`]
    pub date: String,
    /// Rich text (HTML) as produced by the editor
    pub body: String,
    pub img_url: String,
}

/// The editable fields of a post, shared by create and edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub img_url: String,
}

/// A reader's comment on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub author_id: i64,
    pub post_id: i64,
    pub text: String,
}

/// A post together with its resolved author.
///
/// `author` is `None` when the author row no longer exists.
#[derive(Debug, Clone)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author: Option<User>,
}

/// A comment together with its resolved author.
#[derive(Debug, Clone)]
pub struct CommentWithAuthor {
    pub comment: Comment,
    pub author: Option<User>,
}

/// A contact-form submission relayed to the site owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

impl ContactMessage {
    pub fn subject(&self) -> String {
        format!("Message from {}", self.name)
    }

    /// Plaintext body embedding every submitted field.
    pub fn body(&self) -> String {
        format!(
            "email: {}\nphone: {}\nmessage: {}\n",
            self.email, self.phone, self.message
        )
    }
}

/// A one-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    /// "error" or "info"; used as a CSS hook
    pub category: String,
    pub message: String,
}

impl Flash {
    pub fn error(message: impl Into<String>) -> Self {
        Self { category: "error".to_string(), message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { category: "info".to_string(), message: message.into() }
    }
}

/// Formats a creation date the way posts store it.
pub fn format_post_date(date: NaiveDate) -> String {
    date.format(POST_DATE_FORMAT).to_string()
}
