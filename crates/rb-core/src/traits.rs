//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Comment, ContactMessage, NewUser, Post, PostDraft, User};

/// Data persistence contract for users, posts, and comments.
///
/// Uniqueness violations (email, username, post title) are reported as
/// [`AppError::Conflict`](crate::AppError::Conflict) whose message names the
/// offending column, e.g. `users.email`.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BlogRepo: Send + Sync {
    // User Operations
    async fn create_user(&self, user: NewUser) -> Result<User>;
    async fn get_user(&self, id: i64) -> Result<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    // Post Operations
    async fn list_posts(&self) -> Result<Vec<Post>>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>>;
    async fn create_post(&self, author_id: i64, date: String, draft: PostDraft) -> Result<Post>;
    /// Overwrites the post's fields and author. Returns `false` when no row matched.
    async fn update_post(&self, id: i64, author_id: i64, draft: PostDraft) -> Result<bool>;
    /// Deletes the post and its comments. Returns `false` when no row matched.
    async fn delete_post(&self, id: i64) -> Result<bool>;

    // Comment Operations
    async fn create_comment(&self, author_id: i64, post_id: i64, text: String) -> Result<Comment>;
    async fn list_comments_for_post(&self, post_id: i64) -> Result<Vec<Comment>>;
}

/// Password hashing contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait AuthProvider: Send + Sync {
    /// Produces a salted, one-way hash suitable for storage.
    fn hash_password(&self, password: &str) -> Result<String>;

    /// Verifies a candidate password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> bool;
}

/// Outbound mail contract for relaying contact-form submissions.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Delivers the message to the site owner's inbox.
    async fn send_contact(&self, message: &ContactMessage) -> Result<()>;
}
