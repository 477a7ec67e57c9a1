//! # BlogService
//!
//! The operations of the site, expressed over the port traits.
//! Handlers call into this and decide how each outcome is presented
//! (page, redirect, flash message).

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::forms::{CommentForm, ContactForm, LoginForm, PostForm, RegisterForm};
use crate::models::{
    format_post_date, Comment, CommentWithAuthor, NewUser, Post, PostWithAuthor, User,
};
use crate::traits::{AuthProvider, BlogRepo, Mailer};

/// Result of a registration attempt that passed validation.
#[derive(Debug)]
pub enum RegisterOutcome {
    Registered(User),
    /// An account with that email already exists.
    DuplicateEmail,
}

/// Result of a login attempt that passed validation.
#[derive(Debug)]
pub enum LoginOutcome {
    LoggedIn(User),
    UnknownEmail,
    WrongPassword,
}

#[derive(Clone)]
pub struct BlogService {
    repo: Arc<dyn BlogRepo>,
    auth: Arc<dyn AuthProvider>,
    mailer: Arc<dyn Mailer>,
}

impl BlogService {
    pub fn new(
        repo: Arc<dyn BlogRepo>,
        auth: Arc<dyn AuthProvider>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self { repo, auth, mailer }
    }

    pub async fn register(&self, form: RegisterForm) -> Result<RegisterOutcome> {
        form.validate()?;

        if self.repo.find_user_by_email(&form.email).await?.is_some() {
            debug!(email = %form.email, "registration rejected: email already in use");
            return Ok(RegisterOutcome::DuplicateEmail);
        }

        let password_hash = self.auth.hash_password(&form.password)?;
        let created = self
            .repo
            .create_user(NewUser {
                username: form.username,
                email: form.email,
                password_hash,
            })
            .await;

        // A concurrent signup can win the race past the lookup above.
        let user = match created {
            Ok(user) => user,
            Err(AppError::Conflict(column)) if column.contains("email") => {
                debug!(%column, "registration rejected: email taken concurrently");
                return Ok(RegisterOutcome::DuplicateEmail);
            }
            Err(e) => return Err(e),
        };

        info!(user_id = user.id, username = %user.username, "user registered");
        Ok(RegisterOutcome::Registered(user))
    }

    pub async fn login(&self, form: LoginForm) -> Result<LoginOutcome> {
        form.validate()?;

        let Some(user) = self.repo.find_user_by_email(&form.email).await? else {
            return Ok(LoginOutcome::UnknownEmail);
        };

        if self.auth.verify_password(&form.password, &user.password_hash) {
            info!(user_id = user.id, "user logged in");
            Ok(LoginOutcome::LoggedIn(user))
        } else {
            debug!(user_id = user.id, "login rejected: wrong password");
            Ok(LoginOutcome::WrongPassword)
        }
    }

    /// Resolves the session's user id. A dangling id counts as anonymous.
    pub async fn current_user(&self, user_id: Option<i64>) -> Result<Option<User>> {
        match user_id {
            Some(id) => self.repo.get_user(id).await,
            None => Ok(None),
        }
    }

    pub async fn list_posts(&self) -> Result<Vec<PostWithAuthor>> {
        let posts = self.repo.list_posts().await?;
        let mut authors = AuthorCache::default();
        let mut out = Vec::with_capacity(posts.len());
        for post in posts {
            let author = authors.resolve(self.repo.as_ref(), post.author_id).await?;
            out.push(PostWithAuthor { post, author });
        }
        Ok(out)
    }

    pub async fn get_post(&self, id: i64) -> Result<PostWithAuthor> {
        let post = self
            .repo
            .get_post(id)
            .await?
            .ok_or_else(|| AppError::not_found("Post", id))?;
        let author = self.repo.get_user(post.author_id).await?;
        Ok(PostWithAuthor { post, author })
    }

    /// Stamps today's date and the author, then persists.
    pub async fn create_post(&self, author: &User, form: PostForm) -> Result<Post> {
        form.validate()?;
        let date = format_post_date(chrono::Local::now().date_naive());
        let post = self.repo.create_post(author.id, date, form.into_draft()).await?;
        info!(post_id = post.id, author_id = author.id, "post created");
        Ok(post)
    }

    /// Overwrites every editable field and hands authorship to `editor`.
    pub async fn edit_post(&self, id: i64, editor: &User, form: PostForm) -> Result<()> {
        form.validate()?;
        if !self.repo.update_post(id, editor.id, form.into_draft()).await? {
            return Err(AppError::not_found("Post", id));
        }
        info!(post_id = id, editor_id = editor.id, "post edited");
        Ok(())
    }

    pub async fn delete_post(&self, id: i64) -> Result<()> {
        if !self.repo.delete_post(id).await? {
            return Err(AppError::not_found("Post", id));
        }
        info!(post_id = id, "post deleted");
        Ok(())
    }

    pub async fn add_comment(
        &self,
        post_id: i64,
        author: &User,
        form: CommentForm,
    ) -> Result<Comment> {
        form.validate()?;
        if self.repo.get_post(post_id).await?.is_none() {
            return Err(AppError::not_found("Post", post_id));
        }
        let comment = self.repo.create_comment(author.id, post_id, form.body).await?;
        debug!(comment_id = comment.id, post_id, author_id = author.id, "comment added");
        Ok(comment)
    }

    /// Comments belonging to `post_id` only, oldest first.
    pub async fn list_comments_for_post(&self, post_id: i64) -> Result<Vec<CommentWithAuthor>> {
        let comments = self.repo.list_comments_for_post(post_id).await?;
        let mut authors = AuthorCache::default();
        let mut out = Vec::with_capacity(comments.len());
        for comment in comments {
            let author = authors.resolve(self.repo.as_ref(), comment.author_id).await?;
            out.push(CommentWithAuthor { comment, author });
        }
        Ok(out)
    }

    pub async fn send_contact_message(&self, form: ContactForm) -> Result<()> {
        form.validate()?;
        let message = form.into_message();
        self.mailer.send_contact(&message).await?;
        info!(from = %message.email, "contact message relayed");
        Ok(())
    }
}

/// Per-call memo so a page with many rows by one author does one lookup.
#[derive(Default)]
struct AuthorCache(HashMap<i64, Option<User>>);

impl AuthorCache {
    async fn resolve(&mut self, repo: &dyn BlogRepo, id: i64) -> Result<Option<User>> {
        if let Some(user) = self.0.get(&id) {
            return Ok(user.clone());
        }
        let user = repo.get_user(id).await?;
        self.0.insert(id, user.clone());
        Ok(user)
    }
}
