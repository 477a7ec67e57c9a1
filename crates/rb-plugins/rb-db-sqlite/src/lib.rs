//! # rb-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational model
//! and the `rb-core` domain models. The schema lives in `migrations/` and is
//! applied every time the repository is opened.

use std::str::FromStr;

use async_trait::async_trait;
use rb_core::error::{AppError, Result};
use rb_core::models::{Comment, NewUser, Post, PostDraft, User};
use rb_core::traits::BlogRepo;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

pub struct SqliteBlogRepo {
    pool: SqlitePool,
}

impl SqliteBlogRepo {
    /// Opens (creating if needed) the database at `url` and runs migrations.
    ///
    /// In-memory URLs get a single long-lived connection, since every new
    /// SQLite connection to `:memory:` would otherwise see an empty database.
    pub async fn new(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(db_err)?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await.map_err(db_err)?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::Internal(format!("migration failed: {e}")))?;

        tracing::info!(url, "sqlite repository ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Unique-constraint hits become `Conflict`; everything else is internal.
fn db_err(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(db.message().to_string())
        }
        _ => AppError::Internal(err.to_string()),
    }
}

fn user_from_row(row: &SqliteRow) -> sqlx::Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password")?,
    })
}

fn post_from_row(row: &SqliteRow) -> sqlx::Result<Post> {
    Ok(Post {
        id: row.try_get("id")?,
        author_id: row.try_get("author_id")?,
        title: row.try_get("title")?,
        subtitle: row.try_get("subtitle")?,
        date: row.try_get("date")?,
        body: row.try_get("body")?,
        img_url: row.try_get("img_url")?,
    })
}

fn comment_from_row(row: &SqliteRow) -> sqlx::Result<Comment> {
    Ok(Comment {
        id: row.try_get("id")?,
        author_id: row.try_get("author_id")?,
        post_id: row.try_get("post_id")?,
        text: row.try_get("text")?,
    })
}

#[async_trait]
impl BlogRepo for SqliteBlogRepo {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let id = sqlx::query("INSERT INTO users (username, email, password) VALUES (?, ?, ?)")
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .execute(&self.pool)
            .await
            .map_err(db_err)?
            .last_insert_rowid();

        Ok(User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
        })
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, username, email, password FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(user_from_row).transpose().map_err(db_err)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, username, email, password FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(user_from_row).transpose().map_err(db_err)
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        sqlx::query("SELECT * FROM posts ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?
            .iter()
            .map(post_from_row)
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(db_err)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>> {
        let row = sqlx::query("SELECT * FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(post_from_row).transpose().map_err(db_err)
    }

    async fn create_post(&self, author_id: i64, date: String, draft: PostDraft) -> Result<Post> {
        let id = sqlx::query(
            "INSERT INTO posts (author_id, title, subtitle, date, body, img_url) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(author_id)
        .bind(&draft.title)
        .bind(&draft.subtitle)
        .bind(&date)
        .bind(&draft.body)
        .bind(&draft.img_url)
        .execute(&self.pool)
        .await
        .map_err(db_err)?
        .last_insert_rowid();

        Ok(Post {
            id,
            author_id,
            title: draft.title,
            subtitle: draft.subtitle,
            date,
            body: draft.body,
            img_url: draft.img_url,
        })
    }

    async fn update_post(&self, id: i64, author_id: i64, draft: PostDraft) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE posts SET author_id = ?, title = ?, subtitle = ?, body = ?, img_url = ? WHERE id = ?",
        )
        .bind(author_id)
        .bind(draft.title)
        .bind(draft.subtitle)
        .bind(draft.body)
        .bind(draft.img_url)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_post(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_comment(&self, author_id: i64, post_id: i64, text: String) -> Result<Comment> {
        let id = sqlx::query("INSERT INTO comments (author_id, post_id, text) VALUES (?, ?, ?)")
            .bind(author_id)
            .bind(post_id)
            .bind(&text)
            .execute(&self.pool)
            .await
            .map_err(db_err)?
            .last_insert_rowid();

        Ok(Comment { id, author_id, post_id, text })
    }

    async fn list_comments_for_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        sqlx::query("SELECT * FROM comments WHERE post_id = ? ORDER BY id ASC")
            .bind(post_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?
            .iter()
            .map(comment_from_row)
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(db_err)
    }
}
