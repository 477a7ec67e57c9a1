//! # rb-ui
//!
//! Askama page templates and the view structs they render from.
//! Every page extends `base.html`, which reads the shared [`Layout`].

use askama::Template;
use chrono::Datelike;
use rb_core::forms::PostForm;
use rb_core::models::{CommentWithAuthor, Flash, PostWithAuthor, User};
use sha2::{Digest, Sha256};

/// What every page needs to draw the navigation bar and flash area.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub username: Option<String>,
    pub is_admin: bool,
    pub flashes: Vec<Flash>,
    pub year: i32,
}

impl Layout {
    pub fn new(user: Option<&User>, admin_user_id: i64, flashes: Vec<Flash>) -> Self {
        Self {
            username: user.map(|u| u.username.clone()),
            is_admin: user.is_some_and(|u| u.id == admin_user_id),
            flashes,
            year: chrono::Local::now().year(),
        }
    }

    /// Layout for pages rendered without a session, e.g. error pages.
    pub fn anonymous() -> Self {
        Self::new(None, 0, Vec::new())
    }

    pub fn logged_in(&self) -> bool {
        self.username.is_some()
    }
}

/// One row on the home page.
#[derive(Debug, Clone)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub author: String,
}

impl From<&PostWithAuthor> for PostSummary {
    fn from(p: &PostWithAuthor) -> Self {
        Self {
            id: p.post.id,
            title: p.post.title.clone(),
            subtitle: p.post.subtitle.clone(),
            date: p.post.date.clone(),
            author: author_name(p.author.as_ref()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommentView {
    pub text: String,
    pub author: String,
    pub avatar_url: String,
}

impl From<&CommentWithAuthor> for CommentView {
    fn from(c: &CommentWithAuthor) -> Self {
        Self {
            text: c.comment.text.clone(),
            author: author_name(c.author.as_ref()),
            avatar_url: gravatar_url(c.author.as_ref().map(|u| u.email.as_str()).unwrap_or("")),
        }
    }
}

fn author_name(user: Option<&User>) -> String {
    user.map(|u| u.username.clone())
        .unwrap_or_else(|| "[deleted]".to_string())
}

/// Gravatar avatar (100px, rated g, "retro" fallback) for an email address.
pub fn gravatar_url(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    format!(
        "https://www.gravatar.com/avatar/{}?s=100&r=g&d=retro",
        hex::encode(digest)
    )
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub layout: Layout,
    pub posts: Vec<PostSummary>,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub layout: Layout,
    pub id: i64,
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub author: String,
    pub img_url: String,
    /// Rich text, rendered unescaped
    pub body: String,
    pub comments: Vec<CommentView>,
}

impl PostTemplate {
    pub fn new(layout: Layout, post: &PostWithAuthor, comments: &[CommentWithAuthor]) -> Self {
        Self {
            layout,
            id: post.post.id,
            title: post.post.title.clone(),
            subtitle: post.post.subtitle.clone(),
            date: post.post.date.clone(),
            author: author_name(post.author.as_ref()),
            img_url: post.post.img_url.clone(),
            body: post.post.body.clone(),
            comments: comments.iter().map(CommentView::from).collect(),
        }
    }
}

/// Shared by "new post" and "edit post".
#[derive(Template)]
#[template(path = "make-post.html")]
pub struct MakePostTemplate {
    pub layout: Layout,
    pub form: PostForm,
    pub is_edit: bool,
    /// Where the form posts back to
    pub action: String,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
}

#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub layout: Layout,
}

#[derive(Template)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub layout: Layout,
    pub msg_sent: bool,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub layout: Layout,
    pub status: u16,
    pub title: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rb_core::models::{Comment, Post};

    fn admin() -> User {
        User {
            id: 1,
            username: "admin".into(),
            email: "Admin@Example.com ".into(),
            password_hash: String::new(),
        }
    }

    fn post() -> PostWithAuthor {
        PostWithAuthor {
            post: Post {
                id: 4,
                author_id: 1,
                title: "Ferris <3 & friends".into(),
                subtitle: "A crab story".into(),
                date: "October 18, 2026".into(),
                body: "<p>Hello <strong>world</strong></p>".into(),
                img_url: "https://example.com/crab.png".into(),
            },
            author: Some(admin()),
        }
    }

    #[test]
    fn gravatar_normalises_the_email() {
        assert_eq!(gravatar_url("Admin@Example.com "), gravatar_url("admin@example.com"));
        assert!(gravatar_url("a@b.c").starts_with("https://www.gravatar.com/avatar/"));
        assert!(gravatar_url("a@b.c").ends_with("?s=100&r=g&d=retro"));
    }

    #[test]
    fn layout_knows_the_admin() {
        let user = admin();
        assert!(Layout::new(Some(&user), 1, vec![]).is_admin);
        assert!(!Layout::new(Some(&user), 2, vec![]).is_admin);
        assert!(!Layout::anonymous().logged_in());
    }

    #[test]
    fn index_escapes_titles() {
        let html = IndexTemplate {
            layout: Layout::anonymous(),
            posts: vec![PostSummary::from(&post())],
        }
        .render()
        .unwrap();

        assert!(html.contains("Ferris &lt;3 &amp; friends"));
        assert!(html.contains("/post/4"));
        assert!(html.contains("Posted by admin on October 18, 2026"));
    }

    #[test]
    fn post_body_is_rendered_as_rich_text() {
        let comments = vec![CommentWithAuthor {
            comment: Comment { id: 1, author_id: 1, post_id: 4, text: "<b>nice</b>".into() },
            author: Some(admin()),
        }];
        let html = PostTemplate::new(Layout::anonymous(), &post(), &comments)
            .render()
            .unwrap();

        assert!(html.contains("<p>Hello <strong>world</strong></p>"));
        assert!(html.contains("&lt;b&gt;nice&lt;/b&gt;"));
        // the query string's '&' is escaped inside the attribute
        assert!(html.contains(&gravatar_url("admin@example.com").replace('&', "&amp;")));
    }

    #[test]
    fn flashes_and_nav_follow_the_layout() {
        let user = admin();
        let flashes = vec![Flash::error("Invalid password. Please try again")];
        let layout = Layout::new(Some(&user), 1, flashes);
        let html = LoginTemplate { layout }.render().unwrap();

        assert!(html.contains("Invalid password. Please try again"));
        assert!(html.contains("href=\"/logout\""));
        assert!(html.contains("href=\"/new-post\""));
    }

    #[test]
    fn edit_form_is_prefilled() {
        let form = PostForm {
            title: "A".into(),
            subtitle: "B".into(),
            img_url: "https://example.com/c.png".into(),
            body: "<p>D</p>".into(),
        };
        let html = MakePostTemplate {
            layout: Layout::anonymous(),
            form,
            is_edit: true,
            action: "/edit-post/9".into(),
        }
        .render()
        .unwrap();

        assert!(html.contains("Edit Post"));
        assert!(html.contains("action=\"/edit-post/9\""));
        assert!(html.contains("value=\"https://example.com/c.png\""));
    }
}
