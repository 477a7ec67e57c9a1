//! # Forms
//!
//! Declarative field sets for every HTML form the site accepts.
//! Missing fields deserialize as empty strings so that they fail
//! validation instead of rejecting the request outright.

use std::collections::BTreeMap;

use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use crate::models::{ContactMessage, PostDraft};

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterForm {
    #[validate(length(min = 1, max = 250, message = "Please enter a username"))]
    pub username: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Please enter a password"))]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginForm {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Please enter your password"))]
    pub password: String,
}

/// Used by both "new post" and "edit post".
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct PostForm {
    #[validate(length(min = 1, max = 250, message = "Please enter a title"))]
    pub title: String,
    #[validate(length(min = 1, max = 250, message = "Please enter a subtitle"))]
    pub subtitle: String,
    #[validate(url(message = "Please enter a valid image URL"))]
    pub img_url: String,
    #[validate(length(min = 1, message = "The post body cannot be empty"))]
    pub body: String,
}

impl PostForm {
    pub fn into_draft(self) -> PostDraft {
        PostDraft {
            title: self.title,
            subtitle: self.subtitle,
            body: self.body,
            img_url: self.img_url,
        }
    }
}

impl From<&PostDraft> for PostForm {
    fn from(draft: &PostDraft) -> Self {
        Self {
            title: draft.title.clone(),
            subtitle: draft.subtitle.clone(),
            img_url: draft.img_url.clone(),
            body: draft.body.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CommentForm {
    #[validate(length(min = 1, message = "The comment cannot be empty"))]
    pub body: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ContactForm {
    #[validate(length(min = 1, message = "Please enter your name"))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    pub phone: String,
    #[validate(length(min = 1, message = "Please enter a message"))]
    pub message: String,
}

impl ContactForm {
    pub fn into_message(self) -> ContactMessage {
        ContactMessage {
            name: self.name,
            email: self.email,
            phone: self.phone,
            message: self.message,
        }
    }
}

/// Picks a single user-facing message out of a validation failure.
///
/// Fields are visited in name order so the result is stable when several fail.
pub fn first_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .into_iter()
        .collect::<BTreeMap<_, _>>()
        .into_iter()
        .find_map(|(field, errs)| {
            errs.first().map(|e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("Invalid value for {field}"),
            })
        })
        .unwrap_or_else(|| "Invalid form submission".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_form_rejects_malformed_email() {
        let form = RegisterForm {
            username: "ada".into(),
            email: "not-an-email".into(),
            password: "hunter2".into(),
        };
        let err = form.validate().unwrap_err();
        assert_eq!(first_message(&err), "Please enter a valid email address");
    }

    #[test]
    fn post_form_requires_an_image_url() {
        let form = PostForm {
            title: "Hello".into(),
            subtitle: "World".into(),
            img_url: "".into(),
            body: "<p>Body</p>".into(),
        };
        assert!(form.validate().is_err());

        let form = PostForm {
            img_url: "https://example.com/cover.jpg".into(),
            ..form
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn first_message_is_stable_across_several_failures() {
        let form = LoginForm::default();
        let err = form.validate().unwrap_err();
        // "email" sorts before "password"
        assert_eq!(first_message(&err), "Please enter a valid email address");
    }

    #[test]
    fn contact_form_allows_an_empty_phone() {
        let form = ContactForm {
            name: "Grace".into(),
            email: "grace@example.com".into(),
            phone: String::new(),
            message: "Hi there".into(),
        };
        assert!(form.validate().is_ok());
        let message = form.into_message();
        assert_eq!(message.subject(), "Message from Grace");
        assert_eq!(
            message.body(),
            "email: grace@example.com\nphone: \nmessage: Hi there\n"
        );
    }
}
