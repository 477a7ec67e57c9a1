//! rusty-blog/crates/rb-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Rusty-Blog.

pub mod error;
pub mod forms;
pub mod models;
pub mod services;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use services::*;
pub use traits::*;

#[cfg(test)]
mod tests {
    use super::models::*;
    use chrono::NaiveDate;

    #[test]
    fn test_post_date_format() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(format_post_date(date), "October 18, 2026");

        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(format_post_date(date), "March 05, 2024");
    }

    #[test]
    fn test_contact_message_rendering() {
        let msg = ContactMessage {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: "123".to_string(),
            message: "Hello Rust!".to_string(),
        };
        assert_eq!(msg.subject(), "Message from Ada");
        assert_eq!(msg.body(), "email: ada@example.com\nphone: 123\nmessage: Hello Rust!\n");
    }
}
