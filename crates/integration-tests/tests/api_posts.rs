//! Admin-only post management.

use axum::http::StatusCode;
use integration_tests::{post_fields, TestApp};

#[tokio::test]
async fn anonymous_create_redirects_to_login_and_stores_nothing() {
    let app = TestApp::spawn().await;
    let mut client = app.client();

    let res = client.post_form("/new-post", &post_fields("Sneaky")).await;

    res.assert_redirect("/login");
    assert_eq!(app.count("posts").await, 0);
    let page = client.get("/login").await;
    assert!(page.body.contains("You need to login/register to manage posts."));
}

#[tokio::test]
async fn non_admin_is_forbidden() {
    let app = TestApp::spawn().await;
    app.admin().await;
    let mut reader = app.register("reader", "reader@example.com", "pw").await;

    assert_eq!(reader.get("/new-post").await.status, StatusCode::FORBIDDEN);
    let res = reader.post_form("/new-post", &post_fields("Not mine")).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(app.count("posts").await, 0);
}

#[tokio::test]
async fn admin_creates_a_post_that_appears_on_the_index() {
    let app = TestApp::spawn().await;
    let mut admin = app.admin().await;
    let id = app.seed_post(&mut admin, "First light").await;

    let index = app.client().get("/").await;
    assert_eq!(index.status, StatusCode::OK);
    assert!(index.body.contains("First light"));
    assert!(index.body.contains(&format!("/post/{id}")));
    assert!(index.body.contains("Posted by admin"));

    let page = app.client().get(&format!("/post/{id}")).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("<p>Hello from the blog</p>"));
}

#[tokio::test]
async fn duplicate_title_is_rejected() {
    let app = TestApp::spawn().await;
    let mut admin = app.admin().await;
    app.seed_post(&mut admin, "Same title").await;

    let res = admin.post_form("/new-post", &post_fields("Same title")).await;
    res.assert_redirect("/new-post");
    assert_eq!(app.count("posts").await, 1);
}

#[tokio::test]
async fn edit_page_is_prefilled() {
    let app = TestApp::spawn().await;
    let mut admin = app.admin().await;
    let id = app.seed_post(&mut admin, "Draft").await;

    let page = admin.get(&format!("/edit-post/{id}")).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("value=\"Draft\""));
    assert!(page.body.contains(&format!("action=\"/edit-post/{id}\"")));
}

#[tokio::test]
async fn edit_overwrites_fields_and_reassigns_author() {
    let app = TestApp::spawn().await;
    let mut admin = app.admin().await;
    app.register("guest", "guest@example.com", "pw").await;

    sqlx::query(
        "INSERT INTO posts (author_id, title, subtitle, date, body, img_url)
         VALUES (2, 'Guest post', 'sub', 'January 01, 2024', 'body', 'https://example.com/a.jpg')",
    )
    .execute(app.pool())
    .await
    .unwrap();
    let id: i64 = sqlx::query_scalar("SELECT id FROM posts WHERE title = 'Guest post'")
        .fetch_one(app.pool())
        .await
        .unwrap();

    let res = admin
        .post_form(&format!("/edit-post/{id}"), &post_fields("Edited by admin"))
        .await;
    res.assert_redirect(&format!("/post/{id}"));

    let (author_id, title, date): (i64, String, String) =
        sqlx::query_as("SELECT author_id, title, date FROM posts WHERE id = ?")
            .bind(id)
            .fetch_one(app.pool())
            .await
            .unwrap();
    assert_eq!(author_id, 1);
    assert_eq!(title, "Edited by admin");
    assert_eq!(date, "January 01, 2024");
}

#[tokio::test]
async fn editing_a_missing_post_is_404() {
    let app = TestApp::spawn().await;
    let mut admin = app.admin().await;

    assert_eq!(admin.get("/edit-post/42").await.status, StatusCode::NOT_FOUND);
    let res = admin.post_form("/edit-post/42", &post_fields("Ghost")).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_post_and_its_comments() {
    let app = TestApp::spawn().await;
    let mut admin = app.admin().await;
    let id = app.seed_post(&mut admin, "Short lived").await;
    admin
        .post_form(&format!("/post/{id}"), &[("body", "first!")])
        .await
        .assert_redirect(&format!("/post/{id}"));
    assert_eq!(app.count("comments").await, 1);

    admin.get(&format!("/delete/{id}")).await.assert_redirect("/");

    assert_eq!(app.count("posts").await, 0);
    assert_eq!(app.count("comments").await, 0);
    assert_eq!(app.client().get(&format!("/post/{id}")).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_missing_post_is_404() {
    let app = TestApp::spawn().await;
    let mut admin = app.admin().await;
    assert_eq!(admin.get("/delete/7").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_post_id_is_the_404_page() {
    let app = TestApp::spawn().await;

    let res = app.client().get("/post/abc").await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert!(res.body.contains("Not Found"));

    let mut admin = app.admin().await;
    assert_eq!(admin.get("/edit-post/x").await.status, StatusCode::NOT_FOUND);
    assert_eq!(admin.get("/delete/x").await.status, StatusCode::NOT_FOUND);
    let res = admin.post_form("/post/1.5", &[("body", "hi")]).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}
