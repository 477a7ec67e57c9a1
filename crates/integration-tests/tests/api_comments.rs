//! Commenting on posts.

use axum::http::StatusCode;
use integration_tests::TestApp;

#[tokio::test]
async fn anonymous_comment_redirects_to_login_and_stores_nothing() {
    let app = TestApp::spawn().await;
    let mut admin = app.admin().await;
    let id = app.seed_post(&mut admin, "Open thread").await;

    let mut visitor = app.client();
    let res = visitor.post_form(&format!("/post/{id}"), &[("body", "hello")]).await;

    res.assert_redirect("/login");
    assert_eq!(app.count("comments").await, 0);
    let page = visitor.get("/login").await;
    assert!(page.body.contains("You need to be logged in/registered, in order to post a comment"));
}

#[tokio::test]
async fn logged_in_user_can_comment() {
    let app = TestApp::spawn().await;
    let mut admin = app.admin().await;
    let id = app.seed_post(&mut admin, "Open thread").await;
    let mut reader = app.register("reader", "reader@example.com", "pw").await;

    reader
        .post_form(&format!("/post/{id}"), &[("body", "Nice write-up")])
        .await
        .assert_redirect(&format!("/post/{id}"));

    let page = reader.get(&format!("/post/{id}")).await;
    assert!(page.body.contains("Nice write-up"));
    assert!(page.body.contains("reader"));
    assert!(page.body.contains("https://www.gravatar.com/avatar/"));
}

#[tokio::test]
async fn comments_are_scoped_to_their_post() {
    let app = TestApp::spawn().await;
    let mut admin = app.admin().await;
    let first = app.seed_post(&mut admin, "First").await;
    let second = app.seed_post(&mut admin, "Second").await;

    admin.post_form(&format!("/post/{first}"), &[("body", "only on first")]).await;

    let page = app.client().get(&format!("/post/{second}")).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(!page.body.contains("only on first"));
    assert!(app.client().get(&format!("/post/{first}")).await.body.contains("only on first"));
}

#[tokio::test]
async fn empty_comment_is_rejected() {
    let app = TestApp::spawn().await;
    let mut admin = app.admin().await;
    let id = app.seed_post(&mut admin, "Thread").await;

    admin
        .post_form(&format!("/post/{id}"), &[("body", "")])
        .await
        .assert_redirect(&format!("/post/{id}"));
    assert_eq!(app.count("comments").await, 0);
}

#[tokio::test]
async fn commenting_on_a_missing_post_is_404() {
    let app = TestApp::spawn().await;
    let mut reader = app.register("reader", "reader@example.com", "pw").await;
    let res = reader.post_form("/post/99", &[("body", "hello?")]).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}
