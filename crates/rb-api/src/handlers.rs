//! # rb-api Handlers
//!
//! This module coordinates the flow between HTTP requests and `BlogService`.
//! Flow-control outcomes (bad form input, duplicate registration, failed
//! login, anonymous comment) become a flash message plus redirect; real
//! failures propagate as [`ApiError`].

use askama::Template;
use axum::extract::State;
use axum::http::Uri;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Extension, Form};
use rb_core::error::AppError;
use rb_core::forms::{CommentForm, ContactForm, LoginForm, PostForm, RegisterForm};
use rb_core::models::{Flash, PostDraft, User};
use rb_core::services::{LoginOutcome, RegisterOutcome};
use rb_ui::{
    AboutTemplate, ContactTemplate, IndexTemplate, Layout, LoginTemplate, MakePostTemplate,
    PostSummary, PostTemplate, RegisterTemplate,
};

use crate::error::ApiError;
use crate::extract::PostId;
use crate::middleware::Principal;
use crate::session::Session;
use crate::state::AppState;

type HandlerResult = Result<Response, ApiError>;

/// Resolves the principal and drains flashes for a page render.
async fn page_context(
    state: &AppState,
    session: &mut Session,
) -> Result<(Option<User>, Layout), ApiError> {
    let user = state.service.current_user(session.user_id()).await?;
    let layout = Layout::new(user.as_ref(), state.admin_user_id, session.take_flashes());
    Ok((user, layout))
}

fn render(session: Session, page: impl Template) -> HandlerResult {
    Ok((session, Html(page.render()?)).into_response())
}

fn flash_redirect(mut session: Session, flash: Flash, to: &str) -> HandlerResult {
    session.flash(flash);
    Ok((session, Redirect::to(to)).into_response())
}

// ── Authentication ──────────────────────────────────────────────────────────

pub async fn register_page(State(state): State<AppState>, mut session: Session) -> HandlerResult {
    let (_, layout) = page_context(&state, &mut session).await?;
    render(session, RegisterTemplate { layout })
}

pub async fn register(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<RegisterForm>,
) -> HandlerResult {
    match state.service.register(form).await {
        Ok(RegisterOutcome::Registered(user)) => {
            session.login(user.id);
            Ok((session, Redirect::to("/")).into_response())
        }
        Ok(RegisterOutcome::DuplicateEmail) => flash_redirect(
            session,
            Flash::error("You've already signed up with that email, log in instead"),
            "/login",
        ),
        Err(AppError::ValidationError(msg)) => flash_redirect(session, Flash::error(msg), "/register"),
        Err(AppError::Conflict(_)) => flash_redirect(
            session,
            Flash::error("That username is already taken, please choose another"),
            "/register",
        ),
        Err(e) => Err(e.into()),
    }
}

pub async fn login_page(State(state): State<AppState>, mut session: Session) -> HandlerResult {
    let (_, layout) = page_context(&state, &mut session).await?;
    render(session, LoginTemplate { layout })
}

pub async fn login(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<LoginForm>,
) -> HandlerResult {
    match state.service.login(form).await {
        Ok(LoginOutcome::LoggedIn(user)) => {
            session.login(user.id);
            Ok((session, Redirect::to("/")).into_response())
        }
        Ok(LoginOutcome::UnknownEmail) => flash_redirect(
            session,
            Flash::info("Email not registered yet! Please register below"),
            "/register",
        ),
        Ok(LoginOutcome::WrongPassword) => {
            flash_redirect(session, Flash::error("Invalid password. Please try again"), "/login")
        }
        Err(AppError::ValidationError(msg)) => flash_redirect(session, Flash::error(msg), "/login"),
        Err(e) => Err(e.into()),
    }
}

pub async fn logout(mut session: Session) -> impl IntoResponse {
    session.clear();
    (session, Redirect::to("/"))
}

// ── Reading ─────────────────────────────────────────────────────────────────

pub async fn index(State(state): State<AppState>, mut session: Session) -> HandlerResult {
    let (_, layout) = page_context(&state, &mut session).await?;
    let posts = state.service.list_posts().await?;
    render(
        session,
        IndexTemplate {
            layout,
            posts: posts.iter().map(PostSummary::from).collect(),
        },
    )
}

pub async fn show_post(
    State(state): State<AppState>,
    mut session: Session,
    PostId(id): PostId,
) -> HandlerResult {
    let post = state.service.get_post(id).await?;
    let comments = state.service.list_comments_for_post(id).await?;
    let (_, layout) = page_context(&state, &mut session).await?;
    render(session, PostTemplate::new(layout, &post, &comments))
}

pub async fn add_comment(
    State(state): State<AppState>,
    session: Session,
    PostId(id): PostId,
    Form(form): Form<CommentForm>,
) -> HandlerResult {
    // 404 takes precedence over the login check
    state.service.get_post(id).await?;

    let Some(user) = state.service.current_user(session.user_id()).await? else {
        return flash_redirect(
            session,
            Flash::error("You need to be logged in/registered, in order to post a comment"),
            "/login",
        );
    };

    let back = format!("/post/{id}");
    match state.service.add_comment(id, &user, form).await {
        Ok(_) => Ok((session, Redirect::to(&back)).into_response()),
        Err(AppError::ValidationError(msg)) => flash_redirect(session, Flash::error(msg), &back),
        Err(e) => Err(e.into()),
    }
}

pub async fn about(State(state): State<AppState>, mut session: Session) -> HandlerResult {
    let (_, layout) = page_context(&state, &mut session).await?;
    render(session, AboutTemplate { layout })
}

// ── Admin (behind `require_admin`) ──────────────────────────────────────────

pub async fn new_post_page(
    State(state): State<AppState>,
    mut session: Session,
) -> HandlerResult {
    let (_, layout) = page_context(&state, &mut session).await?;
    render(
        session,
        MakePostTemplate {
            layout,
            form: PostForm::default(),
            is_edit: false,
            action: "/new-post".to_string(),
        },
    )
}

pub async fn create_post(
    State(state): State<AppState>,
    session: Session,
    Extension(Principal(author)): Extension<Principal>,
    Form(form): Form<PostForm>,
) -> HandlerResult {
    match state.service.create_post(&author, form).await {
        Ok(_) => Ok((session, Redirect::to("/")).into_response()),
        Err(e) => post_form_failure(session, e, "/new-post"),
    }
}

pub async fn edit_post_page(
    State(state): State<AppState>,
    mut session: Session,
    PostId(id): PostId,
) -> HandlerResult {
    let existing = state.service.get_post(id).await?;
    let (_, layout) = page_context(&state, &mut session).await?;
    let draft = PostDraft {
        title: existing.post.title,
        subtitle: existing.post.subtitle,
        body: existing.post.body,
        img_url: existing.post.img_url,
    };
    render(
        session,
        MakePostTemplate {
            layout,
            form: PostForm::from(&draft),
            is_edit: true,
            action: format!("/edit-post/{id}"),
        },
    )
}

pub async fn update_post(
    State(state): State<AppState>,
    session: Session,
    Extension(Principal(editor)): Extension<Principal>,
    PostId(id): PostId,
    Form(form): Form<PostForm>,
) -> HandlerResult {
    match state.service.edit_post(id, &editor, form).await {
        Ok(()) => Ok((session, Redirect::to(&format!("/post/{id}"))).into_response()),
        Err(e) => post_form_failure(session, e, &format!("/edit-post/{id}")),
    }
}

/// Sends the author back to the form for fixable errors.
fn post_form_failure(session: Session, err: AppError, back: &str) -> HandlerResult {
    match err {
        AppError::ValidationError(msg) => flash_redirect(session, Flash::error(msg), back),
        AppError::Conflict(_) => flash_redirect(
            session,
            Flash::error("A post with that title already exists"),
            back,
        ),
        other => Err(other.into()),
    }
}

pub async fn delete_post(State(state): State<AppState>, PostId(id): PostId) -> HandlerResult {
    state.service.delete_post(id).await?;
    Ok(Redirect::to("/").into_response())
}

// ── Contact ─────────────────────────────────────────────────────────────────

pub async fn contact_page(State(state): State<AppState>, mut session: Session) -> HandlerResult {
    let (_, layout) = page_context(&state, &mut session).await?;
    render(session, ContactTemplate { layout, msg_sent: false })
}

pub async fn contact(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<ContactForm>,
) -> HandlerResult {
    let result = state.service.send_contact_message(form).await;
    let (_, mut layout) = page_context(&state, &mut session).await?;
    match result {
        Ok(()) => render(session, ContactTemplate { layout, msg_sent: true }),
        Err(AppError::ValidationError(msg)) => {
            layout.flashes.push(Flash::error(msg));
            render(session, ContactTemplate { layout, msg_sent: false })
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::App(AppError::not_found("Page", uri.path()))
}
