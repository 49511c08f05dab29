//! Authentication route handlers.
//!
//! Registration, login, and logout against the local user table.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::Result;
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::routes::notice;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for one-shot notices.
#[derive(Debug, Deserialize)]
pub struct NoticeQuery {
    pub notice: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub current_user: Option<CurrentUser>,
    pub error: Option<String>,
    pub email: String,
    pub name: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub current_user: Option<CurrentUser>,
    pub message: Option<String>,
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    OptionalAuth(current_user): OptionalAuth,
) -> impl IntoResponse {
    RegisterTemplate {
        current_user,
        error: None,
        email: String::new(),
        name: String::new(),
    }
}

/// Handle registration form submission.
///
/// Creates the account, logs the new user in, and redirects home. An
/// already-registered email redirects to the login page with a notice
/// instead of creating a duplicate row.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(current_user): OptionalAuth,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let email = form.email.trim().to_owned();
    let name = form.name.trim().to_owned();

    // Presence validation only; there are no password strength rules.
    if email.is_empty() || form.password.is_empty() || name.is_empty() {
        return Ok(RegisterTemplate {
            current_user,
            error: Some("All fields are required.".to_owned()),
            email,
            name,
        }
        .into_response());
    }

    let auth = AuthService::new(state.pool());

    match auth.register(&email, &form.password, &name).await {
        Ok(user) => {
            set_current_user(&session, &CurrentUser::from(&user)).await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(AuthError::UserAlreadyExists) => Ok(Redirect::to(&format!(
            "/login?notice={}",
            notice::ACCOUNT_EXISTS
        ))
        .into_response()),
        Err(AuthError::InvalidEmail(e)) => Ok(RegisterTemplate {
            current_user,
            error: Some(e.to_string()),
            email,
            name,
        }
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    OptionalAuth(current_user): OptionalAuth,
    Query(query): Query<NoticeQuery>,
) -> impl IntoResponse {
    let message = query
        .notice
        .as_deref()
        .and_then(notice::message)
        .map(str::to_owned);

    LoginTemplate {
        current_user,
        message,
    }
}

/// Handle login form submission.
///
/// An unknown email and a wrong password produce distinct notices, both
/// landing back on the login page. Success establishes the session and
/// redirects home.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(current_user): OptionalAuth,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let email = form.email.trim();

    if email.is_empty() || form.password.is_empty() {
        return Ok(LoginTemplate {
            current_user,
            message: Some("Email and password are required.".to_owned()),
        }
        .into_response());
    }

    let auth = AuthService::new(state.pool());

    match auth.login(email, &form.password).await {
        Ok(user) => {
            set_current_user(&session, &CurrentUser::from(&user)).await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(AuthError::UnknownEmail | AuthError::InvalidEmail(_)) => Ok(Redirect::to(&format!(
            "/login?notice={}",
            notice::UNKNOWN_EMAIL
        ))
        .into_response()),
        Err(AuthError::WrongPassword) => Ok(Redirect::to(&format!(
            "/login?notice={}",
            notice::BAD_PASSWORD
        ))
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Clears the current user and destroys the session.
pub async fn logout(session: Session) -> Result<Response> {
    clear_current_user(&session).await?;
    session.flush().await?;

    Ok(Redirect::to("/").into_response())
}
