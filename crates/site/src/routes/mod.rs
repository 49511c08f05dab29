//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                    - Home page
//! GET  /health              - Liveness check
//! GET  /health/ready        - Readiness check (database ping)
//!
//! # Auth
//! GET  /register            - Registration page
//! POST /register            - Create account, log in, redirect home
//! GET  /login               - Login page
//! POST /login               - Login action
//! GET  /logout              - Clear session, redirect home
//!
//! # Items
//! GET  /all_procucts        - Product listing (path kept from the v1 site)
//! GET  /item/{id}           - Product detail with comments
//! POST /item/{id}           - Submit a comment (requires login)
//! GET  /add_item            - New item form (admin)
//! POST /add_item            - Create item with image upload (admin)
//! GET  /edit-item/{id}      - Edit form, pre-filled
//! POST /edit-item/{id}      - Apply edits; image optional
//! GET  /delete/{id}         - Delete item and its comments (admin)
//!
//! # Pages
//! GET  /about               - About page
//! GET  /terms_of_service    - Terms of service
//! GET  /privacy_policy      - Privacy policy
//! ```

pub mod auth;
pub mod home;
pub mod items;
pub mod pages;

use axum::{Router, routing::get};

use crate::state::AppState;

/// One-shot notice codes carried through redirect query strings.
///
/// The login and item pages resolve these back to the user-facing text, so
/// a message survives exactly one redirect without any session storage.
pub mod notice {
    /// Registration attempted with an email that already has an account.
    pub const ACCOUNT_EXISTS: &str = "account_exists";
    /// Login attempted with an email that has no account.
    pub const UNKNOWN_EMAIL: &str = "unknown_email";
    /// Login attempted with the wrong password.
    pub const BAD_PASSWORD: &str = "bad_password";
    /// A guest tried to do something that needs an account.
    pub const LOGIN_REQUIRED: &str = "login_required";
    /// A comment was submitted with no text.
    pub const EMPTY_COMMENT: &str = "empty_comment";

    /// Resolve a notice code to its user-facing message.
    #[must_use]
    pub fn message(code: &str) -> Option<&'static str> {
        match code {
            ACCOUNT_EXISTS => Some("You've already signed up with that email, log in instead!"),
            UNKNOWN_EMAIL => Some("That email does not exist, please try again."),
            BAD_PASSWORD => Some("Password incorrect, please try again."),
            LOGIN_REQUIRED => Some("You need to login or register to comment."),
            EMPTY_COMMENT => Some("Comments cannot be empty."),
            _ => None,
        }
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
}

/// Create the item routes router.
pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/all_procucts", get(items::all_products))
        .route("/item/{id}", get(items::show_item).post(items::post_comment))
        .route("/add_item", get(items::add_item_page).post(items::add_item))
        .route(
            "/edit-item/{id}",
            get(items::edit_item_page).post(items::edit_item),
        )
        .route("/delete/{id}", get(items::delete_item))
}

/// Create the static page routes router.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/about", get(pages::about))
        .route("/terms_of_service", get(pages::terms_of_service))
        .route("/privacy_policy", get(pages::privacy_policy))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .merge(auth_routes())
        .merge(item_routes())
        .merge(page_routes())
}

#[cfg(test)]
mod tests {
    use super::notice;

    #[test]
    fn test_notice_messages_resolve() {
        assert!(notice::message(notice::ACCOUNT_EXISTS).is_some());
        assert!(notice::message(notice::UNKNOWN_EMAIL).is_some());
        assert!(notice::message(notice::BAD_PASSWORD).is_some());
        assert!(notice::message(notice::LOGIN_REQUIRED).is_some());
        assert!(notice::message(notice::EMPTY_COMMENT).is_some());
    }

    #[test]
    fn test_unknown_notice_is_silent() {
        assert!(notice::message("nonsense").is_none());
    }
}
