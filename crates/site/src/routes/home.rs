//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub current_user: Option<CurrentUser>,
}

/// Display the home page.
pub async fn home(OptionalAuth(current_user): OptionalAuth) -> impl IntoResponse {
    HomeTemplate { current_user }
}
