//! Static content page route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub current_user: Option<CurrentUser>,
}

/// Terms of service page template.
#[derive(Template, WebTemplate)]
#[template(path = "tos.html")]
pub struct TermsTemplate {
    pub current_user: Option<CurrentUser>,
}

/// Privacy policy page template.
#[derive(Template, WebTemplate)]
#[template(path = "pp.html")]
pub struct PrivacyTemplate {
    pub current_user: Option<CurrentUser>,
}

/// Display the About page.
pub async fn about(OptionalAuth(current_user): OptionalAuth) -> impl IntoResponse {
    AboutTemplate { current_user }
}

/// Display the Terms of Service page.
pub async fn terms_of_service(OptionalAuth(current_user): OptionalAuth) -> impl IntoResponse {
    TermsTemplate { current_user }
}

/// Display the Privacy Policy page.
pub async fn privacy_policy(OptionalAuth(current_user): OptionalAuth) -> impl IntoResponse {
    PrivacyTemplate { current_user }
}
