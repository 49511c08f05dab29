//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use crate::services::avatar;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the Gravatar URL for an email address.
///
/// Usage in templates: `{{ comment.author_email|gravatar }}`
#[askama::filter_fn]
pub fn gravatar(email: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(avatar::gravatar_url(&email.to_string()))
}
