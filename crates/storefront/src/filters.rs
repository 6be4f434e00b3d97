//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the build-time content hash of the static CSS and JS assets.
///
/// Appended to asset URLs so browsers refetch them after a deploy.
///
/// Usage in templates: `/static/css/main.css?v={{ ""|asset_version }}`
#[askama::filter_fn]
pub fn asset_version(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("ASSET_VERSION"))
}
