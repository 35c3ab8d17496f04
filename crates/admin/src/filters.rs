//! Custom Askama template filters.

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// URL of a file under `/static`, versioned so browsers refetch it after an
/// upgrade.
///
/// Usage in templates: `{{ "admin.css"|asset }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn asset(file: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(asset_url(&file.to_string()))
}

fn asset_url(file: &str) -> String {
    format!(
        "/static/{}?v={}",
        file.trim_start_matches('/'),
        env!("CARGO_PKG_VERSION")
    )
}
