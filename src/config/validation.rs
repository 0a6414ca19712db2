use crate::config::schema::RunConfig;
use crate::error::{Result, SignupError};

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Validate a run configuration before any browser is launched
pub fn validate_config(config: &RunConfig) -> Result<()> {
    if !is_http_url(&config.base_url) {
        return Err(SignupError::Validation(format!(
            "Invalid base URL: {}. Must start with http:// or https://",
            config.base_url
        )));
    }

    if !is_http_url(&config.inbox_url) {
        return Err(SignupError::Validation(format!(
            "Invalid inbox URL: {}. Must start with http:// or https://",
            config.inbox_url
        )));
    }

    if config.email_domain.trim().is_empty() {
        return Err(SignupError::Validation(
            "Email domain cannot be empty".to_string(),
        ));
    }

    if config.password.is_empty() {
        return Err(SignupError::Validation(
            "Password cannot be empty".to_string(),
        ));
    }

    if config.asset_urls.len() != 2 {
        return Err(SignupError::Validation(format!(
            "Exactly two asset URLs are required, got {}",
            config.asset_urls.len()
        )));
    }

    // Asset URLs may be unreachable at run time, but they must at least be HTTP
    if let Some(url) = config.asset_urls.iter().find(|u| !is_http_url(u)) {
        return Err(SignupError::Validation(format!(
            "Invalid asset URL: {}",
            url
        )));
    }

    let viewport = config.browser.viewport;
    if viewport.width == 0 || viewport.height == 0 {
        return Err(SignupError::Validation(format!(
            "Viewport must be non-zero, got {}x{}",
            viewport.width, viewport.height
        )));
    }

    Ok(())
}
