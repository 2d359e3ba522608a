pub mod client;
pub mod sampler;

pub use client::{HttpClient, HttpClientBuilder};
pub use sampler::{AttemptOutcome, LatencySession};

use crate::error::LatmeterError;

/// Validate a target URL before a session is created: scheme must be HTTP(S)
/// and the host must carry a domain ending. Returns the trimmed URL.
pub fn validate_url(url: &str) -> Result<String, LatmeterError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(LatmeterError::InvalidUrl("URL cannot be empty".to_string()));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(LatmeterError::InvalidUrl(format!(
            "URL must start with http:// or https://: {url}"
        )));
    }
    if !url.contains('.') || url.ends_with('.') {
        return Err(LatmeterError::InvalidUrl(format!(
            "URL must contain a valid domain ending: {url}"
        )));
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_https_url_and_trims_it() {
        let url = validate_url("  https://example.com  ").expect("should be valid");
        assert_eq!(url, "https://example.com");
    }

    #[test]
    fn accepts_http_url() {
        assert!(validate_url("http://example.com/path").is_ok());
    }

    #[test]
    fn rejects_empty_url() {
        assert!(matches!(
            validate_url("   "),
            Err(LatmeterError::InvalidUrl(_))
        ));
    }

    #[test]
    fn rejects_missing_scheme() {
        assert!(matches!(
            validate_url("example.com"),
            Err(LatmeterError::InvalidUrl(_))
        ));
    }

    #[test]
    fn rejects_missing_domain_ending() {
        assert!(matches!(
            validate_url("https://localhost"),
            Err(LatmeterError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_url("https://example."),
            Err(LatmeterError::InvalidUrl(_))
        ));
    }
}
