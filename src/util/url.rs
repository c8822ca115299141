use thiserror::Error;
use url::Url;

/// Errors from validating a link before handing it to the system browser.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
}

/// Validates a story/search-hit link before `open::that`.
///
/// Upstream titles link to arbitrary submitted URLs; refuse anything that
/// is not plain http(s) (`file://`, `javascript:`, custom schemes) so a
/// hostile submission cannot reach local handlers.
pub fn validate_url_for_open(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }
}
