//! Utility functions for common operations.
//!
//! - **Text processing**: Unicode-aware width/truncation for terminal
//!   rendering, and flattening of upstream HTML fragments into plain text
//! - **URL validation**: scheme checks before opening links in the browser

mod text;
mod url;

pub use text::{clean_html, display_width, truncate_to_width};
pub use url::{validate_url_for_open, UrlValidationError};
