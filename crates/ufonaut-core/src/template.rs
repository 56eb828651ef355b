//! Pre-request script templates.
//!
//! A template is plain text with two tokens, substituted literally in a
//! single pass with no escaping:
//!
//! - `<%%= requestBody =%%>`: the item's original raw body
//! - `<%%= scriptContent =%%>`: the endpoint's pre-request script
//!
//! Whitespace inside the delimiters is optional.

use std::path::Path;
use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use crate::error::ConvertError;

static REQUEST_BODY_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<%%=\s*requestBody\s*=%%>").expect("requestBody token pattern is valid")
});

static SCRIPT_CONTENT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<%%=\s*scriptContent\s*=%%>").expect("scriptContent token pattern is valid")
});

/// Substitute the request body and script content into a template.
pub fn interpolate(template: &str, request_body: &str, script_content: &str) -> String {
    let with_body = REQUEST_BODY_TOKEN.replace_all(template, NoExpand(request_body));
    SCRIPT_CONTENT_TOKEN
        .replace_all(&with_body, NoExpand(script_content))
        .into_owned()
}

/// Read a template file.
pub fn load_template(path: &Path) -> Result<String, ConvertError> {
    std::fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))
}
