//! Rewrite example values into `{{name}}` template variables.
//!
//! Request bodies are rewritten in two phases:
//!
//! 1. [`rewrite_to_placeholders`] replaces every scalar leaf with
//!    `{{<keyPath>}}`, where the key path is the parent path followed by the
//!    capitalized child key (`categoryId`, `photoUrls0`, `tags1Name`).
//!    Numeric and boolean leaves are prefixed with [`UNQUOTE_SENTINEL`].
//! 2. [`to_template_json`] pretty-prints the tree and strips the quotes
//!    around sentinel-tagged strings, yielding `"quantity": {{quantity}}`.
//!
//! The rewrite is not idempotent: a second pass over the rewritten tree
//! turns every leaf into a quoted placeholder.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::collection::{Collection, Url};
use crate::error::ConvertError;
use crate::normalize::capitalize;

/// Prefix marking a placeholder that must be emitted without quotes.
pub const UNQUOTE_SENTINEL: &str = "<unquote>";

/// Example values the OpenAPI backend emits for numeric and boolean schemas.
const UNQUOTED_TYPE_MARKERS: &[&str] = &["<long>", "<integer>", "<number>", "<boolean>"];

/// Matches a whole JSON string token holding a sentinel-tagged placeholder.
/// Escapes inside the name (keys containing quotes or backslashes) are kept.
static UNQUOTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""<unquote>(\{\{(?:[^"\\]|\\.)*\}\})""#).expect("unquote pattern is valid")
});

/// Wrap a variable name as `{{name}}`.
pub fn placeholder(name: &str) -> String {
    format!("{{{{{name}}}}}")
}

/// Replace every scalar leaf of a composite value with a placeholder.
///
/// A scalar root has no key to derive a name from and is returned unchanged.
pub fn rewrite_to_placeholders(value: &Value) -> Value {
    match value {
        Value::Object(_) | Value::Array(_) => rewrite_node(value, ""),
        scalar => scalar.clone(),
    }
}

fn child_key(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}{}", capitalize(key))
    }
}

fn rewrite_node(value: &Value, key_path: &str) -> Value {
    match value {
        Value::Object(map) => {
            let rewritten: Map<String, Value> = map
                .iter()
                .map(|(key, child)| (key.clone(), rewrite_node(child, &child_key(key_path, key))))
                .collect();
            Value::Object(rewritten)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(index, child)| rewrite_node(child, &child_key(key_path, &index.to_string())))
                .collect(),
        ),
        leaf => {
            let prefix = if is_unquoted(leaf) { UNQUOTE_SENTINEL } else { "" };
            Value::String(format!("{prefix}{}", placeholder(key_path)))
        }
    }
}

fn is_unquoted(leaf: &Value) -> bool {
    match leaf {
        Value::Number(_) | Value::Bool(_) => true,
        Value::String(s) => UNQUOTED_TYPE_MARKERS.contains(&s.as_str()),
        _ => false,
    }
}

/// Pretty-print (two-space indent) and strip quotes from sentinel-tagged placeholders.
pub fn to_template_json(value: &Value) -> Result<String, ConvertError> {
    let json = serde_json::to_string_pretty(value)?;
    Ok(UNQUOTE_RE.replace_all(&json, "${1}").into_owned())
}

/// Parse a raw JSON body, rewrite it and serialize it back.
pub fn rewrite_raw_body(raw: &str) -> Result<String, ConvertError> {
    let parsed: Value = serde_json::from_str(raw)?;
    to_template_json(&rewrite_to_placeholders(&parsed))
}

/// Point every query parameter and path variable at a same-named variable.
pub fn rewrite_url_params(url: &mut Url) {
    for variable in &mut url.variable {
        variable.value = placeholder(&variable.key);
    }
    for param in &mut url.query {
        param.value = Some(placeholder(&param.key));
    }
}

/// Apply the body and parameter rewrite to every request item.
///
/// Bodies that are not JSON are left as they are.
pub fn rewrite_collection(collection: &mut Collection) {
    collection.for_each_item_mut(|item| {
        if let Some(raw) = item
            .request
            .body
            .as_mut()
            .and_then(|body| body.raw.as_mut())
            .filter(|raw| !raw.is_empty())
        {
            match rewrite_raw_body(raw) {
                Ok(rewritten) => *raw = rewritten,
                Err(err) => {
                    tracing::warn!(item = %item.name, error = %err, "request body is not JSON, leaving it unchanged");
                }
            }
        }
        rewrite_url_params(&mut item.request.url);
    });
}
