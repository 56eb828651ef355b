//! Loading the OpenAPI document from a local path or a remote URL.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use reqwest::blocking::Client;
use reqwest::Url;

/// Input document location and credentials for fetching it.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Local path or http(s) URL of the OpenAPI document (JSON or YAML)
    pub input: String,

    /// Basic auth username for a protected URL
    #[arg(short = 'u', long)]
    pub username: Option<String>,

    /// Basic auth password for a protected URL
    #[arg(short = 'p', long)]
    pub password: Option<String>,

    /// X-API-KEY header value for a protected URL
    #[arg(short = 'x', long)]
    pub x_api_key: Option<String>,

    /// Authorization: Bearer token for a protected URL
    #[arg(short = 'b', long)]
    pub bearer_token: Option<String>,
}

/// Credentials sent with the document request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchAuth {
    None,
    Basic { username: String, password: String },
    ApiKey(String),
    Bearer(String),
}

fn given(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl SourceArgs {
    /// Validate the credential flags; at most one scheme may be used.
    pub fn fetch_auth(&self) -> Result<FetchAuth> {
        let username = given(&self.username);
        let password = given(&self.password);
        let api_key = given(&self.x_api_key);
        let token = given(&self.bearer_token);

        match (username, password) {
            (Some(_), None) => bail!("Basic auth password is missing"),
            (None, Some(_)) => bail!("Basic auth username is missing"),
            _ => {}
        }
        let schemes = [username.is_some(), api_key.is_some(), token.is_some()];
        if schemes.iter().filter(|used| **used).count() > 1 {
            bail!("Please use either basic auth, X-API-KEY or Bearer token");
        }

        Ok(match (username, password, api_key, token) {
            (Some(username), Some(password), _, _) => FetchAuth::Basic {
                username: username.to_string(),
                password: password.to_string(),
            },
            (_, _, Some(key), _) => FetchAuth::ApiKey(key.to_string()),
            (_, _, _, Some(token)) => FetchAuth::Bearer(token.to_string()),
            _ => FetchAuth::None,
        })
    }
}

/// The input as an http(s) URL, if it is one.
fn remote_url(input: &str) -> Option<Url> {
    Url::parse(input)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

/// Read the document text from disk or over HTTP.
pub fn load(source: &SourceArgs) -> Result<String> {
    match remote_url(&source.input) {
        Some(url) => fetch(url, &source.fetch_auth()?),
        None => {
            let path = Path::new(&source.input);
            if !path.is_file() {
                bail!(
                    "{} not found or you do not have access to the file",
                    source.input
                );
            }
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read input file: {}", path.display()))
        }
    }
}

fn fetch(url: Url, auth: &FetchAuth) -> Result<String> {
    tracing::debug!(%url, "fetching OpenAPI document");
    let client = Client::new();
    let mut request = client.get(url.clone());
    request = match auth {
        FetchAuth::None => request,
        FetchAuth::Basic { username, password } => request.basic_auth(username, Some(password)),
        FetchAuth::ApiKey(key) => request.header("X-API-KEY", key),
        FetchAuth::Bearer(token) => request.bearer_auth(token),
    };

    let response = request
        .send()
        .with_context(|| format!("Failed to get {url}"))?;
    let status = response.status();
    if !status.is_success() {
        bail!("Failed to get {url}. Reason: HTTP {status}");
    }
    response
        .text()
        .with_context(|| format!("Failed to read response body from {url}"))
}
