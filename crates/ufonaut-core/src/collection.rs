//! Postman v2.1 collection model and collection-level operations.
//!
//! Only the fields this crate reads or writes are modelled. Request items
//! and folders share the `item` array, distinguished by the presence of a
//! nested `item` list.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::MethodPath;
use crate::normalize::{normalized_endpoint_name, UNDEFINED_PATH};

/// Collection format schema URL written into `info.schema`.
pub const SCHEMA_V2_1: &str =
    "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

fn default_schema() -> String {
    SCHEMA_V2_1.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub info: Info,
    #[serde(default)]
    pub item: Vec<Item>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variable: Vec<Variable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    #[serde(rename = "_postman_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_schema")]
    pub schema: String,
}

/// An entry of an `item` array: a folder or a single request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Item {
    Folder(Folder),
    Request(RequestItem),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub item: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub request: Request,
    #[serde(default)]
    pub response: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: String,
    #[serde(default)]
    pub header: Vec<Header>,
    #[serde(default)]
    pub url: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<RequestAuth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Url {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub host: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<QueryParam>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variable: Vec<Variable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParam {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

/// A path variable (`url.variable`) or a collection-level variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub var_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub key: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl Body {
    /// A raw JSON body.
    pub fn raw_json(raw: impl Into<String>) -> Self {
        Self {
            mode: "raw".to_string(),
            raw: Some(raw.into()),
            options: Some(serde_json::json!({ "raw": { "language": "json" } })),
        }
    }
}

/// Lifecycle hook a script is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Listen {
    Prerequest,
    Test,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub listen: Listen,
    pub script: Script,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(rename = "type")]
    pub script_type: String,
    pub exec: Vec<String>,
}

impl Event {
    /// A JavaScript event; the source is stored one line per `exec` entry.
    pub fn javascript(listen: Listen, source: &str) -> Self {
        Self {
            listen,
            script: Script {
                script_type: "text/javascript".to_string(),
                exec: source.split('\n').map(str::to_string).collect(),
            },
        }
    }

    /// The script source with lines joined back together.
    pub fn source(&self) -> String {
        self.script.exec.join("\n")
    }
}

/// Native request authorization.
///
/// Serializes as `{"type": "<scheme>", "<scheme>": [{key, value, type}]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RequestAuth {
    Noauth,
    Basic { basic: Vec<AuthAttribute> },
    Bearer { bearer: Vec<AuthAttribute> },
    Apikey { apikey: Vec<AuthAttribute> },
}

impl RequestAuth {
    pub fn is_noauth(&self) -> bool {
        matches!(self, RequestAuth::Noauth)
    }

    pub fn attributes(&self) -> &[AuthAttribute] {
        match self {
            RequestAuth::Noauth => &[],
            RequestAuth::Basic { basic } => basic,
            RequestAuth::Bearer { bearer } => bearer,
            RequestAuth::Apikey { apikey } => apikey,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthAttribute {
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub value_type: String,
}

impl AuthAttribute {
    pub fn string(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
            value_type: "string".to_string(),
        }
    }
}

/// Actual and normalized identity of a request item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub actual: MethodPath,
    pub normalized: String,
}

impl Url {
    /// Lower-cased, slash-joined path segments, `None` when the URL has no
    /// path or an empty one.
    pub fn path_key(&self) -> Option<String> {
        self.path
            .as_ref()
            .filter(|p| !p.is_empty())
            .map(|p| p.join("/").to_lowercase())
    }
}

impl RequestItem {
    /// The endpoint identity; a missing or empty path reads as `"undefined"`.
    pub fn endpoint(&self) -> Endpoint {
        let path = self
            .request
            .url
            .path_key()
            .unwrap_or_else(|| UNDEFINED_PATH.to_string());
        Endpoint {
            normalized: normalized_endpoint_name(&self.request.method, Some(&path)),
            actual: MethodPath {
                method: self.request.method.to_lowercase(),
                path,
            },
        }
    }

    /// Case-insensitive (method, path) comparison.
    pub fn matches(&self, target: &MethodPath) -> bool {
        let endpoint = self.endpoint();
        endpoint.actual.method == target.method.to_lowercase()
            && endpoint.actual.path == target.path.to_lowercase()
    }
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            info: Info {
                id: None,
                name: name.into(),
                description: None,
                schema: default_schema(),
            },
            item: Vec::new(),
            variable: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Rename the collection; an empty name is ignored.
    pub fn rename(&mut self, name: &str) {
        if !name.is_empty() {
            self.info.name = name.to_string();
        }
    }

    /// Every request item, depth-first in tree order.
    pub fn request_items(&self) -> Vec<&RequestItem> {
        fn walk<'a>(items: &'a [Item], out: &mut Vec<&'a RequestItem>) {
            for item in items {
                match item {
                    Item::Folder(folder) => walk(&folder.item, out),
                    Item::Request(request) => out.push(request),
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.item, &mut out);
        out
    }

    /// Visit every request item mutably, depth-first in tree order.
    pub fn for_each_item_mut<F: FnMut(&mut RequestItem)>(&mut self, mut f: F) {
        fn walk<F: FnMut(&mut RequestItem)>(items: &mut [Item], f: &mut F) {
            for item in items {
                match item {
                    Item::Folder(folder) => walk(&mut folder.item, f),
                    Item::Request(request) => f(request),
                }
            }
        }
        walk(&mut self.item, &mut f);
    }

    /// Remove and return every request item, dissolving folders.
    pub(crate) fn take_request_items(&mut self) -> Vec<RequestItem> {
        fn drain(items: Vec<Item>, out: &mut Vec<RequestItem>) {
            for item in items {
                match item {
                    Item::Folder(folder) => drain(folder.item, out),
                    Item::Request(request) => out.push(request),
                }
            }
        }
        let mut out = Vec::new();
        drain(std::mem::take(&mut self.item), &mut out);
        out
    }

    /// Actual and normalized endpoint of every request item.
    pub fn list_endpoints(&self) -> Vec<Endpoint> {
        self.request_items()
            .into_iter()
            .map(RequestItem::endpoint)
            .collect()
    }
}
