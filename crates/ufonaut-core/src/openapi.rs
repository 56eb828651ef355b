//! OpenAPI v3 → collection conversion backend.
//!
//! The orchestrator talks to a [`CollectionBackend`]; [`OpenApiBackend`] is
//! the built-in implementation. It walks `paths` and `components` far enough
//! to emit one request item per operation and does not validate the
//! document beyond that.
//!
//! Example values are type markers (`<string>`, `<long>`, `<boolean>`, ...)
//! rather than concrete data, so the placeholder rewrite can tell numeric
//! leaves from string leaves.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::collection::{
    AuthAttribute, Body, Collection, Folder, Header, Item, QueryParam, Request, RequestAuth,
    RequestItem, Url, Variable,
};
use crate::error::ConvertError;
use crate::placeholder::placeholder;

const METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

const BASE_URL_VARIABLE: &str = "baseUrl";

/// Outcome reported by a backend.
///
/// `result == false` carries a human-readable `reason`; a successful run
/// carries the generated collections in `output`.
#[derive(Debug, Clone, Default)]
pub struct ConversionResult {
    pub result: bool,
    pub reason: Option<String>,
    pub output: Vec<Collection>,
}

impl ConversionResult {
    pub fn success(output: Vec<Collection>) -> Self {
        Self {
            result: true,
            reason: None,
            output,
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            result: false,
            reason: Some(reason.into()),
            output: Vec::new(),
        }
    }
}

/// Converts OpenAPI document text into collections.
pub trait CollectionBackend {
    fn convert(&self, document: &str) -> Result<ConversionResult, ConvertError>;
}

/// Built-in backend for JSON or YAML OpenAPI v3 documents.
#[derive(Debug, Clone)]
pub struct OpenApiBackend {
    /// Maximum schema nesting followed while generating example bodies.
    pub max_depth: usize,
}

impl Default for OpenApiBackend {
    fn default() -> Self {
        Self { max_depth: 50 }
    }
}

impl CollectionBackend for OpenApiBackend {
    fn convert(&self, document: &str) -> Result<ConversionResult, ConvertError> {
        let doc = parse_document(document)?;

        // YAML reads an unquoted `openapi: 3.0` as a number
        let version = match doc.get("openapi") {
            Some(Value::String(v)) => v.clone(),
            Some(Value::Number(v)) => v.to_string(),
            _ => String::new(),
        };
        if !version.starts_with('3') {
            return Ok(ConversionResult::failure(format!(
                "Unsupported OpenAPI version: '{version}', expected 3.x"
            )));
        }
        let Some(paths) = doc.get("paths").and_then(Value::as_object) else {
            return Ok(ConversionResult::failure(
                "Document has no 'paths' object",
            ));
        };

        let builder = CollectionBuilder {
            root: &doc,
            max_depth: self.max_depth,
        };
        Ok(ConversionResult::success(vec![builder.build(paths)]))
    }
}

/// Parse document text as JSON, falling back to YAML.
pub fn parse_document(text: &str) -> Result<Value, ConvertError> {
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(json_err) => serde_yaml::from_str::<Value>(text).map_err(|yaml_err| {
            tracing::debug!(error = %json_err, "document is not JSON");
            ConvertError::DocumentParse(yaml_err.to_string())
        }),
    }
}

struct CollectionBuilder<'a> {
    root: &'a Value,
    max_depth: usize,
}

impl CollectionBuilder<'_> {
    fn build(&self, paths: &Map<String, Value>) -> Collection {
        let info = self.root.get("info");
        let name = info
            .and_then(|i| i.get("title"))
            .and_then(Value::as_str)
            .unwrap_or("Converted collection");
        let mut collection = Collection::new(name);
        collection.info.description = info
            .and_then(|i| i.get("description"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let base_url = self
            .root
            .pointer("/servers/0/url")
            .and_then(Value::as_str)
            .unwrap_or("/");
        collection.variable.push(Variable {
            key: BASE_URL_VARIABLE.to_string(),
            value: base_url.to_string(),
            var_type: Some("string".to_string()),
            description: None,
        });

        for (path, path_item) in paths {
            let path_item = self.resolve(path_item);
            let path_params = path_item.get("parameters");
            for method in METHODS {
                let Some(operation) = path_item.get(*method) else {
                    continue;
                };
                let item = self.request_item(path, method, operation, path_params);
                insert_grouped(&mut collection.item, path, item);
            }
        }
        tracing::debug!(
            items = collection.request_items().len(),
            "generated collection from OpenAPI document"
        );
        collection
    }

    fn request_item(
        &self,
        path: &str,
        method: &str,
        operation: &Value,
        path_params: Option<&Value>,
    ) -> RequestItem {
        let name = operation
            .get("summary")
            .or_else(|| operation.get("operationId"))
            .and_then(Value::as_str)
            .unwrap_or(path)
            .to_string();

        let mut url = Url {
            host: vec![placeholder(BASE_URL_VARIABLE)],
            path: Some(path_segments(path)),
            ..Url::default()
        };
        let mut header = Vec::new();

        for param in self.merged_params(path_params, operation.get("parameters")) {
            let Some(key) = param.get("name").and_then(Value::as_str) else {
                continue;
            };
            let description = param
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string);
            let value = param
                .get("schema")
                .map(|schema| self.marker(schema))
                .unwrap_or_else(|| "<string>".to_string());
            match param.get("in").and_then(Value::as_str) {
                Some("path") => url.variable.push(Variable {
                    key: key.to_string(),
                    value,
                    var_type: None,
                    description,
                }),
                Some("query") => url.query.push(QueryParam {
                    key: key.to_string(),
                    value: Some(value),
                    description,
                    disabled: None,
                }),
                Some("header") => header.push(Header {
                    key: key.to_string(),
                    value,
                    description,
                }),
                _ => {}
            }
        }
        url.raw = Some(raw_url(&url));

        let body = self.json_body(operation);
        if body.is_some() {
            header.push(Header {
                key: "Content-Type".to_string(),
                value: "application/json".to_string(),
                description: None,
            });
        }
        if produces_json(operation) {
            header.push(Header {
                key: "Accept".to_string(),
                value: "application/json".to_string(),
                description: None,
            });
        }

        RequestItem {
            id: None,
            name,
            request: Request {
                method: method.to_uppercase(),
                header,
                url,
                body,
                auth: self.auth(operation),
                description: operation
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
            response: Vec::new(),
            event: Vec::new(),
        }
    }

    /// Path-level parameters overridden by operation-level ones with the
    /// same `name` and `in`, in first-seen order.
    fn merged_params<'v>(
        &'v self,
        path_level: Option<&'v Value>,
        op_level: Option<&'v Value>,
    ) -> Vec<&'v Value> {
        let mut merged: Vec<&'v Value> = Vec::new();
        for source in [path_level, op_level].into_iter().flatten() {
            for param in source.as_array().into_iter().flatten() {
                let param = self.resolve(param);
                let identity = (param.get("name"), param.get("in"));
                match merged
                    .iter()
                    .position(|p| (p.get("name"), p.get("in")) == identity)
                {
                    Some(index) => merged[index] = param,
                    None => merged.push(param),
                }
            }
        }
        merged
    }

    fn json_body(&self, operation: &Value) -> Option<Body> {
        let request_body = self.resolve(operation.get("requestBody")?);
        let content = request_body.get("content")?.as_object()?;
        let media = content
            .get("application/json")
            .or_else(|| {
                content
                    .iter()
                    .find(|(media_type, _)| media_type.contains("json"))
                    .map(|(_, media)| media)
            })?;
        let example = match media.get("schema") {
            Some(schema) => self.example(schema, 0, &mut HashSet::new()),
            None => Value::Object(Map::new()),
        };
        let raw = serde_json::to_string_pretty(&example).ok()?;
        Some(Body::raw_json(raw))
    }

    fn auth(&self, operation: &Value) -> Option<RequestAuth> {
        let requirements = operation
            .get("security")
            .or_else(|| self.root.get("security"))?
            .as_array()?;
        let Some(first) = requirements.first() else {
            return Some(RequestAuth::Noauth);
        };
        // an empty requirement object marks the operation as optionally anonymous
        let Some((scheme_name, _)) = first.as_object()?.iter().next() else {
            return Some(RequestAuth::Noauth);
        };
        let scheme = self.resolve(
            self.root
                .pointer(&format!("/components/securitySchemes/{scheme_name}"))?,
        );

        match (
            scheme.get("type").and_then(Value::as_str),
            scheme
                .get("scheme")
                .and_then(Value::as_str)
                .map(str::to_lowercase),
        ) {
            (Some("http"), Some(s)) if s == "basic" => Some(RequestAuth::Basic {
                basic: vec![
                    AuthAttribute::string("password", &placeholder("basicAuthPassword")),
                    AuthAttribute::string("username", &placeholder("basicAuthUsername")),
                ],
            }),
            (Some("http"), Some(s)) if s == "bearer" => Some(RequestAuth::Bearer {
                bearer: vec![AuthAttribute::string("token", &placeholder("bearerToken"))],
            }),
            (Some("apiKey"), _) => {
                let location = scheme.get("in").and_then(Value::as_str).unwrap_or("header");
                let key = scheme.get("name").and_then(Value::as_str).unwrap_or("X-API-KEY");
                Some(RequestAuth::Apikey {
                    apikey: vec![
                        AuthAttribute::string("in", location),
                        AuthAttribute::string("value", &placeholder("apiKey")),
                        AuthAttribute::string("key", key),
                    ],
                })
            }
            (kind, _) => {
                tracing::debug!(scheme = %scheme_name, ?kind, "security scheme not mapped");
                None
            }
        }
    }

    /// Follow a local `$ref` chain; unresolvable refs return the node itself.
    fn resolve<'v>(&'v self, node: &'v Value) -> &'v Value {
        let mut current = node;
        for _ in 0..self.max_depth {
            let Some(target) = current
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|r| r.strip_prefix('#'))
                .and_then(|pointer| self.root.pointer(pointer))
            else {
                break;
            };
            current = target;
        }
        current
    }

    /// Type marker for a parameter schema.
    fn marker(&self, schema: &Value) -> String {
        match self.example(schema, 0, &mut HashSet::new()) {
            Value::String(s) => s,
            other => other.to_string(),
        }
    }

    /// Example value for a schema built from type markers.
    fn example(&self, schema: &Value, depth: usize, visiting: &mut HashSet<String>) -> Value {
        if depth > self.max_depth {
            return Value::String("<object>".to_string());
        }

        if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
            if !visiting.insert(reference.to_string()) {
                return Value::String("<object>".to_string());
            }
            let target = reference
                .strip_prefix('#')
                .and_then(|pointer| self.root.pointer(pointer));
            let value = match target {
                Some(target) => self.example(target, depth + 1, visiting),
                None => {
                    tracing::warn!(reference, "unresolvable $ref in schema");
                    Value::String("<object>".to_string())
                }
            };
            visiting.remove(reference);
            return value;
        }

        if let Some(parts) = schema.get("allOf").and_then(Value::as_array) {
            let mut merged = Map::new();
            for part in parts {
                if let Value::Object(fields) = self.example(part, depth + 1, visiting) {
                    merged.extend(fields);
                }
            }
            return Value::Object(merged);
        }

        for key in ["oneOf", "anyOf"] {
            if let Some(first) = schema
                .get(key)
                .and_then(Value::as_array)
                .and_then(|variants| variants.first())
            {
                return self.example(first, depth + 1, visiting);
            }
        }

        match schema_type(schema) {
            Some("object") => self.object_example(schema, depth, visiting),
            None if schema.get("properties").is_some() => {
                self.object_example(schema, depth, visiting)
            }
            Some("array") => {
                let item = match schema.get("items") {
                    Some(items) => self.example(items, depth + 1, visiting),
                    None => Value::String("<string>".to_string()),
                };
                Value::Array(vec![item.clone(), item])
            }
            Some("integer") => {
                let marker = match schema.get("format").and_then(Value::as_str) {
                    Some("int64") => "<long>",
                    _ => "<integer>",
                };
                Value::String(marker.to_string())
            }
            Some("number") => Value::String("<number>".to_string()),
            Some("boolean") => Value::String("<boolean>".to_string()),
            _ => {
                let marker = match schema.get("format").and_then(Value::as_str) {
                    Some("date-time") => "<dateTime>",
                    Some("date") => "<date>",
                    Some("uuid") => "<uuid>",
                    _ => "<string>",
                };
                Value::String(marker.to_string())
            }
        }
    }

    fn object_example(
        &self,
        schema: &Value,
        depth: usize,
        visiting: &mut HashSet<String>,
    ) -> Value {
        let mut fields = Map::new();
        if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
            for (name, property) in properties {
                fields.insert(name.clone(), self.example(property, depth + 1, visiting));
            }
        }
        Value::Object(fields)
    }
}

/// The first concrete `type`, accepting the 3.1 array form.
fn schema_type(schema: &Value) -> Option<&str> {
    match schema.get("type")? {
        Value::String(t) => Some(t),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null"),
        _ => None,
    }
}

fn produces_json(operation: &Value) -> bool {
    operation
        .get("responses")
        .and_then(Value::as_object)
        .is_some_and(|responses| {
            responses.values().any(|response| {
                response
                    .get("content")
                    .and_then(Value::as_object)
                    .is_some_and(|content| content.keys().any(|k| k.contains("json")))
            })
        })
}

/// `/pet/{petId}/uploadImage` → `["pet", ":petId", "uploadImage"]`.
fn path_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.replace('{', ":").replace('}', ""))
        .collect()
}

fn raw_url(url: &Url) -> String {
    let mut raw = url.host.join(".");
    for segment in url.path.iter().flatten() {
        raw.push('/');
        raw.push_str(segment);
    }
    let query: Vec<String> = url
        .query
        .iter()
        .map(|q| format!("{}={}", q.key, q.value.as_deref().unwrap_or("")))
        .collect();
    if !query.is_empty() {
        raw.push('?');
        raw.push_str(&query.join("&"));
    }
    raw
}

/// Place the item in the folder named after the first path segment.
fn insert_grouped(items: &mut Vec<Item>, path: &str, item: RequestItem) {
    let Some(group) = path.split('/').find(|s| !s.is_empty()) else {
        items.push(Item::Request(item));
        return;
    };
    let existing = items.iter_mut().find_map(|entry| match entry {
        Item::Folder(folder) if folder.name == group => Some(folder),
        _ => None,
    });
    match existing {
        Some(folder) => folder.item.push(Item::Request(item)),
        None => items.push(Item::Folder(Folder {
            name: group.to_string(),
            description: None,
            item: vec![Item::Request(item)],
        })),
    }
}
