//! Configuration for collection post-processing and set creation.
//!
//! ## Serialization Format
//!
//! Config files use `camelCase` field names (e.g. `collectionName`,
//! `scriptsPath`, `preRequestTemplateFilePath`).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::AuthDescriptor;
use crate::error::ConvertError;
use crate::scripts::ScriptEntry;

/// An HTTP method and resource path pair, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodPath {
    pub method: String,
    pub path: String,
}

impl MethodPath {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
        }
    }
}

/// Explicit ordering of collection items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderList {
    #[serde(default)]
    pub order: Vec<MethodPath>,
}

/// Location of a pre-request script template file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptTemplate {
    pub pre_request_template_file_path: PathBuf,
}

/// One output collection of a sets run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetConfig {
    pub collection_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scripts_path: Option<PathBuf>,
    #[serde(default)]
    pub order: Vec<MethodPath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<ScriptTemplate>,
}

/// Sets config file: `{"sets": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetsConfig {
    #[serde(default)]
    pub sets: Vec<SetConfig>,
}

impl SetsConfig {
    /// Parse a sets config, mapping any structural problem to
    /// [`ConvertError::SetsConfigInvalid`].
    pub fn from_value(value: &Value) -> Result<Self, ConvertError> {
        let config: SetsConfig =
            SetsConfig::deserialize(value).map_err(|_| ConvertError::SetsConfigInvalid)?;
        config.validated()
    }

    /// The config itself when it holds at least one set.
    pub fn validated(self) -> Result<Self, ConvertError> {
        if self.sets.is_empty() {
            return Err(ConvertError::SetsConfigInvalid);
        }
        Ok(self)
    }
}

/// Post-processing applied to a single converted collection.
#[derive(Debug, Clone, Default)]
pub struct CollectionOptions {
    /// Reorder items, keeping unlisted ones at the end.
    pub order: Option<OrderList>,
    /// Script entries to attach.
    pub scripts: Option<Vec<ScriptEntry>>,
    /// Pre-request template text, only used together with `scripts`.
    pub pre_request_template: Option<String>,
    /// New collection name.
    pub collection_name: Option<String>,
    /// Authorization to apply to the collection's items.
    pub auth: Option<AuthDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sets_config_reads_camel_case() {
        let value = json!({
            "sets": [{
                "collectionName": "smoke",
                "scriptsPath": "./scripts",
                "order": [{ "method": "GET", "path": "pet" }],
                "auth": {
                    "type": "apikey",
                    "forced": true,
                    "apikey": { "key": "X-API-KEY", "value": "secret", "location": "header" }
                },
                "template": { "preRequestTemplateFilePath": "./pre.template" }
            }]
        });

        let config = SetsConfig::from_value(&value).unwrap();
        let set = &config.sets[0];
        assert_eq!(set.collection_name, "smoke");
        assert_eq!(set.scripts_path, Some(PathBuf::from("./scripts")));
        assert_eq!(set.order, vec![MethodPath::new("GET", "pet")]);
        let auth = set.auth.as_ref().unwrap();
        assert!(auth.forced);
        assert_eq!(
            auth.apikey.as_ref().unwrap().location,
            Some("header".to_string())
        );
        assert_eq!(
            set.template.as_ref().unwrap().pre_request_template_file_path,
            PathBuf::from("./pre.template")
        );
    }

    #[test]
    fn test_empty_apikey_location_reaches_auth_validation() {
        let value = json!({
            "sets": [{
                "collectionName": "smoke",
                "auth": {
                    "type": "apikey",
                    "apikey": { "key": "k", "value": "v", "location": "" }
                }
            }]
        });

        let config = SetsConfig::from_value(&value).unwrap();
        let auth = config.sets[0].auth.as_ref().unwrap();
        let err = crate::auth::build_definition(auth).unwrap_err();
        assert_eq!(err.to_string(), "Api key, key value or key location is missing");
    }

    #[test]
    fn test_empty_sets_rejected() {
        let err = SetsConfig::from_value(&json!({ "sets": [] })).unwrap_err();
        assert!(matches!(err, ConvertError::SetsConfigInvalid));
    }

    #[test]
    fn test_malformed_sets_rejected() {
        for value in [json!(null), json!({ "sets": "nope" }), json!([1, 2])] {
            let err = SetsConfig::from_value(&value).unwrap_err();
            assert!(matches!(err, ConvertError::SetsConfigInvalid));
        }
    }

    #[test]
    fn test_order_list_round_trip() {
        let list: OrderList =
            serde_json::from_value(json!({ "order": [{ "method": "post", "path": "store/order" }] }))
                .unwrap();
        assert_eq!(list.order[0], MethodPath::new("post", "store/order"));
        let back = serde_json::to_value(&list).unwrap();
        assert_eq!(back["order"][0]["path"], json!("store/order"));
    }
}
