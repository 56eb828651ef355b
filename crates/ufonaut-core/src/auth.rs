//! Authorization descriptors and their application to collections.
//!
//! An [`AuthDescriptor`] is the user-facing description read from config or
//! command-line flags. [`build_definition`] turns it into the native
//! [`RequestAuth`] shape, and [`apply_to_collection`] writes that shape onto
//! request items.
//!
//! Attribute order inside each definition is fixed and consumers rely on it:
//!
//! | Scheme   | Attributes                |
//! |----------|---------------------------|
//! | `basic`  | `password`, `username`    |
//! | `bearer` | `token`                   |
//! | `apikey` | `in`, `value`, `key`      |

use serde::{Deserialize, Serialize};

use crate::collection::{AuthAttribute, Collection, RequestAuth};
use crate::error::ConvertError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyAuth {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    /// Where the key is sent, passed through verbatim (`header`, `query`).
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BearerAuth {
    #[serde(default)]
    pub token: Option<String>,
}

/// User-facing authorization description.
///
/// `auth_type` stays a raw string so an unknown scheme can be reported
/// verbatim instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthDescriptor {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<String>,
    #[serde(default)]
    pub forced: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic: Option<BasicAuth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apikey: Option<ApiKeyAuth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer: Option<BearerAuth>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Convert a descriptor into the native authorization definition.
///
/// # Errors
///
/// - [`ConvertError::BasicCredentialsMissing`], [`ConvertError::BearerTokenMissing`],
///   [`ConvertError::ApiKeyMissing`] when a required field is absent or empty.
/// - [`ConvertError::UnsupportedAuthType`] for any other `type`, including a
///   missing one (reported as `undefined`).
pub fn build_definition(descriptor: &AuthDescriptor) -> Result<RequestAuth, ConvertError> {
    match descriptor.auth_type.as_deref() {
        Some("basic") => {
            let basic = descriptor.basic.as_ref();
            let (Some(username), Some(password)) = (
                basic.and_then(|b| non_empty(&b.username)),
                basic.and_then(|b| non_empty(&b.password)),
            ) else {
                return Err(ConvertError::BasicCredentialsMissing);
            };
            Ok(RequestAuth::Basic {
                basic: vec![
                    AuthAttribute::string("password", password),
                    AuthAttribute::string("username", username),
                ],
            })
        }
        Some("bearer") => {
            let token = descriptor
                .bearer
                .as_ref()
                .and_then(|b| non_empty(&b.token))
                .ok_or(ConvertError::BearerTokenMissing)?;
            Ok(RequestAuth::Bearer {
                bearer: vec![AuthAttribute::string("token", token)],
            })
        }
        Some("apikey") => {
            let apikey = descriptor.apikey.as_ref();
            let (Some(key), Some(value), Some(location)) = (
                apikey.and_then(|a| non_empty(&a.key)),
                apikey.and_then(|a| non_empty(&a.value)),
                apikey.and_then(|a| non_empty(&a.location)),
            ) else {
                return Err(ConvertError::ApiKeyMissing);
            };
            Ok(RequestAuth::Apikey {
                apikey: vec![
                    AuthAttribute::string("in", location),
                    AuthAttribute::string("value", value),
                    AuthAttribute::string("key", key),
                ],
            })
        }
        other => Err(ConvertError::UnsupportedAuthType(
            other.unwrap_or("undefined").to_string(),
        )),
    }
}

/// Write `definition` onto request items.
///
/// An item is overwritten when it already carries a non-`noauth`
/// authorization, or when `force_all` is set. Items declaring `noauth` and
/// items without any authorization are otherwise left as they are.
pub fn apply_to_collection(collection: &mut Collection, definition: &RequestAuth, force_all: bool) {
    collection.for_each_item_mut(|item| {
        let has_auth = item
            .request
            .auth
            .as_ref()
            .is_some_and(|auth| !auth.is_noauth());
        if has_auth || force_all {
            tracing::debug!(item = %item.name, "applying authorization");
            item.request.auth = Some(definition.clone());
        }
    });
}
