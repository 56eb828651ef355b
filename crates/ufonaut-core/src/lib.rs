//! # ufonaut-core
//!
//! Converts OpenAPI v3 documents into Postman v2.1 collections whose request
//! bodies and parameters are parameterized with `{{variable}}` placeholders,
//! then post-processes them: explicit ordering, per-endpoint pre-request and
//! test scripts, collection-level authorization and multi-collection "sets".
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use ufonaut_core::{convert, process, CollectionOptions};
//!
//! let document = std::fs::read_to_string("petstore.json").unwrap();
//! let mut collection = convert(&document).unwrap();
//! process(&mut collection, &CollectionOptions::default()).unwrap();
//! println!("{}", serde_json::to_string_pretty(&collection).unwrap());
//! ```

pub mod auth;
pub mod collection;
pub mod config;
pub mod converter;
pub mod error;
pub mod normalize;
pub mod openapi;
pub mod order;
pub mod placeholder;
pub mod report;
pub mod scripts;
pub mod template;

pub use auth::{ApiKeyAuth, AuthDescriptor, BasicAuth, BearerAuth};
pub use collection::{Collection, Endpoint, Item, RequestItem};
pub use config::{CollectionOptions, MethodPath, OrderList, SetConfig, SetsConfig};
pub use converter::{process, CollectionSet, Converter};
pub use error::{ConvertError, ErrorCode};
pub use openapi::{CollectionBackend, ConversionResult, OpenApiBackend};
pub use report::ReportFormat;
pub use scripts::ScriptEntry;

/// Convert an OpenAPI document (JSON or YAML text) with the built-in backend.
///
/// Example values in bodies and parameters are replaced by placeholders.
pub fn convert(document: &str) -> Result<Collection, ConvertError> {
    Converter::new(document).convert()
}

/// Build one collection per entry of `sets` from a single document.
pub fn create_sets(
    document: &str,
    sets: Option<&SetsConfig>,
) -> Result<Vec<CollectionSet>, ConvertError> {
    Converter::new(document).create_sets(sets)
}
