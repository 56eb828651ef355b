//! Conversion orchestrator.
//!
//! [`Converter`] drives a [`CollectionBackend`], rewrites example values to
//! placeholders and composes ordering, scripts and authorization into single
//! collections or independent sets.

use serde::Serialize;

use crate::auth::{apply_to_collection, build_definition};
use crate::collection::Collection;
use crate::config::{CollectionOptions, OrderList, SetConfig, SetsConfig};
use crate::error::ConvertError;
use crate::openapi::{CollectionBackend, OpenApiBackend};
use crate::order::order;
use crate::placeholder::rewrite_collection;
use crate::scripts::{add_scripts, scripts_for_endpoints};
use crate::template::load_template;

/// A named collection produced by [`Converter::create_sets`].
#[derive(Debug, Clone, Serialize)]
pub struct CollectionSet {
    pub name: String,
    pub collection: Collection,
}

/// Converts one OpenAPI document.
pub struct Converter<B = OpenApiBackend> {
    document: String,
    backend: B,
}

impl Converter<OpenApiBackend> {
    /// A converter using the built-in OpenAPI backend.
    pub fn new(document: impl Into<String>) -> Self {
        Self::with_backend(document, OpenApiBackend::default())
    }
}

impl<B: CollectionBackend> Converter<B> {
    pub fn with_backend(document: impl Into<String>, backend: B) -> Self {
        Self {
            document: document.into(),
            backend,
        }
    }

    /// The backend's collection, untouched.
    ///
    /// # Errors
    ///
    /// - [`ConvertError::ConversionFailed`] when the backend reports failure.
    /// - [`ConvertError::ConversionOutputCount`] unless exactly one collection
    ///   was produced.
    pub fn collection_definition(&self) -> Result<Collection, ConvertError> {
        let result = self.backend.convert(&self.document)?;
        if !result.result {
            return Err(ConvertError::ConversionFailed(
                result
                    .reason
                    .unwrap_or_else(|| "Conversion failed".to_string()),
            ));
        }
        let count = result.output.len();
        let mut output = result.output.into_iter();
        match (output.next(), count) {
            (Some(collection), 1) => Ok(collection),
            _ => {
                tracing::debug!(count, "backend produced an unexpected number of collections");
                Err(ConvertError::ConversionOutputCount { count })
            }
        }
    }

    /// The backend's collection with bodies and parameters rewritten to placeholders.
    pub fn convert(&self) -> Result<Collection, ConvertError> {
        let mut collection = self.collection_definition()?;
        rewrite_collection(&mut collection);
        Ok(collection)
    }

    /// Build one independently processed collection per set.
    ///
    /// Sets are processed in order and the first failure aborts the run.
    pub fn create_sets(&self, sets: Option<&SetsConfig>) -> Result<Vec<CollectionSet>, ConvertError> {
        let sets = match sets {
            Some(config) if !config.sets.is_empty() => &config.sets,
            _ => return Err(ConvertError::SetsConfigInvalid),
        };

        let definition = self.convert()?;
        sets.iter()
            .map(|set| {
                let mut collection = definition.clone();
                apply_set(&mut collection, set)?;
                Ok(CollectionSet {
                    name: set.collection_name.clone(),
                    collection,
                })
            })
            .collect()
    }
}

fn apply_set(collection: &mut Collection, set: &SetConfig) -> Result<(), ConvertError> {
    tracing::debug!(set = %set.collection_name, "building collection set");
    collection.rename(&set.collection_name);

    if let Some(auth) = &set.auth {
        let definition = build_definition(auth)?;
        apply_to_collection(collection, &definition, auth.forced);
    }

    if let Some(scripts_path) = &set.scripts_path {
        let scripts = scripts_for_endpoints(scripts_path, &collection.list_endpoints())?;
        let template = set
            .template
            .as_ref()
            .map(|t| load_template(&t.pre_request_template_file_path))
            .transpose()?;
        add_scripts(collection, &scripts, template.as_deref())?;
    }

    let order_list = OrderList {
        order: set.order.clone(),
    };
    order(collection, &order_list, true)
}

/// Single-collection post-processing: order (keeping unlisted items),
/// scripts, rename, then authorization.
pub fn process(collection: &mut Collection, options: &CollectionOptions) -> Result<(), ConvertError> {
    if let Some(order_list) = &options.order {
        order(collection, order_list, false)?;
    }
    if let Some(scripts) = &options.scripts {
        add_scripts(collection, scripts, options.pre_request_template.as_deref())?;
    }
    if let Some(name) = &options.collection_name {
        collection.rename(name);
    }
    if let Some(auth) = options.auth.as_ref().filter(|a| a.auth_type.is_some()) {
        let definition = build_definition(auth)?;
        apply_to_collection(collection, &definition, auth.forced);
    }
    Ok(())
}
