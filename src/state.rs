//! Fetching attribute values of existing resources.
//!
//! When generation is import-based, the command hands an opaque identifier to
//! a [`StateFetcher`] and renders against the values it returns. How the
//! identifier is resolved is entirely up to the fetcher.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::address::ResourceAddress;
use crate::error::ScaffoldError;
use crate::value::ValueSource;

/// Reads the attribute values of an existing resource instance.
///
/// # Example
///
/// ```ignore
/// use hemmer_scaffold::{ResourceAddress, ScaffoldError, StateFetcher, ValueSource};
///
/// struct CloudFetcher;
///
/// #[async_trait::async_trait]
/// impl StateFetcher for CloudFetcher {
///     async fn fetch(
///         &self,
///         address: &ResourceAddress,
///         import_id: &str,
///     ) -> Result<ValueSource, ScaffoldError> {
///         // ... call the provider's read operation
///         Ok(ValueSource::new())
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait StateFetcher: Send + Sync {
    /// Fetch the values of the resource identified by `import_id`, to be
    /// rendered at `address`.
    async fn fetch(
        &self,
        address: &ResourceAddress,
        import_id: &str,
    ) -> Result<ValueSource, ScaffoldError>;
}

/// Reads resource values from JSON documents on disk.
///
/// The import identifier is a path, relative to the base directory unless
/// absolute. Three document shapes are accepted:
///
/// - a bare attribute object: `{"ami": "ami-123", ...}`
/// - a state instance: `{"schema_version": 0, "attributes": {...}}`. The
///   numeric `schema_version` marks the wrapper; without it an object holding
///   an `attributes` key is read as a bare attribute object. Other state
///   instance keys are ignored.
/// - an imported resource: `{"resource_type": "...", "state": {...}}`, whose
///   type must match the address being generated
#[derive(Debug, Clone)]
pub struct JsonFileStateFetcher {
    base_dir: PathBuf,
}

impl JsonFileStateFetcher {
    /// Create a fetcher resolving identifiers against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// The directory relative identifiers resolve against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

#[async_trait::async_trait]
impl StateFetcher for JsonFileStateFetcher {
    async fn fetch(
        &self,
        address: &ResourceAddress,
        import_id: &str,
    ) -> Result<ValueSource, ScaffoldError> {
        let path = self.base_dir.join(import_id);
        let failed = |message: String| ScaffoldError::ImportFailed {
            id: import_id.to_string(),
            message,
        };

        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| failed(format!("{}: {e}", path.display())))?;
        let document: Value = serde_json::from_str(&text)
            .map_err(|e| failed(format!("{}: {e}", path.display())))?;

        let attributes = extract_attributes(address, document).map_err(failed)?;
        debug!(path = %path.display(), attributes = attributes.root().len(), "read existing resource");
        Ok(attributes)
    }
}

fn extract_attributes(address: &ResourceAddress, document: Value) -> Result<ValueSource, String> {
    let Value::Object(mut map) = document else {
        return Err("expected a JSON object".to_string());
    };

    let is_state_instance = map.get("schema_version").is_some_and(Value::is_u64)
        && map.get("attributes").is_some_and(Value::is_object);
    let is_imported_resource = map.len() == 2
        && map.get("resource_type").is_some_and(Value::is_string)
        && map.get("state").is_some_and(Value::is_object);

    let attributes = if is_state_instance {
        map.remove("attributes").unwrap_or_default()
    } else if is_imported_resource {
        let resource_type = map
            .get("resource_type")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if resource_type != address.type_name {
            return Err(format!(
                "the document describes a {resource_type} resource, not {}",
                address.type_name
            ));
        }
        map.remove("state").unwrap_or_default()
    } else {
        Value::Object(map)
    };

    ValueSource::from_json(attributes).map_err(|e| e.to_string())
}

/// Resource values held in memory, keyed by import identifier.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStateFetcher {
    resources: HashMap<String, Value>,
}

impl InMemoryStateFetcher {
    /// Create an empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the attribute values for `import_id`.
    pub fn with_resource(mut self, import_id: impl Into<String>, attributes: Value) -> Self {
        self.resources.insert(import_id.into(), attributes);
        self
    }
}

#[async_trait::async_trait]
impl StateFetcher for InMemoryStateFetcher {
    async fn fetch(
        &self,
        _address: &ResourceAddress,
        import_id: &str,
    ) -> Result<ValueSource, ScaffoldError> {
        let attributes = self
            .resources
            .get(import_id)
            .ok_or_else(|| ScaffoldError::ImportFailed {
                id: import_id.to_string(),
                message: format!("Cannot import non-existent remote object {import_id:?}"),
            })?;
        ValueSource::from_json(attributes.clone()).map_err(|e| ScaffoldError::ImportFailed {
            id: import_id.to_string(),
            message: e.to_string(),
        })
    }
}
