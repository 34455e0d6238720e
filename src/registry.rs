//! Provider schema registry.
//!
//! The registry is an injected, read-only dependency. Fetching schemas from
//! provider plugins is out of scope here; callers hand in whatever registry
//! they have already materialized.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::address::ResourceMode;
use crate::error::ScaffoldError;
use crate::provider::ProviderAddress;
use crate::schema::{Block, ProviderSchema};

/// Read-only access to provider schemas.
pub trait SchemaRegistry: Send + Sync {
    /// The full schema of a provider, if one is registered.
    fn provider_schema(&self, provider: &ProviderAddress) -> Option<&ProviderSchema>;

    /// Whether the provider has a registered schema.
    fn has_provider(&self, provider: &ProviderAddress) -> bool {
        self.provider_schema(provider).is_some()
    }
}

/// Find the root block for a resource or data source type.
///
/// Failures are not fatal at this layer; the caller decides whether to render
/// against an empty block or abort.
pub fn lookup<'r>(
    registry: &'r dyn SchemaRegistry,
    provider: &ProviderAddress,
    mode: ResourceMode,
    type_name: &str,
) -> Result<&'r Block, ScaffoldError> {
    let schema = registry
        .provider_schema(provider)
        .ok_or_else(|| ScaffoldError::MissingProviderSchema(provider.to_string()))?;

    let schemas = match mode {
        ResourceMode::Managed => &schema.resources,
        ResourceMode::Data => &schema.data_sources,
    };

    schemas
        .get(type_name)
        .map(|s| &s.block)
        .ok_or_else(|| ScaffoldError::ResourceSchemaNotFound {
            provider: provider.to_string(),
            type_name: type_name.to_string(),
        })
}

/// A registry held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySchemaRegistry {
    providers: HashMap<ProviderAddress, ProviderSchema>,
}

#[derive(Deserialize)]
struct RegistryFile {
    #[serde(default)]
    providers: HashMap<ProviderAddress, ProviderSchema>,
}

impl InMemorySchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider's schema.
    pub fn with_provider(mut self, provider: ProviderAddress, schema: ProviderSchema) -> Self {
        self.providers.insert(provider, schema);
        self
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no providers are registered.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Parse a registry from JSON of the form
    /// `{"providers": {"<source>": <ProviderSchema>}}`.
    ///
    /// Provider keys may use any abbreviated source form.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let file: RegistryFile = serde_json::from_str(json)?;
        Ok(Self {
            providers: file.providers,
        })
    }

    /// Load a registry from a JSON file. A missing file yields an empty registry.
    pub async fn load(path: &Path) -> Result<Self, ScaffoldError> {
        match tokio::fs::read_to_string(path).await {
            Ok(json) => {
                let registry =
                    Self::from_json_str(&json).map_err(|e| ScaffoldError::ConfigLoad {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    })?;
                debug!(path = %path.display(), providers = registry.len(), "loaded schema registry");
                Ok(registry)
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no schema file, using an empty registry");
                Ok(Self::default())
            },
            Err(e) => Err(ScaffoldError::ConfigLoad {
                path: path.display().to_string(),
                message: e.to_string(),
            }),
        }
    }
}

impl SchemaRegistry for InMemorySchemaRegistry {
    fn provider_schema(&self, provider: &ProviderAddress) -> Option<&ProviderSchema> {
        self.providers.get(provider)
    }
}
