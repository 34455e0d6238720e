//! Error types for configuration generation.

use thiserror::Error;

use crate::config::SourceRange;
use crate::schema::Diagnostic;

/// Errors that can occur while generating configuration.
#[derive(Debug, Error)]
pub enum ScaffoldError {
    /// Command-line flags could not be parsed.
    #[error("Failed to parse command-line flags: {0}")]
    Cli(#[from] clap::Error),

    /// The positional arguments or flag values are unusable.
    #[error("{summary}: {detail}")]
    Argument {
        /// Short summary.
        summary: String,
        /// Longer explanation.
        detail: String,
    },

    /// The address does not name exactly one resource instance.
    #[error("Error parsing resource address: {input}")]
    AddressSyntax {
        /// The text that failed to parse.
        input: String,
        /// Why it failed.
        reason: String,
    },

    /// The provider source string is malformed.
    #[error("Invalid provider string: {input}")]
    InvalidProvider {
        /// The text that failed to parse.
        input: String,
        /// Why it failed.
        reason: String,
    },

    /// The active backend cannot generate configuration locally.
    #[error("Unsupported backend: {0}")]
    BackendUnsupported(String),

    /// The working context could not be determined.
    #[error("Error determining current working directory: {0}")]
    Environment(String),

    /// A configuration or schema file exists but could not be read.
    #[error("Error loading {path}: {message}")]
    ConfigLoad {
        /// The file that failed to load.
        path: String,
        /// What went wrong.
        message: String,
    },

    /// The addressed module is not part of the configuration.
    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    /// The resource is already declared in the target module.
    #[error("Resource already in configuration: {address}")]
    ResourceAlreadyExists {
        /// The address the user asked for.
        address: String,
        /// Where the existing declaration lives.
        declared_at: SourceRange,
    },

    /// No schema is registered for the resolved provider.
    #[error("Missing schema for provider: {0}")]
    MissingProviderSchema(String),

    /// The provider has no schema for the requested resource type.
    #[error("Missing schema for resource type {type_name} in provider {provider}")]
    ResourceSchemaNotFound {
        /// The resolved provider.
        provider: String,
        /// The resource or data source type.
        type_name: String,
    },

    /// An imported value disagrees with the declared type.
    #[error("Invalid type for attribute '{path}': expected {expected}, got {actual}")]
    ValueTypeMismatch {
        /// Path of the offending attribute.
        path: String,
        /// The declared type.
        expected: String,
        /// What the value actually is.
        actual: String,
    },

    /// The schema nests deeper than the renderer allows.
    #[error("Schema nesting exceeds {limit} levels at '{path}'")]
    SchemaTooDeep {
        /// Path where the limit was hit.
        path: String,
        /// The configured ceiling.
        limit: usize,
    },

    /// Attribute values for an existing resource could not be fetched.
    #[error("Failed to read existing resource {id}: {message}")]
    ImportFailed {
        /// The import identifier handed to the fetcher.
        id: String,
        /// What went wrong.
        message: String,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScaffoldError {
    /// Short, user-facing summary of the error.
    pub fn summary(&self) -> String {
        match self {
            Self::Cli(_) => "Failed to parse command-line flags".to_string(),
            Self::Argument { summary, .. } => summary.clone(),
            Self::AddressSyntax { input, .. } => format!("Error parsing resource address: {input}"),
            Self::InvalidProvider { input, .. } => format!("Invalid provider string: {input}"),
            Self::BackendUnsupported(_) => "Unsupported backend".to_string(),
            Self::Environment(_) => "Error determining current working directory".to_string(),
            Self::ConfigLoad { path, .. } => format!("Error loading {path}"),
            Self::ModuleNotFound(_) => "Module not found".to_string(),
            Self::ResourceAlreadyExists { .. } => "Resource already in configuration".to_string(),
            Self::MissingProviderSchema(_) => "Missing schema for provider".to_string(),
            Self::ResourceSchemaNotFound { .. } => "Missing schema for resource type".to_string(),
            Self::ValueTypeMismatch { path, .. } => format!("Invalid type for attribute '{path}'"),
            Self::SchemaTooDeep { .. } => "Schema nesting too deep".to_string(),
            Self::ImportFailed { .. } => "Failed to read existing resource".to_string(),
            Self::Io(_) => "I/O error".to_string(),
            Self::Serialization(_) => "Serialization error".to_string(),
        }
    }

    /// Longer explanation of the error.
    pub fn detail(&self) -> String {
        match self {
            Self::Cli(err) => err.to_string().trim_end().to_string(),
            Self::Argument { detail, .. } => detail.clone(),
            Self::AddressSyntax { reason, .. } => format!(
                "This command requires that the address references one specific resource instance ({reason})."
            ),
            Self::InvalidProvider { .. } => {
                r#"The "provider" argument must be in the format "[hostname/][namespace/]name"."#
                    .to_string()
            },
            Self::BackendUnsupported(backend) => format!(
                "The {backend:?} backend does not support generating configuration. Only the local backend is supported."
            ),
            Self::Environment(message) => message.clone(),
            Self::ConfigLoad { message, .. } => message.clone(),
            Self::ModuleNotFound(module) => {
                format!("The module {module} was not found in the current configuration.")
            },
            Self::ResourceAlreadyExists { address, .. } => format!(
                "The resource {address} is already in this configuration. Add cannot overwrite existing resources."
            ),
            Self::MissingProviderSchema(provider) => format!(
                "No schema found for provider {provider}. Please verify that this provider exists in the configuration."
            ),
            Self::ResourceSchemaNotFound {
                provider,
                type_name,
            } => format!("Provider {provider} does not declare a schema for {type_name}."),
            Self::ValueTypeMismatch {
                expected, actual, ..
            } => format!("Expected {expected}, got {actual}"),
            Self::SchemaTooDeep { limit, .. } => format!(
                "Nested blocks below this point were not rendered; the limit is {limit} levels."
            ),
            Self::ImportFailed { message, .. } => message.clone(),
            Self::Io(err) => err.to_string(),
            Self::Serialization(err) => err.to_string(),
        }
    }
}

impl From<&ScaffoldError> for Diagnostic {
    fn from(err: &ScaffoldError) -> Self {
        let diagnostic = Diagnostic::error(err.summary()).with_detail(err.detail());
        match err {
            ScaffoldError::ResourceAlreadyExists { declared_at, .. } => {
                diagnostic.with_subject(declared_at.clone())
            },
            ScaffoldError::ValueTypeMismatch { path, .. }
            | ScaffoldError::SchemaTooDeep { path, .. } => diagnostic.with_attribute(path.clone()),
            _ => diagnostic,
        }
    }
}

impl From<ScaffoldError> for Diagnostic {
    fn from(err: ScaffoldError) -> Self {
        Diagnostic::from(&err)
    }
}
