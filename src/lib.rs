//! Hemmer Scaffold
//!
//! Generates configuration templates for Hemmer resources from provider
//! schemas. Given one resource instance address, it walks the provider's
//! schema for that resource type and emits a block with every required
//! attribute filled in, ready to paste into configuration.
//!
//! # Overview
//!
//! The crate provides:
//!
//! - **Address parsing**: [`ResourceAddress`] and [`ProviderAddress`]
//! - **Schema types**: the same schema shape providers publish
//! - **Schema registry**: the [`SchemaRegistry`] trait and an in-memory registry
//! - **Duplicate detection**: refuses resources already declared in configuration
//! - **Rendering**: one schema walk producing a neutral tree, with human
//!   (configuration source) and JSON formatters over it
//! - **Import-based generation**: pre-fill values through a [`StateFetcher`]
//! - **Error types**: [`ScaffoldError`] and user-facing [`Diagnostic`]s
//! - **Logging**: integration with `tracing` for structured logging
//!
//! # Quick Start
//!
//! ```ignore
//! use hemmer_scaffold::{render, RenderOptions, ResourceAddress};
//! use hemmer_scaffold::render::human;
//! use hemmer_scaffold::schema::{Attribute, Block};
//!
//! let schema = Block::new()
//!     .with_attribute("name", Attribute::required_string())
//!     .with_attribute("ami", Attribute::optional_string().with_description("AMI id"));
//!
//! let address = ResourceAddress::parse("aws_instance.web")?;
//! let options = RenderOptions::new().with_optional(true).with_descriptions(true);
//! let outcome = render(&address, &schema, &options);
//!
//! print!("{}", human::format(&outcome.resource));
//! // resource "aws_instance" "web" {
//! //   # AMI id
//! //   ami  = null # OPTIONAL string
//! //   name = ""
//! // }
//! ```
//!
//! # Inclusion Policy
//!
//! - Values from an existing resource are always rendered, except that
//!   sensitive ones are withheld
//! - Required attributes are rendered with a zero value
//! - Computed-only attributes are never rendered
//! - Optional attributes need `--optional`; `--defaults` gives them zero values
//!   instead of an unset marker

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod address;
pub mod command;
pub mod config;
pub mod duplicate;
pub mod error;
pub mod logging;
pub mod options;
pub mod provider;
pub mod registry;
pub mod render;
pub mod schema;
pub mod state;
pub mod testing;
pub mod value;
pub mod view;

// Re-export main types at crate root
pub use address::{InstanceKey, ModulePath, ModuleStep, ResourceAddress, ResourceMode};
pub use command::{parse_add, run, Add, AddCommand, AddFlags, AddOutcome, ViewType};
pub use config::{Backend, ConfigTree, Module, SourcePos, SourceRange};
pub use error::ScaffoldError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use options::RenderOptions;
pub use provider::ProviderAddress;
pub use registry::{lookup, InMemorySchemaRegistry, SchemaRegistry};
pub use render::{render, RenderOutcome, RenderedResource};
pub use schema::{Diagnostic, DiagnosticSeverity, ProviderSchema};
pub use state::{InMemoryStateFetcher, JsonFileStateFetcher, StateFetcher};
pub use value::{AttributePath, ValueSource};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
