//! Testing utilities for the generator.
//!
//! [`ScaffoldTester`] drives the full command pipeline against in-memory
//! collaborators, so behaviour can be checked end to end without touching the
//! filesystem, stdout or stderr.
//!
//! # Example
//!
//! ```ignore
//! use hemmer_scaffold::testing::{assert_no_errors, ScaffoldTester};
//!
//! #[tokio::test]
//! async fn test_generate() {
//!     let run = ScaffoldTester::new().run(&["--optional", "test_instance.new"]).await;
//!
//!     assert_eq!(run.exit_code, 0);
//!     assert_no_errors(&run.diagnostics);
//!     assert!(run.output().contains("ami"));
//! }
//! ```

use serde_json::Value;

use crate::command::{parse_add, AddCommand};
use crate::config::ConfigTree;
use crate::registry::InMemorySchemaRegistry;
use crate::render::RenderedBlock;
use crate::schema::{Diagnostic, DiagnosticSeverity};
use crate::state::InMemoryStateFetcher;

/// A test harness for the generate command.
#[derive(Debug, Clone)]
pub struct ScaffoldTester {
    config: ConfigTree,
    registry: InMemorySchemaRegistry,
    fetcher: InMemoryStateFetcher,
}

impl Default for ScaffoldTester {
    fn default() -> Self {
        Self::new()
    }
}

impl ScaffoldTester {
    /// A tester with an empty root module and the [`fixtures::test_registry`].
    pub fn new() -> Self {
        Self {
            config: ConfigTree::default(),
            registry: fixtures::test_registry(),
            fetcher: InMemoryStateFetcher::new(),
        }
    }

    /// Use a different configuration tree.
    pub fn with_config(mut self, config: ConfigTree) -> Self {
        self.config = config;
        self
    }

    /// Use a different schema registry.
    pub fn with_registry(mut self, registry: InMemorySchemaRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Make an existing resource available to `--from-existing-resource`.
    pub fn with_existing_resource(mut self, import_id: &str, attributes: Value) -> Self {
        self.fetcher = self.fetcher.with_resource(import_id, attributes);
        self
    }

    /// Parse `args` and execute the command.
    ///
    /// Argument errors are reported the same way the binary reports them:
    /// exit code 1, no output, one diagnostic.
    pub async fn run(&self, args: &[&str]) -> TestRun {
        let add = match parse_add(args) {
            Ok(add) => add,
            Err(err) => {
                return TestRun {
                    exit_code: 1,
                    rendered: None,
                    diagnostics: vec![Diagnostic::from(&err)],
                }
            },
        };

        let outcome = AddCommand::new(&self.config, &self.registry, &self.fetcher)
            .execute(&add)
            .await;
        TestRun {
            exit_code: outcome.exit_code(),
            rendered: outcome.rendered,
            diagnostics: outcome.diagnostics,
        }
    }
}

/// What one tester run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TestRun {
    /// Process exit status the binary would return.
    pub exit_code: u8,
    /// Generated output, if any.
    pub rendered: Option<String>,
    /// Diagnostics, in the order they were found.
    pub diagnostics: Vec<Diagnostic>,
}

impl TestRun {
    /// The generated output, or the empty string when there is none.
    pub fn output(&self) -> &str {
        self.rendered.as_deref().unwrap_or_default()
    }
}

/// Attribute names of a rendered block, in output order.
pub fn names(block: &RenderedBlock) -> Vec<&str> {
    block.attributes.iter().map(|a| a.name.as_str()).collect()
}

/// Schemas and configuration pieces shared by tests.
pub mod fixtures {
    use crate::config::{SourcePos, SourceRange};
    use crate::provider::ProviderAddress;
    use crate::registry::InMemorySchemaRegistry;
    use crate::schema::{
        Attribute, AttributeFlags, AttributeType, Block, NestedBlock, ProviderSchema, Schema,
    };

    /// A resource with one required attribute (`value`), one optional
    /// attribute with a description (`ami`) and one optional+computed
    /// attribute (`id`).
    pub fn instance_block() -> Block {
        Block::new()
            .with_attribute("value", Attribute::required_string())
            .with_attribute("ami", Attribute::optional_string().with_description("AMI id"))
            .with_attribute(
                "id",
                Attribute::new(AttributeType::String, AttributeFlags::optional_computed()),
            )
    }

    /// A resource with a required `network` list block holding an optional
    /// `subnet` list block.
    pub fn network_block() -> Block {
        let subnet = Block::new().with_attribute("cidr", Attribute::required_string());
        let network = Block::new()
            .with_attribute("cidr", Attribute::required_string())
            .with_block("subnet", NestedBlock::list(subnet));
        Block::new().with_block("network", NestedBlock::list(network).with_min_items(1))
    }

    /// The schemas of the `test` provider.
    pub fn test_provider_schema() -> ProviderSchema {
        ProviderSchema::new()
            .with_resource(
                "test_instance",
                Schema {
                    version: 0,
                    block: instance_block(),
                },
            )
            .with_resource(
                "test_network",
                Schema {
                    version: 0,
                    block: network_block(),
                },
            )
            .with_data_source(
                "test_zone",
                Schema::v0().with_attribute("name", Attribute::required_string()),
            )
    }

    /// A registry holding [`test_provider_schema`] under the implied `test`
    /// provider.
    pub fn test_registry() -> InMemorySchemaRegistry {
        InMemorySchemaRegistry::new()
            .with_provider(ProviderAddress::implied("test"), test_provider_schema())
    }

    /// A registry holding `schema` under the implied address of `provider`.
    pub fn registry_with(provider: &str, schema: ProviderSchema) -> InMemorySchemaRegistry {
        InMemorySchemaRegistry::new().with_provider(ProviderAddress::implied(provider), schema)
    }

    /// A one-line declaration range.
    pub fn source_range(filename: &str, line: u32) -> SourceRange {
        SourceRange {
            filename: filename.to_string(),
            start: SourcePos { line, column: 1 },
            end: SourcePos { line, column: 38 },
        }
    }
}

// =========================================================================
// Assertion Helpers
// =========================================================================

/// Assert that diagnostics contain no errors.
///
/// # Panics
///
/// Panics if there are any error diagnostics.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics
        .iter()
        .filter(|d| matches!(d.severity, DiagnosticSeverity::Error))
        .collect();

    assert!(
        errors.is_empty(),
        "Expected no errors, but got {} error(s): {:?}",
        errors.len(),
        errors.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain an error with exactly this summary.
///
/// # Panics
///
/// Panics if no error diagnostic has the given summary.
pub fn assert_error_summary(diagnostics: &[Diagnostic], summary: &str) {
    let found = diagnostics
        .iter()
        .any(|d| matches!(d.severity, DiagnosticSeverity::Error) && d.summary == summary);

    assert!(
        found,
        "Expected an error '{}', but got: {:?}",
        summary,
        diagnostics.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain a warning whose summary contains `substring`.
///
/// # Panics
///
/// Panics if no warning matches.
pub fn assert_warning_contains(diagnostics: &[Diagnostic], substring: &str) {
    let found = diagnostics
        .iter()
        .any(|d| matches!(d.severity, DiagnosticSeverity::Warning) && d.summary.contains(substring));

    assert!(
        found,
        "Expected a warning containing '{}', but got: {:?}",
        substring,
        diagnostics.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}
