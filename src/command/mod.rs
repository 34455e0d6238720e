//! The generate-configuration command.
//!
//! [`AddCommand`] runs one invocation against already-loaded collaborators:
//!
//! 1. refuse backends that cannot generate locally
//! 2. refuse addresses already declared in the target module
//! 3. resolve the provider and look up the resource schema
//! 4. fetch existing values when an import identifier was given
//! 5. render and format for the selected view
//!
//! Steps 1, 2 and 4 abort with no output. A missing schema is reported but
//! rendering still proceeds against an empty block, so the user gets a header
//! to fill in by hand. [`run`] is the binary's entry point: it parses flags,
//! loads the configuration tree and schema registry from disk, executes, and
//! writes results.

pub mod arguments;

use std::process::ExitCode;

use clap::error::ErrorKind;
use tracing::{debug, info, instrument, warn};

use crate::address::ResourceAddress;
use crate::config::{ConfigTree, Module};
use crate::duplicate;
use crate::error::ScaffoldError;
use crate::provider::ProviderAddress;
use crate::registry::{self, InMemorySchemaRegistry, SchemaRegistry};
use crate::render::render;
use crate::schema::{has_errors, Block, Diagnostic};
use crate::state::{JsonFileStateFetcher, StateFetcher};
use crate::view;

pub use arguments::{parse_add, Add, AddArgs, AddFlags, ViewType};

/// Result of one command execution.
#[derive(Debug, Clone, PartialEq)]
pub struct AddOutcome {
    /// Formatted output, absent when a fatal error stopped generation.
    pub rendered: Option<String>,
    /// Everything worth telling the user, in the order it was found.
    pub diagnostics: Vec<Diagnostic>,
}

impl AddOutcome {
    fn failed(err: &ScaffoldError) -> Self {
        Self {
            rendered: None,
            diagnostics: vec![Diagnostic::from(err)],
        }
    }

    /// Whether any diagnostic has error severity.
    pub fn has_errors(&self) -> bool {
        has_errors(&self.diagnostics)
    }

    /// 0 on success with no error diagnostics, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.rendered.is_none() || self.has_errors() {
            1
        } else {
            0
        }
    }
}

/// Generates configuration for one resource instance.
pub struct AddCommand<'a> {
    config: &'a ConfigTree,
    registry: &'a dyn SchemaRegistry,
    fetcher: &'a dyn StateFetcher,
}

impl<'a> AddCommand<'a> {
    /// Create a command over loaded collaborators.
    pub fn new(
        config: &'a ConfigTree,
        registry: &'a dyn SchemaRegistry,
        fetcher: &'a dyn StateFetcher,
    ) -> Self {
        Self {
            config,
            registry,
            fetcher,
        }
    }

    /// Execute the command.
    #[instrument(skip_all, fields(address = %add.addr))]
    pub async fn execute(&self, add: &Add) -> AddOutcome {
        let mut diagnostics = Vec::new();
        match self.generate(add, &mut diagnostics).await {
            Ok(rendered) => AddOutcome {
                rendered: Some(rendered),
                diagnostics,
            },
            Err(err) => {
                debug!(error = %err, "generation aborted");
                diagnostics.push(Diagnostic::from(&err));
                AddOutcome {
                    rendered: None,
                    diagnostics,
                }
            },
        }
    }

    async fn generate(
        &self,
        add: &Add,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<String, ScaffoldError> {
        let backend = self.config.backend;
        if !backend.supports_local_generation() {
            return Err(ScaffoldError::BackendUnsupported(backend.to_string()));
        }

        duplicate::ensure_absent(&add.addr, self.config)?;
        let module = self
            .config
            .descendant(&add.addr.module.call_names())
            .ok_or_else(|| ScaffoldError::ModuleNotFound(add.addr.module.to_string()))?;

        let provider = resolve_provider(&add.addr, add.provider.as_ref(), module);
        debug!(provider = %provider, "resolved provider");

        let empty = Block::default();
        let schema =
            match registry::lookup(self.registry, &provider, add.addr.mode, &add.addr.type_name) {
                Ok(block) => block,
                Err(err) => {
                    warn!(error = %err, "rendering without a schema");
                    diagnostics.push(Diagnostic::from(&err));
                    &empty
                },
            };

        let mut options = add.flags.render_options();
        if let Some(import_id) = &add.import_id {
            let source = self.fetcher.fetch(&add.addr, import_id).await?;
            options = options.with_import_source(source);
        }

        let outcome = render(&add.addr, schema, &options);
        diagnostics.extend(outcome.diagnostics);
        view::format_resource(add.view_type, &outcome.resource)
    }
}

/// Pick the provider for `address`.
///
/// An explicit override wins. Otherwise the module's `required_providers`
/// entry for the implied local name is used, falling back to the implied
/// default provider.
pub fn resolve_provider(
    address: &ResourceAddress,
    explicit: Option<&ProviderAddress>,
    module: &Module,
) -> ProviderAddress {
    if let Some(provider) = explicit {
        return provider.clone();
    }
    let local_name = address.implied_provider_name();
    module
        .required_providers
        .get(local_name)
        .cloned()
        .unwrap_or_else(|| ProviderAddress::implied(local_name))
}

/// Run the command with process arguments (without the program name).
///
/// Generated text goes to stdout or the `--out` file; diagnostics go to stderr.
pub async fn run<I, T>(args: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let add = match parse_add(args) {
        Ok(add) => add,
        Err(ScaffoldError::Cli(err))
            if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) =>
        {
            // Help and version output are not failures.
            let _ = err.print();
            return ExitCode::SUCCESS;
        },
        Err(err) => {
            eprint!("{}", view::format_diagnostics(ViewType::Human, &[Diagnostic::from(&err)]));
            return ExitCode::from(1);
        },
    };

    let mut outcome = match load_and_execute(&add).await {
        Ok(outcome) => outcome,
        Err(err) => AddOutcome::failed(&err),
    };

    if let Some(text) = &outcome.rendered {
        if let Err(err) = view::write_output(add.out_path.as_deref(), text).await {
            outcome.diagnostics.push(Diagnostic::from(&err));
        } else if let Some(path) = &add.out_path {
            info!(path = %path.display(), "configuration written");
        }
    }

    eprint!("{}", view::format_diagnostics(add.view_type, &outcome.diagnostics));
    ExitCode::from(outcome.exit_code())
}

async fn load_and_execute(add: &Add) -> Result<AddOutcome, ScaffoldError> {
    let cwd = std::env::current_dir().map_err(|e| ScaffoldError::Environment(e.to_string()))?;
    let config = ConfigTree::load(&cwd.join(&add.config_file)).await?;
    let registry = InMemorySchemaRegistry::load(&cwd.join(&add.schema_file)).await?;
    let fetcher = JsonFileStateFetcher::new(&cwd);

    Ok(AddCommand::new(&config, &registry, &fetcher)
        .execute(add)
        .await)
}
