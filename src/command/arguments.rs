//! Command-line arguments for the generator.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::address::ResourceAddress;
use crate::error::ScaffoldError;
use crate::options::RenderOptions;
use crate::provider::ProviderAddress;

/// Default location of the configuration tree.
pub const DEFAULT_CONFIG_FILE: &str = "hemmer.config.json";

/// Default location of the schema registry.
pub const DEFAULT_SCHEMA_FILE: &str = "hemmer.schemas.json";

/// Output presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewType {
    /// Configuration source text.
    #[default]
    Human,
    /// Structured JSON.
    Json,
}

/// Raw flags as clap sees them.
#[derive(Debug, Parser)]
#[command(
    name = "hemmer-scaffold",
    version,
    about = "Generate a configuration template for a resource",
    long_about = "Generates a configuration block for the given resource instance address, \
                  derived from the provider's schema. Required attributes are always \
                  included; optional attributes, zero values and descriptions are opt-in."
)]
pub struct AddArgs {
    /// Resource instance address, e.g. `module.app.aws_instance.web[0]`.
    #[arg(value_name = "ADDRESS")]
    pub address: Vec<String>,

    /// Include optional attributes.
    #[arg(long)]
    pub optional: bool,

    /// Include zero values for non-required attributes.
    #[arg(long)]
    pub defaults: bool,

    /// Include attribute descriptions as comments.
    #[arg(long)]
    pub descriptions: bool,

    /// Shorthand for `--optional --defaults --descriptions`.
    #[arg(long)]
    pub verbose: bool,

    /// Provider source, `[hostname/][namespace/]name`.
    #[arg(long, value_name = "SOURCE")]
    pub provider: Option<String>,

    /// Fill attribute values from an existing resource.
    #[arg(long, value_name = "ID")]
    pub from_existing_resource: Option<String>,

    /// Append the result to this file instead of printing it.
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Emit structured JSON instead of configuration text.
    #[arg(long)]
    pub json: bool,

    /// Configuration tree to check for existing resources.
    #[arg(long, env = "HEMMER_SCAFFOLD_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: PathBuf,

    /// Provider schemas to render from.
    #[arg(long, env = "HEMMER_SCAFFOLD_SCHEMAS", default_value = DEFAULT_SCHEMA_FILE)]
    pub schema_file: PathBuf,
}

/// Rendering toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddFlags {
    /// Include optional attributes.
    pub optional: bool,
    /// Include zero values.
    pub defaults: bool,
    /// Include descriptions.
    pub descriptions: bool,
}

impl AddFlags {
    /// Apply `--verbose`, which turns every toggle on.
    pub fn normalize(mut self, verbose: bool) -> Self {
        if verbose {
            self.optional = true;
            self.defaults = true;
            self.descriptions = true;
        }
        self
    }

    /// The render policy these flags describe.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::new()
            .with_optional(self.optional)
            .with_defaults(self.defaults)
            .with_descriptions(self.descriptions)
    }
}

/// Validated arguments for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Add {
    /// The resource instance to generate.
    pub addr: ResourceAddress,
    /// Import identifier of an existing resource.
    pub import_id: Option<String>,
    /// Where to write the result; `None` means stdout.
    pub out_path: Option<PathBuf>,
    /// Rendering toggles, already normalized.
    pub flags: AddFlags,
    /// Explicit provider override.
    pub provider: Option<ProviderAddress>,
    /// Output presentation.
    pub view_type: ViewType,
    /// Configuration tree file.
    pub config_file: PathBuf,
    /// Schema registry file.
    pub schema_file: PathBuf,
}

/// Parse command-line arguments (without the program name).
///
/// Validation runs in a fixed order: flags, then the provider override, then
/// the positional count, then the address. The first failure wins.
pub fn parse_add<I, T>(args: I) -> Result<Add, ScaffoldError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let argv = std::iter::once(OsString::from("hemmer-scaffold"))
        .chain(args.into_iter().map(Into::into));
    let raw = AddArgs::try_parse_from(argv)?;
    Add::try_from(raw)
}

impl TryFrom<AddArgs> for Add {
    type Error = ScaffoldError;

    fn try_from(raw: AddArgs) -> Result<Self, Self::Error> {
        let flags = AddFlags {
            optional: raw.optional,
            defaults: raw.defaults,
            descriptions: raw.descriptions,
        }
        .normalize(raw.verbose);

        let provider = match raw.provider.as_deref() {
            Some(source) if !source.is_empty() => Some(ProviderAddress::parse(source)?),
            _ => None,
        };

        let address = match raw.address.as_slice() {
            [] => {
                return Err(ScaffoldError::Argument {
                    summary: "Too few command line arguments".to_string(),
                    detail: "Expected exactly one positional argument.".to_string(),
                })
            },
            [address] => address,
            _ => {
                return Err(ScaffoldError::Argument {
                    summary: "Too many command line arguments".to_string(),
                    detail: "Expected exactly one positional argument.".to_string(),
                })
            },
        };
        let addr = ResourceAddress::parse(address)?;

        Ok(Self {
            addr,
            import_id: raw.from_existing_resource.filter(|id| !id.is_empty()),
            out_path: raw.out,
            flags,
            provider,
            view_type: if raw.json {
                ViewType::Json
            } else {
                ViewType::Human
            },
            config_file: raw.config_file,
            schema_file: raw.schema_file,
        })
    }
}
