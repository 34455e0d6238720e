//! The loaded configuration tree.
//!
//! Parsing configuration source is somebody else's job; this module holds the
//! read-only summary the generator needs: which backend is active, which
//! modules exist, which managed resources each module declares and where, and
//! which provider sources each module requires.
//!
//! The tree is stored as JSON:
//!
//! ```json
//! {
//!   "backend": "local",
//!   "root": {
//!     "required_providers": { "test": "example.com/happycorp/test" },
//!     "managed_resources": {
//!       "test_instance.exists": {
//!         "filename": "main.hcl",
//!         "start": { "line": 1, "column": 1 },
//!         "end": { "line": 1, "column": 38 }
//!       }
//!     },
//!     "module_calls": { "child": {} }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::error::ScaffoldError;
use crate::provider::ProviderAddress;

/// A line/column position in a configuration file. Both are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePos {
    /// Line number.
    pub line: u32,
    /// Column number.
    pub column: u32,
}

/// The span of a declaration in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRange {
    /// File the declaration lives in.
    pub filename: String,
    /// Start of the declaration.
    pub start: SourcePos,
    /// End of the declaration.
    pub end: SourcePos,
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{},{}-{}",
                self.filename, self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(
                f,
                "{}:{},{}-{},{}",
                self.filename, self.start.line, self.start.column, self.end.line, self.end.column
            )
        }
    }
}

/// The execution backend the configuration selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// State and operations run on this machine.
    #[default]
    Local,
    /// Operations run on a remote service.
    Remote,
    /// Operations run on a hosted workspace.
    Cloud,
}

impl Backend {
    /// Only the local backend can hand the generator a usable context.
    pub fn supports_local_generation(&self) -> bool {
        matches!(self, Self::Local)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Remote => "remote",
            Self::Cloud => "cloud",
        })
    }
}

/// One module of the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Module {
    /// Provider local name to provider source.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub required_providers: BTreeMap<String, ProviderAddress>,
    /// Declared managed resources, keyed `type.name`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub managed_resources: BTreeMap<String, SourceRange>,
    /// Child modules, keyed by call name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub module_calls: BTreeMap<String, Module>,
}

impl Module {
    /// Create an empty module.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a managed resource.
    pub fn with_managed_resource(mut self, key: impl Into<String>, range: SourceRange) -> Self {
        self.managed_resources.insert(key.into(), range);
        self
    }

    /// Add a child module call.
    pub fn with_module_call(mut self, name: impl Into<String>, module: Module) -> Self {
        self.module_calls.insert(name.into(), module);
        self
    }

    /// Require a provider under a local name.
    pub fn with_required_provider(
        mut self,
        local_name: impl Into<String>,
        source: ProviderAddress,
    ) -> Self {
        self.required_providers.insert(local_name.into(), source);
        self
    }
}

/// The whole configuration tree rooted at the working directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfigTree {
    /// The active backend.
    #[serde(default)]
    pub backend: Backend,
    /// The root module.
    #[serde(default)]
    pub root: Module,
}

impl ConfigTree {
    /// A tree holding just the given root module on the local backend.
    pub fn new(root: Module) -> Self {
        Self {
            backend: Backend::Local,
            root,
        }
    }

    /// Select a different backend.
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Find the module reached by following the given call names from the root.
    /// An empty path names the root module.
    pub fn descendant(&self, call_names: &[&str]) -> Option<&Module> {
        call_names
            .iter()
            .try_fold(&self.root, |module, name| module.module_calls.get(*name))
    }

    /// Parse a tree from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load the tree from a JSON file. A missing file yields an empty tree.
    pub async fn load(path: &Path) -> Result<Self, ScaffoldError> {
        match tokio::fs::read_to_string(path).await {
            Ok(json) => Self::from_json_str(&json).map_err(|e| ScaffoldError::ConfigLoad {
                path: path.display().to_string(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no configuration file, using an empty root module");
                Ok(Self::default())
            },
            Err(e) => Err(ScaffoldError::ConfigLoad {
                path: path.display().to_string(),
                message: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(line: u32) -> SourceRange {
        SourceRange {
            filename: "main.hcl".to_string(),
            start: SourcePos { line, column: 1 },
            end: SourcePos { line, column: 30 },
        }
    }

    #[test]
    fn test_descendant_lookup() {
        let tree = ConfigTree::new(
            Module::new().with_module_call(
                "net",
                Module::new().with_module_call(
                    "subnet",
                    Module::new().with_managed_resource("test_foo.a", range(4)),
                ),
            ),
        );

        assert!(tree.descendant(&[]).is_some());
        let subnet = tree.descendant(&["net", "subnet"]).unwrap();
        assert!(subnet.managed_resources.contains_key("test_foo.a"));
        assert!(tree.descendant(&["net", "missing"]).is_none());
        assert!(tree.descendant(&["subnet"]).is_none());
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "backend": "remote",
            "root": {
                "required_providers": {"test": "example.com/happycorp/test"},
                "managed_resources": {
                    "test_instance.exists": {
                        "filename": "main.hcl",
                        "start": {"line": 1, "column": 1},
                        "end": {"line": 1, "column": 38}
                    }
                }
            }
        }"#;
        let tree = ConfigTree::from_json_str(json).unwrap();
        assert_eq!(tree.backend, Backend::Remote);
        assert!(!tree.backend.supports_local_generation());
        assert_eq!(
            tree.root.required_providers["test"],
            ProviderAddress::new("example.com", "happycorp", "test")
        );
        assert_eq!(
            tree.root.managed_resources["test_instance.exists"].to_string(),
            "main.hcl:1,1-38"
        );
    }

    #[test]
    fn test_defaults_to_local_backend() {
        let tree = ConfigTree::from_json_str("{}").unwrap();
        assert_eq!(tree.backend, Backend::Local);
        assert!(tree.root.managed_resources.is_empty());
    }

    #[test]
    fn test_multi_line_range_display() {
        let range = SourceRange {
            filename: "net.hcl".to_string(),
            start: SourcePos { line: 2, column: 1 },
            end: SourcePos { line: 9, column: 2 },
        };
        assert_eq!(range.to_string(), "net.hcl:2,1-9,2");
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let tree = ConfigTree::load(&dir.path().join("absent.json")).await.unwrap();
        assert_eq!(tree, ConfigTree::default());
    }

    #[tokio::test]
    async fn test_load_malformed_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = ConfigTree::load(&path).await.unwrap_err();
        assert!(matches!(err, ScaffoldError::ConfigLoad { .. }));
    }
}
