//! Resource instance addresses.
//!
//! An address names one resource instance, optionally inside a chain of
//! module calls:
//!
//! ```text
//! module.network["east"].module.subnet[0].data.test_zone.primary[2]
//! ```
//!
//! Parsing is pure; the string form of a parsed address parses back to an
//! equal value.

use std::fmt;
use std::str::FromStr;

use crate::error::ScaffoldError;

/// Distinguishes managed resources from data sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResourceMode {
    /// A resource whose lifecycle is managed.
    #[default]
    Managed,
    /// A read-only data source.
    Data,
}

impl fmt::Display for ResourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Managed => "managed",
            Self::Data => "data",
        })
    }
}

/// The key selecting one instance of a repeated resource or module call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum InstanceKey {
    /// No key: the resource or module is not repeated.
    #[default]
    None,
    /// A `count`-style integer index.
    Int(u64),
    /// A `for_each`-style string key.
    Str(String),
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Int(i) => write!(f, "[{i}]"),
            Self::Str(s) => {
                f.write_str("[\"")?;
                for c in s.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        _ => write!(f, "{c}")?,
                    }
                }
                f.write_str("\"]")
            },
        }
    }
}

/// One `module.<name>[<key>]` step of a module path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleStep {
    /// The module call name.
    pub name: String,
    /// The instance key of the call.
    pub key: InstanceKey,
}

/// The chain of module calls leading to a resource. Empty means the root module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ModulePath(pub Vec<ModuleStep>);

impl ModulePath {
    /// The root module.
    pub fn root() -> Self {
        Self::default()
    }

    /// Whether this is the root module.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Module call names with instance keys dropped.
    ///
    /// Configuration declares modules, not module instances, so this is the
    /// form used to find a module in the configuration tree.
    pub fn call_names(&self) -> Vec<&str> {
        self.0.iter().map(|step| step.name.as_str()).collect()
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "module.{}{}", step.name, step.key)?;
        }
        Ok(())
    }
}

/// A fully parsed resource instance address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceAddress {
    /// Module calls leading to the resource.
    pub module: ModulePath,
    /// Managed resource or data source.
    pub mode: ResourceMode,
    /// Resource type, e.g. `test_instance`.
    pub type_name: String,
    /// Local name, e.g. `new`.
    pub name: String,
    /// Instance key.
    pub key: InstanceKey,
}

impl ResourceAddress {
    /// Parse an address string.
    pub fn parse(input: &str) -> Result<Self, ScaffoldError> {
        Parser::new(input)
            .address()
            .map_err(|reason| ScaffoldError::AddressSyntax {
                input: input.to_string(),
                reason,
            })
    }

    /// The resource's configuration key within its module, ignoring the
    /// instance key: `type.name` or `data.type.name`.
    pub fn config_key(&self) -> String {
        match self.mode {
            ResourceMode::Managed => format!("{}.{}", self.type_name, self.name),
            ResourceMode::Data => format!("data.{}.{}", self.type_name, self.name),
        }
    }

    /// The provider local name implied by the resource type: everything
    /// before the first underscore.
    pub fn implied_provider_name(&self) -> &str {
        self.type_name
            .split_once('_')
            .map_or(self.type_name.as_str(), |(prefix, _)| prefix)
    }
}

impl fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.module.is_root() {
            write!(f, "{}.", self.module)?;
        }
        write!(f, "{}{}", self.config_key(), self.key)
    }
}

impl FromStr for ResourceAddress {
    type Err = ScaffoldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn address(mut self) -> Result<ResourceAddress, String> {
        let mut steps = Vec::new();
        loop {
            let first = self.identifier()?;
            if first == "module" {
                self.expect('.')?;
                let name = self.identifier()?;
                let key = self.instance_key()?;
                self.expect('.')?;
                steps.push(ModuleStep {
                    name: name.to_string(),
                    key,
                });
                continue;
            }

            let (mode, type_name) = if first == "data" {
                self.expect('.')?;
                (ResourceMode::Data, self.identifier()?)
            } else {
                (ResourceMode::Managed, first)
            };
            if self.peek().is_none() {
                return Err("a resource address needs both a type and a name".to_string());
            }
            self.expect('.')?;
            let name = self.identifier()?;
            let key = self.instance_key()?;
            if let Some(c) = self.peek() {
                return Err(format!(
                    "unexpected {c:?} after the resource name; an address must end at one resource instance"
                ));
            }

            return Ok(ResourceAddress {
                module: ModulePath(steps),
                mode,
                type_name: type_name.to_string(),
                name: name.to_string(),
                key,
            });
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn expect(&mut self, want: char) -> Result<(), String> {
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(c) => Err(format!("expected {want:?}, found {c:?}")),
            None => Err(format!("expected {want:?}, found end of input")),
        }
    }

    fn identifier(&mut self) -> Result<&'a str, String> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                self.bump();
            },
            Some(c) => return Err(format!("expected a name, found {c:?}")),
            None => return Err("expected a name, found end of input".to_string()),
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                self.bump();
            } else {
                break;
            }
        }
        Ok(&self.input[start..self.pos])
    }

    fn instance_key(&mut self) -> Result<InstanceKey, String> {
        if self.peek() != Some('[') {
            return Ok(InstanceKey::None);
        }
        self.bump();
        let key = match self.peek() {
            Some('"') => InstanceKey::Str(self.string_literal()?),
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                }
                let digits = &self.input[start..self.pos];
                let index = digits
                    .parse::<u64>()
                    .map_err(|e| format!("invalid index {digits}: {e}"))?;
                InstanceKey::Int(index)
            },
            Some(c) => return Err(format!("invalid instance key starting with {c:?}")),
            None => return Err("unterminated instance key".to_string()),
        };
        self.expect(']')?;
        Ok(key)
    }

    fn string_literal(&mut self) -> Result<String, String> {
        self.expect('"')?;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('"') => out.push('"'),
                    Some('\\') => out.push('\\'),
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(c) => return Err(format!("unsupported escape sequence \\{c}")),
                    None => return Err("unterminated string key".to_string()),
                },
                Some(c) => out.push(c),
                None => return Err("unterminated string key".to_string()),
            }
        }
    }
}
