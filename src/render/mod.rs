//! Schema-driven configuration rendering.
//!
//! [`render`] walks a schema [`Block`] once, applying the inclusion policy in
//! [`RenderOptions`], and produces a [`RenderedResource`]: a presentation-neutral
//! tree. The [`human`] and [`json`] formatters both consume that tree, so the two
//! output modes always agree on which attributes and blocks appear.
//!
//! Within each block, attributes come first and nested blocks second, each
//! sorted by name. Schema storage order is never observable in the output.
//!
//! # Inclusion policy
//!
//! For every attribute, in priority order:
//!
//! 1. An imported value at the attribute's path is always rendered verbatim,
//!    unless the attribute is sensitive: then it is rendered as withheld.
//! 2. Required attributes are rendered with the zero value of their type.
//! 3. Computed-only attributes are skipped.
//! 4. Optional attributes are rendered only with `include_optional`, holding a
//!    zero value when `include_defaults` is set and an unset marker otherwise.
//!
//! Nested blocks follow the same rule with `min_items >= 1` standing in for
//! "required".
//!
//! Rendering never fails. Imported values that disagree with the schema are
//! dropped in favour of the policy above and reported as diagnostics; the pass
//! is then marked degraded.

pub mod human;
pub mod json;
pub mod zero;

use serde_json::{Map, Value};
use tracing::{debug, instrument, trace};

use crate::address::ResourceAddress;
use crate::error::ScaffoldError;
use crate::options::RenderOptions;
use crate::schema::{
    has_errors, Attribute, AttributeType, Block, BlockNestingMode, Diagnostic, NestedBlock,
};
use crate::value::{check_type, present, value_type_name, AttributePath};

pub use zero::zero_value;

/// Maximum nested block depth rendered before giving up on a branch.
pub const MAX_DEPTH: usize = 32;

/// The value chosen for a rendered attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedValue {
    /// A concrete literal: imported or a zero value.
    Literal(Value),
    /// A "fill me in" marker that asserts no value.
    Unset,
    /// The existing resource has a value, but the attribute is sensitive so
    /// it is withheld.
    Sensitive,
}

/// One rendered attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedAttribute {
    /// Attribute name.
    pub name: String,
    /// Declared type.
    pub attr_type: AttributeType,
    /// The rendered value.
    pub value: RenderedValue,
    /// Description to attach, if descriptions are enabled.
    pub description: Option<String>,
}

/// One occurrence of a nested block.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedNestedBlock {
    /// Block type name.
    pub name: String,
    /// Nesting mode of the block type.
    pub nesting_mode: BlockNestingMode,
    /// The map key, for map-nested blocks.
    pub key: Option<String>,
    /// Description to attach, if descriptions are enabled.
    pub description: Option<String>,
    /// The block's contents.
    pub body: RenderedBlock,
}

/// The rendered contents of one block level.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderedBlock {
    /// Attributes in name order.
    pub attributes: Vec<RenderedAttribute>,
    /// Nested block occurrences, grouped by name in name order.
    pub blocks: Vec<RenderedNestedBlock>,
}

impl RenderedBlock {
    /// Whether the block renders nothing.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.blocks.is_empty()
    }
}

/// A rendered resource, ready for either formatter.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedResource {
    /// The resource instance being generated.
    pub address: ResourceAddress,
    /// The resource body.
    pub body: RenderedBlock,
}

/// Everything a render pass produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutcome {
    /// The neutral output tree.
    pub resource: RenderedResource,
    /// Problems found along the way.
    pub diagnostics: Vec<Diagnostic>,
    /// Set when some imported value or schema branch had to be dropped.
    pub degraded: bool,
}

impl RenderOutcome {
    /// Whether any diagnostic has error severity.
    pub fn has_errors(&self) -> bool {
        has_errors(&self.diagnostics)
    }
}

/// Render `schema` for `address` under `options`.
///
/// Pure and deterministic: identical inputs give identical outcomes.
#[instrument(skip_all, fields(address = %address))]
pub fn render(address: &ResourceAddress, schema: &Block, options: &RenderOptions) -> RenderOutcome {
    let mut renderer = Renderer {
        options,
        diagnostics: Vec::new(),
        degraded: false,
    };
    let values = options.import_source.as_ref().map(|source| source.root());
    let body = renderer.block(schema, values, &AttributePath::root(), 0);

    debug!(
        attributes = body.attributes.len(),
        blocks = body.blocks.len(),
        diagnostics = renderer.diagnostics.len(),
        degraded = renderer.degraded,
        "render complete"
    );

    RenderOutcome {
        resource: RenderedResource {
            address: address.clone(),
            body,
        },
        diagnostics: renderer.diagnostics,
        degraded: renderer.degraded,
    }
}

type Occurrence<'v> = (Option<String>, Option<&'v Map<String, Value>>);

struct Renderer<'o> {
    options: &'o RenderOptions,
    diagnostics: Vec<Diagnostic>,
    degraded: bool,
}

impl Renderer<'_> {
    fn block(
        &mut self,
        block: &Block,
        values: Option<&Map<String, Value>>,
        path: &AttributePath,
        depth: usize,
    ) -> RenderedBlock {
        let mut body = RenderedBlock::default();

        for (name, attr) in block.sorted_attributes() {
            let imported = present(values.and_then(|v| v.get(name.as_str())));
            if let Some(rendered) = self.attribute(name, attr, imported, &path.attribute(name)) {
                body.attributes.push(rendered);
            }
        }

        for (name, nested) in block.sorted_blocks() {
            let imported = present(values.and_then(|v| v.get(name.as_str())));
            let occurrences = self.nested(name, nested, imported, &path.attribute(name), depth);
            body.blocks.extend(occurrences);
        }

        body
    }

    fn attribute(
        &mut self,
        name: &str,
        attr: &Attribute,
        imported: Option<&Value>,
        path: &AttributePath,
    ) -> Option<RenderedAttribute> {
        if !attr.flags.is_consistent() {
            self.diagnostics.push(
                Diagnostic::warning("Inconsistent attribute flags")
                    .with_detail(
                        "An attribute must be either required, or optional and/or computed. It is rendered as optional.",
                    )
                    .with_attribute(path.to_string()),
            );
        }

        let literal = match imported {
            Some(value) => match check_type(&attr.attr_type, value, path) {
                Ok(()) => Some(value.clone()),
                Err(err) => {
                    self.degrade(&err);
                    None
                },
            },
            None => None,
        };

        let value = match literal {
            Some(_) if attr.flags.sensitive => {
                trace!(path = %path, "withholding sensitive imported value");
                RenderedValue::Sensitive
            },
            Some(value) => {
                trace!(path = %path, "using imported value");
                RenderedValue::Literal(value)
            },
            None => self.placeholder(attr, path)?,
        };

        Some(RenderedAttribute {
            name: name.to_string(),
            attr_type: attr.attr_type.clone(),
            value,
            description: self.description(attr.description.as_deref()),
        })
    }

    fn placeholder(&self, attr: &Attribute, path: &AttributePath) -> Option<RenderedValue> {
        let flags = &attr.flags;
        if flags.is_consistent() {
            if flags.required {
                trace!(path = %path, "including required attribute");
                return Some(RenderedValue::Literal(zero_value(&attr.attr_type)));
            }
            if flags.is_computed_only() {
                trace!(path = %path, "skipping computed attribute");
                return None;
            }
        }

        if !self.options.include_optional {
            return None;
        }
        if self.options.include_defaults {
            Some(RenderedValue::Literal(zero_value(&attr.attr_type)))
        } else {
            Some(RenderedValue::Unset)
        }
    }

    fn nested(
        &mut self,
        name: &str,
        nested: &NestedBlock,
        imported: Option<&Value>,
        path: &AttributePath,
        depth: usize,
    ) -> Vec<RenderedNestedBlock> {
        let found = self.occurrences(nested.nesting_mode, imported, path);
        let forced = nested.is_required() || self.options.include_optional;
        if found.is_empty() && !forced {
            return Vec::new();
        }

        if depth >= MAX_DEPTH {
            self.degrade(&ScaffoldError::SchemaTooDeep {
                path: path.to_string(),
                limit: MAX_DEPTH,
            });
            return Vec::new();
        }

        let count = match nested.nesting_mode {
            BlockNestingMode::Single => 1,
            _ => found.len().max(nested.min_items as usize).max(1),
        };

        let max_items = nested.max_items as usize;
        if nested.nesting_mode != BlockNestingMode::Single && max_items > 0 && count > max_items {
            let detail = if found.len() > max_items {
                format!(
                    "The existing resource has {} blocks but the schema allows at most {max_items}. All of them were rendered.",
                    found.len()
                )
            } else {
                format!(
                    "The schema requires at least {} blocks but allows at most {max_items}. {count} were rendered.",
                    nested.min_items
                )
            };
            self.diagnostics.push(
                Diagnostic::warning(format!("Too many \"{name}\" blocks"))
                    .with_detail(detail)
                    .with_attribute(path.to_string()),
            );
        }

        let mut used_keys: Vec<String> = found.iter().filter_map(|(k, _)| k.clone()).collect();
        let description = self.description(nested.block.description.as_deref());
        let mut rendered = Vec::with_capacity(count);

        for i in 0..count {
            let (key, values) = match found.get(i) {
                Some((key, values)) => (key.clone(), *values),
                None if nested.nesting_mode == BlockNestingMode::Map => {
                    let key = placeholder_key(&used_keys);
                    used_keys.push(key.clone());
                    (Some(key), None)
                },
                None => (None, None),
            };

            let item_path = match (nested.nesting_mode, &key) {
                (BlockNestingMode::Single, _) => path.clone(),
                (BlockNestingMode::Map, Some(key)) => path.key(key),
                _ => path.index(i),
            };

            rendered.push(RenderedNestedBlock {
                name: name.to_string(),
                nesting_mode: nested.nesting_mode,
                key,
                description: description.clone(),
                body: self.block(&nested.block, values, &item_path, depth + 1),
            });
        }

        rendered
    }

    /// Split an imported block value into per-occurrence value maps.
    fn occurrences<'v>(
        &mut self,
        mode: BlockNestingMode,
        imported: Option<&'v Value>,
        path: &AttributePath,
    ) -> Vec<Occurrence<'v>> {
        let Some(value) = imported else {
            return Vec::new();
        };

        match (mode, value) {
            (BlockNestingMode::Single, Value::Object(map)) => vec![(None, Some(map))],
            (BlockNestingMode::List | BlockNestingMode::Set, Value::Array(items)) => {
                let mut found = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    found.push((None, self.block_values(item, &path.index(i))));
                }
                found
            },
            (BlockNestingMode::Map, Value::Object(entries)) => {
                let mut found = Vec::with_capacity(entries.len());
                for (key, item) in entries {
                    found.push((Some(key.clone()), self.block_values(item, &path.key(key))));
                }
                found
            },
            (mode, other) => {
                self.degrade(&ScaffoldError::ValueTypeMismatch {
                    path: path.to_string(),
                    expected: match mode {
                        BlockNestingMode::Single => "a block".to_string(),
                        _ => format!("a {mode} of blocks"),
                    },
                    actual: value_type_name(other).to_string(),
                });
                Vec::new()
            },
        }
    }

    fn block_values<'v>(
        &mut self,
        item: &'v Value,
        path: &AttributePath,
    ) -> Option<&'v Map<String, Value>> {
        match item {
            Value::Object(map) => Some(map),
            Value::Null => None,
            other => {
                self.degrade(&ScaffoldError::ValueTypeMismatch {
                    path: path.to_string(),
                    expected: "a block".to_string(),
                    actual: value_type_name(other).to_string(),
                });
                None
            },
        }
    }

    fn description(&self, description: Option<&str>) -> Option<String> {
        if !self.options.include_descriptions {
            return None;
        }
        description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
    }

    fn degrade(&mut self, err: &ScaffoldError) {
        debug!(error = %err, "render degraded");
        self.degraded = true;
        self.diagnostics.push(Diagnostic::from(err));
    }
}

fn placeholder_key(used: &[String]) -> String {
    let mut n = 0usize;
    loop {
        let candidate = if n == 0 {
            "key".to_string()
        } else {
            format!("key_{n}")
        };
        if !used.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeFlags, DiagnosticSeverity};
    use crate::testing::{fixtures, names};
    use crate::value::ValueSource;
    use serde_json::json;

    fn addr() -> ResourceAddress {
        ResourceAddress::parse("test_instance.new").unwrap()
    }

    fn source(value: Value) -> ValueSource {
        ValueSource::from_json(value).unwrap()
    }

    fn attr<'a>(body: &'a RenderedBlock, name: &str) -> &'a RenderedAttribute {
        body.attributes
            .iter()
            .find(|a| a.name == name)
            .unwrap_or_else(|| panic!("attribute {name} not rendered"))
    }

    #[test]
    fn test_required_only_by_default() {
        let outcome = render(&addr(), &fixtures::instance_block(), &RenderOptions::new());
        assert_eq!(names(&outcome.resource.body), vec!["value"]);
        assert_eq!(
            attr(&outcome.resource.body, "value").value,
            RenderedValue::Literal(json!(""))
        );
        assert!(outcome.diagnostics.is_empty());
        assert!(!outcome.degraded);
    }

    #[test]
    fn test_optional_with_descriptions() {
        let options = RenderOptions::new()
            .with_optional(true)
            .with_descriptions(true);
        let outcome = render(&addr(), &fixtures::instance_block(), &options);
        let body = &outcome.resource.body;

        // id is optional+computed, so it counts as optional.
        assert_eq!(names(body), vec!["ami", "id", "value"]);
        let ami = attr(body, "ami");
        assert_eq!(ami.value, RenderedValue::Unset);
        assert_eq!(ami.description.as_deref(), Some("AMI id"));
        assert_eq!(attr(body, "value").description, None);
    }

    #[test]
    fn test_optional_with_defaults() {
        let options = RenderOptions::new().with_optional(true).with_defaults(true);
        let outcome = render(&addr(), &fixtures::instance_block(), &options);
        assert_eq!(
            attr(&outcome.resource.body, "ami").value,
            RenderedValue::Literal(json!(""))
        );
    }

    #[test]
    fn test_defaults_without_optional_adds_nothing() {
        let options = RenderOptions::new().with_defaults(true);
        let outcome = render(&addr(), &fixtures::instance_block(), &options);
        assert_eq!(names(&outcome.resource.body), vec!["value"]);
    }

    #[test]
    fn test_computed_only_is_skipped() {
        let block = Block::new()
            .with_attribute("arn", Attribute::computed_string())
            .with_attribute("name", Attribute::required_string());
        let options = RenderOptions::new().with_optional(true).with_defaults(true);
        let outcome = render(&addr(), &block, &options);
        assert_eq!(names(&outcome.resource.body), vec!["name"]);
    }

    #[test]
    fn test_import_value_takes_precedence() {
        let block = fixtures::instance_block()
            .with_attribute("arn", Attribute::computed_string())
            .with_attribute("tags", Attribute::optional(AttributeType::map(AttributeType::String)));
        let options = RenderOptions::new().with_import_source(source(json!({
            "value": "hello",
            "arn": "arn:test:1",
            "tags": {"env": "prod"},
            "ami": null
        })));
        let outcome = render(&addr(), &block, &options);
        let body = &outcome.resource.body;

        // Imported values win even for computed-only and ungated optional attributes.
        assert_eq!(names(body), vec!["arn", "tags", "value"]);
        assert_eq!(attr(body, "value").value, RenderedValue::Literal(json!("hello")));
        assert_eq!(attr(body, "arn").value, RenderedValue::Literal(json!("arn:test:1")));
        assert_eq!(
            attr(body, "tags").value,
            RenderedValue::Literal(json!({"env": "prod"}))
        );
    }

    #[test]
    fn test_type_mismatch_falls_back_and_degrades() {
        let block = fixtures::instance_block()
            .with_attribute("count", Attribute::optional_number());
        let options = RenderOptions::new().with_import_source(source(json!({
            "value": 42,
            "count": "three"
        })));
        let outcome = render(&addr(), &block, &options);
        let body = &outcome.resource.body;

        assert!(outcome.degraded);
        assert!(outcome.has_errors());
        assert_eq!(outcome.diagnostics.len(), 2);
        // Required attribute falls back to its zero value; optional one is dropped.
        assert_eq!(names(body), vec!["value"]);
        assert_eq!(attr(body, "value").value, RenderedValue::Literal(json!("")));

        let paths: Vec<_> = outcome
            .diagnostics
            .iter()
            .map(|d| d.attribute.clone().unwrap())
            .collect();
        assert_eq!(paths, vec!["count", "value"]);
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let block = Block::new()
            .with_attribute("zeta", Attribute::required_string())
            .with_attribute("alpha", Attribute::required_string())
            .with_attribute("mid", Attribute::required_string())
            .with_block("zone", NestedBlock::single(Block::new()).with_min_items(1))
            .with_block("disk", NestedBlock::list(Block::new()).with_min_items(1));
        let outcome = render(&addr(), &block, &RenderOptions::new());
        let body = &outcome.resource.body;

        assert_eq!(names(body), vec!["alpha", "mid", "zeta"]);
        let blocks: Vec<_> = body.blocks.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(blocks, vec!["disk", "zone"]);
    }

    #[test]
    fn test_render_is_deterministic() {
        let options = RenderOptions::new()
            .with_optional(true)
            .with_descriptions(true)
            .with_import_source(source(json!({"network": [{"cidr": "10.0.0.0/16"}]})));
        let block = fixtures::network_block();
        let first = render(&addr(), &block, &options);
        let second = render(&addr(), &block.clone(), &options);
        assert_eq!(first, second);
        assert_eq!(
            human::format(&first.resource),
            human::format(&second.resource)
        );
    }

    #[test]
    fn test_optional_block_gated() {
        let block = Block::new().with_block(
            "logging",
            NestedBlock::single(Block::new().with_attribute("level", Attribute::required_string())),
        );
        let outcome = render(&addr(), &block, &RenderOptions::new());
        assert!(outcome.resource.body.blocks.is_empty());

        let outcome = render(&addr(), &block, &RenderOptions::new().with_optional(true));
        assert_eq!(outcome.resource.body.blocks.len(), 1);
        let logging = &outcome.resource.body.blocks[0];
        assert_eq!(logging.key, None);
        assert_eq!(names(&logging.body), vec!["level"]);
    }

    #[test]
    fn test_min_items_forces_repetitions() {
        let block = Block::new().with_block(
            "disk",
            NestedBlock::list(Block::new().with_attribute("size", Attribute::required_number()))
                .with_min_items(2),
        );
        let outcome = render(&addr(), &block, &RenderOptions::new());
        assert_eq!(outcome.resource.body.blocks.len(), 2);
    }

    #[test]
    fn test_list_blocks_follow_import_count_and_order() {
        let block = fixtures::network_block();
        let options = RenderOptions::new().with_import_source(source(json!({
            "network": [
                {"cidr": "10.0.0.0/16"},
                {"cidr": "10.1.0.0/16"},
                {"cidr": "10.2.0.0/16"}
            ]
        })));
        let outcome = render(&addr(), &block, &options);
        let blocks = &outcome.resource.body.blocks;

        assert_eq!(blocks.len(), 3);
        let cidrs: Vec<_> = blocks
            .iter()
            .map(|b| attr(&b.body, "cidr").value.clone())
            .collect();
        assert_eq!(
            cidrs,
            vec![
                RenderedValue::Literal(json!("10.0.0.0/16")),
                RenderedValue::Literal(json!("10.1.0.0/16")),
                RenderedValue::Literal(json!("10.2.0.0/16")),
            ]
        );
    }

    #[test]
    fn test_import_shorter_than_min_items_pads() {
        let block = Block::new().with_block(
            "disk",
            NestedBlock::list(Block::new().with_attribute("size", Attribute::required_number()))
                .with_min_items(3),
        );
        let options =
            RenderOptions::new().with_import_source(source(json!({"disk": [{"size": 100}]})));
        let outcome = render(&addr(), &block, &options);
        let sizes: Vec<_> = outcome
            .resource
            .body
            .blocks
            .iter()
            .map(|b| attr(&b.body, "size").value.clone())
            .collect();
        assert_eq!(
            sizes,
            vec![
                RenderedValue::Literal(json!(100)),
                RenderedValue::Literal(json!(0)),
                RenderedValue::Literal(json!(0)),
            ]
        );
    }

    #[test]
    fn test_map_blocks_keyed_by_import() {
        let block = Block::new().with_block(
            "volume",
            NestedBlock::map(
                Block::new().with_attribute("mount_path", Attribute::required_string()),
            ),
        );
        let options = RenderOptions::new().with_import_source(source(json!({
            "volume": {
                "logs": {"mount_path": "/logs"},
                "data": {"mount_path": "/data"}
            }
        })));
        let outcome = render(&addr(), &block, &options);
        let keys: Vec<_> = outcome
            .resource
            .body
            .blocks
            .iter()
            .map(|b| b.key.clone().unwrap())
            .collect();
        assert_eq!(keys, vec!["data", "logs"]);

        // No values and not forced: nothing.
        let outcome = render(&addr(), &block, &RenderOptions::new());
        assert!(outcome.resource.body.blocks.is_empty());

        // Forced with no values: placeholder keys.
        let forced = Block::new().with_block(
            "volume",
            NestedBlock::map(Block::new()).with_min_items(2),
        );
        let outcome = render(&addr(), &forced, &RenderOptions::new());
        let keys: Vec<_> = outcome
            .resource
            .body
            .blocks
            .iter()
            .map(|b| b.key.clone().unwrap())
            .collect();
        assert_eq!(keys, vec!["key", "key_1"]);
    }

    #[test]
    fn test_single_block_ignores_min_items() {
        let block = Block::new().with_block(
            "settings",
            NestedBlock::single(Block::new()).with_min_items(3),
        );
        let outcome = render(&addr(), &block, &RenderOptions::new());
        assert_eq!(outcome.resource.body.blocks.len(), 1);
    }

    #[test]
    fn test_nested_block_mismatch() {
        let block = fixtures::network_block();
        let options =
            RenderOptions::new().with_import_source(source(json!({"network": "oops"})));
        let outcome = render(&addr(), &block, &options);
        assert!(outcome.degraded);
        assert_eq!(
            outcome.diagnostics[0].attribute.as_deref(),
            Some("network")
        );
        // network has min_items = 1, so a blank occurrence is still rendered.
        assert_eq!(outcome.resource.body.blocks.len(), 1);
    }

    #[test]
    fn test_nested_values_are_narrowed() {
        let block = fixtures::network_block();
        let options = RenderOptions::new().with_import_source(source(json!({
            "network": [{"cidr": "10.0.0.0/16", "subnet": [{"cidr": 24}]}]
        })));
        let outcome = render(&addr(), &block, &options);
        assert_eq!(
            outcome.diagnostics[0].attribute.as_deref(),
            Some("network[0].subnet[0].cidr")
        );
    }

    #[test]
    fn test_max_items_exceeded_warns() {
        let block = Block::new().with_block(
            "rule",
            NestedBlock::list(Block::new()).with_max_items(1),
        );
        let options =
            RenderOptions::new().with_import_source(source(json!({"rule": [{}, {}]})));
        let outcome = render(&addr(), &block, &options);
        assert_eq!(outcome.resource.body.blocks.len(), 2);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].severity, DiagnosticSeverity::Warning);
        assert!(!outcome.degraded);
    }

    #[test]
    fn test_min_items_above_max_items_warns() {
        let block = Block::new().with_block(
            "rule",
            NestedBlock::list(Block::new())
                .with_min_items(5)
                .with_max_items(2),
        );
        let outcome = render(&addr(), &block, &RenderOptions::new());
        assert_eq!(outcome.resource.body.blocks.len(), 5);
        assert_eq!(outcome.diagnostics.len(), 1);
        let warning = &outcome.diagnostics[0];
        assert_eq!(warning.severity, DiagnosticSeverity::Warning);
        assert_eq!(warning.summary, "Too many \"rule\" blocks");
        assert!(warning
            .detail
            .as_deref()
            .unwrap()
            .contains("requires at least 5 blocks"));
        assert!(!outcome.degraded);
    }

    #[test]
    fn test_set_blocks_keep_source_order_and_duplicates() {
        let block = Block::new().with_block(
            "ingress",
            NestedBlock::set(Block::new().with_attribute("port", Attribute::required_number())),
        );
        let options = RenderOptions::new().with_import_source(source(json!({
            "ingress": [{"port": 443}, {"port": 80}, {"port": 443}]
        })));
        let outcome = render(&addr(), &block, &options);
        assert!(outcome.diagnostics.is_empty());

        let ports: Vec<_> = outcome
            .resource
            .body
            .blocks
            .iter()
            .map(|b| attr(&b.body, "port").value.clone())
            .collect();
        assert_eq!(
            ports,
            vec![
                RenderedValue::Literal(json!(443)),
                RenderedValue::Literal(json!(80)),
                RenderedValue::Literal(json!(443)),
            ]
        );

        let doc = json::ResourceDocument::from(&outcome.resource);
        assert_eq!(doc.body.blocks.len(), 3);
        for nested in &doc.body.blocks {
            assert_eq!(nested.nesting_mode, BlockNestingMode::Set);
            assert_eq!(nested.key, None);
        }
        let text = json::format(&outcome.resource).unwrap();
        assert_eq!(text.matches("\"nesting_mode\": \"set\"").count(), 3);
    }

    #[test]
    fn test_sensitive_import_is_withheld() {
        let block = Block::new()
            .with_attribute("name", Attribute::required_string())
            .with_attribute("password", Attribute::required_string().sensitive())
            .with_attribute("token", Attribute::optional_string().sensitive());
        let options = RenderOptions::new().with_import_source(source(json!({
            "name": "db",
            "password": "hunter2",
            "token": "t0ken"
        })));
        let outcome = render(&addr(), &block, &options);
        let body = &outcome.resource.body;

        assert_eq!(names(body), vec!["name", "password", "token"]);
        assert_eq!(attr(body, "name").value, RenderedValue::Literal(json!("db")));
        assert_eq!(attr(body, "password").value, RenderedValue::Sensitive);
        assert_eq!(attr(body, "token").value, RenderedValue::Sensitive);
        assert!(outcome.diagnostics.is_empty());

        // Without an imported value a sensitive attribute follows the usual policy.
        let outcome = render(&addr(), &block, &RenderOptions::new());
        assert_eq!(
            attr(&outcome.resource.body, "password").value,
            RenderedValue::Literal(json!(""))
        );
    }

    #[test]
    fn test_inconsistent_flags_render_as_optional() {
        let broken = Attribute::new(
            AttributeType::String,
            AttributeFlags {
                required: true,
                computed: true,
                ..Default::default()
            },
        );
        let block = Block::new().with_attribute("odd", broken);

        let outcome = render(&addr(), &block, &RenderOptions::new());
        assert!(outcome.resource.body.attributes.is_empty());
        assert_eq!(outcome.diagnostics[0].severity, DiagnosticSeverity::Warning);

        let outcome = render(&addr(), &block, &RenderOptions::new().with_optional(true));
        assert_eq!(names(&outcome.resource.body), vec!["odd"]);
    }

    #[test]
    fn test_depth_ceiling() {
        let mut block = Block::new().with_attribute("leaf", Attribute::required_string());
        for _ in 0..(MAX_DEPTH + 2) {
            block = Block::new().with_block("inner", NestedBlock::single(block).with_min_items(1));
        }
        let outcome = render(&addr(), &block, &RenderOptions::new());
        assert!(outcome.degraded);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].summary, "Schema nesting too deep");
    }

    #[test]
    fn test_block_description() {
        let block = Block::new().with_block(
            "network",
            NestedBlock::single(Block::new().with_description("  Network settings \n"))
                .with_min_items(1),
        );
        let outcome = render(&addr(), &block, &RenderOptions::new());
        assert_eq!(outcome.resource.body.blocks[0].description, None);

        let outcome = render(&addr(), &block, &RenderOptions::new().with_descriptions(true));
        assert_eq!(
            outcome.resource.body.blocks[0].description.as_deref(),
            Some("Network settings")
        );
    }

    #[test]
    fn test_empty_schema_renders_empty_body() {
        let outcome = render(&addr(), &Block::new(), &RenderOptions::new().with_optional(true));
        assert!(outcome.resource.body.is_empty());
    }
}
