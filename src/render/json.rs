//! Machine-readable formatter.
//!
//! Mirrors the rendered tree one-to-one: every attribute and block occurrence
//! the human formatter prints appears here, tagged with its type and value.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{RenderedBlock, RenderedResource, RenderedValue};
use crate::schema::BlockNestingMode;

/// A rendered resource in structured form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDocument {
    /// Full resource instance address.
    pub address: String,
    /// `managed` or `data`.
    pub mode: String,
    /// Resource type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Local name.
    pub name: String,
    /// The resource body.
    pub body: BlockDocument,
}

/// One block level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BlockDocument {
    /// Attributes in name order.
    pub attributes: Vec<AttributeDocument>,
    /// Nested block occurrences in name order.
    pub blocks: Vec<NestedBlockDocument>,
}

/// One rendered attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDocument {
    /// Attribute name.
    pub name: String,
    /// Type constraint, e.g. `list(string)`.
    #[serde(rename = "type")]
    pub attr_type: String,
    /// The value; `null` when unset.
    pub value: Value,
    /// Whether the value is a fill-me-in marker rather than a real value.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unset: bool,
    /// Whether an existing value was withheld because it is sensitive.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
    /// Schema description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One nested block occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedBlockDocument {
    /// Block type name.
    pub name: String,
    /// Nesting mode of the block type.
    pub nesting_mode: BlockNestingMode,
    /// Map key, for map-nested blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Schema description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The block's contents.
    pub body: BlockDocument,
}

impl From<&RenderedResource> for ResourceDocument {
    fn from(resource: &RenderedResource) -> Self {
        let address = &resource.address;
        Self {
            address: address.to_string(),
            mode: address.mode.to_string(),
            type_name: address.type_name.clone(),
            name: address.name.clone(),
            body: BlockDocument::from(&resource.body),
        }
    }
}

impl From<&RenderedBlock> for BlockDocument {
    fn from(block: &RenderedBlock) -> Self {
        Self {
            attributes: block
                .attributes
                .iter()
                .map(|attr| {
                    let (value, unset, sensitive) = match &attr.value {
                        RenderedValue::Literal(value) => (value.clone(), false, false),
                        RenderedValue::Unset => (Value::Null, true, false),
                        RenderedValue::Sensitive => (Value::Null, true, true),
                    };
                    AttributeDocument {
                        name: attr.name.clone(),
                        attr_type: attr.attr_type.to_string(),
                        value,
                        unset,
                        sensitive,
                        description: attr.description.clone(),
                    }
                })
                .collect(),
            blocks: block
                .blocks
                .iter()
                .map(|nested| NestedBlockDocument {
                    name: nested.name.clone(),
                    nesting_mode: nested.nesting_mode,
                    key: nested.key.clone(),
                    description: nested.description.clone(),
                    body: BlockDocument::from(&nested.body),
                })
                .collect(),
        }
    }
}

/// Format a rendered resource as pretty-printed JSON, newline-terminated.
pub fn format(resource: &RenderedResource) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(&ResourceDocument::from(resource))?;
    out.push('\n');
    Ok(out)
}
