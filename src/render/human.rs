//! Human-readable configuration formatter.
//!
//! Emits configuration block syntax: two-space indentation per nesting level,
//! `=` aligned within each block, descriptions as `#` comment lines above the
//! attribute or block they describe. Output is always newline-terminated so it
//! can be appended to a configuration file as-is.

use serde_json::Value;

use super::{RenderedBlock, RenderedResource, RenderedValue};
use crate::address::ResourceMode;

const INDENT: &str = "  ";

/// Format a rendered resource as configuration source text.
pub fn format(resource: &RenderedResource) -> String {
    let address = &resource.address;
    let keyword = match address.mode {
        ResourceMode::Managed => "resource",
        ResourceMode::Data => "data",
    };

    let mut out = format!(
        "{keyword} {} {} {{\n",
        quote(&address.type_name),
        quote(&address.name)
    );
    write_body(&mut out, &resource.body, 1);
    out.push_str("}\n");
    out
}

fn write_body(out: &mut String, body: &RenderedBlock, depth: usize) {
    let width = body
        .attributes
        .iter()
        .map(|a| a.name.chars().count())
        .max()
        .unwrap_or(0);

    for attr in &body.attributes {
        if let Some(description) = &attr.description {
            write_comment(out, description, depth);
        }
        indent(out, depth);
        out.push_str(&format!("{:width$} = ", attr.name));
        match &attr.value {
            RenderedValue::Literal(value) => write_value(out, value, depth),
            RenderedValue::Unset => {
                out.push_str("null # OPTIONAL ");
                out.push_str(&attr.attr_type.to_string());
            },
            RenderedValue::Sensitive => {
                out.push_str("null # SENSITIVE ");
                out.push_str(&attr.attr_type.to_string());
            },
        }
        out.push('\n');
    }

    for (i, block) in body.blocks.iter().enumerate() {
        if i > 0 || !body.attributes.is_empty() {
            out.push('\n');
        }
        if let Some(description) = &block.description {
            write_comment(out, description, depth);
        }
        indent(out, depth);
        out.push_str(&block.name);
        if let Some(key) = &block.key {
            out.push(' ');
            out.push_str(&quote(key));
        }
        if block.body.is_empty() {
            out.push_str(" {}\n");
        } else {
            out.push_str(" {\n");
            write_body(out, &block.body, depth + 1);
            indent(out, depth);
            out.push_str("}\n");
        }
    }
}

fn write_comment(out: &mut String, text: &str, depth: usize) {
    for line in text.lines() {
        indent(out, depth);
        let line = line.trim_end();
        if line.is_empty() {
            out.push_str("#\n");
        } else {
            out.push_str("# ");
            out.push_str(line);
            out.push('\n');
        }
    }
}

/// Write `value` starting at the current column. Multi-line values close at
/// `depth`.
fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => out.push_str(&quote(s)),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) if items.iter().all(is_inline) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item, depth);
            }
            out.push(']');
        },
        Value::Array(items) => {
            out.push_str("[\n");
            for item in items {
                indent(out, depth + 1);
                write_value(out, item, depth + 1);
                out.push_str(",\n");
            }
            indent(out, depth);
            out.push(']');
        },
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(map) => {
            let keys: Vec<String> = map.keys().map(|k| object_key(k)).collect();
            let width = keys.iter().map(|k| k.chars().count()).max().unwrap_or(0);
            out.push_str("{\n");
            for (key, item) in keys.iter().zip(map.values()) {
                indent(out, depth + 1);
                out.push_str(&format!("{key:width$} = "));
                write_value(out, item, depth + 1);
                out.push('\n');
            }
            indent(out, depth);
            out.push('}');
        },
    }
}

fn is_inline(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.iter().all(is_inline),
        _ => true,
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

/// Words the expression parser claims at the start of an object item.
const RESERVED_KEYS: &[&str] = &["for", "in", "if", "null", "true", "false"];

fn object_key(key: &str) -> String {
    if is_identifier(key) && !RESERVED_KEYS.contains(&key) {
        key.to_string()
    } else {
        quote(key)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {},
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Quote a string literal, escaping template sequences so the text is never
/// interpolated.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                out.push(c);
                out.push(c);
            },
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
