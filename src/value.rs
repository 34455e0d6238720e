//! Known attribute values and their type checks.
//!
//! A [`ValueSource`] is the read-only bag of values an existing resource
//! already has. Values are plain `serde_json::Value`s; their shape is checked
//! against the schema's [`AttributeType`] before they are rendered.

use serde_json::{Map, Value};
use std::fmt;

use crate::error::ScaffoldError;
use crate::schema::AttributeType;

/// One step of an [`AttributePath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// An attribute or nested block name.
    Attribute(String),
    /// A position in a list or set of blocks.
    Index(usize),
    /// A key in a map of blocks.
    Key(String),
}

/// A path from the resource root to an attribute, e.g. `network[0].port`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AttributePath(Vec<PathStep>);

impl AttributePath {
    /// The empty path, naming the resource itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Extend the path with an attribute or block name.
    pub fn attribute(&self, name: &str) -> Self {
        self.push(PathStep::Attribute(name.to_string()))
    }

    /// Extend the path with a list index.
    pub fn index(&self, index: usize) -> Self {
        self.push(PathStep::Index(index))
    }

    /// Extend the path with a map key.
    pub fn key(&self, key: &str) -> Self {
        self.push(PathStep::Key(key.to_string()))
    }

    /// The steps of the path.
    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    fn push(&self, step: PathStep) -> Self {
        let mut steps = self.0.clone();
        steps.push(step);
        Self(steps)
    }
}

impl From<Vec<PathStep>> for AttributePath {
    fn from(steps: Vec<PathStep>) -> Self {
        Self(steps)
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            match step {
                PathStep::Attribute(name) if i == 0 => f.write_str(name)?,
                PathStep::Attribute(name) => write!(f, ".{name}")?,
                PathStep::Index(index) => write!(f, "[{index}]")?,
                PathStep::Key(key) => write!(f, "[{key:?}]")?,
            }
        }
        Ok(())
    }
}

/// Attribute values of an existing resource instance.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueSource {
    root: Map<String, Value>,
}

impl ValueSource {
    /// An empty value source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a value source from a JSON object.
    pub fn from_json(value: Value) -> Result<Self, ScaffoldError> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(ScaffoldError::ValueTypeMismatch {
                path: String::new(),
                expected: "object".to_string(),
                actual: value_type_name(&other).to_string(),
            }),
        }
    }

    /// The top-level attribute values.
    pub fn root(&self) -> &Map<String, Value> {
        &self.root
    }

    /// The value at `path`. Nulls count as absent.
    pub fn get(&self, path: &AttributePath) -> Option<&Value> {
        let mut steps = path.steps().iter();
        let mut current = match steps.next()? {
            PathStep::Attribute(name) => self.root.get(name)?,
            _ => return None,
        };
        for step in steps {
            current = match (step, current) {
                (PathStep::Attribute(name), Value::Object(map))
                | (PathStep::Key(name), Value::Object(map)) => map.get(name)?,
                (PathStep::Index(index), Value::Array(items)) => items.get(*index)?,
                _ => return None,
            };
        }
        present(Some(current))
    }
}

/// Drop explicit nulls: an unknown or absent value is no value at all.
pub fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Check that `value` is a valid literal of `expected`.
///
/// Nulls nested inside collections are accepted. Returns the first mismatch,
/// tagged with the path of the offending element.
pub fn check_type(
    expected: &AttributeType,
    value: &Value,
    path: &AttributePath,
) -> Result<(), ScaffoldError> {
    if value.is_null() {
        return Ok(());
    }
    match expected {
        AttributeType::String => expect(value.is_string(), expected, value, path),
        AttributeType::Number => expect(value.is_number(), expected, value, path),
        AttributeType::Bool => expect(value.is_boolean(), expected, value, path),
        AttributeType::List(element_type) | AttributeType::Set(element_type) => {
            let items = value
                .as_array()
                .ok_or_else(|| mismatch(expected, value, path))?;
            for (i, item) in items.iter().enumerate() {
                check_type(element_type, item, &path.index(i))?;
            }
            Ok(())
        },
        AttributeType::Map(element_type) => {
            let map = value
                .as_object()
                .ok_or_else(|| mismatch(expected, value, path))?;
            for (key, item) in map {
                check_type(element_type, item, &path.key(key))?;
            }
            Ok(())
        },
        AttributeType::Object(fields) => {
            let map = value
                .as_object()
                .ok_or_else(|| mismatch(expected, value, path))?;
            if let Some(unknown) = map.keys().find(|k| !fields.contains_key(*k)) {
                return Err(ScaffoldError::ValueTypeMismatch {
                    path: path.attribute(unknown).to_string(),
                    expected: expected.to_string(),
                    actual: "an unexpected attribute".to_string(),
                });
            }
            // Fields are checked in name order so the reported path is stable.
            let mut names: Vec<&String> = fields.keys().collect();
            names.sort();
            for name in names {
                if let Some(item) = map.get(name) {
                    check_type(&fields[name], item, &path.attribute(name))?;
                }
            }
            Ok(())
        },
        AttributeType::Tuple(element_types) => {
            let items = value
                .as_array()
                .ok_or_else(|| mismatch(expected, value, path))?;
            if items.len() != element_types.len() {
                return Err(ScaffoldError::ValueTypeMismatch {
                    path: path.to_string(),
                    expected: expected.to_string(),
                    actual: format!("a sequence of {} elements", items.len()),
                });
            }
            for (i, (item, element_type)) in items.iter().zip(element_types).enumerate() {
                check_type(element_type, item, &path.index(i))?;
            }
            Ok(())
        },
        AttributeType::Dynamic => Ok(()),
    }
}

/// Short name for the JSON kind of `value`.
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "object",
    }
}

fn expect(
    ok: bool,
    expected: &AttributeType,
    value: &Value,
    path: &AttributePath,
) -> Result<(), ScaffoldError> {
    if ok {
        Ok(())
    } else {
        Err(mismatch(expected, value, path))
    }
}

fn mismatch(expected: &AttributeType, value: &Value, path: &AttributePath) -> ScaffoldError {
    ScaffoldError::ValueTypeMismatch {
        path: path.to_string(),
        expected: expected.to_string(),
        actual: value_type_name(value).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn path(name: &str) -> AttributePath {
        AttributePath::root().attribute(name)
    }

    fn mismatch_path(err: ScaffoldError) -> String {
        match err {
            ScaffoldError::ValueTypeMismatch { path, .. } => path,
            other => panic!("expected a type mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_path_display() {
        let p = AttributePath::root()
            .attribute("network")
            .index(0)
            .attribute("volume")
            .key("data")
            .attribute("size");
        assert_eq!(p.to_string(), r#"network[0].volume["data"].size"#);
        assert_eq!(AttributePath::root().to_string(), "");
    }

    #[test]
    fn test_value_source_get() {
        let source = ValueSource::from_json(json!({
            "value": "hello",
            "missing": null,
            "network": [{"port": 80}, {"port": 443}],
            "volume": {"data": {"size": 10}}
        }))
        .unwrap();

        assert_eq!(source.get(&path("value")), Some(&json!("hello")));
        assert_eq!(source.get(&path("missing")), None);
        assert_eq!(source.get(&path("absent")), None);
        assert_eq!(
            source.get(&path("network").index(1).attribute("port")),
            Some(&json!(443))
        );
        assert_eq!(
            source.get(&path("volume").key("data").attribute("size")),
            Some(&json!(10))
        );
        assert_eq!(source.get(&path("network").key("x")), None);
        assert_eq!(source.get(&AttributePath::root()), None);
    }

    #[test]
    fn test_value_source_requires_object() {
        assert!(ValueSource::from_json(json!(["not", "an", "object"])).is_err());
        assert!(ValueSource::new().root().is_empty());
    }

    #[test]
    fn test_check_primitives() {
        assert!(check_type(&AttributeType::String, &json!("x"), &path("a")).is_ok());
        assert!(check_type(&AttributeType::Number, &json!(4.5), &path("a")).is_ok());
        assert!(check_type(&AttributeType::Bool, &json!(true), &path("a")).is_ok());
        assert!(check_type(&AttributeType::Bool, &json!(null), &path("a")).is_ok());

        let err = check_type(&AttributeType::Number, &json!("42"), &path("count")).unwrap_err();
        match err {
            ScaffoldError::ValueTypeMismatch {
                path,
                expected,
                actual,
            } => {
                assert_eq!(path, "count");
                assert_eq!(expected, "number");
                assert_eq!(actual, "string");
            },
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_check_collections() {
        let tags = AttributeType::list(AttributeType::String);
        assert!(check_type(&tags, &json!(["a", "b"]), &path("tags")).is_ok());
        assert!(check_type(&tags, &json!([]), &path("tags")).is_ok());
        let err = check_type(&tags, &json!(["a", 1]), &path("tags")).unwrap_err();
        assert_eq!(mismatch_path(err), "tags[1]");

        let labels = AttributeType::map(AttributeType::String);
        let err = check_type(&labels, &json!({"env": 1}), &path("labels")).unwrap_err();
        assert_eq!(mismatch_path(err), r#"labels["env"]"#);
        assert!(check_type(&labels, &json!("nope"), &path("labels")).is_err());
    }

    #[test]
    fn test_check_object_and_tuple() {
        let mut fields = HashMap::new();
        fields.insert("host".to_string(), AttributeType::String);
        fields.insert("port".to_string(), AttributeType::Number);
        let endpoint = AttributeType::object(fields);

        assert!(check_type(&endpoint, &json!({"host": "h", "port": 1}), &path("e")).is_ok());
        assert!(check_type(&endpoint, &json!({"host": "h"}), &path("e")).is_ok());
        let err = check_type(&endpoint, &json!({"host": "h", "port": "1"}), &path("e"))
            .unwrap_err();
        assert_eq!(mismatch_path(err), "e.port");
        let err = check_type(&endpoint, &json!({"other": 1}), &path("e")).unwrap_err();
        assert_eq!(mismatch_path(err), "e.other");

        let pair = AttributeType::tuple(vec![AttributeType::String, AttributeType::Number]);
        assert!(check_type(&pair, &json!(["a", 1]), &path("p")).is_ok());
        assert!(check_type(&pair, &json!(["a"]), &path("p")).is_err());
        let err = check_type(&pair, &json!([1, 1]), &path("p")).unwrap_err();
        assert_eq!(mismatch_path(err), "p[0]");
    }

    #[test]
    fn test_check_dynamic_accepts_anything() {
        for value in [json!("s"), json!(1), json!({"a": [1]}), json!([true])] {
            assert!(check_type(&AttributeType::Dynamic, &value, &path("d")).is_ok());
        }
    }
}
