//! Zero values by type.

use serde_json::{Map, Value};

use crate::schema::AttributeType;

/// The minimal valid literal of `ty`.
///
/// Objects and tuples recurse so every field or element gets its own zero
/// value. Dynamic types get `null`, which is valid whatever type a provider
/// later settles on.
pub fn zero_value(ty: &AttributeType) -> Value {
    match ty {
        AttributeType::String => Value::String(String::new()),
        AttributeType::Number => Value::from(0),
        AttributeType::Bool => Value::Bool(false),
        AttributeType::List(_) | AttributeType::Set(_) => Value::Array(Vec::new()),
        AttributeType::Tuple(elements) => Value::Array(elements.iter().map(zero_value).collect()),
        AttributeType::Map(_) => Value::Object(Map::new()),
        AttributeType::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(name, field)| (name.clone(), zero_value(field)))
                .collect(),
        ),
        AttributeType::Dynamic => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{check_type, AttributePath};
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_primitive_zero_values() {
        assert_eq!(zero_value(&AttributeType::String), json!(""));
        assert_eq!(zero_value(&AttributeType::Number), json!(0));
        assert_eq!(zero_value(&AttributeType::Bool), json!(false));
        assert_eq!(zero_value(&AttributeType::Dynamic), json!(null));
    }

    #[test]
    fn test_collection_zero_values() {
        assert_eq!(zero_value(&AttributeType::list(AttributeType::String)), json!([]));
        assert_eq!(zero_value(&AttributeType::set(AttributeType::Number)), json!([]));
        assert_eq!(zero_value(&AttributeType::map(AttributeType::Bool)), json!({}));
        assert_eq!(
            zero_value(&AttributeType::tuple(vec![
                AttributeType::String,
                AttributeType::Bool
            ])),
            json!(["", false])
        );
    }

    #[test]
    fn test_object_zero_value_recurses() {
        let mut inner = HashMap::new();
        inner.insert("enabled".to_string(), AttributeType::Bool);
        let mut fields = HashMap::new();
        fields.insert("host".to_string(), AttributeType::String);
        fields.insert("port".to_string(), AttributeType::Number);
        fields.insert("tls".to_string(), AttributeType::object(inner));

        assert_eq!(
            zero_value(&AttributeType::object(fields)),
            json!({"host": "", "port": 0, "tls": {"enabled": false}})
        );
    }

    #[test]
    fn test_zero_values_type_check() {
        let mut fields = HashMap::new();
        fields.insert("name".to_string(), AttributeType::String);
        let types = vec![
            AttributeType::String,
            AttributeType::Number,
            AttributeType::Bool,
            AttributeType::list(AttributeType::String),
            AttributeType::set(AttributeType::Number),
            AttributeType::map(AttributeType::Bool),
            AttributeType::object(fields),
            AttributeType::tuple(vec![AttributeType::Number, AttributeType::String]),
        ];
        for ty in types {
            let path = AttributePath::root().attribute("a");
            assert!(
                check_type(&ty, &zero_value(&ty), &path).is_ok(),
                "zero value of {ty} does not type-check"
            );
        }
    }
}
