//! Conversions between [`Node`] and `serde_json::Value`.
//!
//! `serde_json` is built with `preserve_order`, so object member order
//! survives in both directions. Duplicate member names collapse to the last
//! value, matching last-match-wins lookup.
use serde_json::{Map, Number, Value};

use crate::error::{Error, Result};
use crate::node::{Category, Node, Scalar};

impl From<&Value> for Node {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Node::new(),
            Value::Bool(b) => Node::scalar(*b),
            Value::Number(n) => Node::scalar(number_to_scalar(n)),
            Value::String(s) => Node::scalar(s.as_str()),
            Value::Array(xs) => Node::from_elements(xs.iter().map(Node::from)),
            Value::Object(map) => Node::from_members(map.iter().map(|(k, v)| (k.as_str(), Node::from(v)))),
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Node::from(&value)
    }
}

impl TryFrom<&Node> for Value {
    type Error = Error;

    fn try_from(node: &Node) -> Result<Self> {
        match node.category() {
            Category::Void => Ok(Value::Null),
            Category::Scalar => scalar_to_value(node.value()?),
            Category::Array => node
                .children()
                .iter()
                .map(Value::try_from)
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Category::Object => {
                let mut map = Map::new();
                for child in node.children() {
                    let name = child.name().unwrap_or_default().to_owned();
                    map.insert(name, Value::try_from(child)?);
                }
                Ok(Value::Object(map))
            }
        }
    }
}

fn number_to_scalar(n: &Number) -> Scalar {
    if let Some(u) = n.as_u64() {
        Scalar::UInt(u)
    } else if let Some(i) = n.as_i64() {
        Scalar::from(i)
    } else {
        // serde_json only holds finite floats.
        Scalar::Float(n.as_f64().unwrap_or_default())
    }
}

fn scalar_to_value(scalar: &Scalar) -> Result<Value> {
    let value = match scalar {
        Scalar::Bool(b) => Value::Bool(*b),
        Scalar::UInt(u) => Value::from(*u),
        Scalar::Int(i) => Value::from(*i),
        Scalar::Float(f) => Number::from_f64(*f)
            .map(Value::Number)
            .ok_or(Error::NonFiniteNumber(*f))?,
        Scalar::Str(s) => Value::String(s.clone()),
    };
    Ok(value)
}
