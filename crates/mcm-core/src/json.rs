// Bridges between the literal value tree and serde_json, used for CLI
// dumps/input and for the typed record views.
use serde_json::{Map, Number, json};

use crate::collection::Collection;
use crate::literal::Value;

impl From<&Value> for serde_json::Value {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(n) => json!(*n),
            // NaN and infinities have no JSON spelling
            Value::Float(f) => Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => serde_json::Value::Array(items.iter().map(Into::into).collect()),
            Value::Object(members) => {
                let mut map = Map::with_capacity(members.len());
                for (k, val) in members {
                    map.insert(k.clone(), val.into());
                }
                serde_json::Value::Object(map)
            }
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(items) => Value::Array(items.iter().map(Into::into).collect()),
            serde_json::Value::Object(map) => {
                Value::Object(map.iter().map(|(k, v)| (k.clone(), v.into())).collect())
            }
        }
    }
}

pub fn collection_to_json(c: &Collection) -> serde_json::Value {
    (&c.to_value()).into()
}

pub fn to_json_pretty(v: &Value) -> String {
    let j: serde_json::Value = v.into();
    serde_json::to_string_pretty(&j).unwrap_or_else(|_| "null".to_string())
}
