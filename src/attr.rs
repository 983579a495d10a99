use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type Attributes = BTreeMap<String, AttrValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl AttrValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(v) => Some(*v as f64),
            AttrValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Lumisection and run numbers. Integral floats are accepted, anything
    /// negative or fractional is not.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            AttrValue::Int(v) => u32::try_from(*v).ok(),
            AttrValue::Float(v) if v.fract() == 0.0 && *v >= 0.0 && *v <= u32::MAX as f64 => {
                Some(*v as u32)
            }
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<u32> for AttrValue {
    fn from(v: u32) -> Self {
        AttrValue::Int(v as i64)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Text(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Text(v)
    }
}

/// Looks up `key` and reads it as a lumisection/run number.
pub fn get_u32(attrs: &Attributes, key: &str) -> Option<u32> {
    attrs.get(key).and_then(AttrValue::as_u32)
}

/// Looks up `key` and reads it as a number.
pub fn get_f64(attrs: &Attributes, key: &str) -> Option<f64> {
    attrs.get(key).and_then(AttrValue::as_f64)
}
