//! Shape-classified view of a decoded JSON payload.
//!
//! The payload is classified exactly once, when the [`Document`] is built.
//! Everything downstream matches on [`DocumentNode`] instead of inspecting
//! raw JSON types.

use crate::error::DecodeError;
use serde_json::{Map, Value};

/// One node of the payload tree.
///
/// Absent object members and explicit `null` are both `Scalar(Value::Null)`.
#[derive(Clone, Debug, PartialEq)]
pub enum DocumentNode {
    /// A string, number, boolean, or null.
    Scalar(Value),
    /// Named fields, in payload order.
    Object(Vec<(String, DocumentNode)>),
    Array(Vec<DocumentNode>),
}

/// Shared node returned for every missing field.
pub static ABSENT: DocumentNode = DocumentNode::Scalar(Value::Null);

impl DocumentNode {
    /// Classify a decoded JSON value, recursively.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => DocumentNode::Object(
                map.into_iter()
                    .map(|(k, v)| (k, DocumentNode::from_value(v)))
                    .collect(),
            ),
            Value::Array(items) => {
                DocumentNode::Array(items.into_iter().map(DocumentNode::from_value).collect())
            }
            scalar => DocumentNode::Scalar(scalar),
        }
    }

    /// Named child of an object node. Returns [`ABSENT`] when the name is
    /// missing or this node is not an object.
    pub fn get(&self, name: &str) -> &DocumentNode {
        match self {
            DocumentNode::Object(fields) => fields
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v)
                .unwrap_or(&ABSENT),
            _ => &ABSENT,
        }
    }

    /// Items of an array node; empty for every other shape.
    pub fn items(&self) -> &[DocumentNode] {
        match self {
            DocumentNode::Array(items) => items,
            _ => &[],
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DocumentNode::Scalar(Value::Null))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, DocumentNode::Object(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, DocumentNode::Array(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DocumentNode::Scalar(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DocumentNode::Scalar(Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DocumentNode::Scalar(Value::Number(n)) => n.as_f64(),
            _ => None,
        }
    }

    /// True for null, `""`, and empty containers.
    pub fn is_empty(&self) -> bool {
        match self {
            DocumentNode::Scalar(Value::Null) => true,
            DocumentNode::Scalar(Value::String(s)) => s.is_empty(),
            DocumentNode::Scalar(_) => false,
            DocumentNode::Object(fields) => fields.is_empty(),
            DocumentNode::Array(items) => items.is_empty(),
        }
    }

    /// Rebuild the JSON value this node was classified from.
    pub fn to_value(&self) -> Value {
        match self {
            DocumentNode::Scalar(v) => v.clone(),
            DocumentNode::Object(fields) => {
                let map: Map<String, Value> = fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect();
                Value::Object(map)
            }
            DocumentNode::Array(items) => Value::Array(items.iter().map(|v| v.to_value()).collect()),
        }
    }
}

/// A decoded, immutable payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    root: DocumentNode,
}

impl Document {
    /// Decode a raw JSON payload.
    ///
    /// Fails with [`DecodeError`] when the input is not valid JSON; the
    /// document root may be any JSON value.
    pub fn from_json(input: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(input).map_err(|e| DecodeError {
            message: e.to_string(),
            line: Some(e.line()),
            column: Some(e.column()),
        })?;
        Ok(Self::from_value(value))
    }

    pub fn from_value(value: Value) -> Self {
        Document {
            root: DocumentNode::from_value(value),
        }
    }

    pub fn root(&self) -> &DocumentNode {
        &self.root
    }
}
