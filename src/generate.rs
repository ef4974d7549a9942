//! Rule generation from OpenAPI 3 request-body schemas.
//!
//! Every operation with a JSON request body yields one [`OperationRules`]
//! holding a rule per reachable property. Schema composition (`$ref`,
//! `oneOf`, `anyOf`, `allOf`) is not followed.

use crate::error::{GenerateError, GenerateErrorKind, RuleError};
use crate::path::child_path;
use crate::rules::RuleTable;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

const COMPOSITION_KEYS: &[&str] = &["$ref", "oneOf", "anyOf", "allOf"];

const JSON_MEDIA_TYPE: &str = "application/json";

/// A generated rule in declaration form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub path: String,
    pub tokens: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// Rules for the request body of one API operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRules {
    pub operation_id: String,
    pub method: String,
    pub path: String,
    pub rules: Vec<RuleSpec>,
}

impl OperationRules {
    /// Build a rule table in generation order.
    pub fn to_table(&self) -> Result<RuleTable, RuleError> {
        let mut table = RuleTable::new();
        for spec in &self.rules {
            table.add_rule(&spec.path, &spec.tokens.join(","), spec.pattern.as_deref())?;
        }
        Ok(table)
    }
}

/// Schema `type` → type-check token.
fn type_token(schema_type: &str) -> Option<&'static str> {
    match schema_type {
        "string" => Some("string"),
        "number" => Some("numeric"),
        "integer" => Some("integer"),
        "boolean" => Some("boolean"),
        _ => None,
    }
}

/// Schema `format` → format-check token.
fn format_token(format: &str) -> Option<&'static str> {
    match format {
        "date" | "date-time" => Some("ISO8601"),
        "email" => Some("email"),
        "uuid" => Some("uuid"),
        "uri" => Some("url"),
        "ipv4" => Some("ip_v4"),
        "ipv6" => Some("ip_v6"),
        _ => None,
    }
}

/// Generate rules for every operation in an OpenAPI YAML (or JSON) document.
pub fn generate(input: &str) -> Result<Vec<OperationRules>, GenerateError> {
    let value: Value = serde_saphyr::from_str(input).map_err(|e| GenerateError {
        kind: GenerateErrorKind::Syntax,
        message: e.to_string(),
        path: None,
    })?;

    let root = value.as_object().ok_or_else(|| GenerateError {
        kind: GenerateErrorKind::TypeMismatch,
        message: "document root must be a mapping".to_string(),
        path: None,
    })?;

    let paths = match root.get("paths") {
        Some(Value::Object(paths)) => paths,
        None | Some(Value::Null) => return Ok(vec![]),
        Some(_) => {
            return Err(GenerateError {
                kind: GenerateErrorKind::TypeMismatch,
                message: "'paths' must be a mapping".to_string(),
                path: Some("paths".to_string()),
            });
        }
    };

    let mut operations = Vec::new();
    for (route, item) in paths {
        let Some(item) = item.as_object() else {
            continue;
        };
        for (method, operation) in item {
            if !HTTP_METHODS.contains(&method.as_str()) {
                continue;
            }
            let Some(operation) = operation.as_object() else {
                continue;
            };
            if let Some(rules) = operation_rules(route, method, operation) {
                operations.push(rules);
            }
        }
    }

    Ok(operations)
}

fn operation_rules(route: &str, method: &str, operation: &Map<String, Value>) -> Option<OperationRules> {
    let operation_id = operation
        .get("operationId")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} {}", method.to_uppercase(), route));

    let body = operation.get("requestBody")?.as_object()?;
    if has_composition(body, &operation_id) {
        return None;
    }
    let schema = body
        .get("content")?
        .get(JSON_MEDIA_TYPE)?
        .get("schema")?
        .as_object()?;

    let mut rules = Vec::new();
    if !has_composition(schema, &operation_id) {
        walk_properties(schema, "", &mut rules);
    }

    Some(OperationRules {
        operation_id,
        method: method.to_string(),
        path: route.to_string(),
        rules,
    })
}

fn has_composition(schema: &Map<String, Value>, location: &str) -> bool {
    match COMPOSITION_KEYS.iter().find(|k| schema.contains_key(**k)) {
        Some(key) => {
            tracing::warn!(
                target: "payload_rules::generate",
                location = %location,
                key = %key,
                "schema composition is not supported; skipping"
            );
            true
        }
        None => false,
    }
}

/// Emit rules for each entry of `schema.properties` below `prefix`.
fn walk_properties(schema: &Map<String, Value>, prefix: &str, out: &mut Vec<RuleSpec>) {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return;
    };
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    for (name, property) in properties {
        let path = child_path(prefix, name);
        let is_required = required.contains(&name.as_str());
        match property.as_object() {
            Some(property) => walk_property(property, path, is_required, out),
            None => out.push(RuleSpec {
                path,
                tokens: vec![presence_token(is_required).to_string()],
                pattern: None,
            }),
        }
    }
}

fn walk_property(
    property: &Map<String, Value>,
    path: String,
    is_required: bool,
    out: &mut Vec<RuleSpec>,
) {
    if has_composition(property, &path) {
        out.push(RuleSpec {
            path,
            tokens: vec![presence_token(is_required).to_string()],
            pattern: None,
        });
        return;
    }

    out.push(rule_spec(property, path.clone(), is_required));

    match property.get("type").and_then(Value::as_str) {
        Some("array") => {
            let Some(items) = property.get("items").and_then(Value::as_object) else {
                return;
            };
            if has_composition(items, &path) {
                return;
            }
            let item_path = format!("{}[]", path);
            if is_object_schema(items) {
                walk_properties(items, &item_path, out);
            } else {
                out.push(rule_spec(items, item_path, is_required));
            }
        }
        _ if is_object_schema(property) => walk_properties(property, &path, out),
        _ => {}
    }
}

fn is_object_schema(schema: &Map<String, Value>) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("object")
        || schema.contains_key("properties")
}

fn presence_token(is_required: bool) -> &'static str {
    if is_required { "required" } else { "omitempty" }
}

/// Tokens in generation order: presence, type, format, lower bound, upper bound.
fn rule_spec(schema: &Map<String, Value>, path: String, is_required: bool) -> RuleSpec {
    let mut tokens = vec![presence_token(is_required).to_string()];

    if let Some(token) = schema.get("type").and_then(Value::as_str).and_then(type_token) {
        tokens.push(token.to_string());
    }
    if let Some(token) = schema
        .get("format")
        .and_then(Value::as_str)
        .and_then(format_token)
    {
        tokens.push(token.to_string());
    }
    if let Some(min) = first_number(schema, &["minimum", "minLength", "minItems"]) {
        tokens.push(format!("min={}", bound(min)));
    }
    if let Some(max) = first_number(schema, &["maximum", "maxLength", "maxItems"]) {
        tokens.push(format!("max={}", bound(max)));
    }

    RuleSpec {
        path,
        tokens,
        pattern: schema
            .get("pattern")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

fn first_number(schema: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| schema.get(*k).and_then(Value::as_f64))
}

/// Integral bounds are written without a fraction; others exactly.
fn bound(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}
