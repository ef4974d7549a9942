//! Rule tables → YAML rule files, validation errors → JSON.

use crate::error::{SerializeError, ValidationErrors};
use crate::rules::RuleTable;
use serde_json::{Map, Value};

/// Serialize a rule table to the YAML rule-file form read by
/// [`RuleTable::from_yaml`].
///
/// Rules without a pattern are written as a bare token string; rules with one
/// as a `{rules, pattern}` mapping. Declaration order is kept.
pub fn rules_to_yaml(table: &RuleTable) -> Result<String, SerializeError> {
    let mut entries = Map::new();
    for rule in table.iter() {
        let entry = match rule.pattern_str() {
            Some(pattern) => {
                let mut map = Map::new();
                map.insert("rules".to_string(), Value::String(rule.token_string()));
                map.insert("pattern".to_string(), Value::String(pattern.to_string()));
                Value::Object(map)
            }
            None => Value::String(rule.token_string()),
        };
        entries.insert(rule.literal().to_string(), entry);
    }

    serde_saphyr::to_string(&Value::Object(entries)).map_err(|e| SerializeError {
        message: format!("failed to serialize rules to YAML: {}", e),
    })
}

/// Serialize validation errors to a JSON object keyed by field path, each
/// entry shaped `{field, rule, value, accepted}`.
pub fn errors_to_json(errors: &ValidationErrors) -> Result<String, SerializeError> {
    serde_json::to_string(errors).map_err(|e| SerializeError {
        message: format!("failed to serialize validation errors: {}", e),
    })
}
