//! Payload validation: resolution followed by predicate evaluation.
//!
//! Returns **all** failing fields, but only the first failing predicate of
//! each field. Validation never modifies the document or the rule table, so
//! repeated calls return identical results.

use crate::document::{Document, DocumentNode};
use crate::error::*;
use crate::predicate::PredicateRegistry;
use crate::resolve::{ResolvedField, Resolver};
use crate::rules::RuleTable;
use std::sync::LazyLock;

/// Predicate name reported for pattern mismatches.
pub const PATTERN_RULE: &str = "regexp";

static DEFAULT_REGISTRY: LazyLock<PredicateRegistry> = LazyLock::new(PredicateRegistry::default);

/// Validates one document against one rule table.
#[derive(Debug)]
pub struct Validator<'a> {
    document: &'a Document,
    rules: &'a RuleTable,
    registry: &'a PredicateRegistry,
    debug: bool,
}

impl<'a> Validator<'a> {
    /// Build a validator using the default predicate registry.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleError`] if a rule uses a token the registry does not
    /// know, or a parameter its predicate cannot interpret.
    pub fn new(document: &'a Document, rules: &'a RuleTable) -> Result<Self, RuleError> {
        Self::with_registry(document, rules, &DEFAULT_REGISTRY)
    }

    pub fn with_registry(
        document: &'a Document,
        rules: &'a RuleTable,
        registry: &'a PredicateRegistry,
    ) -> Result<Self, RuleError> {
        registry.verify(rules)?;
        Ok(Validator {
            document,
            rules,
            registry,
            debug: false,
        })
    }

    /// Emit `tracing` debug events for this validator's resolution and
    /// failures. Off by default.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Concrete references every rule resolves to, in evaluation order.
    pub fn resolve(&self) -> Vec<ResolvedField<'a>> {
        Resolver::new(self.rules)
            .debug(self.debug)
            .resolve(self.document)
    }

    /// Run every rule against the document.
    ///
    /// # Errors
    ///
    /// Returns every failing field. A concrete path reached by several rules
    /// keeps the first failure in rule order.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        for field in self.resolve() {
            if errors.contains(&field.path) {
                continue;
            }
            if let Some(error) = self.evaluate(&field) {
                if self.debug {
                    tracing::debug!(
                        target: "payload_rules::validate",
                        field = %error.field,
                        rule = %error.rule,
                        placeholder = field.placeholder,
                        "field failed"
                    );
                }
                errors.push(error);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// First failing predicate of one reference, if any.
    pub fn evaluate(&self, field: &ResolvedField<'_>) -> Option<FieldError> {
        let value = field.value;
        let is_bool = value.as_bool().is_some();

        for token in &field.rule.tokens {
            if is_bool && token.is_size_bound() {
                continue;
            }
            if token.name == "omitempty" {
                if value.is_empty() {
                    return None;
                }
                continue;
            }
            // Unknown names were rejected when the validator was built.
            let Some(predicate) = self.registry.get(&token.name) else {
                continue;
            };
            let param = token.param.as_deref();
            if !predicate.check(value, param) {
                return Some(FieldError {
                    field: field.path.clone(),
                    rule: token.name.clone(),
                    value: offending_value(value),
                    accepted: predicate.accepted(param),
                });
            }
        }

        if let (Some(pattern), Some(text)) = (&field.rule.pattern, value.as_str())
            && !text.is_empty()
            && !pattern.is_match(text)
        {
            return Some(FieldError {
                field: field.path.clone(),
                rule: PATTERN_RULE.to_string(),
                value: offending_value(value),
                accepted: pattern.as_str().to_string(),
            });
        }

        None
    }
}

fn offending_value(value: &DocumentNode) -> Option<serde_json::Value> {
    if value.is_null() {
        None
    } else {
        Some(value.to_value())
    }
}

/// Validate `document` against `rules` with the default predicate registry.
pub fn validate(document: &Document, rules: &RuleTable) -> Result<(), CheckError> {
    Validator::new(document, rules)?.validate()?;
    Ok(())
}
