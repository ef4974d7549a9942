//! Rule-driven validation of loosely shaped JSON request payloads.
//!
//! A [`RuleTable`] maps paths such as `variants[].content[].language` to
//! predicate tokens (`required,string,min=2`) and an optional pattern. The
//! payload may omit, null out, or reshape any part of what the rules
//! describe; resolution expands wildcards over the items actually present
//! and only enforces missing branches that a `required` rule asks for.
//!
//! ```text
//! from_json(payload) → Document ┐
//!                               ├→ Validator → resolve → evaluate → ValidationErrors
//! add_rule(path, tokens) → RuleTable ┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use payload_rules::{Document, RuleTable, Validator};
//!
//! let mut rules = RuleTable::new();
//! rules.add_rule("categoryId", "required,string,max=5", None).unwrap();
//! rules.add_rule("tags[].id", "required,string", None).unwrap();
//!
//! let doc = Document::from_json(r#"{"categoryId": "123456", "tags": [{"id": 7}]}"#).unwrap();
//! let errors = Validator::new(&doc, &rules).unwrap().validate().unwrap_err();
//!
//! assert_eq!(errors.get("categoryId").unwrap()[0].rule, "max");
//! assert_eq!(errors.get("tags[0].id").unwrap()[0].rule, "string");
//! ```
//!
//! # Logging
//!
//! Debug events are emitted through [`tracing`] only for validators built
//! with [`Validator::debug`]. Targets are `payload_rules::resolve`,
//! `payload_rules::validate`, and `payload_rules::generate`.

pub mod document;
pub mod error;
pub mod generate;
pub mod path;
pub mod predicate;
pub mod resolve;
pub mod rules;
pub mod serialize;
pub mod validate;

pub use document::{Document, DocumentNode};
pub use error::*;
pub use predicate::{Predicate, PredicateRegistry};
pub use rules::{Rule, RuleTable};
pub use validate::Validator;

// Re-export entry-point functions at the crate root for convenience.
pub use generate::generate;
pub use resolve::resolve;
pub use validate::validate;

/// Convenience entry point composing decode → validate.
///
/// # Errors
///
/// Returns [`CheckError::Decode`] if `input` is not valid JSON,
/// [`CheckError::Rule`] if a rule is not executable with the default
/// predicates, and [`CheckError::Validation`] with every failing field
/// otherwise.
///
/// # Example
///
/// ```rust
/// let mut rules = payload_rules::RuleTable::new();
/// rules.add_rule("product", "required", None).unwrap();
/// rules.add_rule("product.categories[].id", "required,string", None).unwrap();
///
/// match payload_rules::check("{}", &rules) {
///     Err(payload_rules::CheckError::Validation(errors)) => {
///         assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["product"]);
///     }
///     other => panic!("unexpected result: {:?}", other),
/// }
/// ```
pub fn check(input: &str, rules: &RuleTable) -> Result<(), CheckError> {
    let document = Document::from_json(input)?;
    validate::validate(&document, rules)
}
