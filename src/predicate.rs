//! Leaf predicates and the registry that resolves token names to them.

use crate::document::DocumentNode;
use crate::error::{RuleError, RuleErrorKind};
use crate::rules::RuleTable;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

// ─── Cached regexes ─────────────────────────────────────────────────────────

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
});

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*://[^\s/?#]+\S*$").unwrap());

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

static ISO8601_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(-?(?:[1-9][0-9]*)?[0-9]{4})-(1[0-2]|0[1-9])-(3[01]|0[1-9]|[12][0-9])(?:T|\s)(2[0-3]|[01][0-9]):([0-5][0-9]):([0-5][0-9])?(Z)?$",
    )
    .unwrap()
});

static NUMERIC_STR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]?[0-9]+(?:\.[0-9]+)?$").unwrap());

static ALPHA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z]+$").unwrap());

static ALPHANUM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

/// Tokens the engine interprets itself rather than dispatching to a predicate.
pub const DIRECTIVES: &[&str] = &["omitempty"];

// ─── Predicate ──────────────────────────────────────────────────────────────

/// A named boolean check over one resolved value.
///
/// Closures of type `Fn(&DocumentNode, Option<&str>) -> bool` implement this
/// trait, so simple checks can be registered inline.
pub trait Predicate: Send + Sync {
    /// Returns `true` when `value` satisfies the check.
    fn check(&self, value: &DocumentNode, param: Option<&str>) -> bool;

    /// Description of the accepted values, reported alongside a failure.
    fn accepted(&self, param: Option<&str>) -> String {
        param.unwrap_or_default().to_string()
    }

    /// Rejects parameters the check cannot interpret.
    fn check_param(&self, _param: Option<&str>) -> Result<(), String> {
        Ok(())
    }
}

impl<F> Predicate for F
where
    F: Fn(&DocumentNode, Option<&str>) -> bool + Send + Sync,
{
    fn check(&self, value: &DocumentNode, param: Option<&str>) -> bool {
        self(value, param)
    }
}

/// `min`, `max`, and `len` compare against the value's size: characters for
/// strings, the value itself for numbers, element count for containers.
struct SizeBound {
    cmp: fn(f64, f64) -> bool,
}

impl Predicate for SizeBound {
    fn check(&self, value: &DocumentNode, param: Option<&str>) -> bool {
        match (size_of(value), param.and_then(|p| p.trim().parse::<f64>().ok())) {
            (Some(size), Some(bound)) => (self.cmp)(size, bound),
            _ => false,
        }
    }

    fn check_param(&self, param: Option<&str>) -> Result<(), String> {
        match param {
            Some(p) if p.trim().parse::<f64>().is_ok() => Ok(()),
            Some(p) => Err(format!("numeric parameter expected, found '{}'", p)),
            None => Err("numeric parameter expected".to_string()),
        }
    }
}

/// `oneof=a b c`: the value's text form is one of the space-separated options.
struct OneOf;

impl Predicate for OneOf {
    fn check(&self, value: &DocumentNode, param: Option<&str>) -> bool {
        let Some(text) = scalar_text(value) else {
            return false;
        };
        param
            .unwrap_or_default()
            .split_whitespace()
            .any(|option| option == text)
    }

    fn check_param(&self, param: Option<&str>) -> Result<(), String> {
        match param {
            Some(p) if !p.trim().is_empty() => Ok(()),
            _ => Err("at least one option expected".to_string()),
        }
    }
}

fn size_of(value: &DocumentNode) -> Option<f64> {
    match value {
        DocumentNode::Scalar(Value::String(s)) => Some(s.chars().count() as f64),
        DocumentNode::Scalar(Value::Number(n)) => n.as_f64(),
        DocumentNode::Scalar(_) => None,
        DocumentNode::Object(fields) => Some(fields.len() as f64),
        DocumentNode::Array(items) => Some(items.len() as f64),
    }
}

fn scalar_text(value: &DocumentNode) -> Option<String> {
    match value {
        DocumentNode::Scalar(Value::String(s)) => Some(s.clone()),
        DocumentNode::Scalar(Value::Number(n)) => Some(n.to_string()),
        DocumentNode::Scalar(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    }
}

fn matches(re: &Regex, value: &DocumentNode) -> bool {
    value.as_str().is_some_and(|s| re.is_match(s))
}

fn equals(value: &DocumentNode, param: Option<&str>) -> bool {
    let param = param.unwrap_or_default();
    match value {
        DocumentNode::Scalar(Value::Number(n)) => match (n.as_f64(), param.parse::<f64>()) {
            (Some(a), Ok(b)) => a == b,
            _ => false,
        },
        other => scalar_text(other).is_some_and(|text| text == param),
    }
}

// ─── Default predicates ─────────────────────────────────────────────────────

fn required(value: &DocumentNode, _: Option<&str>) -> bool {
    match value {
        DocumentNode::Scalar(Value::Null) => false,
        DocumentNode::Scalar(Value::String(s)) => !s.is_empty(),
        DocumentNode::Array(items) => !items.is_empty(),
        _ => true,
    }
}

fn string(value: &DocumentNode, _: Option<&str>) -> bool {
    value.as_str().is_some()
}

fn integer(value: &DocumentNode, _: Option<&str>) -> bool {
    match value {
        DocumentNode::Scalar(Value::Number(n)) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        _ => false,
    }
}

fn numeric(value: &DocumentNode, _: Option<&str>) -> bool {
    match value {
        DocumentNode::Scalar(Value::Number(_)) => true,
        DocumentNode::Scalar(Value::String(s)) => NUMERIC_STR_RE.is_match(s),
        _ => false,
    }
}

fn boolean(value: &DocumentNode, _: Option<&str>) -> bool {
    value.as_bool().is_some()
}

fn object(value: &DocumentNode, _: Option<&str>) -> bool {
    value.is_object()
}

fn array(value: &DocumentNode, _: Option<&str>) -> bool {
    value.is_array()
}

fn not_blank(value: &DocumentNode, _: Option<&str>) -> bool {
    match value {
        DocumentNode::Scalar(Value::Null) => false,
        DocumentNode::Scalar(Value::String(s)) => !s.trim().is_empty(),
        DocumentNode::Scalar(_) => true,
        DocumentNode::Object(fields) => !fields.is_empty(),
        DocumentNode::Array(items) => !items.is_empty(),
    }
}

fn ip_v4(value: &DocumentNode, _: Option<&str>) -> bool {
    value.as_str().is_some_and(|s| s.parse::<Ipv4Addr>().is_ok())
}

fn ip_v6(value: &DocumentNode, _: Option<&str>) -> bool {
    value.as_str().is_some_and(|s| s.parse::<Ipv6Addr>().is_ok())
}

// ─── Registry ───────────────────────────────────────────────────────────────

/// Resolves token names to predicates.
///
/// [`PredicateRegistry::default`] knows the vocabulary emitted by
/// [`crate::generate`]; [`PredicateRegistry::register`] adds or replaces
/// entries.
pub struct PredicateRegistry {
    predicates: HashMap<String, Box<dyn Predicate>>,
}

impl PredicateRegistry {
    /// A registry with no predicates at all.
    pub fn empty() -> Self {
        PredicateRegistry {
            predicates: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: &str, predicate: impl Predicate + 'static) {
        self.predicates.insert(name.to_string(), Box::new(predicate));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Predicate> {
        self.predicates.get(name).map(|p| p.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        DIRECTIVES.contains(&name) || self.predicates.contains_key(name)
    }

    /// Check every token of every rule against this registry.
    pub fn verify(&self, rules: &RuleTable) -> Result<(), RuleError> {
        for rule in rules.iter() {
            for token in &rule.tokens {
                if DIRECTIVES.contains(&token.name.as_str()) {
                    continue;
                }
                let predicate = self.get(&token.name).ok_or_else(|| {
                    RuleError::new(
                        RuleErrorKind::UnknownPredicate,
                        rule.literal(),
                        format!("unknown predicate '{}'", token.name),
                    )
                })?;
                predicate
                    .check_param(token.param.as_deref())
                    .map_err(|message| {
                        RuleError::new(
                            RuleErrorKind::InvalidToken,
                            rule.literal(),
                            format!("{}: {}", token, message),
                        )
                    })?;
            }
        }
        Ok(())
    }
}

impl Default for PredicateRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("required", required);
        registry.register("string", string);
        registry.register("integer", integer);
        registry.register("numeric", numeric);
        registry.register("boolean", boolean);
        registry.register("object", object);
        registry.register("array", array);
        registry.register("notblank", not_blank);
        registry.register("min", SizeBound { cmp: |size, bound| size >= bound });
        registry.register("max", SizeBound { cmp: |size, bound| size <= bound });
        registry.register("len", SizeBound { cmp: |size, bound| size == bound });
        registry.register("eq", equals);
        registry.register("ne", |value: &DocumentNode, param: Option<&str>| {
            !equals(value, param)
        });
        registry.register("oneof", OneOf);
        registry.register("uuid", |v: &DocumentNode, _: Option<&str>| matches(&UUID_RE, v));
        registry.register("url", |v: &DocumentNode, _: Option<&str>| matches(&URL_RE, v));
        registry.register("email", |v: &DocumentNode, _: Option<&str>| matches(&EMAIL_RE, v));
        registry.register("ISO8601", |v: &DocumentNode, _: Option<&str>| {
            matches(&ISO8601_RE, v)
        });
        registry.register("alpha", |v: &DocumentNode, _: Option<&str>| matches(&ALPHA_RE, v));
        registry.register("alphanum", |v: &DocumentNode, _: Option<&str>| {
            matches(&ALPHANUM_RE, v)
        });
        registry.register("ip_v4", ip_v4);
        registry.register("ip_v6", ip_v6);
        registry
    }
}

impl std::fmt::Debug for PredicateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.predicates.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("PredicateRegistry")
            .field("predicates", &names)
            .finish()
    }
}
