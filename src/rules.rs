//! Declared rules and the table they are collected in.

use crate::error::{RuleError, RuleErrorKind};
use crate::path::{FieldPath, normalize_path};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// One predicate invocation, e.g. `min=2` → name `min`, param `2`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub name: String,
    pub param: Option<String>,
}

impl Token {
    pub fn parse(raw: &str) -> Option<Token> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.split_once('=') {
            Some((name, param)) => Some(Token {
                name: name.trim().to_string(),
                param: Some(param.to_string()),
            }),
            None => Some(Token {
                name: raw.to_string(),
                param: None,
            }),
        }
    }

    /// Size bounds, which do not apply to boolean values.
    pub fn is_size_bound(&self) -> bool {
        self.name == "min" || self.name == "max"
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.param {
            Some(p) => write!(f, "{}={}", self.name, p),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Split a comma-separated token list such as `required,string,min=2`.
pub fn parse_tokens(path: &str, tokens: &str) -> Result<Vec<Token>, RuleError> {
    let mut out = Vec::new();
    for raw in tokens.split(',') {
        match Token::parse(raw) {
            Some(token) if !token.name.is_empty() => out.push(token),
            _ => {
                return Err(RuleError::new(
                    RuleErrorKind::InvalidToken,
                    path,
                    format!("malformed token list '{}'", tokens),
                ));
            }
        }
    }
    Ok(out)
}

/// A path mapped to ordered predicate tokens and an optional pattern.
#[derive(Clone, Debug)]
pub struct Rule {
    pub path: FieldPath,
    literal: String,
    pub tokens: Vec<Token>,
    pub pattern: Option<Regex>,
}

impl Rule {
    pub fn new(path: &str, tokens: &str, pattern: Option<&str>) -> Result<Self, RuleError> {
        let field_path = FieldPath::parse(path)?;
        let tokens = parse_tokens(path, tokens)?;
        let pattern = match pattern.filter(|p| !p.is_empty()) {
            Some(p) => Some(Regex::new(p).map_err(|e| {
                RuleError::new(
                    RuleErrorKind::InvalidPattern,
                    path,
                    format!("invalid pattern '{}': {}", p, e),
                )
            })?),
            None => None,
        };
        Ok(Rule {
            path: field_path,
            literal: path.to_string(),
            tokens,
            pattern,
        })
    }

    /// The path exactly as declared.
    pub fn literal(&self) -> &str {
        &self.literal
    }

    pub fn is_required(&self) -> bool {
        self.tokens.iter().any(|t| t.name == "required")
    }

    /// Tokens joined back into their declared form.
    pub fn token_string(&self) -> String {
        self.tokens
            .iter()
            .map(Token::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn pattern_str(&self) -> Option<&str> {
        self.pattern.as_ref().map(Regex::as_str)
    }
}

/// All rules of one validation run, in declaration order.
///
/// Re-adding a literal path replaces the earlier rule in place.
#[derive(Clone, Debug, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
    index: HashMap<String, usize>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a rule. The last declaration of a literal path wins.
    pub fn add_rule(
        &mut self,
        path: &str,
        tokens: &str,
        pattern: Option<&str>,
    ) -> Result<(), RuleError> {
        let rule = Rule::new(path, tokens, pattern)?;
        self.insert(rule);
        Ok(())
    }

    pub fn insert(&mut self, rule: Rule) {
        match self.index.get(rule.literal()) {
            Some(&i) => self.rules[i] = rule,
            None => {
                self.index.insert(rule.literal.clone(), self.rules.len());
                self.rules.push(rule);
            }
        }
    }

    /// Whether a rule governs `path`, either literally or once its concrete
    /// indices are collapsed.
    pub fn has(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Rule governing `path`: exact literal match first, then the
    /// wildcard-normalized form (`media[2].url` → `media[].url`).
    pub fn get(&self, path: &str) -> Option<&Rule> {
        if let Some(&i) = self.index.get(path) {
            return Some(&self.rules[i]);
        }
        let normalized = normalize_path(path);
        self.index.get(&normalized).map(|&i| &self.rules[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Load a rule file.
    ///
    /// The file is a YAML mapping from path to either a token string or a
    /// `{rules, pattern}` mapping. Entries are added in file order.
    pub fn from_yaml(input: &str) -> Result<Self, RuleError> {
        if input.trim().is_empty() {
            return Ok(Self::new());
        }

        let value: Value = serde_saphyr::from_str(input).map_err(|e| RuleError {
            kind: RuleErrorKind::Syntax,
            message: e.to_string(),
            path: None,
        })?;

        let entries = match value {
            Value::Object(map) => map,
            Value::Null => return Ok(Self::new()),
            _ => {
                return Err(RuleError {
                    kind: RuleErrorKind::Syntax,
                    message: "rule file root must be a mapping".to_string(),
                    path: None,
                });
            }
        };

        let mut table = Self::new();
        for (path, entry) in entries {
            match entry {
                Value::String(tokens) => table.add_rule(&path, &tokens, None)?,
                Value::Object(map) => {
                    let tokens = map.get("rules").and_then(Value::as_str).ok_or_else(|| {
                        RuleError::new(RuleErrorKind::Syntax, &path, "missing 'rules' string")
                    })?;
                    let pattern = map.get("pattern").and_then(Value::as_str);
                    table.add_rule(&path, tokens, pattern)?;
                }
                _ => {
                    return Err(RuleError::new(
                        RuleErrorKind::Syntax,
                        &path,
                        "expected a token string or a {rules, pattern} mapping",
                    ));
                }
            }
        }
        Ok(table)
    }
}
