use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Produced when the raw payload is not syntactically valid JSON.
///
/// This is a precondition failure: no validation is attempted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(line), Some(col)) = (self.line, self.column) {
            write!(f, "invalid json at {}:{}: {}", line, col, self.message)
        } else {
            write!(f, "invalid json: {}", self.message)
        }
    }
}

impl std::error::Error for DecodeError {}

/// Error kind for rule definition failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleErrorKind {
    InvalidPath,
    InvalidToken,
    InvalidPattern,
    UnknownPredicate,
    Syntax,
}

/// Produced when a rule cannot be added to a table or is not executable
/// against a predicate registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleError {
    pub kind: RuleErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl RuleError {
    pub(crate) fn new(kind: RuleErrorKind, path: &str, message: impl Into<String>) -> Self {
        RuleError {
            kind,
            message: message.into(),
            path: Some(path.to_string()),
        }
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "rule '{}': {}", path, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for RuleError {}

/// Error kind for rule generation failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerateErrorKind {
    Syntax,
    TypeMismatch,
}

/// Produced by [`crate::generate::generate`] when an API document cannot be read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateError {
    pub kind: GenerateErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for GenerateError {}

/// Serialization error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerializeError {
    pub message: String,
}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SerializeError {}

/// A single failed predicate at a concrete field path.
///
/// `value` is `None` when the field was absent or null.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub rule: String,
    pub value: Option<Value>,
    pub accepted: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field '{}' failed in '{}' rule", self.field, self.rule)?;
        if !self.accepted.is_empty() {
            write!(f, ", available values: {}", self.accepted)?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldError {}

/// All field failures of one validation pass, keyed by concrete path.
///
/// A path is only present when at least one predicate failed for it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<FieldError>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[FieldError]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Failing field paths in sorted order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FieldError])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub(crate) fn push(&mut self, error: FieldError) {
        self.0.entry(error.field.clone()).or_default().push(error);
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in self.0.values().flatten() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}", error)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Combined error type for the [`crate::check`] entry point.
#[derive(Clone, Debug)]
pub enum CheckError {
    Decode(DecodeError),
    Rule(RuleError),
    Validation(ValidationErrors),
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::Decode(e) => write!(f, "Decode error: {}", e),
            CheckError::Rule(e) => write!(f, "Rule error: {}", e),
            CheckError::Validation(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl std::error::Error for CheckError {}

impl From<DecodeError> for CheckError {
    fn from(e: DecodeError) -> Self {
        CheckError::Decode(e)
    }
}

impl From<RuleError> for CheckError {
    fn from(e: RuleError) -> Self {
        CheckError::Rule(e)
    }
}

impl From<ValidationErrors> for CheckError {
    fn from(e: ValidationErrors) -> Self {
        CheckError::Validation(e)
    }
}
