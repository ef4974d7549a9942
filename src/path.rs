//! Rule path syntax: dotted names with `[]` wildcard suffixes.
//!
//! `variants[].content[].language` parses into three segments, the first two
//! of which are wildcards. `matrix[][]` parses into `matrix` (wildcard)
//! followed by an unnamed wildcard segment, and `[]` on its own addresses the
//! items of a root array.

use crate::error::{RuleError, RuleErrorKind};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static INDEX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\d+\]").unwrap());

/// One component of a [`FieldPath`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathSegment {
    pub name: String,
    /// Declared with trailing `[]`: applies to every item of the array here.
    pub wildcard: bool,
}

/// A parsed rule path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Parse a declared rule path.
    ///
    /// Only empty brackets are accepted; concrete indices belong to resolved
    /// paths, not to declarations.
    pub fn parse(path: &str) -> Result<Self, RuleError> {
        if path.is_empty() {
            return Err(RuleError::new(RuleErrorKind::InvalidPath, path, "empty path"));
        }

        let mut segments = Vec::new();
        for (i, part) in path.split('.').enumerate() {
            let (name, mut brackets) = match part.find('[') {
                Some(pos) => (&part[..pos], &part[pos..]),
                None => (part, ""),
            };
            if name.is_empty() && (i > 0 || brackets.is_empty()) {
                return Err(RuleError::new(
                    RuleErrorKind::InvalidPath,
                    path,
                    format!("empty segment at position {}", i),
                ));
            }
            if name.contains(']') {
                return Err(RuleError::new(
                    RuleErrorKind::InvalidPath,
                    path,
                    format!("unbalanced ']' in segment '{}'", part),
                ));
            }

            let mut wildcard = false;
            let mut current = name.to_string();
            while !brackets.is_empty() {
                match brackets.strip_prefix("[]") {
                    Some(rest) => {
                        if wildcard {
                            segments.push(PathSegment {
                                name: std::mem::take(&mut current),
                                wildcard: true,
                            });
                        }
                        wildcard = true;
                        brackets = rest;
                    }
                    None => {
                        return Err(RuleError::new(
                            RuleErrorKind::InvalidPath,
                            path,
                            format!("only empty brackets are allowed, found '{}'", brackets),
                        ));
                    }
                }
            }
            segments.push(PathSegment {
                name: current,
                wildcard,
            });
        }

        Ok(FieldPath { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn has_wildcard(&self) -> bool {
        self.segments.iter().any(|s| s.wildcard)
    }

    /// Declared form of the first `len` segments: `variants[].delivery`
    /// for `prefix(2)` of `variants[].delivery.dispatchTime`.
    pub fn prefix(&self, len: usize) -> String {
        let mut out = String::new();
        for seg in self.segments.iter().take(len) {
            out = child_path(&out, &seg.name);
            if seg.wildcard {
                out.push_str("[]");
            }
        }
        out
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix(self.segments.len()))
    }
}

/// Collapse every concrete index to empty brackets:
/// `media[2].url` becomes `media[].url`.
pub fn normalize_path(path: &str) -> String {
    INDEX_RE.replace_all(path, "[]").into_owned()
}

/// Append a field name to a concrete path. Unnamed segments add nothing.
pub(crate) fn child_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        prefix.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// Concrete path of the document root when it is addressed by an unnamed
/// leading `[]` segment.
pub const ROOT_PATH: &str = "[]";

/// Path under which a placeholder is reported.
pub(crate) fn placeholder_path(base: String) -> String {
    if base.is_empty() {
        ROOT_PATH.to_string()
    } else {
        base
    }
}

/// Append a concrete array index to a path.
pub(crate) fn index_path(base: &str, index: usize) -> String {
    format!("{}[{}]", base, index)
}
