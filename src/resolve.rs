//! Rule path resolution against a payload.
//!
//! Every rule path is walked against the document tree. Wildcard segments
//! fan out into one concrete reference per array item (`media[].url` becomes
//! `media[0].url`, `media[1].url`, ...); an array met under a plain segment
//! fans out the same way. When the walk cannot continue because an
//! intermediate value is missing or has the wrong shape, the rest of the
//! path is dropped silently unless a `required` rule governs the blocking
//! prefix, in which case a single absent placeholder is emitted at that
//! prefix.

use crate::document::{ABSENT, Document, DocumentNode};
use crate::path::{PathSegment, child_path, index_path, placeholder_path};
use crate::rules::{Rule, RuleTable};

/// One concrete reference produced by resolution.
#[derive(Clone, Debug)]
pub struct ResolvedField<'a> {
    /// Concrete path with wildcards replaced by observed indices.
    pub path: String,
    /// Value found at `path`; the shared null node when absent and for
    /// every placeholder.
    pub value: &'a DocumentNode,
    /// The rule whose tokens apply to this reference.
    pub rule: &'a Rule,
    /// Emitted on behalf of a `required` rule for a branch that could not be
    /// walked, rather than found by enumeration.
    pub placeholder: bool,
}

/// Walks rule paths against a document.
#[derive(Clone, Copy, Debug)]
pub struct Resolver<'a> {
    rules: &'a RuleTable,
    debug: bool,
}

impl<'a> Resolver<'a> {
    pub fn new(rules: &'a RuleTable) -> Self {
        Resolver {
            rules,
            debug: false,
        }
    }

    /// Emit `tracing` debug events for placeholders and skipped branches.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Resolve every rule of the table, in declaration order.
    pub fn resolve(&self, document: &'a Document) -> Vec<ResolvedField<'a>> {
        let mut out = Vec::new();
        for rule in self.rules.iter() {
            self.resolve_rule(document.root(), rule, &mut out);
        }
        out
    }

    /// Resolve a single rule against `root`, appending to `out`.
    pub fn resolve_rule(
        &self,
        root: &'a DocumentNode,
        rule: &'a Rule,
        out: &mut Vec<ResolvedField<'a>>,
    ) {
        if rule.path.is_empty() {
            return;
        }
        self.walk(rule, 0, root, "", out);
    }

    fn walk(
        &self,
        rule: &'a Rule,
        i: usize,
        node: &'a DocumentNode,
        prefix: &str,
        out: &mut Vec<ResolvedField<'a>>,
    ) {
        let segments = rule.path.segments();
        let seg = &segments[i];
        let base = child_path(prefix, &seg.name);
        let child = if seg.name.is_empty() {
            node
        } else {
            node.get(&seg.name)
        };

        if i + 1 == segments.len() {
            self.emit_terminal(rule, seg, base, child, out);
            return;
        }

        // Arrays fan out whether or not the segment was declared with `[]`.
        let items = child.items();
        if !items.is_empty() {
            for (j, item) in items.iter().enumerate() {
                self.walk(rule, i + 1, item, &index_path(&base, j), out);
            }
            return;
        }
        if !seg.wildcard && child.is_object() {
            self.walk(rule, i + 1, child, &base, out);
            return;
        }

        self.emit_blocked(rule, i, base, out);
    }

    fn emit_terminal(
        &self,
        rule: &'a Rule,
        seg: &PathSegment,
        base: String,
        child: &'a DocumentNode,
        out: &mut Vec<ResolvedField<'a>>,
    ) {
        if !seg.wildcard {
            out.push(ResolvedField {
                path: base,
                value: child,
                rule,
                placeholder: false,
            });
            return;
        }

        let items = child.items();
        if items.is_empty() {
            if rule.is_required() {
                let path = placeholder_path(base);
                if self.debug {
                    tracing::debug!(
                        target: "payload_rules::resolve",
                        path = %path,
                        rule = %rule.literal(),
                        "no items under required wildcard; emitting placeholder"
                    );
                }
                out.push(ResolvedField {
                    path,
                    value: &ABSENT,
                    rule,
                    placeholder: true,
                });
            }
            return;
        }

        for (j, item) in items.iter().enumerate() {
            out.push(ResolvedField {
                path: index_path(&base, j),
                value: item,
                rule,
                placeholder: false,
            });
        }
    }

    /// The walk stopped at segment `i`: the value at `base` is missing,
    /// empty, or not a container the rest of the path can descend into.
    fn emit_blocked(
        &self,
        rule: &'a Rule,
        i: usize,
        base: String,
        out: &mut Vec<ResolvedField<'a>>,
    ) {
        let declared = rule.path.prefix(i + 1);
        let path = placeholder_path(base);

        match self.required_rule_at(&path, &declared) {
            Some(governing) => {
                if self.debug {
                    tracing::debug!(
                        target: "payload_rules::resolve",
                        path = %path,
                        rule = %rule.literal(),
                        governing = %governing.literal(),
                        "branch not walkable under required prefix; emitting placeholder"
                    );
                }
                out.push(ResolvedField {
                    path,
                    value: &ABSENT,
                    rule: governing,
                    placeholder: true,
                });
            }
            None => {
                if self.debug {
                    tracing::debug!(
                        target: "payload_rules::resolve",
                        path = %path,
                        rule = %rule.literal(),
                        "optional branch not present; skipping"
                    );
                }
            }
        }
    }

    /// A `required` rule covering this prefix, matched by its concrete path
    /// or by the declared form of the rule path up to the prefix.
    fn required_rule_at(&self, concrete: &str, declared: &str) -> Option<&'a Rule> {
        [concrete, declared]
            .into_iter()
            .filter_map(|p| self.rules.get(p))
            .find(|r| r.is_required())
    }
}

/// Resolve every rule of `rules` against `document`.
pub fn resolve<'a>(document: &'a Document, rules: &'a RuleTable) -> Vec<ResolvedField<'a>> {
    Resolver::new(rules).resolve(document)
}
