//! Rule applicator - applies rewrite rules to a tree in order
//!
//! Each rule is looked up against the tree as left by the previous rule.
//! Constraints make rules idempotent: a rule whose goal already holds is
//! skipped instead of applied again.

use crate::cache::get_or_parse_pattern;
use crate::config::schema::{Action, RuleConfig, RuleDefinition};
use crate::matcher::{Matcher, PatternError};
use crate::search::replacer::replace_matches;
use crate::search::{engine, find_and_replace_all};
use crate::sexp::{read_value, ReadError, Value};
use std::fmt;
use tracing::{debug, trace};

/// Result of applying a single rule
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "RuleResult should be checked for success/failure"]
pub enum RuleResult {
    /// The rule rewrote `count` occurrences
    Applied { id: String, count: usize },
    /// Nothing matched, or an `expect` rule held
    Unchanged { id: String },
    /// A constraint said the rule's goal already holds
    Skipped { id: String, reason: String },
    Failed { id: String, reason: String },
}

impl RuleResult {
    pub fn id(&self) -> &str {
        match self {
            RuleResult::Applied { id, .. }
            | RuleResult::Unchanged { id }
            | RuleResult::Skipped { id, .. }
            | RuleResult::Failed { id, .. } => id,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RuleResult::Failed { .. })
    }
}

impl fmt::Display for RuleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleResult::Applied { id, count } => {
                write!(f, "Applied {id} ({count} replaced)")
            }
            RuleResult::Unchanged { id } => write!(f, "Unchanged {id}"),
            RuleResult::Skipped { id, reason } => write!(f, "Skipped {id}: {reason}"),
            RuleResult::Failed { id, reason } => write!(f, "Failed {id}: {reason}"),
        }
    }
}

/// Errors during rule application
#[derive(Debug)]
pub enum ApplicationError {
    /// Rule pattern could not be parsed
    Pattern { id: String, source: PatternError },
    /// Rule pattern text was empty
    EmptyPattern { id: String },
    /// A data-text field of the action could not be read
    Value { id: String, source: ReadError },
    /// `expect` rule saw a different number of matches
    CountMismatch {
        id: String,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationError::Pattern { id, source } => {
                write!(f, "rule '{id}' pattern error: {source}")
            }
            ApplicationError::EmptyPattern { id } => write!(f, "rule '{id}' has an empty pattern"),
            ApplicationError::Value { id, source } => {
                write!(f, "rule '{id}' value error: {source}")
            }
            ApplicationError::CountMismatch {
                id,
                expected,
                found,
            } => write!(
                f,
                "rule '{id}' expected {expected} matches, found {found}"
            ),
        }
    }
}

impl std::error::Error for ApplicationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApplicationError::Pattern { source, .. } => Some(source),
            ApplicationError::Value { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Apply every rule of `config` to `root`, in order.
///
/// A failing rule leaves the tree as it was and does not stop later rules.
pub fn apply_rules(config: &RuleConfig, root: Value) -> (Value, Vec<RuleResult>) {
    let mut current = root;
    let mut results = Vec::with_capacity(config.rules.len());

    for rule in &config.rules {
        let (next, outcome) = apply_rule(rule, current);
        current = next;
        let result = outcome.unwrap_or_else(|e| RuleResult::Failed {
            id: rule.id.clone(),
            reason: e.to_string(),
        });
        trace!(rule = %rule.id, result = %result, "rule finished");
        results.push(result);
    }

    debug!(
        rules = results.len(),
        failed = results.iter().filter(|r| r.is_failure()).count(),
        "applied rule file"
    );
    (current, results)
}

/// Apply one rule, returning the (possibly rewritten) tree.
///
/// On error the tree is handed back untouched.
pub fn apply_rule(
    rule: &RuleDefinition,
    root: Value,
) -> (Value, Result<RuleResult, ApplicationError>) {
    let id = rule.id.clone();

    if let Action::Rename { from, to } = &rule.action {
        return rename(&id, root, from, to);
    }

    let matcher = match rule_matcher(rule) {
        Ok(matcher) => matcher,
        Err(e) => return (root, Err(e)),
    };
    let found = count_matches(&root, &matcher);

    if let Some(constraint) = &rule.constraint {
        if constraint.ensure_absent && found == 0 {
            let reason = "pattern already absent".to_string();
            return (root, Ok(RuleResult::Skipped { id, reason }));
        }
        if constraint.ensure_present && found > 0 {
            let reason = "pattern already present".to_string();
            return (root, Ok(RuleResult::Skipped { id, reason }));
        }
    }

    match &rule.action {
        Action::Expect { count } if *count == found => (root, Ok(RuleResult::Unchanged { id })),
        Action::Expect { count } => (
            root,
            Err(ApplicationError::CountMismatch {
                id,
                expected: *count,
                found,
            }),
        ),
        Action::Replace { with } | Action::ReplaceFirst { with } => {
            let replacement = match read_value(with) {
                Ok(value) => value,
                Err(source) => return (root, Err(ApplicationError::Value { id, source })),
            };
            let sexp = match root {
                Value::List(sexp) => sexp,
                atom => return (atom, Ok(RuleResult::Unchanged { id })),
            };
            if found == 0 {
                return (Value::List(sexp), Ok(RuleResult::Unchanged { id }));
            }

            let limit = matches!(rule.action, Action::ReplaceFirst { .. }).then_some(1);
            let mut count = 0;
            let rewritten = replace_matches(sexp, &matcher, limit, |_| {
                count += 1;
                replacement.clone()
            });
            (rewritten, Ok(RuleResult::Applied { id, count }))
        }
        Action::Rename { .. } => (root, Ok(RuleResult::Unchanged { id })),
    }
}

fn rename(
    id: &str,
    root: Value,
    from: &str,
    to: &str,
) -> (Value, Result<RuleResult, ApplicationError>) {
    let id = id.to_string();
    let parsed = read_value(from).and_then(|from| Ok((from, read_value(to)?)));
    let (from, to) = match parsed {
        Ok(pair) => pair,
        Err(source) => return (root, Err(ApplicationError::Value { id, source })),
    };

    match root {
        Value::List(mut sexp) => {
            let count = find_and_replace_all(&mut sexp, &from, &to);
            let result = if count == 0 {
                RuleResult::Unchanged { id }
            } else {
                RuleResult::Applied { id, count }
            };
            (Value::List(sexp), Ok(result))
        }
        atom if atom == from => (to, Ok(RuleResult::Applied { id, count: 1 })),
        atom => (atom, Ok(RuleResult::Unchanged { id })),
    }
}

fn rule_matcher(rule: &RuleDefinition) -> Result<Matcher, ApplicationError> {
    let text = rule.pattern.as_deref().unwrap_or_default();
    match get_or_parse_pattern(text) {
        Ok(Some(matcher)) => Ok(matcher),
        Ok(None) => Err(ApplicationError::EmptyPattern {
            id: rule.id.clone(),
        }),
        Err(source) => Err(ApplicationError::Pattern {
            id: rule.id.clone(),
            source,
        }),
    }
}

fn count_matches(root: &Value, matcher: &Matcher) -> usize {
    root.as_sexp()
        .map_or(0, |sexp| engine::matches(sexp, matcher).count())
}
