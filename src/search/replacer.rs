//! Substitution of matched occurrences.
//!
//! Matches are always located against the original tree first and applied
//! afterwards, so replacement output is never searched again within the
//! same call.

use crate::matcher::{AsMatcher, Matcher, PatternError, Term};
use crate::search::engine;
use crate::search::result::MatchResult;
use crate::sexp::{NodePath, Sexp, Value};
use tracing::debug;

/// Replace every outermost occurrence of `pattern` with the value produced
/// by `transform`.
///
/// A match lying inside an earlier match is not handed to `transform`:
/// the enclosing occurrence is replaced as a whole. If the root itself
/// matches, the transform's value becomes the returned root.
pub fn replace<P, F>(root: Sexp, pattern: &P, transform: F) -> Result<Value, PatternError>
where
    P: AsMatcher + ?Sized,
    F: FnMut(&MatchResult<'_>) -> Value,
{
    let matcher = pattern.as_matcher()?;
    Ok(replace_matches(root, matcher, None, transform))
}

/// Replace the first occurrence of `from` with `to`.
///
/// A plain value for `from` matches nodes equal to it.
pub fn sub(root: Sexp, from: impl Into<Term>, to: &Value) -> Value {
    let matcher = from.into().into_matcher();
    replace_matches(root, &matcher, Some(1), |_| to.clone())
}

/// Replace every outermost occurrence of `from` with `to`.
pub fn gsub(root: Sexp, from: impl Into<Term>, to: &Value) -> Value {
    let matcher = from.into().into_matcher();
    replace_matches(root, &matcher, None, |_| to.clone())
}

/// Replace every atom slot equal to `from` with `to`, at any depth, in
/// place. Returns the number of slots replaced.
pub fn find_and_replace_all(root: &mut Sexp, from: &Value, to: &Value) -> usize {
    let mut replaced = 0;
    for index in 0..root.len() {
        let Some(slot) = root.get_mut(index) else {
            continue;
        };
        if let Value::List(child) = slot {
            replaced += find_and_replace_all(child, from, to);
        } else if *slot == *from {
            *slot = to.clone();
            replaced += 1;
        }
    }
    replaced
}

pub(crate) fn replace_matches<F>(
    mut root: Sexp,
    matcher: &Matcher,
    limit: Option<usize>,
    mut transform: F,
) -> Value
where
    F: FnMut(&MatchResult<'_>) -> Value,
{
    let mut selected: Vec<(NodePath, Value)> = Vec::new();
    for result in engine::matches(&root, matcher) {
        if limit.is_some_and(|limit| selected.len() >= limit) {
            break;
        }
        // Pre-order: anything inside the last selected match follows it
        // directly.
        if let Some((last, _)) = selected.last() {
            if result.path.starts_with(last) {
                continue;
            }
        }
        let replacement = transform(&result);
        selected.push((result.path, replacement));
    }

    debug!(pattern = %matcher, replaced = selected.len(), "replace");

    let mut replacements = selected.into_iter();
    let Some((first_path, first_value)) = replacements.next() else {
        return Value::List(root);
    };
    if first_path.is_root() {
        return first_value;
    }
    root.replace_at(&first_path, first_value);
    for (path, value) in replacements {
        root.replace_at(&path, value);
    }
    Value::List(root)
}

impl Sexp {
    /// [`replace`] on this tree.
    pub fn replace_sexp<P, F>(self, pattern: &P, transform: F) -> Result<Value, PatternError>
    where
        P: AsMatcher + ?Sized,
        F: FnMut(&MatchResult<'_>) -> Value,
    {
        replace(self, pattern, transform)
    }
}
