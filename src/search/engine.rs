//! Pre-order search of a tree with a matcher.

use crate::matcher::{AsMatcher, Matcher, PatternError};
use crate::search::result::{MatchCollection, MatchResult};
use crate::sexp::walk::Cursor;
use crate::sexp::Sexp;
use std::ops::Div;
use tracing::debug;

/// Lazy search over a tree.
///
/// Yields a [`MatchResult`] for every node (the root included) satisfying
/// the matcher, in pre-order. Paths are built only for matching nodes. A
/// clone continues from the same position as the original.
#[derive(Debug, Clone)]
pub struct Search<'t, 'm> {
    cursor: Cursor<'t>,
    matcher: &'m Matcher,
}

impl<'t> Iterator for Search<'t, '_> {
    type Item = MatchResult<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.cursor.advance() {
            if self.matcher.satisfies(node) {
                return Some(MatchResult::new(node, self.cursor.path()));
            }
        }
        None
    }
}

/// Search `root` for nodes satisfying `pattern`.
///
/// Fails with [`PatternError::InvalidPattern`] when `pattern` is a plain
/// value rather than a matcher.
pub fn search<'t, 'm, P>(root: &'t Sexp, pattern: &'m P) -> Result<Search<'t, 'm>, PatternError>
where
    P: AsMatcher + ?Sized,
{
    Ok(matches(root, pattern.as_matcher()?))
}

pub(crate) fn matches<'t, 'm>(root: &'t Sexp, matcher: &'m Matcher) -> Search<'t, 'm> {
    Search {
        cursor: Cursor::new(root),
        matcher,
    }
}

/// Eager [`search`], collected in discovery order.
pub fn divide<'t, P>(root: &'t Sexp, pattern: &P) -> Result<MatchCollection<'t>, PatternError>
where
    P: AsMatcher + ?Sized,
{
    let matcher = pattern.as_matcher()?;
    let collection: MatchCollection<'t> = matches(root, matcher).collect();
    debug!(pattern = %matcher, matches = collection.len(), "divide");
    Ok(collection)
}

/// `tree / &pattern`
impl<'t> Div<&Matcher> for &'t Sexp {
    type Output = MatchCollection<'t>;

    fn div(self, matcher: &Matcher) -> MatchCollection<'t> {
        matches(self, matcher).collect()
    }
}

impl Sexp {
    /// [`search`] rooted at this node.
    pub fn search_each<'m, P>(&self, pattern: &'m P) -> Result<Search<'_, 'm>, PatternError>
    where
        P: AsMatcher + ?Sized,
    {
        search(self, pattern)
    }

    /// [`divide`] rooted at this node.
    pub fn divide<P>(&self, pattern: &P) -> Result<MatchCollection<'_>, PatternError>
    where
        P: AsMatcher + ?Sized,
    {
        divide(self, pattern)
    }

    /// True if some node of this tree satisfies some of `patterns`.
    pub fn satisfied_by_any(&self, patterns: &[Matcher]) -> bool {
        self.nodes()
            .any(|node| patterns.iter().any(|m| m.satisfies(node)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexp::Value;

    fn s(text: &str) -> Sexp {
        Sexp::parse(text).unwrap()
    }

    fn q(text: &str) -> Matcher {
        Matcher::parse(text).unwrap().unwrap()
    }

    fn class_sexp() -> Sexp {
        s("(class cake nil (defn foo (args) (add a b)) (defn bar (args) (sub a b)))")
    }

    #[test]
    fn search_in_preorder() {
        let tree = class_sexp();
        let found: Vec<_> = search(&tree, &Matcher::t("defn"))
            .unwrap()
            .map(|r| r.node.get(1).cloned())
            .collect();
        assert_eq!(found, vec![Some(Value::sym("foo")), Some(Value::sym("bar"))]);
    }

    #[test]
    fn search_is_restartable() {
        let tree = class_sexp();
        let pattern = Matcher::Wild;
        let fresh = search(&tree, &pattern).unwrap();
        let mut partial = fresh.clone();
        partial.next();
        partial.next();
        assert_eq!(partial.count(), 5);
        assert_eq!(fresh.clone().count(), 7);
        assert_eq!(fresh.count(), 7);
    }

    #[test]
    fn wild_counts_every_node() {
        let tree = class_sexp();
        assert_eq!(search(&tree, &Matcher::Wild).unwrap().count(), tree.mass());
    }

    #[test]
    fn root_itself_can_match() {
        let tree = s("(a (a))");
        let paths: Vec<_> = search(&tree, &Matcher::t("a"))
            .unwrap()
            .map(|r| r.path.to_string())
            .collect();
        assert_eq!(paths, vec!["/", "/1"]);
    }

    #[test]
    fn plain_values_are_rejected() {
        let tree = class_sexp();
        assert!(matches!(
            search(&tree, &Value::sym("defn")),
            Err(PatternError::InvalidPattern { .. })
        ));
        assert!(divide(&tree, &s("(args)")).is_err());
    }

    #[test]
    fn div_operator() {
        let tree = class_sexp();
        let by_op = &tree / &Matcher::t("args");
        assert_eq!(by_op, tree.divide(&Matcher::t("args")).unwrap());
        assert_eq!(by_op.len(), 2);
    }

    #[test]
    fn chained_divide_equals_direct_search() {
        let tree = class_sexp();
        let classes = tree.divide(&q("(class [atom] ___)")).unwrap();
        let chained = classes.divide(&q("(defn ___)")).unwrap();
        let direct = tree.divide(&q("(defn ___)")).unwrap();
        assert_eq!(chained, direct);
        assert_eq!(chained.len(), 2);
    }

    #[test]
    fn satisfied_by_any() {
        let tree = class_sexp();
        assert!(tree.satisfied_by_any(&[Matcher::t("nope"), Matcher::t("sub")]));
        assert!(!tree.satisfied_by_any(&[Matcher::t("nope")]));
        assert!(!tree.satisfied_by_any(&[]));
    }

    #[test]
    fn search_each_finds_text_patterns() {
        let tree = s("(block (call test_one) (call helper) (call test_two))");
        let pattern = q("(call [m /^test_/])");
        let names: Vec<_> = tree
            .search_each(&pattern)
            .unwrap()
            .filter_map(|r| r.node.get(1).and_then(Value::as_symbol).map(str::to_string))
            .collect();
        assert_eq!(names, vec!["test_one", "test_two"]);
    }
}
