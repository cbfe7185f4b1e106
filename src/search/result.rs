use crate::matcher::{AsMatcher, PatternError};
use crate::search::engine;
use crate::sexp::{NodePath, Sexp, Value};
use std::collections::BTreeMap;
use std::fmt;

/// One matched occurrence.
///
/// `path` locates the node relative to the root that was searched, so two
/// value-equal matches are still distinguishable. Annotations are opaque
/// caller data and start empty.
#[derive(Debug, Clone)]
pub struct MatchResult<'a> {
    pub node: &'a Sexp,
    pub path: NodePath,
    pub annotations: BTreeMap<String, Value>,
}

impl<'a> MatchResult<'a> {
    pub fn new(node: &'a Sexp, path: NodePath) -> Self {
        Self {
            node,
            path,
            annotations: BTreeMap::new(),
        }
    }

    /// Attach an annotation, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.annotations.get(key)
    }
}

/// Node values and annotations; the path is not compared.
impl PartialEq for MatchResult<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node && self.annotations == other.annotations
    }
}

/// `MatchResult(s(:a), {cheat: :woot})`
impl fmt::Display for MatchResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MatchResult({}", self.node)?;
        if !self.annotations.is_empty() {
            write!(f, ", {{")?;
            for (i, (key, value)) in self.annotations.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}: {value}")?;
            }
            write!(f, "}}")?;
        }
        write!(f, ")")
    }
}

/// Matches in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchCollection<'a>(Vec<MatchResult<'a>>);

impl<'a> MatchCollection<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MatchResult<'a>> {
        self.0.iter()
    }

    pub fn first(&self) -> Option<&MatchResult<'a>> {
        self.0.first()
    }

    pub fn push(&mut self, result: MatchResult<'a>) {
        self.0.push(result);
    }

    /// The matched nodes, in order.
    pub fn nodes(&self) -> Vec<&'a Sexp> {
        self.0.iter().map(|r| r.node).collect()
    }

    /// Search every result's node again and concatenate the sub-results.
    ///
    /// Sub-result paths are joined onto the parent's path, so they stay
    /// relative to the tree the first search ran on. Nothing is
    /// de-duplicated: a node inside two results is reported twice.
    pub fn divide<P>(&self, pattern: &P) -> Result<MatchCollection<'a>, PatternError>
    where
        P: AsMatcher + ?Sized,
    {
        let matcher = pattern.as_matcher()?;
        let mut out = MatchCollection::new();
        for parent in &self.0 {
            for sub in engine::matches(parent.node, matcher) {
                out.push(MatchResult {
                    path: parent.path.join(&sub.path),
                    ..sub
                });
            }
        }
        Ok(out)
    }
}

impl<'a> FromIterator<MatchResult<'a>> for MatchCollection<'a> {
    fn from_iter<I: IntoIterator<Item = MatchResult<'a>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for MatchCollection<'a> {
    type Item = MatchResult<'a>;
    type IntoIter = std::vec::IntoIter<MatchResult<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'c, 'a> IntoIterator for &'c MatchCollection<'a> {
    type Item = &'c MatchResult<'a>;
    type IntoIter = std::slice::Iter<'c, MatchResult<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'a> std::ops::Index<usize> for MatchCollection<'a> {
    type Output = MatchResult<'a>;

    fn index(&self, index: usize) -> &MatchResult<'a> {
        &self.0[index]
    }
}

/// `MatchCollection(MatchResult(s(:a)), MatchResult(s(:b)))`
impl fmt::Display for MatchCollection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MatchCollection(")?;
        for (i, result) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{result}")?;
        }
        write!(f, ")")
    }
}
