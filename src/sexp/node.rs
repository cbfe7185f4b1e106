use crate::sexp::errors::ReadError;
use crate::sexp::reader;
use crate::sexp::value::Value;
use crate::sexp::walk::{NodePath, Nodes, Walk};
use std::fmt;

/// An s-expression node: an ordered sequence of slots whose first slot is
/// conventionally a tag symbol.
///
/// Equality is slot-wise; source line numbers do not participate.
#[derive(Debug, Clone, Default)]
pub struct Sexp {
    items: Vec<Value>,
    line: Option<usize>,
}

impl PartialEq for Sexp {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Sexp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(items: Vec<Value>) -> Self {
        Self { items, line: None }
    }

    /// Read exactly one node from data text, e.g. `(add a (lit 1))`.
    pub fn parse(text: &str) -> Result<Sexp, ReadError> {
        reader::read_one(text)
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn set_line(&mut self, line: Option<usize>) {
        self.line = line;
    }

    /// Source line this node was read from, if known.
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// Largest line number of this node and all its descendants.
    pub fn line_max(&self) -> Option<usize> {
        self.each_sexp()
            .filter_map(Sexp::line_max)
            .chain(self.line)
            .max()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.items.get_mut(index)
    }

    /// Replace slot `index`, returning the previous value.
    pub fn set(&mut self, index: usize, value: Value) -> Option<Value> {
        let slot = self.items.get_mut(index)?;
        Some(std::mem::replace(slot, value))
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.items.push(value.into());
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Value> {
        self.items
    }

    /// Slot 0.
    pub fn tag(&self) -> Option<&Value> {
        self.items.first()
    }

    /// Slot 0 when it is a symbol.
    pub fn tag_name(&self) -> Option<&str> {
        self.tag().and_then(Value::as_symbol)
    }

    /// Every slot after the tag.
    pub fn body(&self) -> &[Value] {
        self.items.get(1..).unwrap_or(&[])
    }

    /// Direct child nodes, skipping atoms.
    pub fn each_sexp(&self) -> impl Iterator<Item = &Sexp> + '_ {
        self.items.iter().filter_map(Value::as_sexp)
    }

    /// Pre-order walk of this node and every descendant node.
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(self)
    }

    /// Pre-order walk like [`Sexp::walk`], without building paths.
    pub fn nodes(&self) -> Nodes<'_> {
        Nodes::new(self)
    }

    /// Number of nodes in this tree, including itself.
    pub fn mass(&self) -> usize {
        self.nodes().count()
    }

    /// 1 for a node without child nodes.
    pub fn depth(&self) -> usize {
        1 + self.each_sexp().map(Sexp::depth).max().unwrap_or(0)
    }

    /// The node at `path`, relative to this node.
    pub fn get_path(&self, path: &NodePath) -> Option<&Sexp> {
        path.indices()
            .iter()
            .try_fold(self, |node, &index| node.get(index)?.as_sexp())
    }

    pub fn get_path_mut(&mut self, path: &NodePath) -> Option<&mut Sexp> {
        let mut node = self;
        for &index in path.indices() {
            node = node.get_mut(index)?.as_sexp_mut()?;
        }
        Some(node)
    }

    /// Substitute the node at `path` with `value` in its parent's slot.
    ///
    /// Returns the replaced value, or `None` for the root path or a path
    /// that does not lead to a node.
    pub fn replace_at(&mut self, path: &NodePath, value: Value) -> Option<Value> {
        let (parent, index) = path.split_last()?;
        let parent = self.get_path_mut(&parent)?;
        if !parent.get(index)?.is_sequence() {
            return None;
        }
        parent.set(index, value)
    }

    /// Render as data text, e.g. `(a 1 "x" nil (b))`.
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        self.write_source(&mut out);
        out
    }

    pub(crate) fn write_source(&self, out: &mut String) {
        out.push('(');
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            item.write_source(out);
        }
        out.push(')');
    }
}

impl From<Vec<Value>> for Sexp {
    fn from(items: Vec<Value>) -> Self {
        Self::from_vec(items)
    }
}

impl FromIterator<Value> for Sexp {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Sexp {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl std::ops::Index<usize> for Sexp {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.items[index]
    }
}

/// `s(:a, 1, s(:b))`
impl fmt::Display for Sexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s(")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{item}")?;
        }
        write!(f, ")")
    }
}
