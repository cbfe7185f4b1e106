use crate::sexp::node::Sexp;
use std::fmt;

/// Identity of a node inside a tree: the slot indices leading to it from
/// the root the path was computed against.
///
/// Value-equal subtrees at different positions have different paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The path of the root itself.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Path of slot `index` below this node.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// `other` interpreted relative to the node at `self`.
    pub fn join(&self, other: &NodePath) -> Self {
        let mut indices = self.0.clone();
        indices.extend_from_slice(&other.0);
        Self(indices)
    }

    /// True if `self` lies inside (or is) the node at `ancestor`.
    pub fn starts_with(&self, ancestor: &NodePath) -> bool {
        self.0.starts_with(&ancestor.0)
    }

    /// Split into the parent path and the slot index; `None` for the root.
    pub fn split_last(&self) -> Option<(NodePath, usize)> {
        let (&last, parent) = self.0.split_last()?;
        Some((NodePath(parent.to_vec()), last))
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for index in &self.0 {
            write!(f, "/{index}")?;
        }
        Ok(())
    }
}

/// Pre-order traversal state: the chain of nodes from the root down to the
/// node yielded last.
///
/// Paths are not stored per node; [`Cursor::path`] rebuilds the path of the
/// current node from the chain on request.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    pending: Option<&'a Sexp>,
    frames: Vec<Frame<'a>>,
}

#[derive(Debug, Clone)]
struct Frame<'a> {
    node: &'a Sexp,
    /// Slot index of `node` in its parent; unused for the root.
    index: usize,
    /// First slot not yet searched for child nodes.
    next: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(root: &'a Sexp) -> Self {
        Self {
            pending: Some(root),
            frames: Vec::new(),
        }
    }

    /// Move to the next node in pre-order.
    pub(crate) fn advance(&mut self) -> Option<&'a Sexp> {
        if let Some(root) = self.pending.take() {
            self.frames.push(Frame {
                node: root,
                index: 0,
                next: 0,
            });
            return Some(root);
        }

        while let Some(frame) = self.frames.last_mut() {
            let (node, start) = (frame.node, frame.next);
            let child = node.items()[start..]
                .iter()
                .enumerate()
                .find_map(|(offset, slot)| slot.as_sexp().map(|child| (start + offset, child)));

            match child {
                Some((index, child)) => {
                    frame.next = index + 1;
                    self.frames.push(Frame {
                        node: child,
                        index,
                        next: 0,
                    });
                    return Some(child);
                }
                None => {
                    self.frames.pop();
                }
            }
        }
        None
    }

    /// Path of the node returned by the last [`Cursor::advance`].
    pub(crate) fn path(&self) -> NodePath {
        NodePath(self.frames.iter().skip(1).map(|frame| frame.index).collect())
    }
}

/// Lazy pre-order walk over a node and all of its descendant nodes, with
/// the path of each.
///
/// Atoms are never yielded. A clone continues from the same position;
/// [`Sexp::walk`] always starts over.
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Walk<'a> {
    pub(crate) fn new(root: &'a Sexp) -> Self {
        Self {
            cursor: Cursor::new(root),
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = (NodePath, &'a Sexp);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.cursor.advance()?;
        Some((self.cursor.path(), node))
    }
}

/// [`Walk`] without paths; see [`Sexp::nodes`].
#[derive(Debug, Clone)]
pub struct Nodes<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Nodes<'a> {
    pub(crate) fn new(root: &'a Sexp) -> Self {
        Self {
            cursor: Cursor::new(root),
        }
    }
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a Sexp;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.advance()
    }
}
