//! Owned snapshots of tree shape.

use std::fmt;

use crate::mug::Identifiable;
use crate::tree_traits::ToTermTree;

/// Nested mapping from a node id to the structures of its children.
///
/// Two trees with equal structures have the same ids in the same nesting
/// and order, which is what structural assertions compare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Structure {
    pub id: String,
    pub children: Vec<Structure>,
}

impl Structure {
    pub fn new(id: impl Into<String>, children: Vec<Structure>) -> Self {
        Self {
            id: id.into(),
            children,
        }
    }

    pub fn leaf(id: impl Into<String>) -> Self {
        Self::new(id, Vec::new())
    }

    /// Number of entries, this one included.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(Structure::size).sum::<usize>()
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_term_tree())
    }
}

/// A mug and its descendants after removal from a tree.
///
/// Handed out by [`Tree::remove_mug`](crate::Tree::remove_mug) and accepted by
/// [`Tree::insert_subtree`](crate::Tree::insert_subtree).
#[derive(Debug, Clone)]
pub struct Subtree<M> {
    mug: M,
    children: Vec<Subtree<M>>,
}

impl<M> Subtree<M> {
    pub fn new(mug: M, children: Vec<Subtree<M>>) -> Self {
        Self { mug, children }
    }

    pub fn mug(&self) -> &M {
        &self.mug
    }

    pub fn children(&self) -> &[Subtree<M>] {
        &self.children
    }

    pub fn into_parts(self) -> (M, Vec<Subtree<M>>) {
        (self.mug, self.children)
    }

    /// All mugs in pre-order, this one first.
    pub fn mugs(&self) -> Vec<&M> {
        let mut out = vec![&self.mug];
        for child in &self.children {
            out.extend(child.mugs());
        }
        out
    }

    /// Every `(parent, child)` pair in pre-order of the child.
    pub fn edges(&self) -> Vec<(&M, &M)> {
        let mut out = Vec::new();
        for child in &self.children {
            out.push((&self.mug, &child.mug));
            out.extend(child.edges());
        }
        out
    }
}

impl<M: Identifiable> Subtree<M> {
    pub fn structure(&self) -> Structure {
        Structure::new(
            self.mug.node_id(),
            self.children.iter().map(Subtree::structure).collect(),
        )
    }
}
