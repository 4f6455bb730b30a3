//! Read-only views onto tree vertices.

use std::fmt;

use generational_arena::Index;

use crate::arena::{NodeArena, TreeNode};
use crate::errors::{TreeError, TreeResult};
use crate::mug::Mug;
use crate::structure::Structure;

/// Stable handle to a vertex, valid until the vertex is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) Index);

/// Search request for [`Node::find`].
pub enum NodeQuery<'q, M> {
    /// The root of the tree the node belongs to.
    Root,
    /// The vertex holding this mug (matched by ufid).
    Mug(&'q M),
    /// First vertex whose value satisfies the predicate. The root is offered
    /// as `None`.
    Predicate(&'q dyn Fn(Option<&M>) -> bool),
}

/// Borrowed view of one vertex.
pub struct Node<'a, M> {
    arena: &'a NodeArena<M>,
    idx: Index,
}

impl<M> Clone for Node<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for Node<'_, M> {}

impl<M> PartialEq for Node<'_, M> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.arena, other.arena) && self.idx == other.idx
    }
}

impl<M> Eq for Node<'_, M> {}

impl<M: Mug> fmt::Debug for Node<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.get_id())
            .field("children", &self.slot().map_or(0, |n| n.children.len()))
            .finish()
    }
}

impl<'a, M: Mug + 'a> Node<'a, M> {
    pub(crate) fn new(arena: &'a NodeArena<M>, idx: Index) -> Self {
        Self { arena, idx }
    }

    fn slot(&self) -> Option<&'a TreeNode<M>> {
        self.arena.get_node(self.idx)
    }

    pub fn id(&self) -> NodeId {
        NodeId(self.idx)
    }

    pub fn is_root(&self) -> bool {
        self.arena.is_root(self.idx)
    }

    /// The mug held here; `None` for the root.
    pub fn value(&self) -> Option<&'a M> {
        self.slot().and_then(|n| n.value.as_ref())
    }

    pub fn children(&self) -> impl Iterator<Item = Node<'a, M>> + 'a {
        let arena = self.arena;
        self.slot()
            .into_iter()
            .flat_map(|n| n.children.iter())
            .map(move |&idx| Node::new(arena, idx))
    }

    pub fn child_count(&self) -> usize {
        self.slot().map_or(0, |n| n.children.len())
    }

    pub fn parent(&self) -> Option<Node<'a, M>> {
        self.arena
            .find_parent_node(self.idx)
            .map(|idx| Node::new(self.arena, idx))
    }

    /// The root's configured id, otherwise the mug's display id.
    pub fn get_id(&self) -> String {
        if self.is_root() {
            return self.arena.root_id().unwrap_or_default().to_string();
        }
        self.value().map(|m| m.node_id()).unwrap_or_default()
    }

    /// Mugs of the direct children, in display order.
    pub fn children_mugs(&self) -> Vec<&'a M> {
        self.children().filter_map(|c| c.value()).collect()
    }

    pub fn structure(&self) -> Structure {
        Structure::new(
            self.get_id(),
            self.children().map(|c| c.structure()).collect(),
        )
    }

    /// Depth-first pre-order search of this subtree.
    pub fn find(&self, query: NodeQuery<'_, M>) -> Option<Node<'a, M>> {
        match query {
            NodeQuery::Root => Some(Node::new(self.arena, self.arena.root())),
            NodeQuery::Mug(mug) => {
                let ufid = mug.ufid();
                self.find_where(&|value: Option<&M>| value.is_some_and(|v| v.ufid() == ufid))
            }
            NodeQuery::Predicate(predicate) => self.find_where(predicate),
        }
    }

    fn find_where(&self, predicate: &dyn Fn(Option<&M>) -> bool) -> Option<Node<'a, M>> {
        self.arena
            .iter_at(self.idx)
            .find(|(_, node)| predicate(node.value.as_ref()))
            .map(|(idx, _)| Node::new(self.arena, idx))
    }

    pub fn get_node_from_mug(&self, mug: &M) -> Option<Node<'a, M>> {
        self.find(NodeQuery::Mug(mug))
    }

    pub fn get_mug_from_ufid(&self, ufid: &M::Ufid) -> Option<&'a M> {
        self.find(NodeQuery::Predicate(&|value: Option<&M>| {
            value.is_some_and(|v| &v.ufid() == ufid)
        }))
        .and_then(|n| n.value())
    }

    /// The vertex within this subtree whose children contain `node`.
    pub fn find_parent_node(&self, node: NodeId) -> Option<Node<'a, M>> {
        let parent = self.arena.find_parent_node(node.0)?;
        self.arena
            .is_ancestor_or_self(self.idx, parent)
            .then(|| Node::new(self.arena, parent))
    }

    /// Pre-order traversal collecting every `Some` returned by `visit`.
    pub fn tree_map<T, V>(&self, mut visit: V, mut collector: Vec<T>) -> Vec<T>
    where
        V: FnMut(Node<'a, M>) -> Option<T>,
    {
        self.walk(&mut visit, &mut collector, &mut |_: Node<'a, M>, _: Option<&T>| {});
        collector
    }

    /// Like [`tree_map`](Self::tree_map), additionally calling
    /// `after_children` with each node and its own visit result once all of
    /// its descendants were visited.
    pub fn tree_map_with<T, V, A>(
        &self,
        mut visit: V,
        mut collector: Vec<T>,
        mut after_children: A,
    ) -> Vec<T>
    where
        V: FnMut(Node<'a, M>) -> Option<T>,
        A: FnMut(Node<'a, M>, Option<&T>),
    {
        self.walk(&mut visit, &mut collector, &mut after_children);
        collector
    }

    fn walk<T>(
        &self,
        visit: &mut dyn FnMut(Node<'a, M>) -> Option<T>,
        collector: &mut Vec<T>,
        after_children: &mut dyn FnMut(Node<'a, M>, Option<&T>),
    ) {
        let slot = visit(*self).map(|result| {
            collector.push(result);
            collector.len() - 1
        });
        for child in self.children() {
            child.walk(visit, collector, after_children);
        }
        after_children(*self, slot.map(|i| &collector[i]));
    }

    /// Validity of this mug and all descendants, stopping at the first
    /// invalid one.
    ///
    /// Fails with [`TreeError::MissingValue`] on a vertex without a mug,
    /// which includes calling it on the root.
    pub fn validate_tree(&self) -> TreeResult<bool> {
        let mug = self.value().ok_or(TreeError::MissingValue)?;
        if !mug.is_valid() {
            return Ok(false);
        }
        for child in self.children() {
            if !child.validate_tree()? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
