use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::errors::{TreeError, TreeResult};
use crate::structure::Subtree;

/// Slot in the arena: one tree vertex.
#[derive(Debug)]
pub struct TreeNode<M> {
    /// Mug held by this vertex, `None` only for the root sentinel
    pub value: Option<M>,
    /// Index of the parent vertex, `None` for the root and for detached vertices
    pub parent: Option<Index>,
    /// Ordered child indices, display order
    pub children: Vec<Index>,
}

/// Arena-based storage for one question tree.
///
/// The ordered child lists are authoritative. Each slot also carries a parent
/// back-reference which every primitive here keeps in step with them, so
/// parent lookups never walk the tree.
#[derive(Debug)]
pub struct NodeArena<M> {
    arena: Arena<TreeNode<M>>,
    root: Index,
    root_id: Option<String>,
}

impl<M> NodeArena<M> {
    pub fn new(root_id: Option<String>) -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(TreeNode {
            value: None,
            parent: None,
            children: Vec::new(),
        });
        Self {
            arena,
            root,
            root_id,
        }
    }

    pub fn root(&self) -> Index {
        self.root
    }

    pub fn root_id(&self) -> Option<&str> {
        self.root_id.as_deref()
    }

    pub fn set_root_id(&mut self, root_id: Option<String>) {
        self.root_id = root_id;
    }

    pub fn is_root(&self, idx: Index) -> bool {
        idx == self.root
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode<M>> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode<M>> {
        self.arena.get_mut(idx)
    }

    pub fn value(&self, idx: Index) -> Option<&M> {
        self.get_node(idx).and_then(|n| n.value.as_ref())
    }

    pub fn value_mut(&mut self, idx: Index) -> Option<&mut M> {
        self.get_node_mut(idx).and_then(|n| n.value.as_mut())
    }

    /// Number of live slots, root included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Allocates a detached vertex holding `value`.
    #[instrument(level = "trace", skip(self, value))]
    pub fn alloc(&mut self, value: M) -> Index {
        self.arena.insert(TreeNode {
            value: Some(value),
            parent: None,
            children: Vec::new(),
        })
    }

    /// Appends `child` to the end of `parent`'s children.
    ///
    /// Does not check whether `child` is already linked elsewhere; callers
    /// detach first.
    #[instrument(level = "trace", skip(self))]
    pub fn add_child(&mut self, parent: Index, child: Index) -> TreeResult<()> {
        let len = self.get_node(parent).ok_or(TreeError::StaleNode)?.children.len();
        self.insert_child(parent, child, len)
    }

    /// Inserts `child` at `index` among `parent`'s children, appending when
    /// `index` is past the end.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_child(&mut self, parent: Index, child: Index, index: usize) -> TreeResult<()> {
        if !self.arena.contains(parent) {
            return Err(TreeError::StaleNode);
        }
        let child_node = self.get_node_mut(child).ok_or(TreeError::StaleNode)?;
        debug_assert!(child_node.parent.is_none(), "child still linked");
        child_node.parent = Some(parent);

        let siblings = &mut self
            .get_node_mut(parent)
            .ok_or(TreeError::StaleNode)?
            .children;
        let index = index.min(siblings.len());
        siblings.insert(index, child);
        Ok(())
    }

    /// Unlinks the first occurrence of `child` from `parent`'s children.
    ///
    /// Returns `None` when `child` was not a child of `parent`.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_child(&mut self, parent: Index, child: Index) -> Option<Index> {
        let siblings = &mut self.get_node_mut(parent)?.children;
        let pos = siblings.iter().position(|&c| c == child)?;
        siblings.remove(pos);
        if let Some(node) = self.get_node_mut(child) {
            node.parent = None;
        }
        Some(child)
    }

    /// Unlinks `idx` from whatever parent holds it, returning that parent.
    pub fn detach(&mut self, idx: Index) -> Option<Index> {
        let parent = self.find_parent_node(idx)?;
        self.remove_child(parent, idx).map(|_| parent)
    }

    pub fn find_parent_node(&self, idx: Index) -> Option<Index> {
        self.get_node(idx).and_then(|n| n.parent)
    }

    /// Position of `child` in `parent`'s child list.
    pub fn child_position(&self, parent: Index, child: Index) -> Option<usize> {
        self.get_node(parent)?
            .children
            .iter()
            .position(|&c| c == child)
    }

    /// True if `ancestor` is `idx` itself or lies on its parent chain.
    pub fn is_ancestor_or_self(&self, ancestor: Index, idx: Index) -> bool {
        let mut current = Some(idx);
        while let Some(i) = current {
            if i == ancestor {
                return true;
            }
            current = self.find_parent_node(i);
        }
        false
    }

    /// Removes the detached vertex `idx` and all of its descendants from the
    /// arena, handing back their values with the same shape.
    #[instrument(level = "trace", skip(self))]
    pub fn take_subtree(&mut self, idx: Index) -> Option<Subtree<M>> {
        if self.is_root(idx) {
            return None;
        }
        let node = self.arena.remove(idx)?;
        let children = node
            .children
            .into_iter()
            .filter_map(|child| self.take_subtree(child))
            .collect();
        node.value.map(|value| Subtree::new(value, children))
    }

    /// Pre-order walk of the subtree rooted at `idx`.
    pub fn iter_at(&self, idx: Index) -> PreOrderIterator<'_, M> {
        PreOrderIterator::new(self, idx)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> PreOrderIterator<'_, M> {
        self.iter_at(self.root)
    }
}

pub struct PreOrderIterator<'a, M> {
    arena: &'a NodeArena<M>,
    stack: Vec<Index>,
}

impl<'a, M> PreOrderIterator<'a, M> {
    fn new(arena: &'a NodeArena<M>, start: Index) -> Self {
        let stack = if arena.get_node(start).is_some() {
            vec![start]
        } else {
            Vec::new()
        };
        Self { arena, stack }
    }
}

impl<'a, M> Iterator for PreOrderIterator<'a, M> {
    type Item = (Index, &'a TreeNode<M>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
