//! Ordered question tree.
//!
//! A [`Tree`] owns a valueless root vertex and arranges mugs beneath it. All
//! mutations go through [`Tree::insert_mug`], [`Tree::insert_subtree`],
//! [`Tree::remove_mug`] and [`Tree::replace_mug`]; each one leaves the tree
//! consistent (child lists, parent links, ufid index and every mug's
//! `parent_mug`) before it emits exactly one [`TreeEvent::Change`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use generational_arena::Index;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::arena::NodeArena;
use crate::errors::{TreeError, TreeResult};
use crate::events::{Listeners, SubscriptionId, TreeEvent};
use crate::mug::Mug;
use crate::node::{Node, NodeId};
use crate::position::Position;
use crate::structure::{Structure, Subtree};

/// Which element tree this is. Opaque to the tree itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeType {
    #[default]
    Data,
    Control,
}

impl fmt::Display for TreeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeType::Data => f.write_str("data"),
            TreeType::Control => f.write_str("control"),
        }
    }
}

impl FromStr for TreeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "data" => Ok(TreeType::Data),
            "control" => Ok(TreeType::Control),
            other => Err(format!("unknown tree type: {other}")),
        }
    }
}

pub struct Tree<M: Mug> {
    nodes: NodeArena<M>,
    /// ufid -> vertex, covers exactly the mugs reachable from the root
    index: HashMap<M::Ufid, Index>,
    tree_type: TreeType,
    listeners: Listeners<M>,
}

impl<M: Mug> Default for Tree<M> {
    fn default() -> Self {
        Self::new(None, TreeType::default())
    }
}

impl<M: Mug> fmt::Debug for Tree<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("tree_type", &self.tree_type)
            .field("structure", &self.structure())
            .field("listeners", &self.listeners)
            .finish()
    }
}

impl<M: Mug> Tree<M> {
    pub fn new(root_id: Option<String>, tree_type: TreeType) -> Self {
        Self {
            nodes: NodeArena::new(root_id),
            index: HashMap::new(),
            tree_type,
            listeners: Listeners::default(),
        }
    }

    pub fn tree_type(&self) -> TreeType {
        self.tree_type
    }

    pub fn root_id(&self) -> Option<&str> {
        self.nodes.root_id()
    }

    pub fn set_root_id(&mut self, root_id: Option<String>) {
        self.nodes.set_root_id(root_id);
    }

    /// Number of mugs in the tree.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, mug: &M) -> bool {
        self.index.contains_key(&mug.ufid())
    }

    pub fn get_root_node(&self) -> Node<'_, M> {
        Node::new(&self.nodes, self.nodes.root())
    }

    /// View of a vertex by handle; `None` once it has been removed.
    pub fn node(&self, id: NodeId) -> Option<Node<'_, M>> {
        self.nodes
            .get_node(id.0)
            .map(|_| Node::new(&self.nodes, id.0))
    }

    pub fn get_node_from_mug(&self, mug: &M) -> Option<Node<'_, M>> {
        self.index
            .get(&mug.ufid())
            .map(|&idx| Node::new(&self.nodes, idx))
    }

    pub fn get_mug_from_ufid(&self, ufid: &M::Ufid) -> Option<&M> {
        self.index.get(ufid).and_then(|&idx| self.nodes.value(idx))
    }

    /// Parent of `node`; the root is its own parent.
    pub fn get_parent_node(&self, node: NodeId) -> Option<Node<'_, M>> {
        if self.nodes.is_root(node.0) {
            return Some(self.get_root_node());
        }
        self.nodes
            .find_parent_node(node.0)
            .map(|idx| Node::new(&self.nodes, idx))
    }

    pub fn structure(&self) -> Structure {
        self.get_root_node().structure()
    }

    /// Top-level mugs in display order.
    pub fn get_root_children(&self) -> Vec<&M> {
        self.get_root_node().children_mugs()
    }

    /// Every mug in pre-order.
    pub fn mugs(&self) -> impl Iterator<Item = &M> {
        self.nodes.iter().filter_map(|(_, node)| node.value.as_ref())
    }

    /// Slash-joined ids from the root down to `mug`, e.g. `/group/text2`.
    ///
    /// The root contributes a segment only when it has a non-empty id.
    pub fn get_absolute_path(&self, mug: &M) -> Option<String> {
        let mut current = Some(self.get_node_from_mug(mug)?);
        let mut ids = Vec::new();
        while let Some(node) = current.filter(|n| !n.is_root()) {
            ids.push(node.get_id());
            current = node.parent();
        }
        if let Some(root_id) = self.root_id().filter(|id| !id.is_empty()) {
            ids.push(root_id.to_string());
        }
        Some(format!("/{}", ids.iter().rev().join("/")))
    }

    /// Inverse of [`get_absolute_path`](Self::get_absolute_path): resolves
    /// each segment against the first child with that id.
    pub fn get_mug_from_path(&self, path: &str) -> Option<&M> {
        let mut segments = path.split('/').filter(|s| !s.is_empty()).peekable();
        if let Some(root_id) = self.root_id().filter(|id| !id.is_empty()) {
            if segments.next() != Some(root_id) {
                return None;
            }
        }
        segments.peek()?;

        let mut current = self.get_root_node();
        for segment in segments {
            current = current.children().find(|c| c.get_id() == segment)?;
        }
        current.value()
    }

    pub fn tree_map<'a, T, V>(&'a self, visit: V) -> Vec<T>
    where
        V: FnMut(Node<'a, M>) -> Option<T>,
    {
        self.get_root_node().tree_map(visit, Vec::new())
    }

    pub fn tree_map_with<'a, T, V, A>(&'a self, visit: V, after_children: A) -> Vec<T>
    where
        V: FnMut(Node<'a, M>) -> Option<T>,
        A: FnMut(Node<'a, M>, Option<&T>),
    {
        self.get_root_node()
            .tree_map_with(visit, Vec::new(), after_children)
    }

    /// True iff every top-level subtree validates; an empty tree is valid.
    pub fn is_tree_valid(&self) -> TreeResult<bool> {
        for child in self.get_root_node().children() {
            if !child.validate_tree()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&TreeEvent<M>) + 'static,
    {
        self.listeners.subscribe(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    /// Places `mug` relative to `ref_mug`.
    ///
    /// A mug already in the tree is moved together with its descendants.
    /// Without a reference (or with one that is not in this tree) the mug is
    /// appended to the root, whatever `position` says.
    #[instrument(level = "debug", skip_all, fields(node_id = %mug.node_id(), %position))]
    pub fn insert_mug(
        &mut self,
        mut mug: M,
        position: Position,
        ref_mug: Option<&M>,
    ) -> TreeResult<NodeId> {
        let ufid = mug.ufid();
        let existing = self.index.get(&ufid).copied();
        let (ref_idx, position) = self.resolve_reference(&mug, existing, position, ref_mug)?;

        let idx = match existing {
            Some(idx) => {
                self.nodes.detach(idx);
                idx
            }
            None => {
                let idx = self.nodes.alloc(mug.clone());
                self.index.insert(ufid, idx);
                idx
            }
        };

        let parent_idx = self.link(idx, ref_idx, position)?;
        mug.set_parent_mug(self.nodes.value(parent_idx).map(|p| p.ufid()));
        if let Some(slot) = self.nodes.value_mut(idx) {
            *slot = mug.clone();
        }
        debug!(moved = existing.is_some(), "inserted mug");

        self.listeners.emit(&TreeEvent::Change { mug: Some(mug) });
        Ok(NodeId(idx))
    }

    /// Re-inserts a previously removed subtree with its shape intact.
    #[instrument(level = "debug", skip_all, fields(node_id = %subtree.mug().node_id(), %position))]
    pub fn insert_subtree(
        &mut self,
        subtree: Subtree<M>,
        position: Position,
        ref_mug: Option<&M>,
    ) -> TreeResult<NodeId> {
        if let Some(dup) = subtree.mugs().into_iter().find(|m| self.contains(m)) {
            return Err(TreeError::DuplicateMug {
                node_id: dup.node_id(),
            });
        }
        let (ref_idx, position) =
            self.resolve_reference(subtree.mug(), None, position, ref_mug)?;

        let (mut mug, children) = subtree.into_parts();
        let ufid = mug.ufid();
        let idx = self.nodes.alloc(mug.clone());
        self.index.insert(ufid.clone(), idx);
        for child in children {
            self.plant(child, idx, &ufid)?;
        }

        let parent_idx = self.link(idx, ref_idx, position)?;
        mug.set_parent_mug(self.nodes.value(parent_idx).map(|p| p.ufid()));
        if let Some(slot) = self.nodes.value_mut(idx) {
            *slot = mug.clone();
        }
        debug!(size = self.len(), "inserted subtree");

        self.listeners.emit(&TreeEvent::Change { mug: Some(mug) });
        Ok(NodeId(idx))
    }

    /// Detaches `mug` and its descendants. Returns `None` if it is not in
    /// the tree.
    #[instrument(level = "debug", skip_all, fields(node_id = %mug.node_id()))]
    pub fn remove_mug(&mut self, mug: &M) -> Option<Subtree<M>> {
        let idx = self.index.get(&mug.ufid()).copied()?;
        let removed: Vec<M::Ufid> = self
            .nodes
            .iter_at(idx)
            .filter_map(|(_, node)| node.value.as_ref().map(|m| m.ufid()))
            .collect();
        for ufid in &removed {
            self.index.remove(ufid);
        }
        self.nodes.detach(idx);
        let subtree = self.nodes.take_subtree(idx)?;
        debug!(removed = removed.len(), "removed mug");

        self.listeners.emit(&TreeEvent::Change { mug: None });
        Some(subtree)
    }

    /// Swaps the mug held by `old`'s vertex for `new`, re-pointing the
    /// children's `parent_mug` at it. Returns the mug that was replaced.
    #[instrument(level = "debug", skip_all, fields(old = %old.node_id(), new = %new.node_id()))]
    pub fn replace_mug(&mut self, old: &M, mut new: M) -> TreeResult<Option<M>> {
        let old_ufid = old.ufid();
        let Some(idx) = self.index.get(&old_ufid).copied() else {
            return Ok(None);
        };
        let new_ufid = new.ufid();
        if new_ufid != old_ufid && self.index.contains_key(&new_ufid) {
            return Err(TreeError::DuplicateMug {
                node_id: new.node_id(),
            });
        }

        let parent_ufid = self
            .nodes
            .find_parent_node(idx)
            .and_then(|p| self.nodes.value(p))
            .map(|p| p.ufid());
        new.set_parent_mug(parent_ufid);

        let slot = self.nodes.value_mut(idx).ok_or(TreeError::StaleNode)?;
        let previous = std::mem::replace(slot, new.clone());
        self.index.remove(&old_ufid);
        self.index.insert(new_ufid.clone(), idx);

        let children = self
            .nodes
            .get_node(idx)
            .map(|n| n.children.clone())
            .unwrap_or_default();
        for child in children {
            if let Some(value) = self.nodes.value_mut(child) {
                value.set_parent_mug(Some(new_ufid.clone()));
            }
        }

        self.listeners.emit(&TreeEvent::Change { mug: Some(new) });
        Ok(Some(previous))
    }

    /// Resolves the reference vertex and effective position, rejecting
    /// placements that would break the tree.
    fn resolve_reference(
        &self,
        mug: &M,
        existing: Option<Index>,
        position: Position,
        ref_mug: Option<&M>,
    ) -> TreeResult<(Index, Position)> {
        let Some(ref_mug) = ref_mug else {
            return Ok((self.nodes.root(), Position::Into));
        };
        if ref_mug.ufid() == mug.ufid() {
            return Err(TreeError::SelfReference {
                node_id: mug.node_id(),
            });
        }
        let Some(&ref_idx) = self.index.get(&ref_mug.ufid()) else {
            debug!(ref_id = %ref_mug.node_id(), "reference not in tree, appending to root");
            return Ok((self.nodes.root(), Position::Into));
        };
        if let Some(idx) = existing {
            if self.nodes.is_ancestor_or_self(idx, ref_idx) {
                return Err(TreeError::CyclicMove {
                    node_id: mug.node_id(),
                    ref_id: ref_mug.node_id(),
                });
            }
        }
        Ok((ref_idx, position))
    }

    /// Links the detached vertex `idx` relative to `ref_idx`, returning its
    /// new parent.
    fn link(&mut self, idx: Index, ref_idx: Index, position: Position) -> TreeResult<Index> {
        match position {
            Position::Before | Position::After => {
                let parent = self
                    .nodes
                    .find_parent_node(ref_idx)
                    .ok_or(TreeError::StaleNode)?;
                let at = self
                    .nodes
                    .child_position(parent, ref_idx)
                    .ok_or(TreeError::StaleNode)?;
                let at = if position == Position::After { at + 1 } else { at };
                self.nodes.insert_child(parent, idx, at)?;
                Ok(parent)
            }
            Position::First => {
                self.nodes.insert_child(ref_idx, idx, 0)?;
                Ok(ref_idx)
            }
            Position::Into | Position::Last => {
                self.nodes.add_child(ref_idx, idx)?;
                Ok(ref_idx)
            }
        }
    }

    fn plant(
        &mut self,
        subtree: Subtree<M>,
        parent: Index,
        parent_ufid: &M::Ufid,
    ) -> TreeResult<()> {
        let (mut mug, children) = subtree.into_parts();
        mug.set_parent_mug(Some(parent_ufid.clone()));
        let ufid = mug.ufid();
        let idx = self.nodes.alloc(mug);
        self.index.insert(ufid.clone(), idx);
        self.nodes.add_child(parent, idx)?;
        for child in children {
            self.plant(child, idx, &ufid)?;
        }
        Ok(())
    }
}
