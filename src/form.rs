//! Editor-side owner of a question tree and its undo history.

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::errors::TreeResult;
use crate::mug::Mug;
use crate::node::{Node, NodeId};
use crate::position::Position;
use crate::tree::Tree;
use crate::undo::{NoAffordance, QuestionInserter, UndoAffordance, UndoManager, UndoRecord};

/// A form being edited: the tree plus the undo manager recording deletions
/// made through it.
#[derive(Debug)]
pub struct Form<M: Mug, A = NoAffordance> {
    tree: Tree<M>,
    undo: UndoManager<M, A>,
}

impl<M: Mug> Form<M, NoAffordance> {
    pub fn new(tree: Tree<M>) -> Self {
        Self::with_affordance(tree, NoAffordance)
    }
}

impl<M: Mug, A: UndoAffordance> Form<M, A> {
    pub fn with_affordance(tree: Tree<M>, affordance: A) -> Self {
        Self {
            tree,
            undo: UndoManager::with_affordance(affordance),
        }
    }

    pub fn tree(&self) -> &Tree<M> {
        &self.tree
    }

    /// Mutable access for subscribing to tree events and similar. Edits made
    /// directly on the tree are not recorded for undo.
    pub fn tree_mut(&mut self) -> &mut Tree<M> {
        &mut self.tree
    }

    pub fn undo_manager(&self) -> &UndoManager<M, A> {
        &self.undo
    }

    pub fn into_tree(self) -> Tree<M> {
        self.tree
    }

    /// Inserts or moves a question.
    ///
    /// A user edit (`suppress_undo_recording == false`) invalidates pending
    /// undo records, since they refer to the tree as it was before the edit.
    /// Replays pass `true` and leave the undo history alone.
    pub fn insert_question(
        &mut self,
        mug: M,
        ref_mug: Option<&M>,
        position: Position,
        suppress_undo_recording: bool,
    ) -> TreeResult<NodeId> {
        if !suppress_undo_recording && !self.undo.is_empty() {
            debug!("user edit discards pending undo");
            self.undo.clear();
        }
        self.tree.insert_mug(mug, position, ref_mug)
    }

    /// Deletes the selected questions with their descendants and records the
    /// deletion for undo. Returns the number of top-level subtrees removed.
    ///
    /// Selected mugs nested under another selected mug go with their
    /// ancestor. Mugs not in the tree are ignored.
    #[instrument(level = "debug", skip_all, fields(selected = mugs.len()))]
    pub fn remove_questions(&mut self, mugs: &[M]) -> usize {
        let selected: HashSet<M::Ufid> = mugs.iter().map(|m| m.ufid()).collect();
        let doomed: HashSet<M::Ufid> = mugs
            .iter()
            .filter_map(|m| self.tree.get_node_from_mug(m))
            .flat_map(|node| node.tree_map(|n| n.value().map(|v| v.ufid()), Vec::new()))
            .collect();

        // Tree order, outermost selections only
        let tops: Vec<M> = self
            .tree
            .mugs()
            .filter(|m| selected.contains(&m.ufid()))
            .filter(|m| !self.has_selected_ancestor(m, &selected))
            .cloned()
            .collect();

        let records: Vec<UndoRecord<M>> = tops
            .iter()
            .flat_map(|mug| self.deletion_records(mug, &doomed))
            .collect();

        for mug in &tops {
            self.tree.remove_mug(mug);
        }

        let mut records = records.into_iter();
        if let Some(first) = records.next() {
            self.undo
                .reset_undo(first.mug, first.previous_sibling, first.position);
            for record in records {
                self.undo
                    .append_mug(record.mug, record.previous_sibling, record.position);
            }
        }
        debug!(removed = tops.len(), records = self.undo.len(), "questions removed");
        tops.len()
    }

    /// Restores the most recent deletion. Returns the number of mugs
    /// re-inserted.
    pub fn undo(&mut self) -> TreeResult<usize> {
        self.undo.undo(&mut self.tree)
    }

    fn has_selected_ancestor(&self, mug: &M, selected: &HashSet<M::Ufid>) -> bool {
        let mut current = self.tree.get_node_from_mug(mug).and_then(|n| n.parent());
        while let Some(node) = current {
            if node.value().is_some_and(|v| selected.contains(&v.ufid())) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Records for one deleted subtree, in detachment order: the top mug
    /// anchored to a neighbour that is still there at replay time, then each
    /// descendant appended into its parent.
    fn deletion_records(&self, mug: &M, doomed: &HashSet<M::Ufid>) -> Vec<UndoRecord<M>> {
        let Some(node) = self.tree.get_node_from_mug(mug) else {
            return Vec::new();
        };
        let mut records = vec![self.anchor_record(mug, node, doomed)];
        records.extend(node.children().flat_map(descendant_records));
        records
    }

    fn anchor_record(
        &self,
        mug: &M,
        node: Node<'_, M>,
        doomed: &HashSet<M::Ufid>,
    ) -> UndoRecord<M> {
        let parent = node.parent();
        let siblings: Vec<Node<'_, M>> = parent
            .map(|p| p.children().collect())
            .unwrap_or_default();
        let at = siblings.iter().position(|s| *s == node).unwrap_or(0);

        let previous = at.checked_sub(1).map(|i| siblings[i]);
        let (reference, position) = if let Some(prev) = previous {
            (prev.value().cloned(), Position::After)
        } else if let Some(next) = siblings
            .iter()
            .skip(at + 1)
            .find(|s| s.value().is_some_and(|v| !doomed.contains(&v.ufid())))
        {
            (next.value().cloned(), Position::Before)
        } else {
            (parent.and_then(|p| p.value().cloned()), Position::Into)
        };
        UndoRecord::new(mug.clone(), reference, position)
    }
}

/// Pre-order records appending each node into its parent.
fn descendant_records<M: Mug>(node: Node<'_, M>) -> Vec<UndoRecord<M>> {
    node.tree_map(
        |n| {
            let mug = n.value()?.clone();
            let parent = n.parent().and_then(|p| p.value()).cloned();
            Some(UndoRecord::new(mug, parent, Position::Into))
        },
        Vec::new(),
    )
}

impl<M: Mug, A: UndoAffordance> QuestionInserter<M> for Form<M, A> {
    fn insert_question(
        &mut self,
        mug: M,
        previous_sibling: Option<&M>,
        position: Position,
        suppress_undo_recording: bool,
    ) -> TreeResult<()> {
        Form::insert_question(self, mug, previous_sibling, position, suppress_undo_recording)
            .map(|_| ())
    }
}
