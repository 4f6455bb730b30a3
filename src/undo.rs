//! Linear undo of recent deletions.
//!
//! The manager stores one [`UndoRecord`] per removed mug and replays them, in
//! recorded order, through a [`QuestionInserter`]. A cascading delete records
//! the deleted mug first and its descendants after it, so replay re-creates
//! every ancestor before anything positioned relative to it.

use tracing::{debug, warn};

use crate::errors::TreeResult;
use crate::mug::Mug;
use crate::position::Position;
use crate::tree::Tree;

/// Enough to re-run the insertion that restores one mug.
#[derive(Debug, Clone)]
pub struct UndoRecord<M> {
    pub mug: M,
    /// Reference mug `position` is relative to (the previous sibling in the
    /// common case); `None` means the root.
    pub previous_sibling: Option<M>,
    pub position: Position,
}

impl<M> UndoRecord<M> {
    pub fn new(mug: M, previous_sibling: Option<M>, position: Position) -> Self {
        Self {
            mug,
            previous_sibling,
            position,
        }
    }
}

/// The editor operation undo replays through.
pub trait QuestionInserter<M> {
    fn insert_question(
        &mut self,
        mug: M,
        previous_sibling: Option<&M>,
        position: Position,
        suppress_undo_recording: bool,
    ) -> TreeResult<()>;
}

impl<M: Mug> QuestionInserter<M> for Tree<M> {
    fn insert_question(
        &mut self,
        mug: M,
        previous_sibling: Option<&M>,
        position: Position,
        _suppress_undo_recording: bool,
    ) -> TreeResult<()> {
        self.insert_mug(mug, position, previous_sibling).map(|_| ())
    }
}

/// Presentation hook told whether anything can be undone.
pub trait UndoAffordance {
    fn toggle(&mut self, undo_available: bool);
}

/// Affordance for headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAffordance;

impl UndoAffordance for NoAffordance {
    fn toggle(&mut self, _undo_available: bool) {}
}

impl<F: FnMut(bool)> UndoAffordance for F {
    fn toggle(&mut self, undo_available: bool) {
        self(undo_available)
    }
}

#[derive(Debug)]
pub struct UndoManager<M, A = NoAffordance> {
    stack: Vec<UndoRecord<M>>,
    affordance: A,
}

impl<M: Mug> Default for UndoManager<M, NoAffordance> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Mug> UndoManager<M, NoAffordance> {
    pub fn new() -> Self {
        Self::with_affordance(NoAffordance)
    }
}

impl<M: Mug, A: UndoAffordance> UndoManager<M, A> {
    pub fn with_affordance(affordance: A) -> Self {
        Self {
            stack: Vec::new(),
            affordance,
        }
    }

    pub fn records(&self) -> &[UndoRecord<M>] {
        &self.stack
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn affordance(&self) -> &A {
        &self.affordance
    }

    /// Starts tracking a fresh deletion, discarding earlier records.
    pub fn reset_undo(&mut self, mug: M, previous_sibling: Option<M>, position: Position) {
        debug!(node_id = %mug.node_id(), %position, "reset undo");
        self.stack = vec![UndoRecord::new(mug, previous_sibling, position)];
        self.affordance.toggle(true);
    }

    /// Empties the stack.
    pub fn clear(&mut self) {
        self.stack.clear();
        self.affordance.toggle(false);
    }

    /// Adds one more record to the deletion being tracked.
    pub fn append_mug(&mut self, mug: M, previous_sibling: Option<M>, position: Position) {
        debug!(node_id = %mug.node_id(), %position, depth = self.stack.len() + 1, "append undo");
        self.stack
            .push(UndoRecord::new(mug, previous_sibling, position));
        self.affordance.toggle(true);
    }

    /// Replays every record in order, then empties the stack.
    ///
    /// Returns how many records were replayed. On an empty stack nothing
    /// happens. The stack is emptied even when a replay step fails; the
    /// error of that step is returned and later records are dropped.
    pub fn undo<I>(&mut self, inserter: &mut I) -> TreeResult<usize>
    where
        I: QuestionInserter<M> + ?Sized,
    {
        if self.stack.is_empty() {
            debug!("nothing to undo");
            return Ok(0);
        }
        let records = std::mem::take(&mut self.stack);
        let count = records.len();
        let result = records.into_iter().try_for_each(|record| {
            inserter.insert_question(
                record.mug,
                record.previous_sibling.as_ref(),
                record.position,
                true,
            )
        });
        self.affordance.toggle(false);

        match result {
            Ok(()) => {
                debug!(count, "undo replayed");
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "undo replay failed");
                Err(e)
            }
        }
    }
}
