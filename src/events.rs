//! Change notifications emitted by a [`Tree`](crate::Tree).
//!
//! Listeners run synchronously inside the mutating call, after the structure
//! is consistent again. They receive the event only, never the tree, so a
//! listener cannot re-enter the tree it observes.

use std::fmt;

/// Event delivered to subscribers.
#[derive(Debug, Clone)]
pub enum TreeEvent<M> {
    /// The structure changed. Carries the mug that was inserted or moved;
    /// `None` for removals.
    Change { mug: Option<M> },
}

impl<M> TreeEvent<M> {
    pub fn mug(&self) -> Option<&M> {
        match self {
            TreeEvent::Change { mug } => mug.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<M> = Box<dyn FnMut(&TreeEvent<M>)>;

pub(crate) struct Listeners<M> {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener<M>)>,
}

impl<M> Default for Listeners<M> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<M> Listeners<M> {
    pub(crate) fn subscribe(&mut self, listener: Listener<M>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn emit(&mut self, event: &TreeEvent<M>) {
        for (_, listener) in self.entries.iter_mut() {
            listener(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<M> fmt::Debug for Listeners<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}
