//! Capability set a value must provide to live in a [`Tree`](crate::Tree).
//!
//! The tree never constructs or destroys mugs. It only arranges them and keeps
//! their parent back-reference in sync with the structure it maintains.

use std::fmt::Debug;
use std::hash::Hash;

/// Stable identity plus a human readable id.
pub trait Identifiable {
    /// Unique identifier, independent of display name and position.
    type Ufid: Clone + Eq + Hash + Debug;

    fn ufid(&self) -> Self::Ufid;

    /// Display identifier used for paths and structure dumps.
    fn node_id(&self) -> String;
}

pub trait Validatable {
    fn is_valid(&self) -> bool;
}

/// Back-reference to the mug of the enclosing node, `None` at top level.
pub trait Parentable: Identifiable {
    fn parent_mug(&self) -> Option<Self::Ufid>;

    fn set_parent_mug(&mut self, parent: Option<Self::Ufid>);
}

/// Everything the tree needs from a question value.
///
/// Mugs are cloned into events and undo records, so `Clone` should be cheap
/// (typically a shared handle).
pub trait Mug: Identifiable + Validatable + Parentable + Clone {}

impl<T> Mug for T where T: Identifiable + Validatable + Parentable + Clone {}
