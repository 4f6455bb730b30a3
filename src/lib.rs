//! formtree: ordered question tree for structural form editing.
//!
//! A [`Tree`] arranges mugs (question values) under an implicit root and keeps
//! every mug's parent back-reference in sync. [`UndoManager`] records enough
//! placement information before a cascading delete to restore the deleted
//! questions in their original order.

pub mod arena;
pub mod cli;
pub mod config;
pub mod errors;
pub mod events;
pub mod exitcode;
pub mod form;
pub mod mug;
pub mod node;
pub mod outline;
pub mod position;
pub mod question;
pub mod structure;
pub mod tree;
pub mod tree_traits;
pub mod undo;
pub mod util;

pub use errors::{TreeError, TreeResult};
pub use events::{SubscriptionId, TreeEvent};
pub use form::Form;
pub use mug::{Identifiable, Mug, Parentable, Validatable};
pub use node::{Node, NodeId, NodeQuery};
pub use position::Position;
pub use question::{Question, QuestionKind};
pub use structure::{Structure, Subtree};
pub use tree::{Tree, TreeType};
pub use tree_traits::ToTermTree;
pub use undo::{NoAffordance, QuestionInserter, UndoAffordance, UndoManager, UndoRecord};
