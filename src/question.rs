//! Concrete mug: a form question held through a shared handle.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mug::{Identifiable, Parentable, Validatable};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    #[default]
    Text,
    Int,
    Date,
    Trigger,
    Group,
    Repeat,
    Select,
    Choice,
}

impl QuestionKind {
    /// Kinds that hold other questions.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            QuestionKind::Group | QuestionKind::Repeat | QuestionKind::Select
        )
    }
}

#[derive(Debug)]
struct QuestionData {
    ufid: Uuid,
    kind: QuestionKind,
    node_id: RefCell<String>,
    parent: Cell<Option<Uuid>>,
}

/// Cloning yields another handle to the same question, so a parent update
/// made by the tree is visible through every clone.
#[derive(Clone)]
pub struct Question(Rc<QuestionData>);

fn node_id_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_\-.]*$").ok())
        .as_ref()
}

impl Question {
    pub fn new(kind: QuestionKind, node_id: impl Into<String>) -> Self {
        Self(Rc::new(QuestionData {
            ufid: Uuid::new_v4(),
            kind,
            node_id: RefCell::new(node_id.into()),
            parent: Cell::new(None),
        }))
    }

    pub fn text(node_id: impl Into<String>) -> Self {
        Self::new(QuestionKind::Text, node_id)
    }

    pub fn group(node_id: impl Into<String>) -> Self {
        Self::new(QuestionKind::Group, node_id)
    }

    pub fn kind(&self) -> QuestionKind {
        self.0.kind
    }

    /// Changes the display id; identity (ufid) is unaffected.
    pub fn rename(&self, node_id: impl Into<String>) {
        *self.0.node_id.borrow_mut() = node_id.into();
    }
}

impl PartialEq for Question {
    fn eq(&self, other: &Self) -> bool {
        self.0.ufid == other.0.ufid
    }
}

impl Eq for Question {}

impl fmt::Debug for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Question")
            .field("node_id", &self.0.node_id.borrow())
            .field("kind", &self.0.kind)
            .finish()
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.node_id.borrow())
    }
}

impl Identifiable for Question {
    type Ufid = Uuid;

    fn ufid(&self) -> Uuid {
        self.0.ufid
    }

    fn node_id(&self) -> String {
        self.0.node_id.borrow().clone()
    }
}

impl Validatable for Question {
    fn is_valid(&self) -> bool {
        node_id_pattern().is_some_and(|re| re.is_match(&self.0.node_id.borrow()))
    }
}

impl Parentable for Question {
    fn parent_mug(&self) -> Option<Uuid> {
        self.0.parent.get()
    }

    fn set_parent_mug(&mut self, parent: Option<Uuid>) {
        self.0.parent.set(parent);
    }
}
