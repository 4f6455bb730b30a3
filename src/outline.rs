//! TOML outline of nested questions, used to seed a tree.
//!
//! ```toml
//! [[question]]
//! id = "group"
//! kind = "group"
//!
//! [[question.children]]
//! id = "text2"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::errors::TreeResult;
use crate::position::Position;
use crate::question::{Question, QuestionKind};
use crate::tree::{Tree, TreeType};

#[derive(Error, Debug)]
pub enum OutlineError {
    #[error("failed to read outline {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid outline {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Outline {
    #[serde(default, rename = "question")]
    pub questions: Vec<OutlineQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutlineQuestion {
    pub id: String,
    #[serde(default)]
    pub kind: QuestionKind,
    #[serde(default)]
    pub children: Vec<OutlineQuestion>,
}

impl Outline {
    pub fn parse(content: &str, path: &Path) -> Result<Self, OutlineError> {
        toml::from_str(content).map_err(|e| OutlineError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, OutlineError> {
        let content = std::fs::read_to_string(path).map_err(|source| OutlineError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Builds a fresh tree, appending each question into its parent in
    /// document order.
    pub fn build_tree(
        &self,
        root_id: Option<String>,
        tree_type: TreeType,
    ) -> TreeResult<Tree<Question>> {
        let mut tree = Tree::new(root_id, tree_type);
        for question in &self.questions {
            insert_recursive(&mut tree, question, None)?;
        }
        debug!(questions = tree.len(), "outline loaded");
        Ok(tree)
    }
}

fn insert_recursive(
    tree: &mut Tree<Question>,
    question: &OutlineQuestion,
    parent: Option<&Question>,
) -> TreeResult<()> {
    let mug = Question::new(question.kind, question.id.clone());
    tree.insert_mug(mug.clone(), Position::Into, parent)?;
    for child in &question.children {
        insert_recursive(tree, child, Some(&mug))?;
    }
    Ok(())
}
